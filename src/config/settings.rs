use chrono::Datelike;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid backend configuration: {0}")]
    Backend(String),
    #[error("Invalid reports configuration: {0}")]
    Reports(String),
    #[error("Invalid logging configuration: {0}")]
    Logging(String),
    #[error("Invalid Sentry configuration: {0}")]
    Sentry(String),
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    pub logging: LoggingConfig,
    pub sentry: SentryConfig,
    #[serde(default)]
    pub environment: String,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.backend.validate()?;
        self.reports.validate()?;
        self.logging.validate()?;
        self.sentry.validate()?;

        Ok(())
    }

    /// Check if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment == "development" || self.environment == "dev"
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment == "production" || self.environment == "prod"
    }
}

/// Dashboard backend the pages talk to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl BackendConfig {
    /// Validate backend configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.base_url.is_empty() {
            return Err(ConfigValidationError::Backend("Base URL cannot be empty".to_string()));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigValidationError::Backend(format!("Invalid base URL: {}", e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigValidationError::Backend(format!(
                "Base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigValidationError::Backend("Timeout must be greater than 0".to_string()));
        }

        if !self.login_path.starts_with('/') {
            return Err(ConfigValidationError::Backend(
                "Login path must start with '/'".to_string(),
            ));
        }

        Ok(())
    }

    /// Base URL normalized with a trailing slash so relative endpoints join under it
    pub fn base_url(&self) -> Result<Url, ConfigValidationError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ConfigValidationError::Backend(format!("Invalid base URL: {}", e)))?;

        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(url)
    }
}

fn default_login_path() -> String {
    "/login".to_string()
}

/// Financial reports configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Reference year for the monthly report; the current year when unset
    #[serde(default)]
    pub year: Option<i32>,
}

impl ReportsConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(year) = self.year {
            if !(2000..=2100).contains(&year) {
                return Err(ConfigValidationError::Reports(format!(
                    "Year {} is outside 2000-2100",
                    year
                )));
            }
        }

        Ok(())
    }

    pub fn effective_year(&self) -> i32 {
        self.year.unwrap_or_else(|| chrono::Local::now().year())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub include_location: bool,
    #[serde(default = "default_log_target")]
    pub target: String,
    #[serde(default)]
    pub file_path: Option<String>,
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigValidationError::Logging(format!(
                "Invalid log level '{}'. Valid levels: {}",
                self.level,
                valid_levels.join(", ")
            )));
        }

        let valid_formats = ["json", "pretty", "compact"];
        if !valid_formats.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigValidationError::Logging(format!(
                "Invalid log format '{}'. Valid formats: {}",
                self.format,
                valid_formats.join(", ")
            )));
        }

        let valid_targets = ["stdout", "stderr", "file"];
        if !valid_targets.contains(&self.target.to_lowercase().as_str()) {
            return Err(ConfigValidationError::Logging(format!(
                "Invalid log target '{}'. Valid targets: {}",
                self.target,
                valid_targets.join(", ")
            )));
        }

        if self.target.to_lowercase() == "file" && self.file_path.is_none() {
            return Err(ConfigValidationError::Logging(
                "File path must be provided when target is 'file'".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_log_target() -> String {
    "stderr".to_string()
}

/// Sentry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentryConfig {
    pub dsn: String,
    pub environment: String,
    pub traces_sample_rate: f32,
    #[serde(default = "default_release")]
    pub release: Option<String>,
    #[serde(default = "default_max_breadcrumbs")]
    pub max_breadcrumbs: usize,
    #[serde(default)]
    pub debug: bool,
}

impl SentryConfig {
    /// Validate Sentry configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        // Empty DSN disables Sentry
        if !self.dsn.is_empty() && !self.dsn.starts_with("https://") && !self.dsn.starts_with("http://") {
            return Err(ConfigValidationError::Sentry(
                "DSN must be a valid URL starting with http:// or https://".to_string(),
            ));
        }

        if self.environment.is_empty() {
            return Err(ConfigValidationError::Sentry("Environment cannot be empty".to_string()));
        }

        if !(0.0..=1.0).contains(&self.traces_sample_rate) {
            return Err(ConfigValidationError::Sentry(
                "Traces sample rate must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.max_breadcrumbs == 0 {
            return Err(ConfigValidationError::Sentry("Max breadcrumbs must be greater than 0".to_string()));
        }

        Ok(())
    }

    /// Check if Sentry is enabled (has a DSN)
    pub fn is_enabled(&self) -> bool {
        !self.dsn.is_empty()
    }
}

fn default_release() -> Option<String> {
    Some(env!("CARGO_PKG_VERSION").to_string())
}

fn default_max_breadcrumbs() -> usize {
    100
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 30,
            login_path: default_login_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            include_location: false,
            target: default_log_target(),
            file_path: None,
        }
    }
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: "".to_string(),
            environment: "development".to_string(),
            traces_sample_rate: 0.1,
            release: default_release(),
            max_breadcrumbs: default_max_breadcrumbs(),
            debug: false,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            reports: ReportsConfig::default(),
            logging: LoggingConfig::default(),
            sentry: SentryConfig::default(),
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_environment_predicates() {
        let mut config = AppConfig::default();
        assert!(config.is_development());

        config.environment = "prod".to_string();
        assert!(config.is_production());
        assert!(!config.is_development());
    }

    #[test]
    fn test_backend_rejects_non_http_scheme() {
        let backend = BackendConfig {
            base_url: "ftp://example.com".to_string(),
            ..BackendConfig::default()
        };

        assert!(matches!(backend.validate(), Err(ConfigValidationError::Backend(_))));
    }

    #[test]
    fn test_backend_rejects_relative_login_path() {
        let backend = BackendConfig {
            login_path: "login".to_string(),
            ..BackendConfig::default()
        };

        assert!(backend.validate().is_err());
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let backend = BackendConfig {
            base_url: "http://localhost:8080/dashboard".to_string(),
            ..BackendConfig::default()
        };

        let url = backend.base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/dashboard/");
        assert_eq!(
            url.join("api/agenda/listar").unwrap().as_str(),
            "http://localhost:8080/dashboard/api/agenda/listar"
        );
    }

    #[test]
    fn test_reports_year_bounds() {
        assert!(ReportsConfig { year: Some(2025) }.validate().is_ok());
        assert!(ReportsConfig { year: Some(1999) }.validate().is_err());
        assert_eq!(ReportsConfig { year: Some(2025) }.effective_year(), 2025);
    }

    #[test]
    fn test_logging_file_target_requires_path() {
        let logging = LoggingConfig {
            target: "file".to_string(),
            ..LoggingConfig::default()
        };

        assert!(matches!(logging.validate(), Err(ConfigValidationError::Logging(_))));
    }

    #[test]
    fn test_sentry_sample_rate_range() {
        let sentry = SentryConfig {
            traces_sample_rate: 1.5,
            ..SentryConfig::default()
        };

        assert!(sentry.validate().is_err());
        assert!(!SentryConfig::default().is_enabled());
    }
}
