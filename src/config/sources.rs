use crate::config::settings::{AppConfig, ConfigValidationError};
use config::{Config, ConfigError, Environment, File, FileFormat};
use std::env;
use std::path::Path;

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Validation error: {0}")]
    Validation(#[from] ConfigValidationError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AppConfig {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables with the `APP__` prefix (highest priority)
    /// 2. `config/local.yaml`
    /// 3. `config/{environment}.yaml`
    /// 4. `config/default.yaml`
    /// 5. Embedded defaults (lowest priority)
    pub fn load() -> Result<Self, ConfigLoadError> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let mut builder = Config::builder().add_source(File::from_str(
            Self::default_config_template(),
            FileFormat::Yaml,
        ));

        for name in ["default", environment.as_str(), "local"] {
            let base = format!("config/{}", name);
            if Path::new(&format!("{}.yaml", base)).exists() || Path::new(&format!("{}.yml", base)).exists() {
                builder = builder.add_source(File::with_name(&base).format(FileFormat::Yaml).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        );

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;
        app_config.environment = environment;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Generate a configuration template with all available options and documentation
    pub fn generate_template() -> String {
        Self::default_config_template().to_string()
    }

    /// Write a configuration template to a file
    pub fn write_template<P: AsRef<Path>>(path: P) -> Result<(), ConfigLoadError> {
        std::fs::write(path, Self::generate_template())?;
        Ok(())
    }

    fn default_config_template() -> &'static str {
        r#"# HealthMoney dashboard configuration
# Every key can be overridden with APP__SECTION__KEY environment variables.

# Application environment (development, production, test)
environment: "development"

# Dashboard backend
backend:
  # Base URL the /api/agenda and /api/relatorios endpoints live under
  base_url: "http://localhost:8080"
  # Transport timeout for each request in seconds
  timeout_seconds: 30
  # Where the host page navigates when the session has expired
  login_path: "/login"

# Financial reports (optional)
# reports:
#   # Reference year for monthly reports (defaults to the current year)
#   year: 2025

# Logging configuration
logging:
  # Log level: trace, debug, info, warn, error
  level: "info"
  # Log format: json, pretty, compact
  format: "compact"
  # Include source code location in logs
  include_location: false
  # Log target: stdout, stderr, file
  target: "stderr"
  # File path (required if target is "file")
  # file_path: "/var/log/healthmoney.log"

# Sentry error monitoring configuration
sentry:
  # Sentry DSN (leave empty to disable Sentry)
  dsn: ""
  environment: "development"
  # Sample rate for performance tracing (0.0 to 1.0)
  traces_sample_rate: 0.1
  # Maximum number of breadcrumbs to keep
  max_breadcrumbs: 100
  debug: false
"#
    }

    /// Get configuration as a YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Get configuration as a pretty-printed JSON string
    pub fn to_json(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_template_deserializes() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(AppConfig::default_config_template(), FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.backend.login_path, "/login");
        assert_eq!(config.reports.year, None);
    }

    #[test]
    fn test_config_template_generation() {
        let template = AppConfig::generate_template();
        assert!(template.contains("backend:"));
        assert!(template.contains("logging:"));
        assert!(template.contains("sentry:"));
    }

    #[test]
    fn test_config_from_file() {
        let temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        let config_content = r#"
environment: "test"
backend:
  base_url: "https://dashboard.example.com"
  timeout_seconds: 5
  login_path: "/entrar"
reports:
  year: 2025
logging:
  level: "debug"
  format: "pretty"
  include_location: true
  target: "stdout"
sentry:
  dsn: ""
  environment: "test"
  traces_sample_rate: 0.0
  max_breadcrumbs: 50
  debug: true
"#;
        std::fs::write(temp_file.path(), config_content).unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.environment, "test");
        assert_eq!(config.backend.base_url, "https://dashboard.example.com");
        assert_eq!(config.backend.timeout_seconds, 5);
        assert_eq!(config.backend.login_path, "/entrar");
        assert_eq!(config.reports.year, Some(2025));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_config_validation_errors() {
        let temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        let invalid_config = r#"
environment: "test"
backend:
  base_url: "not a url"
  timeout_seconds: 0
logging:
  level: "invalid"
  format: "json"
  include_location: false
sentry:
  dsn: ""
  environment: "test"
  traces_sample_rate: 0.0
"#;
        std::fs::write(temp_file.path(), invalid_config).unwrap();

        let result = AppConfig::load_from_file(temp_file.path());
        assert!(matches!(result, Err(ConfigLoadError::Validation(_))));
    }

    #[test]
    fn test_write_template_round_trips_through_loader() {
        let temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        AppConfig::write_template(temp_file.path()).unwrap();

        let config = AppConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.backend.timeout_seconds, 30);
        assert!(config.to_yaml().unwrap().contains("base_url"));
        assert!(config.to_json().unwrap().contains("\"login_path\""));
    }
}
