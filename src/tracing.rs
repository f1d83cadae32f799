use crate::config::settings::{AppConfig, LoggingConfig, SentryConfig};
use anyhow::Result;
use std::io;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};
use uuid::Uuid;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Correlation ID attached to every backend request
#[derive(Debug, Clone)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a new correlation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Keeps the file writer and the Sentry client alive; drop it on exit to flush
#[must_use]
pub struct TracingGuards {
    _writer: Option<WorkerGuard>,
    _sentry: Option<sentry::ClientInitGuard>,
}

impl TracingGuards {
    pub fn has_file_writer(&self) -> bool {
        self._writer.is_some()
    }
}

/// Initialize the global tracing subscriber and, when a DSN is set, Sentry
pub fn init_tracing(config: &AppConfig) -> Result<TracingGuards> {
    let logging_config = &config.logging;
    let sentry_config = &config.sentry;

    let sentry_guard = init_sentry(sentry_config)?;
    let env_filter = create_env_filter(logging_config);

    let (fmt_layer, writer_guard) = match logging_config.target.to_lowercase().as_str() {
        "stdout" => (build_fmt_layer(logging_config, io::stdout), None),
        "file" => {
            let (writer, guard) = file_writer(logging_config)?;
            (build_fmt_layer(logging_config, writer), Some(guard))
        }
        _ => (build_fmt_layer(logging_config, io::stderr), None),
    };

    let sentry_layer = sentry_guard.as_ref().map(|_| create_sentry_layer());

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .with(sentry_layer)
        .try_init()?;

    tracing::info!(
        level = %logging_config.level,
        format = %logging_config.format,
        target = %logging_config.target,
        sentry_enabled = sentry_config.is_enabled(),
        "Tracing initialized"
    );

    Ok(TracingGuards {
        _writer: writer_guard,
        _sentry: sentry_guard,
    })
}

fn init_sentry(config: &SentryConfig) -> Result<Option<sentry::ClientInitGuard>> {
    if !config.is_enabled() {
        return Ok(None);
    }

    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(config.dsn.parse()?),
        environment: Some(config.environment.clone().into()),
        release: config.release.clone().map(Into::into),
        traces_sample_rate: config.traces_sample_rate,
        max_breadcrumbs: config.max_breadcrumbs,
        debug: config.debug,
        ..Default::default()
    });

    sentry::configure_scope(|scope| {
        scope.set_tag("service", "healthmoney-dashboard");
        scope.set_tag("version", env!("CARGO_PKG_VERSION"));
    });

    Ok(Some(guard))
}

/// Mask the key part of a DSN for logging
fn mask_dsn(dsn: &str) -> String {
    match dsn.parse::<url::Url>() {
        Ok(parsed) => format!("{}://***@{}", parsed.scheme(), parsed.host_str().unwrap_or("unknown")),
        Err(_) => "***".to_string(),
    }
}

fn create_sentry_layer<S>() -> sentry::integrations::tracing::SentryLayer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    use sentry::integrations::tracing::EventFilter;

    sentry::integrations::tracing::layer().event_filter(|md| match *md.level() {
        tracing::Level::ERROR => EventFilter::Event,
        tracing::Level::TRACE => EventFilter::Ignore,
        _ => EventFilter::Breadcrumb,
    })
}

/// RUST_LOG wins over the configured level; unparseable levels fall back to info
fn create_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn build_fmt_layer<W>(config: &LoggingConfig, writer: W) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(FmtSpan::CLOSE);

    match config.format.to_lowercase().as_str() {
        "pretty" => layer.pretty().boxed(),
        "compact" => layer.compact().boxed(),
        _ => layer.json().boxed(),
    }
}

fn file_writer(config: &LoggingConfig) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let file_path = config
        .file_path
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("File path is required when target is 'file'"))?;

    let path = std::path::Path::new(file_path);
    let directory = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Invalid file path: {}", file_path))?;
    let filename = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid filename: {}", file_path))?;

    std::fs::create_dir_all(directory)?;

    let file_appender = tracing_appender::rolling::daily(directory, filename);
    Ok(tracing_appender::non_blocking(file_appender))
}

/// Log line describing where Sentry reports go, without leaking the key
pub fn sentry_summary(config: &SentryConfig) -> String {
    if config.is_enabled() {
        format!("{} ({})", mask_dsn(&config.dsn), config.environment)
    } else {
        "disabled".to_string()
    }
}
