//! Logging setup shared by the CLI and the report server.
//!
//! Logs always go to stderr so the CLI can print reports on stdout.

use std::env;
use std::net::SocketAddr;

use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Quieter baseline for one-shot CLI runs.
    pub fn cli() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            include_target: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Applies `KSM_LOG_LEVEL`, `KSM_LOG_FORMAT` and `KSM_LOG_TARGET` on top of
/// `base`. Unparseable values keep the base setting.
pub fn logging_config_from_env(base: LoggingConfig) -> LoggingConfig {
    let mut config = base;

    if let Ok(level) = env::var("KSM_LOG_LEVEL") {
        let trimmed = level.trim();
        if !trimmed.is_empty() {
            config.level = trimmed.to_string();
        }
    }

    if let Some(format) = env::var("KSM_LOG_FORMAT")
        .ok()
        .and_then(|raw| parse_log_format(&raw))
    {
        config.format = format;
    }

    if let Some(include_target) = env::var("KSM_LOG_TARGET")
        .ok()
        .and_then(|raw| parse_bool(&raw))
    {
        config.include_target = include_target;
    }

    config
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let env_filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(config.include_target)
        .with_ansi(!matches!(config.format, LogFormat::Json));

    match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
        LogFormat::Compact => {
            tracing::subscriber::set_global_default(builder.compact().finish())?
        }
    }

    Ok(())
}

pub fn log_app_start(component: &'static str, config: &LoggingConfig) {
    info!(
        component,
        event = "app.start",
        log_level = %config.level,
        log_format = ?config.format,
        include_target = config.include_target
    );
}

pub fn log_app_bind(bound_addr: SocketAddr) {
    info!(
        component = "report_server",
        event = "app.bind",
        bind_addr = %bound_addr,
        route = "/report"
    );
}

pub fn log_source_selected(source: &str, reason: Option<&str>, season: &str) {
    match reason {
        Some(reason) => info!(
            component = "report_server",
            event = "source.selected",
            source,
            reason,
            season
        ),
        None => info!(
            component = "report_server",
            event = "source.selected",
            source,
            season
        ),
    }
}

fn parse_log_format(raw: &str) -> Option<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" => Some(LogFormat::Pretty),
        "compact" => Some(LogFormat::Compact),
        _ => None,
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
