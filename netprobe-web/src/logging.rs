use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig};

const LOG_FILE_PREFIX: &str = "netprobe.log";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides the configured level. The returned guard flushes the
/// log file on drop and must live as long as the server.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let (json_layer, pretty_layer) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json().with_current_span(false)), None),
        LogFormat::Pretty => (None, Some(fmt::layer().with_target(true))),
    };

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(pretty_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        level = %config.level,
        format = ?config.format,
        directory = config.directory.as_deref().unwrap_or("-"),
        "Logging initialized"
    );
    Ok(guard)
}
