use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LOG_FILE_PREFIX};

/// Install the global subscriber and bridge `log` records (sqlx) into tracing.
///
/// Without a log directory events go to stderr so command output on stdout stays
/// clean. With one, a daily rolling file is used and the returned guard must be
/// held until exit so buffered lines are flushed.
pub fn init(config: &LogConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let _ = tracing_log::LogTracer::init();

    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("parse log filter {:?}", config.filter))?;

    let (writer, guard) = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (tracing_subscriber::fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (
            tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stderr),
            None,
        ),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_ansi(config.dir.is_none())
        .with_writer(writer);

    // A subscriber may already be installed (tests); keep it.
    let _ = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    tracing::debug!(
        target: "resortdesk",
        event = "logging_ready",
        filter = %config.filter,
        json = config.json,
        file = config.dir.is_some()
    );
    Ok(guard)
}
