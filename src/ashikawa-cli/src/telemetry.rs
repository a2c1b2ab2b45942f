//! Log setup for the command line client
//!
//! Human readable logs go to stderr so stdout stays clean for query rows.
//! With `--log-dir`, JSON logs are also written to a rolling file
//! (10MB per file, daily rotation).

use anyhow::Result;
use rolling_file::{RollingConditionBasic, RollingFileAppender};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const DEFAULT_FILTER: &str = "ashikawa=info,ashikawa_core=info,ashikawa_rs=info";

/// Install the global subscriber
///
/// The returned guard must be kept alive until exit so the file writer flushes
pub fn init_telemetry(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let file_appender = RollingFileAppender::new(
                log_dir.join("ashikawa.log"),
                RollingConditionBasic::new()
                    .daily()
                    .max_size(10 * 1024 * 1024),
                9,
            )?;
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()?;

    if let Some(log_dir) = log_dir {
        tracing::debug!("File logging to {:?}", log_dir);
    }

    Ok(guard)
}
