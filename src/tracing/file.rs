use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

use super::filter::CrateLevelFilter;
use super::format::AtharFormat;
use crate::config::LoggingConfig;
use crate::err_with_loc;
use crate::error::EngineError;

/// Keeps the non-blocking log writers flushing; drop only at process exit.
#[must_use]
pub struct TracingGuards {
    _guards: Vec<WorkerGuard>,
}

pub fn setup_tracing(
    engine_name: &str,
    logging_config: &LoggingConfig,
) -> crate::Result<TracingGuards> {
    let base_logs_dir = Path::new(logging_config.directory.as_deref().unwrap_or(".logs"));
    let debug_dir = base_logs_dir.join("debug");
    let error_dir = base_logs_dir.join("error");

    for dir in [base_logs_dir, debug_dir.as_path(), error_dir.as_path()] {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| {
                err_with_loc!(EngineError::SetupTracingError(format!(
                    "failed to create logs directory {}: {}",
                    dir.display(),
                    e
                )))
            })?;
        }
    }

    let file_name = format!("{}.log", engine_name);
    let rotation = logging_config.rotation;
    let debug_appender = RollingFileAppender::new(rotation.into(), &debug_dir, &file_name);
    let error_appender = RollingFileAppender::new(rotation.into(), &error_dir, &file_name);

    let (non_blocking_debug, debug_guard) = tracing_appender::non_blocking(debug_appender);
    let (non_blocking_error, error_guard) = tracing_appender::non_blocking(error_appender);
    #[allow(unused_mut)]
    let mut guards = vec![debug_guard, error_guard];

    let format = AtharFormat::new(engine_name);

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(false)
                .event_format(format.clone())
                .with_writer(non_blocking_debug)
                .with_filter(CrateLevelFilter::debug_only()),
        )
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(false)
                .event_format(format.clone())
                .with_writer(non_blocking_error)
                .with_filter(CrateLevelFilter::error_warn()),
        );

    // Terminal output goes to stderr so stdout stays reserved for search documents
    #[cfg(feature = "prod")]
    let subscriber = subscriber.with(
        tracing_subscriber::fmt::Layer::default()
            .with_ansi(true)
            .event_format(format.clone())
            .with_writer(std::io::stderr)
            .with_filter(CrateLevelFilter::error_only()),
    );

    #[cfg(feature = "dev")]
    let subscriber = {
        let info_appender = RollingFileAppender::new(rotation.into(), base_logs_dir, &file_name);
        let (non_blocking_info, info_guard) = tracing_appender::non_blocking(info_appender);
        guards.push(info_guard);
        subscriber
            .with(
                tracing_subscriber::fmt::Layer::default()
                    .with_ansi(true)
                    .event_format(format.clone())
                    .with_writer(std::io::stderr)
                    .with_filter(CrateLevelFilter::info_only()),
            )
            .with(
                tracing_subscriber::fmt::Layer::default()
                    .with_ansi(false)
                    .event_format(format.clone())
                    .with_writer(non_blocking_info)
                    .with_filter(CrateLevelFilter::info_only()),
            )
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| err_with_loc!(EngineError::SetupTracingError(e.to_string())))?;

    tracing::info!(
        "{}_logging_started::debug_logs::{}::error_logs::{}",
        engine_name,
        debug_dir.display(),
        error_dir.display()
    );

    Ok(TracingGuards { _guards: guards })
}
