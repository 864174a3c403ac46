//! Tracing subscriber setup

use crate::config::{LogFormat, LogSettings};
use crate::telemetry;
use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

const LOG_FILE_PREFIX: &str = "taskhub.log";

pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; hold it until exit.
pub fn init(settings: &LogSettings) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins over the configured filter
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .context("Invalid log filter")?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    match settings.format {
        // Production: JSON structured logging
        LogFormat::Json => layers.push(fmt::layer().json().boxed()),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => layers.push(fmt::layer().pretty().boxed()),
    }

    let guard = match &settings.directory {
        Some(dir) => {
            let dir = shellexpand::tilde(dir).into_owned();
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            layers.push(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .boxed(),
            );
            Some(guard)
        }
        None => None,
    };

    let otel_layer = telemetry::layer()?;
    if let Some(layer) = otel_layer {
        layers.push(layer);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
