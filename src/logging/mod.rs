/*!
 * Logging Module
 * tracing subscriber setup and the request logging middleware
 */
pub mod config;
pub mod middleware;

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt,
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use config::{LogFormat, LoggingConfig};

type BaseSubscriber = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<BaseSubscriber> + Send + Sync>;

/// Installs the global subscriber.
///
/// The returned guards flush the background writers on drop; hold them for
/// the lifetime of the process.
pub fn init(config: &LoggingConfig) -> Vec<WorkerGuard> {
    let mut guards = Vec::new();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let (console_writer, console_guard) = non_blocking(io::stdout());
    guards.push(console_guard);

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.write_files {
        std::fs::create_dir_all(&config.directory).ok();

        let (file_writer, file_guard) = non_blocking(rolling::daily(&config.directory, "app.log"));
        let (error_writer, error_guard) =
            non_blocking(rolling::daily(&config.directory, "error.log"));
        guards.push(file_guard);
        guards.push(error_guard);

        match config.format {
            LogFormat::Json => {
                layers.push(
                    fmt::layer()
                        .json()
                        .with_writer(file_writer)
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true)
                        .boxed(),
                );
                layers.push(
                    fmt::layer()
                        .json()
                        .with_writer(error_writer)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_filter(tracing_subscriber::filter::LevelFilter::ERROR)
                        .boxed(),
                );
            }
            LogFormat::Pretty => {
                layers.push(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true)
                        .with_ansi(false)
                        .boxed(),
                );
                layers.push(
                    fmt::layer()
                        .with_writer(error_writer)
                        .with_ansi(false)
                        .with_filter(tracing_subscriber::filter::LevelFilter::ERROR)
                        .boxed(),
                );
            }
        }
    }

    match config.format {
        LogFormat::Json => layers.push(
            fmt::layer()
                .json()
                .with_writer(console_writer)
                .with_target(false)
                .boxed(),
        ),
        LogFormat::Pretty => layers.push(
            fmt::layer()
                .with_writer(console_writer)
                .with_target(true)
                .pretty()
                .boxed(),
        ),
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .init();

    tracing::info!("Logging initialized for {} environment", config.environment);
    guards
}
