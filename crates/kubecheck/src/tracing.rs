use color_eyre::Result;
use color_eyre::eyre::Context;
use std::fs::{self, File};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the tracing subscriber
///
/// Events go to `log_file` when one is given (its parent directory is created if needed) and to
/// stdout otherwise. Either way they are written through a non-blocking worker so that slow log
/// I/O never stalls a request. The returned [`WorkerGuard`] must be kept alive for the duration of
/// the program to ensure buffered logs are flushed on shutdown.
pub fn init_tracing(log_file: Option<&Path>) -> Result<WorkerGuard> {
    let (writer, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
            }
            let file = File::create(path)
                .wrap_err_with(|| format!("failed to create {}", path.display()))?;
            non_blocking(file)
        }
        None => non_blocking(std::io::stdout()),
    };

    // By default, the subscriber is configured to log all events with a level of `INFO` or higher,
    // but this can be changed by setting the `RUST_LOG` environment variable.
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(log_file.is_none()),
        )
        .with(ErrorLayer::default())
        .try_init()
        .wrap_err("failed to install tracing subscriber")?;

    Ok(guard)
}
