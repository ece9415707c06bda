use anyhow::Result;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::Layer;
use tracing_subscriber::registry::LookupSpan;
use xdg::BaseDirectories;

const LOG_FILE_NAME: &str = "tilewm.log";

/// A layer writing to `$XDG_STATE_HOME/tilewm/tilewm.log`, or `None` if the directory
/// cannot be created.
pub fn layer<S>() -> Option<(impl Layer<S>, WorkerGuard)>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let dir = match log_dir() {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("Couldn't create the log directory: {err:#}");
            return None;
        }
    };
    let writer = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(non_blocking);
    Some((layer, guard))
}

fn log_dir() -> Result<PathBuf> {
    Ok(BaseDirectories::with_prefix("tilewm")?.create_state_directory("")?)
}
