use tracing::metadata::LevelFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "file-log")]
pub mod file;

/// Keeps buffered log writers alive; logs written after it drops may be lost.
#[must_use]
pub struct LogGuard {
    #[cfg(feature = "file-log")]
    _file: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Build the level filter from `RUST_LOG` style directives, `info` when none are given.
/// Invalid directives fall back to `info` and the error is handed back.
pub fn parse_log_level(directives: Option<&str>) -> (EnvFilter, Option<ParseError>) {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::INFO.into());
    match builder.parse(directives.unwrap_or_default()) {
        Ok(filter) => (filter, None),
        Err(err) => (
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .parse_lossy(""),
            Some(err),
        ),
    }
}

/// Install the global subscriber: stderr always, plus a log file with `file-log`.
pub fn setup_logging() -> LogGuard {
    let directives = std::env::var("RUST_LOG").ok();
    let (filter, parse_err) = parse_log_level(directives.as_deref());

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    #[cfg(feature = "file-log")]
    let (subscriber, file_guard) = {
        let (layer, guard) = file::layer().unzip();
        (subscriber.with(layer), guard)
    };

    if let Err(err) = subscriber.try_init() {
        eprintln!("Couldn't set up logging: {err}");
    }
    if let Some(err) = parse_err {
        tracing::warn!("Ignoring RUST_LOG: {err}");
    }

    LogGuard {
        #[cfg(feature = "file-log")]
        _file: file_guard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_directives_means_info() {
        let (filter, err) = parse_log_level(None);
        assert!(err.is_none());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn directives_are_honored() {
        let (filter, err) = parse_log_level(Some("trace"));
        assert!(err.is_none());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn broken_directives_fall_back_to_info() {
        let (filter, err) = parse_log_level(Some("tilewm=loud"));
        assert!(err.is_some());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }
}
