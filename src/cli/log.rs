use std::io;

use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::process::Process;

pub const LOG_ENV: &str = "DIST_SYNC_LOG";

/// A subscriber writing to stderr, filtered by `DIST_SYNC_LOG` when set and
/// otherwise at `info` (`debug` when `verbose`).
pub fn tracing_subscriber(
    process: &Process,
    verbose: bool,
) -> impl Subscriber + Send + Sync + use<> {
    tracing_subscriber::registry().with(env_filter(process, verbose)).with(
        fmt::layer()
            .with_writer(io::stderr)
            .with_ansi(process.stderr_is_a_tty())
            .with_target(false)
            .without_time(),
    )
}

fn env_filter(process: &Process, verbose: bool) -> EnvFilter {
    match process.var(LOG_ENV) {
        Ok(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ if verbose => EnvFilter::new("debug"),
        _ => EnvFilter::new("info"),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tracing::level_filters::LevelFilter;

    use super::*;

    fn process(log: Option<&str>) -> Process {
        Process::with_vars(
            log.map(|v| (LOG_ENV.to_owned(), v.to_owned()))
                .into_iter()
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn defaults_to_info() {
        let filter = env_filter(&process(None), false);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn verbose_raises_default_to_debug() {
        let filter = env_filter(&process(None), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));

        let filter = env_filter(&process(Some("")), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn env_overrides_verbose() {
        let filter = env_filter(&process(Some("warn")), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));

        let filter = env_filter(&process(Some("trace")), false);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }
}
