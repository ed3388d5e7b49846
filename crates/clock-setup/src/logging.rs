//! Log output for the command-line tools.
//!
//! Progress (`INFO` and below) goes to stdout, problems (`WARN`, `ERROR`) to
//! stderr, so scripts can capture the report and still see failures.
//! `RUST_LOG` overrides the default `info` filter.

use platform::config::{APP_NAME, APP_VERSION};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Call once, first thing in `main`.
pub fn init() -> anyhow::Result<()> {
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_target(false)
        .without_time()
        .try_init()
        .map_err(|err| anyhow::anyhow!("cannot install log subscriber: {err}"))?;
    tracing::debug!("{APP_NAME} {APP_VERSION}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        // The first call may lose to another test in this binary.
        let _ = init();
        assert!(init().is_err());
    }
}
