use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliError;

const DEFAULT_FILTER: &str = "warn,btc_whatif_core=info";

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`.
///
/// Logs go to stderr so `--format json` output on stdout stays parseable.
pub fn init_logging() -> Result<(), CliError> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))
}
