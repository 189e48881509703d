use tracing_subscriber::EnvFilter;

use crate::triage::etl::error::{Result, ToolError};

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "triage_etl=info";

/// Installs the global tracing subscriber, writing to stderr.
pub fn init_logging() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}
