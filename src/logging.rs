//! Diagnostic logging setup.
//!
//! Progress and summaries are printed with `eprintln!`; everything else goes
//! through `tracing`, filtered by `RUST_LOG` (default `warn`).

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
