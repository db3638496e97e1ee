//! Tracing bootstrap.

use tracing::{debug, instrument};
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins over `filter` when set. Returns false if a subscriber was
/// already installed, so repeated calls from tests are harmless.
#[instrument]
pub fn init_tracing(filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .is_ok();
    debug!(installed, "Tracing initialized");
    installed
}
