//! Logging utilities and structured logging support

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system.
///
/// Reads the filter from `RUST_LOG`. Only hosts should call this; the
/// runtime itself never installs a logger.
pub fn init() {
    env_logger::init();
}

/// Initialize logging with a fallback filter when `RUST_LOG` is unset.
///
/// Returns `false` if a logger was already installed.
pub fn init_with_default(filter: &str) -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .try_init()
        .is_ok()
}
