//! Logging setup for binaries embedding the collision core
//!
//! The library only emits through the `log` facade and never installs a
//! logger on its own.

pub use log::{debug, info, warn, trace};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Install `env_logger`, honoring `RUST_LOG` and falling back to [`DEFAULT_FILTER`]
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_FILTER)).init();
}
