//! Logging bootstrap on top of `tracing-subscriber`.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Default filter: verbose for kestrel, quiet for the GPU and windowing stacks.
pub const DEFAULT_FILTER: &str =
    "debug,wgpu_core=info,wgpu_hal=info,naga=info,winit=info,gilrs=info";

/// Install the fmt subscriber with [`DEFAULT_FILTER`].
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Install the fmt subscriber using the filter from the configuration.
pub fn init_from_config(config: &Config) {
    init_with_filter(&config.log_filter);
}

/// Install the fmt subscriber with a custom filter directive.
///
/// Calling this more than once is harmless: later calls are ignored.
pub fn init_with_filter(filter: &str) {
    let (env_filter, invalid) = match EnvFilter::try_new(filter) {
        Ok(env_filter) => (env_filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_FILTER), Some(e)),
    };

    if tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed, keeping it");
    }

    if let Some(e) = invalid {
        tracing::warn!("Invalid log filter '{}': {}, using the default", filter, e);
    }
}
