use std::env;

use crate::logging::DEFAULT_FILTER;

/// Environment variable overriding [`Config::log_filter`].
pub const LOG_ENV: &str = "KESTREL_LOG";
/// Environment variable selecting the [`ProfilingMode`] (`off`, `on`, `server`).
pub const PROFILE_ENV: &str = "KESTREL_PROFILE";

/// Configuration for a Kestrel application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `tracing-subscriber` filter directive.
    pub log_filter: String,
    pub profiling: ProfilingMode,
    /// Address the puffin server binds to in [`ProfilingMode::WithWebServer`].
    pub profiler_address: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_filter: DEFAULT_FILTER.to_string(),
            profiling: ProfilingMode::Off,
            profiler_address: "0.0.0.0:8585".to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `KESTREL_LOG` and `KESTREL_PROFILE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(filter) = lookup(LOG_ENV) {
            config.log_filter = filter;
        }
        if let Some(mode) = lookup(PROFILE_ENV) {
            match ProfilingMode::parse(&mode) {
                Some(mode) => config.profiling = mode,
                None => tracing::warn!("Unknown {} value '{}', profiling stays off", PROFILE_ENV, mode),
            }
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfilingMode {
    /// Profiling is disabled
    #[default]
    Off,
    /// Profiling scopes are recorded in-process
    On,
    /// Profiling scopes are recorded and served to external tools such as `puffin_viewer`
    WithWebServer,
}

impl ProfilingMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "off" | "0" | "false" => Some(Self::Off),
            "on" | "1" | "true" => Some(Self::On),
            "server" | "web" => Some(Self::WithWebServer),
            _ => None,
        }
    }
}
