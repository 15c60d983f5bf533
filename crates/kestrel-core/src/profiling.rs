//! Profiling utilities based on the `puffin` crate.

#[cfg(feature = "profiling")]
use std::sync::OnceLock;

pub use puffin::{GlobalProfiler, profile_function, profile_scope};

use crate::config::ProfilingMode;

/// Global profiling server instance.
#[cfg(feature = "profiling")]
static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

/// Enable profiling as requested by the configuration.
///
/// `ProfilingMode::WithWebServer` additionally serves the data to
/// `puffin_viewer` on `address`. Without the `profiling` feature the server
/// is unavailable and only in-process scopes are enabled.
///
/// # Example
/// ```no_run
/// use kestrel_core::config::ProfilingMode;
/// use kestrel_core::profiling::init_profiling;
///
/// init_profiling(ProfilingMode::WithWebServer, "0.0.0.0:8585");
/// ```
pub fn init_profiling(mode: ProfilingMode, address: &str) {
    match mode {
        ProfilingMode::Off => {
            puffin::set_scopes_on(false);
        }
        ProfilingMode::On => {
            puffin::set_scopes_on(true);
            tracing::info!("Profiling scopes enabled");
        }
        ProfilingMode::WithWebServer => {
            puffin::set_scopes_on(true);
            start_server(address);
        }
    }
}

#[cfg(feature = "profiling")]
fn start_server(address: &str) {
    if PROFILING_SERVER.get().is_some() {
        tracing::debug!("Puffin server already running");
        return;
    }

    match puffin_http::Server::new(address) {
        Ok(server) => {
            tracing::info!("Puffin profiler server started on http://{}", address);
            let _ = PROFILING_SERVER.set(server);
        }
        Err(e) => {
            tracing::error!("Failed to start puffin server on {}: {}", address, e);
        }
    }
}

#[cfg(not(feature = "profiling"))]
fn start_server(address: &str) {
    tracing::warn!(
        "Profiling server on {} requested but the `profiling` feature is disabled",
        address
    );
}

/// Mark the start of a new frame for profiling.
///
/// The extension host calls this once per tick.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}
