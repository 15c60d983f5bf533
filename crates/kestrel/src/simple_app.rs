//! Ready-made hosts.

use kestrel_render::{GpuBackend, WgpuBackend, WgpuBackendDescriptor};
use kestrel_winit::{Platform, WinitPlatform};

use crate::app::{App, AppError};
use crate::extensions::QuitOnLastWindowClosed;

/// A host that stops once its last window is closed.
pub fn create_simple_app(platform: Box<dyn Platform>, backend: Box<dyn GpuBackend>) -> App {
    App::new(platform, backend).with_extension(QuitOnLastWindowClosed)
}

/// [`create_simple_app`] that also draws `ui` in every window.
#[cfg(feature = "egui")]
pub fn create_simple_gui_app(
    platform: Box<dyn Platform>,
    backend: Box<dyn GpuBackend>,
    ui: impl FnMut(kestrel_winit::WindowId, &kestrel_egui::EguiContext) + 'static,
) -> App {
    create_simple_app(platform, backend).with_extension(crate::extensions::EguiExtension::new(ui))
}

/// [`create_simple_app`] on winit and wgpu with default settings.
///
/// Reads logging and profiling settings from the environment.
pub fn create_default_app() -> Result<App, AppError> {
    let config = kestrel_core::config::Config::from_env();
    let platform = WinitPlatform::new()?;
    let backend = WgpuBackend::new(WgpuBackendDescriptor::default())?;
    Ok(create_simple_app(Box::new(platform), Box::new(backend)).with_config(config))
}
