//! Kestrel - an extension-driven application framework
//!
//! Kestrel opens windows through winit, renders through wgpu and drives a
//! list of [`Extension`]s through a fixed frame loop. Each tick the host
//! polls the [`EventQueue`](kestrel_winit::EventQueue) once, resizes
//! framebuffers whose window drawable changed, runs the extension hooks and
//! submits the GPU frame, then destroys windows that asked to close.
//!
//! # Quick Start
//!
//! ```no_run
//! use kestrel::prelude::*;
//!
//! struct Hello;
//!
//! impl Extension for Hello {
//!     fn on_window_created(&mut self, ctx: &mut AppContext, window: WindowId) {
//!         ctx.set_clear_color(window, 0x3070_90FF);
//!     }
//! }
//!
//! fn main() -> Result<(), AppError> {
//!     kestrel::core::logging::init();
//!     let mut app = kestrel::create_default_app()?.with_extension(Hello);
//!     app.create_window(&WindowDescriptor::new("Hello", Size::new(800, 600)))?;
//!     app.run();
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - [`core`]: logging, profiling, configuration, validation macros
//! - [`winit`]: event model, event queue, windowing backend
//! - [`render`]: GPU backend, graphics context, windows
//! - `egui` (feature `egui`): GUI input bridge and per-window contexts

pub mod app;
pub mod extension;
pub mod extensions;
pub mod simple_app;
pub mod time;

pub use kestrel_core as core;
pub use kestrel_render as render;
pub use kestrel_winit as winit;

#[cfg(feature = "egui")]
pub use kestrel_egui as egui;

pub use app::{App, AppContext, AppError, AppState};
pub use extension::Extension;
pub use extensions::QuitOnLastWindowClosed;
#[cfg(feature = "egui")]
pub use extensions::EguiExtension;
pub use simple_app::{create_default_app, create_simple_app};
#[cfg(feature = "egui")]
pub use simple_app::create_simple_gui_app;
pub use time::FrameTime;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::app::{App, AppContext, AppError, AppState};
    pub use crate::extension::Extension;
    pub use crate::extensions::QuitOnLastWindowClosed;
    pub use crate::time::FrameTime;
    pub use kestrel_core::geometry::Size;
    pub use kestrel_render::Window;
    pub use kestrel_winit::{WindowDescriptor, WindowEvent, WindowEventKind, WindowId};
}
