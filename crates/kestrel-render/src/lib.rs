//! GPU-facing half of Kestrel.
//!
//! A [`GraphicsContext`] owns one [`GpuBackend`] and the pool of view ids.
//! A [`Window`] ties a native window to a view and, on backends with
//! independent surfaces, to its own framebuffer.

pub mod backend;
pub mod context;
pub mod wgpu_backend;
pub mod window;

pub use backend::{ClearFlags, ClearPolicy, FramebufferHandle, GpuBackend, GpuError, ViewId};
pub use context::GraphicsContext;
pub use wgpu_backend::{WgpuBackend, WgpuBackendDescriptor};
pub use window::{ScopedWindow, Window, WindowError};
