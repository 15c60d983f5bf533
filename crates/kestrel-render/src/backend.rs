use std::fmt;

use bitflags::bitflags;
use kestrel_core::geometry::{Rect, Size};
use kestrel_winit::{NativeWindow, WindowId};

/// Numbered render slot of the GPU backend.
pub type ViewId = u16;

/// Opaque render target created for one native window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferHandle(pub u32);

bitflags! {
    /// Attachments cleared at the start of a view.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// How a view is cleared before drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearPolicy {
    pub flags: ClearFlags,
    /// Packed `0xRRGGBBAA`.
    pub rgba: u32,
    pub depth: f32,
    pub stencil: u8,
}

impl ClearPolicy {
    pub const fn color(rgba: u32) -> Self {
        Self {
            flags: ClearFlags::COLOR.union(ClearFlags::DEPTH),
            rgba,
            depth: 1.0,
            stencil: 0,
        }
    }

    /// Colour channels normalized to `[0, 1]`.
    pub fn rgba_f64(&self) -> [f64; 4] {
        let channel = |shift: u32| ((self.rgba >> shift) & 0xFF) as f64 / 255.0;
        [channel(24), channel(16), channel(8), channel(0)]
    }
}

impl Default for ClearPolicy {
    fn default() -> Self {
        Self::color(0x0000_00FF)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpuError {
    AdapterUnavailable(String),
    DeviceCreation(String),
    SurfaceCreation(String),
    /// The window has no OS handle to build a surface from.
    MissingNativeHandle(WindowId),
    /// The adapter cannot present to the surface.
    UnsupportedSurface,
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::AdapterUnavailable(msg) => write!(f, "No suitable GPU adapter: {}", msg),
            GpuError::DeviceCreation(msg) => write!(f, "Failed to create GPU device: {}", msg),
            GpuError::SurfaceCreation(msg) => write!(f, "Failed to create surface: {}", msg),
            GpuError::MissingNativeHandle(id) => {
                write!(f, "Window {:?} has no native handle", id)
            }
            GpuError::UnsupportedSurface => write!(f, "Surface is not supported by the adapter"),
        }
    }
}

impl std::error::Error for GpuError {}

/// GPU backend consumed by [`GraphicsContext`](crate::GraphicsContext) and
/// [`Window`](crate::Window).
///
/// Views are numbered slots; each view is bound to a framebuffer (or to the
/// backbuffer when bound to `None`), a viewport and a clear policy. Only
/// touched views are drawn by [`submit_frame`](Self::submit_frame).
pub trait GpuBackend {
    fn name(&self) -> &str;

    /// Whether every window can own an independent surface.
    fn supports_multiple_surfaces(&self) -> bool;

    /// Number of view slots.
    fn max_views(&self) -> u16;

    /// Creates a render target for `window` at `size` physical pixels.
    fn create_framebuffer(
        &mut self,
        window: &NativeWindow,
        size: Size<u32>,
    ) -> Result<FramebufferHandle, GpuError>;

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// `None` binds the backbuffer.
    fn set_view_framebuffer(&mut self, view: ViewId, framebuffer: Option<FramebufferHandle>);

    fn set_view_rect(&mut self, view: ViewId, rect: Rect<u32>);

    fn set_view_clear(&mut self, view: ViewId, clear: ClearPolicy);

    /// Unbinds everything from the view and restores defaults.
    fn reset_view(&mut self, view: ViewId);

    /// Marks the view to be drawn this frame even without draw calls.
    fn touch(&mut self, view: ViewId);

    /// Submits the frame; returns the number of the frame just submitted.
    fn submit_frame(&mut self) -> u64;

    /// Resizes the backbuffer. Used by backends with a single surface.
    fn reset_backbuffer(&mut self, size: Size<u32>);

    /// Rebinds the backbuffer to `window`, for backends that start headless.
    fn reinitialize(&mut self, window: &NativeWindow, size: Size<u32>) -> Result<(), GpuError>;

    /// Detaches the backbuffer from its window before the window is destroyed.
    fn release_backbuffer(&mut self);
}
