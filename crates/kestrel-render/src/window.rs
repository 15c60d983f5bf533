use std::fmt;
use std::ops::{Deref, DerefMut};

use kestrel_core::geometry::{Rect, Size};
use kestrel_core::profiling::profile_function;
use kestrel_winit::{NativeWindow, Platform, PlatformError, WindowDescriptor, WindowId};

use crate::backend::{ClearPolicy, FramebufferHandle, GpuError, ViewId};
use crate::context::GraphicsContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    Platform(PlatformError),
    Gpu(GpuError),
}

impl fmt::Display for WindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowError::Platform(err) => write!(f, "Platform error: {}", err),
            WindowError::Gpu(err) => write!(f, "GPU error: {}", err),
        }
    }
}

impl std::error::Error for WindowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WindowError::Platform(err) => Some(err),
            WindowError::Gpu(err) => Some(err),
        }
    }
}

impl From<PlatformError> for WindowError {
    fn from(err: PlatformError) -> Self {
        WindowError::Platform(err)
    }
}

impl From<GpuError> for WindowError {
    fn from(err: GpuError) -> Self {
        WindowError::Gpu(err)
    }
}

/// A native window bound to a GPU view.
///
/// A `Window` exclusively owns its native window, its view id and, on
/// backends with independent surfaces, its framebuffer. It is move-only and
/// [`dispose`](Self::dispose) consumes it, so a disposed window cannot be
/// used again:
///
/// ```compile_fail
/// # fn reuse(window: kestrel_render::Window, platform: &mut dyn kestrel_winit::Platform, graphics: &mut kestrel_render::GraphicsContext) {
/// window.dispose(platform, graphics);
/// let _ = window.view();
/// # }
/// ```
///
/// Platform and GPU state are passed in explicitly; the window holds no
/// reference to either.
#[derive(Debug)]
pub struct Window {
    id: WindowId,
    native: NativeWindow,
    view: ViewId,
    framebuffer: Option<FramebufferHandle>,
    frame_size: Size<u32>,
    clear: ClearPolicy,
}

impl Window {
    /// Opens a native window and binds it to a fresh view.
    pub fn new(
        platform: &mut dyn Platform,
        graphics: &mut GraphicsContext,
        descriptor: &WindowDescriptor,
    ) -> Result<Self, WindowError> {
        profile_function!();
        let id = platform.create_window(descriptor)?;
        Self::from_native(platform, graphics, id).inspect_err(|_| platform.destroy_window(id))
    }

    /// Adopts a native window the platform already created.
    ///
    /// The returned window owns the native window from now on.
    pub fn from_native(
        platform: &dyn Platform,
        graphics: &mut GraphicsContext,
        id: WindowId,
    ) -> Result<Self, WindowError> {
        let native = platform
            .native_window(id)
            .ok_or(PlatformError::UnknownWindow(id))?;
        let frame_size = platform
            .framebuffer_size(id)
            .ok_or(PlatformError::UnknownWindow(id))?;

        let view = graphics.reserve_view();
        let framebuffer = if graphics.supports_multiple_surfaces() {
            graphics
                .backend_mut()
                .create_framebuffer(&native, frame_size)
                .map(Some)
        } else {
            graphics
                .reinitialize_for_window(&native, frame_size)
                .map(|()| None)
        };
        let framebuffer = match framebuffer {
            Ok(framebuffer) => framebuffer,
            Err(err) => {
                graphics.free_view(view);
                return Err(err.into());
            }
        };

        let window = Self {
            id,
            native,
            view,
            framebuffer,
            frame_size,
            clear: ClearPolicy::default(),
        };
        window.bind_view(graphics);
        tracing::debug!(
            "Window {:?} on view {} ({}x{})",
            id,
            view,
            frame_size.width,
            frame_size.height
        );
        Ok(window)
    }

    fn bind_view(&self, graphics: &mut GraphicsContext) {
        let backend = graphics.backend_mut();
        backend.set_view_framebuffer(self.view, self.framebuffer);
        backend.set_view_rect(self.view, Rect::from_size(self.frame_size));
        backend.set_view_clear(self.view, self.clear);
    }

    /// Releases the view, the framebuffer and the native window.
    ///
    /// GPU resources go first since a surface may still reference the native window.
    pub fn dispose(self, platform: &mut dyn Platform, graphics: &mut GraphicsContext) {
        profile_function!();
        let backend = graphics.backend_mut();
        backend.reset_view(self.view);
        match self.framebuffer {
            Some(framebuffer) => backend.destroy_framebuffer(framebuffer),
            None if !backend.supports_multiple_surfaces() => backend.release_backbuffer(),
            None => {}
        }
        graphics.free_view(self.view);
        platform.destroy_window(self.id);
        tracing::debug!("Disposed window {:?}", self.id);
    }

    /// Resizes the render target to `size` physical pixels.
    ///
    /// With independent surfaces the framebuffer is destroyed and recreated
    /// at the new size and bound to the view again. Otherwise the shared
    /// backbuffer is reset.
    ///
    /// If the new framebuffer cannot be created the view is reset and the
    /// window keeps its previous frame size with no framebuffer; see
    /// [`needs_framebuffer`](Self::needs_framebuffer).
    pub fn set_frame_size(
        &mut self,
        graphics: &mut GraphicsContext,
        size: Size<u32>,
    ) -> Result<(), GpuError> {
        profile_function!();
        if !graphics.supports_multiple_surfaces() {
            let backend = graphics.backend_mut();
            backend.reset_backbuffer(size);
            backend.set_view_rect(self.view, Rect::from_size(size));
            self.frame_size = size;
            return Ok(());
        }

        let backend = graphics.backend_mut();
        if let Some(old) = self.framebuffer.take() {
            backend.destroy_framebuffer(old);
        }
        match backend.create_framebuffer(&self.native, size) {
            Ok(framebuffer) => {
                self.framebuffer = Some(framebuffer);
                self.frame_size = size;
                self.bind_view(graphics);
                Ok(())
            }
            Err(err) => {
                backend.reset_view(self.view);
                Err(err)
            }
        }
    }

    /// Whether the window lost its framebuffer to a failed resize.
    pub fn needs_framebuffer(&self, graphics: &GraphicsContext) -> bool {
        graphics.supports_multiple_surfaces() && self.framebuffer.is_none()
    }

    pub fn should_close(&self, platform: &dyn Platform) -> bool {
        platform.should_close(self.id)
    }

    /// Logical window size.
    pub fn size(&self, platform: &dyn Platform) -> Size<u32> {
        platform
            .window_size(self.id)
            .unwrap_or_else(|| kestrel_core::fatal!("window {:?} is gone", self.id))
    }

    /// Drawable size in physical pixels, as reported by the platform.
    pub fn resolution(&self, platform: &dyn Platform) -> Size<u32> {
        platform
            .framebuffer_size(self.id)
            .unwrap_or_else(|| kestrel_core::fatal!("window {:?} is gone", self.id))
    }

    pub fn set_size(&self, platform: &mut dyn Platform, size: Size<u32>) {
        platform.set_window_size(self.id, size);
    }

    pub fn is_resizable(&self, platform: &dyn Platform) -> bool {
        platform.is_resizable(self.id)
    }

    pub fn set_resizable(&self, platform: &mut dyn Platform, resizable: bool) {
        platform.set_resizable(self.id, resizable);
    }

    /// Sets the clear colour, packed `0xRRGGBBAA`.
    pub fn set_clear_color(&mut self, graphics: &mut GraphicsContext, rgba: u32) {
        self.clear.rgba = rgba;
        graphics.backend_mut().set_view_clear(self.view, self.clear);
    }

    pub fn clear_policy(&self) -> ClearPolicy {
        self.clear
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn native(&self) -> &NativeWindow {
        &self.native
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn framebuffer(&self) -> Option<FramebufferHandle> {
        self.framebuffer
    }

    /// Size of the current render target.
    pub fn frame_size(&self) -> Size<u32> {
        self.frame_size
    }
}

/// A [`Window`] disposed when the guard goes out of scope.
///
/// [`into_inner`](Self::into_inner) hands the window back to the caller,
/// who then owns its disposal.
pub struct ScopedWindow<'a> {
    window: Option<Window>,
    platform: &'a mut dyn Platform,
    graphics: &'a mut GraphicsContext,
}

impl<'a> ScopedWindow<'a> {
    pub fn new(
        platform: &'a mut dyn Platform,
        graphics: &'a mut GraphicsContext,
        descriptor: &WindowDescriptor,
    ) -> Result<Self, WindowError> {
        let window = Window::new(platform, graphics, descriptor)?;
        Ok(Self::wrap(window, platform, graphics))
    }

    pub fn wrap(
        window: Window,
        platform: &'a mut dyn Platform,
        graphics: &'a mut GraphicsContext,
    ) -> Self {
        Self {
            window: Some(window),
            platform,
            graphics,
        }
    }

    pub fn platform(&mut self) -> &mut dyn Platform {
        &mut *self.platform
    }

    pub fn graphics(&mut self) -> &mut GraphicsContext {
        &mut *self.graphics
    }

    /// Resizes the wrapped window's render target.
    pub fn set_frame_size(&mut self, size: Size<u32>) -> Result<(), GpuError> {
        match self.window.as_mut() {
            Some(window) => window.set_frame_size(self.graphics, size),
            None => Ok(()),
        }
    }

    pub fn into_inner(mut self) -> Window {
        match self.window.take() {
            Some(window) => window,
            None => kestrel_core::fatal!("scoped window was already released"),
        }
    }
}

impl Deref for ScopedWindow<'_> {
    type Target = Window;

    fn deref(&self) -> &Window {
        match &self.window {
            Some(window) => window,
            None => kestrel_core::fatal!("scoped window was already released"),
        }
    }
}

impl DerefMut for ScopedWindow<'_> {
    fn deref_mut(&mut self) -> &mut Window {
        match &mut self.window {
            Some(window) => window,
            None => kestrel_core::fatal!("scoped window was already released"),
        }
    }
}

impl Drop for ScopedWindow<'_> {
    fn drop(&mut self) {
        if let Some(window) = self.window.take() {
            window.dispose(self.platform, self.graphics);
        }
    }
}
