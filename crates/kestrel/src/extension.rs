//! Lifecycle extensions.

use kestrel_winit::WindowId;

use crate::app::AppContext;

/// A pluggable unit of behaviour driven by the [`App`](crate::App).
///
/// Every hook defaults to a no-op. Hooks run strictly in the order the
/// extensions were added, and each receives the host's [`AppContext`].
///
/// Per tick the host calls [`on_frame_begin`](Self::on_frame_begin),
/// [`on_update`](Self::on_update) (skipped while paused),
/// [`on_render`](Self::on_render) once per live window, then
/// [`on_frame_end`](Self::on_frame_end). Windows that asked to close are
/// announced through [`on_window_destroyed`](Self::on_window_destroyed)
/// while they are still fully alive, so their view and framebuffer can be
/// looked up from the hook.
///
/// # Example
///
/// ```
/// use kestrel::{AppContext, Extension};
///
/// #[derive(Default)]
/// struct FrameCounter {
///     frames: u64,
/// }
///
/// impl Extension for FrameCounter {
///     fn on_update(&mut self, _ctx: &mut AppContext, _dt: f32) {
///         self.frames += 1;
///     }
/// }
/// ```
#[allow(unused_variables)]
pub trait Extension: 'static {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Called once when the host starts running, or immediately if the
    /// extension is added to a running host.
    fn on_initialize(&mut self, ctx: &mut AppContext) {}

    /// Called once when the host shuts down.
    fn on_terminate(&mut self, ctx: &mut AppContext) {}

    fn on_window_created(&mut self, ctx: &mut AppContext, window: WindowId) {}

    /// Called before the window's resources are released.
    fn on_window_destroyed(&mut self, ctx: &mut AppContext, window: WindowId) {}

    fn on_frame_begin(&mut self, ctx: &mut AppContext) {}

    /// `dt` is the time since the previous tick, in seconds.
    fn on_update(&mut self, ctx: &mut AppContext, dt: f32) {}

    /// Called after the window's view has been touched for this frame.
    fn on_render(&mut self, ctx: &mut AppContext, window: WindowId) {}

    fn on_frame_end(&mut self, ctx: &mut AppContext) {}
}
