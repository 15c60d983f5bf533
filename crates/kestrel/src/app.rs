use std::fmt;

use kestrel_core::config::Config;
use kestrel_core::profiling::{profile_function, profile_scope};
use kestrel_render::{GpuBackend, GpuError, GraphicsContext, Window, WindowError};
use kestrel_winit::{EventQueue, Platform, PlatformError, WindowDescriptor, WindowId};

use crate::extension::Extension;
use crate::time::{FrameTime, TimeTracker};

/// Run state of an [`App`].
///
/// [`App::start`] moves `Unset` (or `Stop`) to `Run`; afterwards only
/// `Run <-> Pause` and `Run | Pause -> Stop` are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Unset,
    Run,
    Pause,
    Stop,
}

impl AppState {
    /// `Run` or `Pause`.
    pub fn is_active(self) -> bool {
        matches!(self, AppState::Run | AppState::Pause)
    }
}

/// Failure to build an application host.
#[derive(Debug)]
pub enum AppError {
    Platform(PlatformError),
    Gpu(GpuError),
    Window(WindowError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Platform(err) => write!(f, "Failed to initialize the platform: {}", err),
            AppError::Gpu(err) => write!(f, "Failed to initialize the GPU backend: {}", err),
            AppError::Window(err) => write!(f, "Failed to create a window: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Platform(err) => Some(err),
            AppError::Gpu(err) => Some(err),
            AppError::Window(err) => Some(err),
        }
    }
}

impl From<PlatformError> for AppError {
    fn from(err: PlatformError) -> Self {
        AppError::Platform(err)
    }
}

impl From<GpuError> for AppError {
    fn from(err: GpuError) -> Self {
        AppError::Gpu(err)
    }
}

impl From<WindowError> for AppError {
    fn from(err: WindowError) -> Self {
        AppError::Window(err)
    }
}

/// Everything an [`App`] owns apart from its extensions.
///
/// Extensions receive it in every hook. Windows and extensions added through
/// it while a hook runs are adopted by the host at the next phase boundary.
pub struct AppContext {
    platform: Box<dyn Platform>,
    graphics: GraphicsContext,
    events: EventQueue,
    windows: Vec<Window>,
    state: AppState,
    time: TimeTracker,
    frame_time: FrameTime,
    config: Config,
    pending_extensions: Vec<Box<dyn Extension>>,
    pending_created: Vec<WindowId>,
}

impl AppContext {
    fn new(platform: Box<dyn Platform>, backend: Box<dyn GpuBackend>) -> Self {
        let mut events = EventQueue::new();
        events.initialize();
        Self {
            platform,
            graphics: GraphicsContext::new(backend),
            events,
            windows: Vec::new(),
            state: AppState::Unset,
            time: TimeTracker::new(),
            frame_time: FrameTime::default(),
            config: Config::default(),
            pending_extensions: Vec::new(),
            pending_created: Vec::new(),
        }
    }

    /// Opens a window owned by the host and connects it to the event queue.
    ///
    /// Extensions hear about it through `on_window_created` once the host
    /// is running. A second window requires a backend with independent
    /// surfaces; asking for one on any other backend is fatal.
    pub fn create_window(&mut self, descriptor: &WindowDescriptor) -> Result<WindowId, WindowError> {
        profile_function!();
        kestrel_core::validate!(
            self.windows.is_empty() || self.graphics.supports_multiple_surfaces(),
            "GPU backend '{}' cannot drive more than one window",
            self.graphics.backend_name()
        );

        let window = Window::new(self.platform.as_mut(), &mut self.graphics, descriptor)?;
        let id = window.id();
        self.events.connect_window(id);
        self.windows.push(window);
        self.pending_created.push(id);
        tracing::info!("Created window {:?} '{}'", id, descriptor.title);
        Ok(id)
    }

    /// Queues an extension; the host initializes it before any other hook
    /// reaches it.
    pub fn add_extension(&mut self, extension: impl Extension) {
        self.add_boxed_extension(Box::new(extension));
    }

    pub fn add_boxed_extension(&mut self, extension: Box<dyn Extension>) {
        tracing::debug!("Adding extension {}", extension.name());
        self.pending_extensions.push(extension);
    }

    /// Ends the run once the current tick is over.
    pub fn stop(&mut self) -> bool {
        self.transition(AppState::Stop)
    }

    /// Skips `on_update` from the next check on, while everything else keeps running.
    pub fn pause(&mut self) -> bool {
        self.transition(AppState::Pause)
    }

    pub fn resume(&mut self) -> bool {
        self.transition(AppState::Run)
    }

    fn transition(&mut self, to: AppState) -> bool {
        let allowed = match (self.state, to) {
            (AppState::Run, AppState::Pause) | (AppState::Pause, AppState::Run) => true,
            (AppState::Run | AppState::Pause, AppState::Stop) => true,
            _ => false,
        };
        if !kestrel_core::soft_validate!(
            allowed,
            "invalid app state transition {:?} -> {:?}",
            self.state,
            to
        ) {
            return false;
        }
        tracing::debug!("App state {:?} -> {:?}", self.state, to);
        self.state = to;
        true
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == AppState::Pause
    }

    pub fn time(&self) -> &FrameTime {
        &self.frame_time
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.iter().map(Window::id).collect()
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.iter().find(|window| window.id() == id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.iter_mut().find(|window| window.id() == id)
    }

    /// Sets the colour `window`'s view is cleared to. Returns `false` for unknown windows.
    pub fn set_clear_color(&mut self, id: WindowId, rgba: u32) -> bool {
        match self.windows.iter_mut().find(|window| window.id() == id) {
            Some(window) => {
                window.set_clear_color(&mut self.graphics, rgba);
                true
            }
            None => false,
        }
    }

    /// Raises `window`'s close flag; it is destroyed at the end of the tick.
    pub fn close_window(&mut self, id: WindowId) {
        self.platform.set_should_close(id, true);
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    pub fn platform_mut(&mut self) -> &mut dyn Platform {
        self.platform.as_mut()
    }

    pub fn graphics(&self) -> &GraphicsContext {
        &self.graphics
    }

    pub fn graphics_mut(&mut self) -> &mut GraphicsContext {
        &mut self.graphics
    }

    /// Resizes the framebuffer of every window whose drawable changed this
    /// tick, and retries windows whose last resize failed.
    fn reconcile_resizes(&mut self) {
        profile_function!();
        for window in &mut self.windows {
            let retry = window.needs_framebuffer(&self.graphics);
            let size = match self.events.last_framebuffer_size(window.id()) {
                Some(size) => size,
                None if retry => match self.platform.framebuffer_size(window.id()) {
                    Some(size) => size,
                    None => continue,
                },
                None => continue,
            };
            if size == window.frame_size() && !retry {
                continue;
            }
            tracing::debug!(
                "Window {:?} drawable is now {}x{}",
                window.id(),
                size.width,
                size.height
            );
            if let Err(err) = window.set_frame_size(&mut self.graphics, size) {
                tracing::error!("Failed to resize framebuffer of {:?}: {}", window.id(), err);
            }
        }
    }

    fn remove_window(&mut self, id: WindowId) {
        let Some(index) = self.windows.iter().position(|window| window.id() == id) else {
            return;
        };
        let window = self.windows.remove(index);
        window.dispose(self.platform.as_mut(), &mut self.graphics);
        self.events.disconnect_window(id);
        tracing::info!("Destroyed window {:?}", id);
    }
}

/// The extension host.
///
/// Owns the platform, the graphics context, the event queue, the windows
/// and an ordered list of [`Extension`]s, and drives them through the frame
/// loop:
///
/// 1. poll events and resize framebuffers whose window drawable changed
/// 2. `on_frame_begin`
/// 3. `on_update`, unless paused
/// 4. for each extension and each window, touch the view then `on_render`
/// 5. `on_frame_end`
/// 6. submit the GPU frame
/// 7. destroy windows that asked to close
///
/// # Example
///
/// ```
/// use kestrel::{App, AppContext, Extension};
/// use kestrel_test_utils::MockRig;
///
/// struct StopAfter(u32);
///
/// impl Extension for StopAfter {
///     fn on_update(&mut self, ctx: &mut AppContext, _dt: f32) {
///         self.0 -= 1;
///         if self.0 == 0 {
///             ctx.stop();
///         }
///     }
/// }
///
/// let (platform, backend, rig) = MockRig::multi_surface();
/// let mut app = App::new(platform, backend).with_extension(StopAfter(3));
/// app.run();
/// assert_eq!(rig.gpu.frame_count(), 3);
/// ```
pub struct App {
    extensions: Vec<Box<dyn Extension>>,
    ctx: AppContext,
}

impl App {
    pub fn new(platform: Box<dyn Platform>, backend: Box<dyn GpuBackend>) -> Self {
        tracing::debug!("Creating app on platform '{}'", platform.name());
        Self {
            extensions: Vec::new(),
            ctx: AppContext::new(platform, backend),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.ctx.config = config;
        self
    }

    pub fn with_extension(mut self, extension: impl Extension) -> Self {
        self.add_extension(extension);
        self
    }

    /// Appends an extension. On a running host it is initialized right away.
    pub fn add_extension(&mut self, extension: impl Extension) {
        self.ctx.add_extension(extension);
        self.adopt_pending();
    }

    pub fn add_boxed_extension(&mut self, extension: Box<dyn Extension>) {
        self.ctx.add_boxed_extension(extension);
        self.adopt_pending();
    }

    /// Opens a host-owned window. Before [`start`](Self::start) the
    /// `on_window_created` notifications wait until every extension is initialized.
    pub fn create_window(&mut self, descriptor: &WindowDescriptor) -> Result<WindowId, WindowError> {
        let id = self.ctx.create_window(descriptor)?;
        self.adopt_pending();
        Ok(id)
    }

    /// Runs until an extension (or the caller through a hook) stops the host.
    pub fn run(&mut self) {
        self.start();
        while self.ctx.state != AppState::Stop {
            self.tick();
        }
        self.shutdown();
    }

    /// Switches to `Run` and initializes every extension in order.
    pub fn start(&mut self) {
        kestrel_core::validate!(
            !self.ctx.state.is_active(),
            "app is already running ({:?})",
            self.ctx.state
        );
        let config = &self.ctx.config;
        kestrel_core::profiling::init_profiling(config.profiling, &config.profiler_address);

        tracing::info!(
            "Starting app with {} extension(s) on '{}' / '{}'",
            self.extensions.len() + self.ctx.pending_extensions.len(),
            self.ctx.platform.name(),
            self.ctx.graphics.backend_name()
        );
        self.ctx.state = AppState::Run;
        self.ctx.time.reset();

        for extension in self.extensions.iter_mut() {
            extension.on_initialize(&mut self.ctx);
        }
        self.adopt_pending();
    }

    /// Runs one frame.
    pub fn tick(&mut self) {
        profile_function!();
        kestrel_core::profiling::new_frame();

        self.begin_frame();
        self.adopt_pending();

        {
            profile_scope!("frame_begin");
            for extension in self.extensions.iter_mut() {
                extension.on_frame_begin(&mut self.ctx);
            }
        }
        self.adopt_pending();

        if self.ctx.state != AppState::Pause {
            profile_scope!("update");
            let dt = self.ctx.frame_time.delta_seconds();
            for extension in self.extensions.iter_mut() {
                extension.on_update(&mut self.ctx, dt);
            }
        }
        self.adopt_pending();

        {
            profile_scope!("render");
            let windows = self.ctx.window_ids();
            for extension in self.extensions.iter_mut() {
                for &id in &windows {
                    let Some(view) = self.ctx.window(id).map(Window::view) else {
                        continue;
                    };
                    self.ctx.graphics.touch(view);
                    extension.on_render(&mut self.ctx, id);
                }
            }
        }
        self.adopt_pending();

        {
            profile_scope!("frame_end");
            for extension in self.extensions.iter_mut() {
                extension.on_frame_end(&mut self.ctx);
            }
        }
        self.adopt_pending();

        self.ctx.graphics.submit_frame();
        self.process_closed_windows();
        self.adopt_pending();
    }

    /// Calls `on_terminate` in order and releases the remaining windows.
    ///
    /// A host that was never started only releases its windows; its
    /// extensions were never initialized.
    pub fn shutdown(&mut self) {
        let started = self.ctx.state != AppState::Unset;
        if self.ctx.state.is_active() {
            self.ctx.state = AppState::Stop;
        }
        tracing::info!("Shutting down after {} frame(s)", self.ctx.frame_time.frame_count);

        if started {
            for extension in self.extensions.iter_mut() {
                extension.on_terminate(&mut self.ctx);
            }
        }

        self.ctx.pending_created.clear();
        for id in self.ctx.window_ids() {
            self.ctx.remove_window(id);
        }
    }

    fn begin_frame(&mut self) {
        profile_function!();
        self.ctx.frame_time = self.ctx.time.tick();
        self.ctx.events.poll_events(self.ctx.platform.as_mut());
        self.ctx.reconcile_resizes();
    }

    fn process_closed_windows(&mut self) {
        profile_function!();
        let closing: Vec<WindowId> = self
            .ctx
            .windows
            .iter()
            .filter(|window| window.should_close(self.ctx.platform.as_ref()))
            .map(Window::id)
            .collect();

        for id in closing {
            for extension in self.extensions.iter_mut() {
                extension.on_window_destroyed(&mut self.ctx, id);
            }
            self.ctx.remove_window(id);
        }
    }

    /// Adopts extensions and announces windows queued through the context.
    ///
    /// Before the first start, extensions are only appended and window
    /// announcements keep waiting.
    fn adopt_pending(&mut self) {
        loop {
            let active = self.ctx.state.is_active();
            for mut extension in std::mem::take(&mut self.ctx.pending_extensions) {
                if active {
                    extension.on_initialize(&mut self.ctx);
                }
                self.extensions.push(extension);
            }
            if !active {
                return;
            }

            for id in std::mem::take(&mut self.ctx.pending_created) {
                for extension in self.extensions.iter_mut() {
                    extension.on_window_created(&mut self.ctx, id);
                }
            }

            if self.ctx.pending_extensions.is_empty() && self.ctx.pending_created.is_empty() {
                return;
            }
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    pub fn state(&self) -> AppState {
        self.ctx.state
    }

    pub fn stop(&mut self) -> bool {
        self.ctx.stop()
    }

    pub fn pause(&mut self) -> bool {
        self.ctx.pause()
    }

    pub fn resume(&mut self) -> bool {
        self.ctx.resume()
    }

    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }

    pub fn extension_names(&self) -> Vec<&'static str> {
        self.extensions.iter().map(|extension| extension.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active() {
        assert!(AppState::Run.is_active());
        assert!(AppState::Pause.is_active());
        assert!(!AppState::Unset.is_active());
        assert!(!AppState::Stop.is_active());
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(GpuError::UnsupportedSurface);
        assert!(err.to_string().starts_with("Failed to initialize the GPU backend"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
