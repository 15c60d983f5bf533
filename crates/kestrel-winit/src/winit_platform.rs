use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kestrel_core::alloc::HashMap;
use kestrel_core::geometry::{Pos, Size};
use kestrel_core::math::Vec2;
use kestrel_core::profiling::profile_function;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent as WinitWindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{ModifiersState, PhysicalKey};
use winit::monitor::MonitorHandle;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, Window as WinitWindow, WindowAttributes, WindowId, WindowLevel};

use crate::event::{ButtonState, GlobalEvent, ScrollUnit, WindowEventKind};
use crate::platform::{
    EventPump, EventSink, MonitorId, MonitorInfo, NativeWindow, Platform, PlatformError,
    WindowDescriptor,
};

struct WindowState {
    window: Arc<WinitWindow>,
    should_close: bool,
    modifiers: ModifiersState,
    maximized: bool,
    /// Dropped files are reported one by one; they are batched into a single event.
    pending_drops: Vec<PathBuf>,
}

impl WindowState {
    fn flush_drops(&mut self, sink: &mut dyn EventSink) {
        if self.pending_drops.is_empty() {
            return;
        }
        let paths = std::mem::take(&mut self.pending_drops);
        sink.push_window_event(self.window.id(), WindowEventKind::FileDrop { paths });
    }
}

/// Connected monitors keyed by stable ids.
#[derive(Default)]
struct MonitorRegistry {
    entries: Vec<(MonitorId, MonitorHandle)>,
    next_id: u32,
    /// The first enumeration is a baseline and reports nothing.
    primed: bool,
}

impl MonitorRegistry {
    fn refresh(&mut self, current: Vec<MonitorHandle>, sink: &mut dyn EventSink) {
        let primed = self.primed;
        self.entries.retain(|(id, handle)| {
            let still_connected = current.contains(handle);
            if !still_connected {
                tracing::info!("Monitor {} disconnected", id);
                sink.push_global_event(GlobalEvent::MonitorConnectChanged {
                    monitor: *id,
                    connected: false,
                });
            }
            still_connected
        });

        for handle in current {
            if self.entries.iter().any(|(_, known)| *known == handle) {
                continue;
            }
            let id = MonitorId(self.next_id);
            self.next_id += 1;
            if primed {
                tracing::info!("Monitor {} connected: {:?}", id, handle.name());
                sink.push_global_event(GlobalEvent::MonitorConnectChanged {
                    monitor: id,
                    connected: true,
                });
            }
            self.entries.push((id, handle));
        }
        self.primed = true;
    }

    fn handle(&self, id: MonitorId) -> Option<&MonitorHandle> {
        self.entries
            .iter()
            .find(|(known, _)| *known == id)
            .map(|(_, handle)| handle)
    }

    fn infos(&self) -> Vec<MonitorInfo> {
        self.entries
            .iter()
            .map(|(id, handle)| {
                let size = handle.size();
                let position = handle.position();
                MonitorInfo {
                    id: *id,
                    name: handle.name(),
                    resolution: Size::new(size.width, size.height),
                    position: Pos::new(position.x, position.y),
                    refresh_rate_millihertz: handle.refresh_rate_millihertz(),
                    scale_factor: handle.scale_factor(),
                }
            })
            .collect()
    }
}

/// Sink used while priming the monitor list.
struct Discard;

impl EventSink for Discard {
    fn push_window_event(&mut self, _window: WindowId, _kind: WindowEventKind) {}

    fn push_global_event(&mut self, _event: GlobalEvent) {}
}

/// [`Platform`] backed by a winit event loop that is pumped once per frame.
///
/// Must be created on the main thread.
pub struct WinitPlatform {
    event_loop: EventLoop<()>,
    windows: HashMap<WindowId, WindowState>,
    monitors: MonitorRegistry,
    exited: bool,
    #[cfg(feature = "gamepad")]
    gamepads: Option<crate::gamepad::GamepadWatcher>,
}

impl WinitPlatform {
    pub fn new() -> Result<Self, PlatformError> {
        let event_loop = EventLoop::new().map_err(|e| PlatformError::EventLoop(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut platform = Self {
            event_loop,
            windows: HashMap::new(),
            monitors: MonitorRegistry::default(),
            exited: false,
            #[cfg(feature = "gamepad")]
            gamepads: crate::gamepad::GamepadWatcher::new(),
        };
        // Startup events carry nothing useful, but the pump records the
        // monitors that are already connected.
        platform.pump_events(&mut Discard);
        tracing::info!(
            "Winit platform ready with {} monitor(s)",
            platform.monitors.entries.len()
        );
        Ok(platform)
    }

    /// Whether the OS asked the event loop to exit.
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    fn state(&self, window: WindowId) -> Option<&WindowState> {
        self.windows.get(&window)
    }

    fn attributes(&self, descriptor: &WindowDescriptor) -> Result<WindowAttributes, PlatformError> {
        let mut attributes = WinitWindow::default_attributes()
            .with_title(descriptor.title.clone())
            .with_inner_size(LogicalSize::new(descriptor.size.width, descriptor.size.height))
            .with_resizable(descriptor.resizable)
            .with_visible(descriptor.visible);

        if descriptor.floating {
            attributes = attributes.with_window_level(WindowLevel::AlwaysOnTop);
        }

        if let Some(monitor) = descriptor.monitor {
            let handle = self
                .monitors
                .handle(monitor)
                .ok_or(PlatformError::UnknownMonitor(monitor))?;
            attributes =
                attributes.with_fullscreen(Some(Fullscreen::Borderless(Some(handle.clone()))));
        }

        Ok(attributes)
    }
}

impl EventPump for WinitPlatform {
    fn pump_events(&mut self, sink: &mut dyn EventSink) {
        profile_function!();
        let mut handler = PumpHandler {
            windows: &mut self.windows,
            monitors: &mut self.monitors,
            sink: &mut *sink,
        };
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut handler);
        for state in handler.windows.values_mut() {
            state.flush_drops(&mut *handler.sink);
        }

        if let PumpStatus::Exit(code) = status {
            if !self.exited {
                tracing::info!("Event loop exited with code {}", code);
            }
            self.exited = true;
        }

        #[cfg(feature = "gamepad")]
        if let Some(gamepads) = &mut self.gamepads {
            gamepads.poll(sink);
        }
    }
}

impl Platform for WinitPlatform {
    fn name(&self) -> &str {
        "winit"
    }

    fn create_window(&mut self, descriptor: &WindowDescriptor) -> Result<WindowId, PlatformError> {
        profile_function!();
        let attributes = self.attributes(descriptor)?;

        // Windows are opened between pumps, outside of the handler callbacks.
        #[allow(deprecated)]
        let window = self
            .event_loop
            .create_window(attributes)
            .map_err(|e| PlatformError::WindowCreation(e.to_string()))?;

        let id = window.id();
        let maximized = window.is_maximized();
        self.windows.insert(
            id,
            WindowState {
                window: Arc::new(window),
                should_close: false,
                modifiers: ModifiersState::empty(),
                maximized,
                pending_drops: Vec::new(),
            },
        );
        tracing::info!("Created window {:?} '{}'", id, descriptor.title);
        Ok(id)
    }

    fn destroy_window(&mut self, window: WindowId) {
        if self.windows.remove(&window).is_none() {
            tracing::warn!("Destroying unknown window {:?}", window);
        } else {
            tracing::debug!("Destroyed window {:?}", window);
        }
    }

    fn has_window(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    fn window_size(&self, window: WindowId) -> Option<Size<u32>> {
        let state = self.state(window)?;
        let logical: LogicalSize<u32> = state
            .window
            .inner_size()
            .to_logical(state.window.scale_factor());
        Some(Size::new(logical.width, logical.height))
    }

    fn framebuffer_size(&self, window: WindowId) -> Option<Size<u32>> {
        let physical = self.state(window)?.window.inner_size();
        Some(Size::new(physical.width, physical.height))
    }

    fn should_close(&self, window: WindowId) -> bool {
        self.state(window).is_some_and(|state| state.should_close)
    }

    fn set_should_close(&mut self, window: WindowId, should_close: bool) {
        if let Some(state) = self.windows.get_mut(&window) {
            state.should_close = should_close;
        }
    }

    fn is_resizable(&self, window: WindowId) -> bool {
        self.state(window)
            .is_some_and(|state| state.window.is_resizable())
    }

    fn set_resizable(&mut self, window: WindowId, resizable: bool) {
        if let Some(state) = self.state(window) {
            state.window.set_resizable(resizable);
        }
    }

    fn set_window_size(&mut self, window: WindowId, size: Size<u32>) {
        if let Some(state) = self.state(window) {
            let _ = state
                .window
                .request_inner_size(LogicalSize::new(size.width, size.height));
        }
    }

    fn native_window(&self, window: WindowId) -> Option<NativeWindow> {
        self.state(window)
            .map(|state| NativeWindow::from_winit(state.window.clone()))
    }

    fn monitors(&self) -> Vec<MonitorInfo> {
        self.monitors.infos()
    }
}

struct PumpHandler<'a, 's> {
    windows: &'a mut HashMap<WindowId, WindowState>,
    monitors: &'a mut MonitorRegistry,
    sink: &'a mut (dyn EventSink + 's),
}

impl ApplicationHandler for PumpHandler<'_, '_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WinitWindowEvent,
    ) {
        let Some(state) = self.windows.get_mut(&window_id) else {
            tracing::trace!("Event for unknown window {:?}: {:?}", window_id, event);
            return;
        };
        let sink = &mut *self.sink;

        if !matches!(event, WinitWindowEvent::DroppedFile(_)) {
            state.flush_drops(sink);
        }

        let kind = match event {
            WinitWindowEvent::Moved(position) => WindowEventKind::Moved {
                position: Pos::new(position.x, position.y),
            },
            WinitWindowEvent::Resized(physical) => {
                let logical: LogicalSize<u32> = physical.to_logical(state.window.scale_factor());
                sink.push_window_event(
                    window_id,
                    WindowEventKind::Resized {
                        size: Size::new(logical.width, logical.height),
                    },
                );
                sink.push_window_event(
                    window_id,
                    WindowEventKind::FramebufferResized {
                        size: Size::new(physical.width, physical.height),
                    },
                );

                let maximized = state.window.is_maximized();
                if maximized == state.maximized {
                    return;
                }
                state.maximized = maximized;
                WindowEventKind::MaximizeChanged { maximized }
            }
            WinitWindowEvent::CloseRequested => {
                state.should_close = true;
                WindowEventKind::Closed
            }
            WinitWindowEvent::RedrawRequested => WindowEventKind::RefreshRequested,
            WinitWindowEvent::Focused(focused) => WindowEventKind::FocusChanged { focused },
            WinitWindowEvent::Occluded(iconified) => WindowEventKind::IconifyChanged { iconified },
            WinitWindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                WindowEventKind::ContentScaleChanged {
                    scale: Vec2::splat(scale_factor as f32),
                }
            }
            WinitWindowEvent::ModifiersChanged(modifiers) => {
                state.modifiers = modifiers.state();
                return;
            }
            WinitWindowEvent::MouseInput {
                state: element_state,
                button,
                ..
            } => WindowEventKind::MouseButton {
                button,
                mods: state.modifiers,
                state: match element_state {
                    ElementState::Pressed => ButtonState::Pressed,
                    ElementState::Released => ButtonState::Released,
                },
            },
            WinitWindowEvent::CursorMoved { position, .. } => WindowEventKind::MousePosition {
                position: Vec2::new(position.x as f32, position.y as f32),
            },
            WinitWindowEvent::CursorEntered { .. } => {
                WindowEventKind::MouseEnterChanged { entered: true }
            }
            WinitWindowEvent::CursorLeft { .. } => {
                WindowEventKind::MouseEnterChanged { entered: false }
            }
            WinitWindowEvent::MouseWheel { delta, .. } => match delta {
                MouseScrollDelta::LineDelta(x, y) => WindowEventKind::Scroll {
                    delta: Vec2::new(x, y),
                    unit: ScrollUnit::Lines,
                },
                MouseScrollDelta::PixelDelta(pixels) => WindowEventKind::Scroll {
                    delta: Vec2::new(pixels.x as f32, pixels.y as f32),
                    unit: ScrollUnit::Pixels,
                },
            },
            WinitWindowEvent::KeyboardInput { event, .. } => {
                let button_state = match (event.state, event.repeat) {
                    (ElementState::Pressed, true) => ButtonState::Repeated,
                    (ElementState::Pressed, false) => ButtonState::Pressed,
                    (ElementState::Released, _) => ButtonState::Released,
                };
                sink.push_window_event(
                    window_id,
                    WindowEventKind::KeyboardButton {
                        key: event.physical_key,
                        scan_code: scan_code(event.physical_key),
                        mods: state.modifiers,
                        state: button_state,
                    },
                );

                if event.state == ElementState::Pressed
                    && let Some(text) = &event.text
                {
                    for codepoint in text.chars().filter(|c| !c.is_control()) {
                        sink.push_window_event(window_id, WindowEventKind::CharEntered { codepoint });
                    }
                }
                return;
            }
            WinitWindowEvent::DroppedFile(path) => {
                state.pending_drops.push(path);
                return;
            }
            other => {
                tracing::trace!("Ignoring window event {:?}", other);
                return;
            }
        };

        sink.push_window_event(window_id, kind);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        for state in self.windows.values_mut() {
            state.flush_drops(&mut *self.sink);
        }
        self.monitors
            .refresh(event_loop.available_monitors().collect(), &mut *self.sink);
    }
}

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
))]
fn scan_code(key: PhysicalKey) -> Option<u32> {
    use winit::platform::scancode::PhysicalKeyExtScancode;
    key.to_scancode()
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "dragonfly",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd"
)))]
fn scan_code(_key: PhysicalKey) -> Option<u32> {
    None
}
