//! Windowing-backend abstraction.
//!
//! The host never talks to winit directly. It drives a [`Platform`], which
//! creates and destroys native windows and pumps OS events into an
//! [`EventSink`]. [`WinitPlatform`](crate::WinitPlatform) is the production
//! implementation; tests substitute a scripted one.

use std::fmt;
use std::sync::Arc;

use kestrel_core::geometry::{Pos, Size};
use winit::window::{Window as WinitWindow, WindowId};

use crate::event::{GlobalEvent, WindowEventKind};

/// Stable identifier of a connected monitor, assigned by the platform on
/// first sight and never reused while the platform lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorId(pub u32);

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "monitor#{}", self.0)
    }
}

/// Video mode snapshot of a monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorInfo {
    pub id: MonitorId,
    pub name: Option<String>,
    /// Resolution in physical pixels.
    pub resolution: Size<u32>,
    /// Top-left corner in the virtual desktop.
    pub position: Pos<i32>,
    pub refresh_rate_millihertz: Option<u32>,
    pub scale_factor: f64,
}

impl MonitorInfo {
    pub fn refresh_rate_hz(&self) -> Option<f32> {
        self.refresh_rate_millihertz.map(|mhz| mhz as f32 / 1000.0)
    }
}

/// Parameters for opening a native window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowDescriptor {
    pub title: String,
    /// Logical client-area size.
    pub size: Size<u32>,
    pub resizable: bool,
    pub visible: bool,
    /// Open borderless-fullscreen on this monitor.
    pub monitor: Option<MonitorId>,
    /// Keep the window above other windows.
    pub floating: bool,
}

impl WindowDescriptor {
    pub fn new(title: impl Into<String>, size: Size<u32>) -> Self {
        Self {
            title: title.into(),
            size,
            ..Default::default()
        }
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn on_monitor(mut self, monitor: MonitorId) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_floating(mut self, floating: bool) -> Self {
        self.floating = floating;
        self
    }
}

impl Default for WindowDescriptor {
    fn default() -> Self {
        Self {
            title: "Kestrel Window".to_string(),
            size: Size::new(1280, 720),
            resizable: true,
            visible: true,
            monitor: None,
            floating: false,
        }
    }
}

/// Handle to a native window as seen by the GPU layer.
///
/// Headless windows (from scripted platforms) carry no OS window; GPU
/// backends that need a real surface reject them.
#[derive(Debug, Clone)]
pub struct NativeWindow {
    id: WindowId,
    handle: Option<Arc<WinitWindow>>,
}

impl NativeWindow {
    pub fn from_winit(window: Arc<WinitWindow>) -> Self {
        Self {
            id: window.id(),
            handle: Some(window),
        }
    }

    pub fn headless(id: WindowId) -> Self {
        Self { id, handle: None }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn winit_window(&self) -> Option<&Arc<WinitWindow>> {
        self.handle.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The OS event loop could not be created.
    EventLoop(String),
    WindowCreation(String),
    UnknownWindow(WindowId),
    UnknownMonitor(MonitorId),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::EventLoop(msg) => write!(f, "Failed to create event loop: {}", msg),
            PlatformError::WindowCreation(msg) => write!(f, "Failed to create window: {}", msg),
            PlatformError::UnknownWindow(id) => write!(f, "Unknown window: {:?}", id),
            PlatformError::UnknownMonitor(id) => write!(f, "Unknown monitor: {}", id),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Receives events while a platform pumps the OS queue.
pub trait EventSink {
    fn push_window_event(&mut self, window: WindowId, kind: WindowEventKind);

    fn push_global_event(&mut self, event: GlobalEvent);
}

/// Source of OS events.
pub trait EventPump {
    /// Drains every pending OS event into `sink` without blocking.
    fn pump_events(&mut self, sink: &mut dyn EventSink);
}

/// A windowing backend.
///
/// Queries on a window the platform does not know return `None` or a neutral
/// value; callers that hold a live window treat that as a broken invariant.
pub trait Platform: EventPump {
    fn name(&self) -> &str;

    fn create_window(&mut self, descriptor: &WindowDescriptor) -> Result<WindowId, PlatformError>;

    fn destroy_window(&mut self, window: WindowId);

    fn has_window(&self, window: WindowId) -> bool;

    /// Logical client-area size.
    fn window_size(&self, window: WindowId) -> Option<Size<u32>>;

    /// Drawable size in physical pixels.
    fn framebuffer_size(&self, window: WindowId) -> Option<Size<u32>>;

    fn should_close(&self, window: WindowId) -> bool;

    fn set_should_close(&mut self, window: WindowId, should_close: bool);

    fn is_resizable(&self, window: WindowId) -> bool;

    fn set_resizable(&mut self, window: WindowId, resizable: bool);

    /// Requests a new logical size. The platform reports the applied size
    /// through resize events.
    fn set_window_size(&mut self, window: WindowId, size: Size<u32>);

    fn native_window(&self, window: WindowId) -> Option<NativeWindow>;

    fn monitors(&self) -> Vec<MonitorInfo>;

    fn primary_monitor(&self) -> Option<MonitorInfo> {
        self.monitors().into_iter().next()
    }
}
