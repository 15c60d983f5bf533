//! Event capture and windowing for Kestrel.
//!
//! - [`event`]: the window-scoped and global event records
//! - [`queue`]: the per-frame [`EventQueue`](queue::EventQueue)
//! - [`gui`]: the bridge that forwards GUI-relevant events to a GUI backend
//! - [`platform`]: the windowing-backend traits
//! - [`winit_platform`]: the winit implementation of those traits

pub mod event;
#[cfg(feature = "gamepad")]
mod gamepad;
pub mod gui;
pub mod platform;
pub mod queue;
pub mod winit_platform;

// Re-export WindowId for convenience
pub use winit::window::WindowId;

pub use event::{ButtonState, GlobalEvent, ScrollUnit, WindowEvent, WindowEventKind};
pub use platform::{
    EventPump, EventSink, MonitorId, MonitorInfo, NativeWindow, Platform, PlatformError,
    WindowDescriptor,
};
pub use queue::EventQueue;
pub use winit_platform::WinitPlatform;
