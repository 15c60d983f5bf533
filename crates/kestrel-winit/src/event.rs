use std::path::PathBuf;

use kestrel_core::geometry::{Pos, Size};
use kestrel_core::math::Vec2;
pub use winit::event::MouseButton;
pub use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
pub use winit::window::WindowId;

use crate::platform::MonitorId;

/// State of a mouse or keyboard button in an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Pressed,
    Released,
    /// Key held down long enough for the OS to auto-repeat it.
    Repeated,
}

impl ButtonState {
    /// Pressed or repeated.
    pub const fn is_down(self) -> bool {
        !matches!(self, ButtonState::Released)
    }
}

/// Unit of a scroll delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollUnit {
    /// Lines or rows, as reported by classic mouse wheels.
    Lines,
    /// Physical pixels, as reported by touchpads.
    Pixels,
}

/// An event that belongs to one window.
///
/// `window` only identifies the window; the event never owns it. The host
/// keeps a window alive until every event produced for it in a frame has been
/// consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowEvent {
    pub window: WindowId,
    pub kind: WindowEventKind,
}

impl WindowEvent {
    pub fn new(window: WindowId, kind: WindowEventKind) -> Self {
        Self { window, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowEventKind {
    /// Window moved; position of the client area in screen coordinates.
    Moved { position: Pos<i32> },
    /// Window resized; logical (scale-independent) size.
    Resized { size: Size<u32> },
    /// The user asked to close the window.
    Closed,
    /// The window contents need to be redrawn.
    RefreshRequested,
    FocusChanged { focused: bool },
    IconifyChanged { iconified: bool },
    MaximizeChanged { maximized: bool },
    ContentScaleChanged { scale: Vec2 },
    /// Drawable surface resized; physical pixels.
    FramebufferResized { size: Size<u32> },
    MouseButton {
        button: MouseButton,
        mods: ModifiersState,
        state: ButtonState,
    },
    /// Cursor position relative to the client area, physical pixels.
    MousePosition { position: Vec2 },
    MouseEnterChanged { entered: bool },
    Scroll { delta: Vec2, unit: ScrollUnit },
    KeyboardButton {
        key: PhysicalKey,
        scan_code: Option<u32>,
        mods: ModifiersState,
        state: ButtonState,
    },
    CharEntered { codepoint: char },
    /// Files dropped on the window, in the order the platform reported them.
    FileDrop { paths: Vec<PathBuf> },
}

impl WindowEventKind {
    /// Whether a GUI backend consumes this kind of event.
    ///
    /// Focus, cursor enter/leave, cursor position, mouse buttons, scrolling,
    /// keys and characters are forwarded; everything else is window management.
    pub const fn is_gui_relevant(&self) -> bool {
        matches!(
            self,
            WindowEventKind::FocusChanged { .. }
                | WindowEventKind::MouseEnterChanged { .. }
                | WindowEventKind::MousePosition { .. }
                | WindowEventKind::MouseButton { .. }
                | WindowEventKind::Scroll { .. }
                | WindowEventKind::KeyboardButton { .. }
                | WindowEventKind::CharEntered { .. }
        )
    }
}

/// An event about a device rather than a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalEvent {
    MonitorConnectChanged { monitor: MonitorId, connected: bool },
    GamepadConnectChanged { id: u32, connected: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_state_is_down() {
        assert!(ButtonState::Pressed.is_down());
        assert!(ButtonState::Repeated.is_down());
        assert!(!ButtonState::Released.is_down());
    }

    #[test]
    fn test_gui_relevant_subset() {
        let relevant = [
            WindowEventKind::FocusChanged { focused: true },
            WindowEventKind::MouseEnterChanged { entered: false },
            WindowEventKind::MousePosition {
                position: Vec2::new(1.0, 2.0),
            },
            WindowEventKind::MouseButton {
                button: MouseButton::Left,
                mods: ModifiersState::empty(),
                state: ButtonState::Pressed,
            },
            WindowEventKind::Scroll {
                delta: Vec2::Y,
                unit: ScrollUnit::Lines,
            },
            WindowEventKind::KeyboardButton {
                key: PhysicalKey::Code(KeyCode::KeyA),
                scan_code: None,
                mods: ModifiersState::SHIFT,
                state: ButtonState::Released,
            },
            WindowEventKind::CharEntered { codepoint: 'a' },
        ];
        assert!(relevant.iter().all(WindowEventKind::is_gui_relevant));

        let irrelevant = [
            WindowEventKind::Closed,
            WindowEventKind::RefreshRequested,
            WindowEventKind::Moved {
                position: Pos::new(3, 4),
            },
            WindowEventKind::FramebufferResized {
                size: Size::new(640, 480),
            },
            WindowEventKind::FileDrop { paths: vec![] },
        ];
        assert!(!irrelevant.iter().any(WindowEventKind::is_gui_relevant));
    }
}
