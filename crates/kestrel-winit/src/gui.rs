//! Bridge between captured window events and an immediate-mode GUI.

use kestrel_core::math::Vec2;
use winit::event::MouseButton;
use winit::keyboard::{ModifiersState, PhysicalKey};

use crate::event::{ButtonState, ScrollUnit, WindowEvent, WindowEventKind};

/// Input injectors of a GUI backend.
///
/// One implementation per window context; [`forward_gui_events`] calls the
/// injectors in capture order.
pub trait GuiInput {
    fn focus_changed(&mut self, focused: bool);

    fn cursor_entered(&mut self, entered: bool);

    fn cursor_moved(&mut self, position: Vec2);

    fn mouse_button(&mut self, button: MouseButton, state: ButtonState, mods: ModifiersState);

    fn scrolled(&mut self, delta: Vec2, unit: ScrollUnit);

    fn key(
        &mut self,
        key: PhysicalKey,
        scan_code: Option<u32>,
        state: ButtonState,
        mods: ModifiersState,
    );

    fn char_entered(&mut self, codepoint: char);
}

/// Forwards the GUI-relevant events of one window's slice to `gui`.
///
/// Returns how many events were forwarded.
pub fn forward_gui_events(events: &[WindowEvent], gui: &mut dyn GuiInput) -> usize {
    let mut forwarded = 0;
    for event in events {
        match &event.kind {
            WindowEventKind::FocusChanged { focused } => gui.focus_changed(*focused),
            WindowEventKind::MouseEnterChanged { entered } => gui.cursor_entered(*entered),
            WindowEventKind::MousePosition { position } => gui.cursor_moved(*position),
            WindowEventKind::MouseButton {
                button,
                mods,
                state,
            } => gui.mouse_button(*button, *state, *mods),
            WindowEventKind::Scroll { delta, unit } => gui.scrolled(*delta, *unit),
            WindowEventKind::KeyboardButton {
                key,
                scan_code,
                mods,
                state,
            } => gui.key(*key, *scan_code, *state, *mods),
            WindowEventKind::CharEntered { codepoint } => gui.char_entered(*codepoint),
            _ => continue,
        }
        forwarded += 1;
    }
    forwarded
}
