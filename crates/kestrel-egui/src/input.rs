use kestrel_core::geometry::Size;
use kestrel_core::math::Vec2;
use kestrel_core::profiling::profile_function;
use kestrel_winit::event::{ButtonState, KeyCode, ModifiersState, MouseButton, PhysicalKey, ScrollUnit};
use kestrel_winit::gui::GuiInput;

/// Accumulates one window's input for the next egui pass.
///
/// Positions arrive in physical pixels and are converted to egui points with
/// the window's pixels-per-point.
pub struct EguiInput {
    input: egui::RawInput,
    pixels_per_point: f32,
    pointer_pos: Option<egui::Pos2>,
}

impl EguiInput {
    pub fn new(pixels_per_point: f32) -> Self {
        let mut input = Self {
            input: egui::RawInput {
                focused: false,
                ..Default::default()
            },
            pixels_per_point: 1.0,
            pointer_pos: None,
        };
        input.set_pixels_per_point(pixels_per_point);
        input
    }

    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        self.pixels_per_point = pixels_per_point.max(f32::EPSILON);
        self.input
            .viewports
            .entry(egui::ViewportId::ROOT)
            .or_default()
            .native_pixels_per_point = Some(self.pixels_per_point);
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    /// Events gathered since the last [`take`](Self::take).
    pub fn pending_events(&self) -> &[egui::Event] {
        &self.input.events
    }

    /// Hands the gathered input to egui, sized for a drawable of `size_in_pixels`.
    pub fn take(&mut self, size_in_pixels: Size<u32>) -> egui::RawInput {
        profile_function!();
        let size_in_points = egui::vec2(
            size_in_pixels.width as f32,
            size_in_pixels.height as f32,
        ) / self.pixels_per_point;

        self.input.screen_rect = (size_in_points.x > 0.0 && size_in_points.y > 0.0)
            .then(|| egui::Rect::from_min_size(egui::Pos2::ZERO, size_in_points));
        self.input.viewport_id = egui::ViewportId::ROOT;
        self.input.take()
    }

    fn to_points(&self, position: Vec2) -> egui::Pos2 {
        egui::pos2(
            position.x / self.pixels_per_point,
            position.y / self.pixels_per_point,
        )
    }
}

impl Default for EguiInput {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl GuiInput for EguiInput {
    fn focus_changed(&mut self, focused: bool) {
        self.input.focused = focused;
        self.input.events.push(egui::Event::WindowFocused(focused));
    }

    fn cursor_entered(&mut self, entered: bool) {
        if !entered {
            self.pointer_pos = None;
            self.input.events.push(egui::Event::PointerGone);
        }
    }

    fn cursor_moved(&mut self, position: Vec2) {
        let pos = self.to_points(position);
        self.pointer_pos = Some(pos);
        self.input.events.push(egui::Event::PointerMoved(pos));
    }

    fn mouse_button(&mut self, button: MouseButton, state: ButtonState, mods: ModifiersState) {
        self.input.modifiers = translate_modifiers(mods);
        let (Some(pos), Some(button)) = (self.pointer_pos, translate_mouse_button(button)) else {
            return;
        };
        self.input.events.push(egui::Event::PointerButton {
            pos,
            button,
            pressed: state.is_down(),
            modifiers: self.input.modifiers,
        });
    }

    fn scrolled(&mut self, delta: Vec2, unit: ScrollUnit) {
        let (unit, delta) = match unit {
            ScrollUnit::Lines => (egui::MouseWheelUnit::Line, egui::vec2(delta.x, delta.y)),
            ScrollUnit::Pixels => (
                egui::MouseWheelUnit::Point,
                egui::vec2(delta.x, delta.y) / self.pixels_per_point,
            ),
        };
        self.input.events.push(egui::Event::MouseWheel {
            unit,
            delta,
            modifiers: self.input.modifiers,
        });
    }

    fn key(
        &mut self,
        key: PhysicalKey,
        _scan_code: Option<u32>,
        state: ButtonState,
        mods: ModifiersState,
    ) {
        self.input.modifiers = translate_modifiers(mods);
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let Some(key) = key_from_key_code(code) else {
            tracing::trace!("No egui key for {:?}", code);
            return;
        };

        let pressed = state.is_down();
        if pressed && self.input.modifiers.command {
            match key {
                egui::Key::X => return self.input.events.push(egui::Event::Cut),
                egui::Key::C => return self.input.events.push(egui::Event::Copy),
                _ => {}
            }
        }

        self.input.events.push(egui::Event::Key {
            key,
            physical_key: Some(key),
            pressed,
            repeat: state == ButtonState::Repeated,
            modifiers: self.input.modifiers,
        });
    }

    fn char_entered(&mut self, codepoint: char) {
        let modifiers = self.input.modifiers;
        if !is_printable_char(codepoint) || modifiers.ctrl || modifiers.command || modifiers.mac_cmd
        {
            return;
        }
        // Consecutive characters join into one text event.
        if let Some(egui::Event::Text(text)) = self.input.events.last_mut() {
            text.push(codepoint);
        } else {
            self.input.events.push(egui::Event::Text(codepoint.to_string()));
        }
    }
}

fn translate_modifiers(mods: ModifiersState) -> egui::Modifiers {
    let mac = cfg!(target_os = "macos");
    egui::Modifiers {
        alt: mods.alt_key(),
        ctrl: mods.control_key(),
        shift: mods.shift_key(),
        mac_cmd: mac && mods.super_key(),
        command: if mac {
            mods.super_key()
        } else {
            mods.control_key()
        },
    }
}

fn translate_mouse_button(button: MouseButton) -> Option<egui::PointerButton> {
    match button {
        MouseButton::Left => Some(egui::PointerButton::Primary),
        MouseButton::Right => Some(egui::PointerButton::Secondary),
        MouseButton::Middle => Some(egui::PointerButton::Middle),
        MouseButton::Back => Some(egui::PointerButton::Extra1),
        MouseButton::Forward => Some(egui::PointerButton::Extra2),
        MouseButton::Other(_) => None,
    }
}

fn is_printable_char(chr: char) -> bool {
    let is_in_private_use_area = ('\u{e000}'..='\u{f8ff}').contains(&chr)
        || ('\u{f0000}'..='\u{ffffd}').contains(&chr)
        || ('\u{100000}'..='\u{10fffd}').contains(&chr);

    !is_in_private_use_area && !chr.is_ascii_control()
}

/// Maps a physical key to egui's key set.
///
/// Letters, digits and function keys are matched by name; the rest are listed.
fn key_from_key_code(code: KeyCode) -> Option<egui::Key> {
    use egui::Key;

    let key = match code {
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::Escape => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Space => Key::Space,
        KeyCode::Comma => Key::Comma,
        KeyCode::Period => Key::Period,
        KeyCode::Semicolon => Key::Semicolon,
        KeyCode::Backslash => Key::Backslash,
        KeyCode::Slash | KeyCode::NumpadDivide => Key::Slash,
        KeyCode::BracketLeft => Key::OpenBracket,
        KeyCode::BracketRight => Key::CloseBracket,
        KeyCode::Backquote => Key::Backtick,
        KeyCode::Quote => Key::Quote,
        KeyCode::Minus | KeyCode::NumpadSubtract => Key::Minus,
        KeyCode::NumpadAdd => Key::Plus,
        KeyCode::Equal => Key::Equals,
        _ => {
            // KeyA -> "A", Digit1 / Numpad1 -> "1", F5 -> "F5"
            let name = format!("{:?}", code);
            let stripped = ["Key", "Digit", "Numpad"]
                .iter()
                .find_map(|prefix| name.strip_prefix(prefix))
                .unwrap_or(name.as_str());
            return Key::from_name(stripped);
        }
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names() {
        assert_eq!(key_from_key_code(KeyCode::KeyA), Some(egui::Key::A));
        assert_eq!(key_from_key_code(KeyCode::Digit7), Some(egui::Key::Num7));
        assert_eq!(key_from_key_code(KeyCode::Numpad3), Some(egui::Key::Num3));
        assert_eq!(key_from_key_code(KeyCode::F11), Some(egui::Key::F11));
        assert_eq!(key_from_key_code(KeyCode::Enter), Some(egui::Key::Enter));
        assert_eq!(key_from_key_code(KeyCode::CapsLock), None);
    }

    #[test]
    fn test_cursor_position_in_points() {
        let mut input = EguiInput::new(2.0);
        input.cursor_moved(Vec2::new(100.0, 50.0));
        assert_eq!(
            input.pending_events(),
            &[egui::Event::PointerMoved(egui::pos2(50.0, 25.0))]
        );
    }

    #[test]
    fn test_button_needs_known_pointer() {
        let mut input = EguiInput::default();
        input.mouse_button(MouseButton::Left, ButtonState::Pressed, ModifiersState::empty());
        assert!(input.pending_events().is_empty());

        input.cursor_moved(Vec2::new(4.0, 4.0));
        input.mouse_button(MouseButton::Left, ButtonState::Pressed, ModifiersState::empty());
        assert!(matches!(
            input.pending_events().last(),
            Some(egui::Event::PointerButton {
                button: egui::PointerButton::Primary,
                pressed: true,
                ..
            })
        ));
    }

    #[test]
    fn test_leaving_forgets_pointer() {
        let mut input = EguiInput::default();
        input.cursor_moved(Vec2::new(1.0, 1.0));
        input.cursor_entered(false);
        input.mouse_button(MouseButton::Left, ButtonState::Pressed, ModifiersState::empty());
        assert_eq!(
            input.pending_events().last(),
            Some(&egui::Event::PointerGone)
        );
    }

    #[test]
    fn test_chars_join_into_text() {
        let mut input = EguiInput::default();
        input.char_entered('h');
        input.char_entered('i');
        input.char_entered('\u{7}');
        assert_eq!(
            input.pending_events(),
            &[egui::Event::Text("hi".to_string())]
        );
    }

    #[test]
    fn test_repeated_key() {
        let mut input = EguiInput::default();
        input.key(
            PhysicalKey::Code(KeyCode::ArrowLeft),
            None,
            ButtonState::Repeated,
            ModifiersState::empty(),
        );
        assert!(matches!(
            input.pending_events(),
            [egui::Event::Key {
                key: egui::Key::ArrowLeft,
                pressed: true,
                repeat: true,
                ..
            }]
        ));
    }

    #[test]
    fn test_take_sets_screen_rect_and_clears() {
        let mut input = EguiInput::new(2.0);
        input.focus_changed(true);
        let raw = input.take(Size::new(800, 600));
        assert_eq!(
            raw.screen_rect,
            Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(400.0, 300.0)
            ))
        );
        assert!(raw.focused);
        assert_eq!(raw.events, vec![egui::Event::WindowFocused(true)]);
        assert!(input.pending_events().is_empty());
    }
}
