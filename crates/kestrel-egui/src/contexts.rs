use kestrel_core::alloc::HashMap;
use kestrel_core::geometry::Size;
use kestrel_core::profiling::profile_function;
use kestrel_winit::WindowId;

use crate::input::EguiInput;

/// The egui state of a single window.
pub struct GuiContext {
    context: egui::Context,
    input: EguiInput,
}

impl GuiContext {
    fn new(pixels_per_point: f32) -> Self {
        let context = egui::Context::default();
        context.set_visuals(egui::Visuals::dark());
        Self {
            context,
            input: EguiInput::new(pixels_per_point),
        }
    }

    pub fn context(&self) -> &egui::Context {
        &self.context
    }

    pub fn input(&self) -> &EguiInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut EguiInput {
        &mut self.input
    }

    /// Starts an egui pass; the UI is built on [`context`](Self::context)
    /// until [`end_frame`](Self::end_frame).
    pub fn begin_frame(&mut self, size_in_pixels: Size<u32>) {
        let raw_input = self.input.take(size_in_pixels);
        self.context.begin_pass(raw_input);
    }

    pub fn end_frame(&mut self) -> egui::FullOutput {
        self.context.end_pass()
    }

    /// Runs one egui pass over the input gathered since the last run.
    pub fn run(
        &mut self,
        size_in_pixels: Size<u32>,
        ui: impl FnMut(&egui::Context),
    ) -> egui::FullOutput {
        profile_function!();
        let raw_input = self.input.take(size_in_pixels);
        self.context.run(raw_input, ui)
    }
}

/// Per-window GUI contexts with a notion of the current one.
///
/// Creating the first context makes it current. Destroying the current
/// context leaves no current context until another is selected; destroying
/// any other context is reported and carried out anyway.
#[derive(Default)]
pub struct GuiContexts {
    contexts: HashMap<WindowId, GuiContext>,
    current: Option<WindowId>,
}

impl GuiContexts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the context of `window`. Returns `false` if it already had one.
    pub fn create(&mut self, window: WindowId, pixels_per_point: f32) -> bool {
        if !kestrel_core::soft_validate!(
            !self.contexts.contains_key(&window),
            "GUI context for {:?} already exists",
            window
        ) {
            return false;
        }
        self.contexts
            .insert(window, GuiContext::new(pixels_per_point));
        if self.current.is_none() {
            self.current = Some(window);
        }
        tracing::debug!("Created GUI context for {:?}", window);
        true
    }

    /// Destroys the context of `window`. Returns `false` if there was none.
    pub fn destroy(&mut self, window: WindowId) -> bool {
        if !kestrel_core::soft_validate!(
            self.contexts.contains_key(&window),
            "No GUI context for {:?}",
            window
        ) {
            return false;
        }
        if kestrel_core::soft_validate!(
            self.current == Some(window),
            "destroying GUI context of {:?} which is not current",
            window
        ) {
            self.current = None;
        }
        self.contexts.remove(&window);
        tracing::debug!("Destroyed GUI context for {:?}", window);
        true
    }

    /// Makes the context of `window` current. Returns `false` if it has none.
    pub fn set_current(&mut self, window: WindowId) -> bool {
        if self.contexts.contains_key(&window) {
            self.current = Some(window);
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<WindowId> {
        self.current
    }

    pub fn current_mut(&mut self) -> Option<&mut GuiContext> {
        let window = self.current?;
        self.contexts.get_mut(&window)
    }

    /// Begins a pass on the context of `window` and makes it current.
    pub fn begin_frame(&mut self, window: WindowId, size_in_pixels: Size<u32>) -> bool {
        let Some(gui) = self.contexts.get_mut(&window) else {
            return false;
        };
        gui.begin_frame(size_in_pixels);
        self.current = Some(window);
        true
    }

    pub fn end_frame(&mut self, window: WindowId) -> Option<egui::FullOutput> {
        self.contexts.get_mut(&window).map(GuiContext::end_frame)
    }

    pub fn get(&self, window: WindowId) -> Option<&GuiContext> {
        self.contexts.get(&window)
    }

    pub fn get_mut(&mut self, window: WindowId) -> Option<&mut GuiContext> {
        self.contexts.get_mut(&window)
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.contexts.contains_key(&window)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_winit::gui::GuiInput;

    #[test]
    fn test_first_context_becomes_current() {
        let mut contexts = GuiContexts::new();
        let (a, b) = (WindowId::from(1), WindowId::from(2));

        assert!(contexts.create(a, 1.0));
        assert!(contexts.create(b, 1.0));
        assert_eq!(contexts.current(), Some(a));
        assert!(!contexts.create(a, 1.0));
        assert_eq!(contexts.len(), 2);
    }

    #[test]
    fn test_destroy_current_clears_it() {
        let mut contexts = GuiContexts::new();
        let (a, b) = (WindowId::from(1), WindowId::from(2));
        contexts.create(a, 1.0);
        contexts.create(b, 1.0);

        assert!(contexts.destroy(a));
        assert_eq!(contexts.current(), None);
        assert!(contexts.current_mut().is_none());
        assert!(!contexts.destroy(a));

        assert!(contexts.set_current(b));
        assert!(!contexts.set_current(a));
        assert_eq!(contexts.current(), Some(b));
    }

    #[test]
    fn test_run_consumes_input() {
        let mut contexts = GuiContexts::new();
        let window = WindowId::from(7);
        contexts.create(window, 1.0);

        let gui = contexts.get_mut(window).unwrap();
        gui.input_mut().focus_changed(true);
        let mut frames = 0;
        gui.run(Size::new(320, 240), |ctx| {
            frames += 1;
            assert!(ctx.input(|i| i.focused));
        });

        assert!(frames >= 1);
        assert!(gui.input().pending_events().is_empty());
    }

    #[test]
    fn test_begin_frame_selects_context() {
        let mut contexts = GuiContexts::new();
        let (a, b) = (WindowId::from(1), WindowId::from(2));
        contexts.create(a, 1.0);
        contexts.create(b, 1.0);

        assert!(contexts.begin_frame(b, Size::new(100, 100)));
        assert_eq!(contexts.current(), Some(b));
        assert!(contexts.end_frame(b).is_some());

        assert!(!contexts.begin_frame(WindowId::from(3), Size::new(1, 1)));
        assert!(contexts.end_frame(WindowId::from(3)).is_none());
    }
}
