use kestrel_core::alloc::HashMap;
use kestrel_core::profiling::profile_function;
use kestrel_egui::{EguiContext, FullOutput, GuiContexts};
use kestrel_winit::WindowId;

use crate::app::AppContext;
use crate::extension::Extension;

type UiCallback = Box<dyn FnMut(WindowId, &EguiContext)>;
type OutputHandler = Box<dyn FnMut(&mut AppContext, WindowId, FullOutput)>;

/// Runs an egui UI in every window.
///
/// Each window gets its own GUI context when it is created, which is fed
/// the window's GUI-relevant events every frame and run during render.
/// The output (shapes, textures, platform requests) goes to the output
/// handler; without one it is dropped after the pass.
pub struct EguiExtension {
    contexts: GuiContexts,
    ui: UiCallback,
    output: Option<OutputHandler>,
    forwarded: HashMap<WindowId, usize>,
}

impl EguiExtension {
    pub fn new(ui: impl FnMut(WindowId, &EguiContext) + 'static) -> Self {
        Self {
            contexts: GuiContexts::new(),
            ui: Box::new(ui),
            output: None,
            forwarded: HashMap::new(),
        }
    }

    /// Hands every pass's output to `handler`, e.g. to tessellate and draw it.
    pub fn with_output_handler(
        mut self,
        handler: impl FnMut(&mut AppContext, WindowId, FullOutput) + 'static,
    ) -> Self {
        self.output = Some(Box::new(handler));
        self
    }

    pub fn contexts(&self) -> &GuiContexts {
        &self.contexts
    }
}

impl Extension for EguiExtension {
    fn name(&self) -> &'static str {
        "EguiExtension"
    }

    fn on_window_created(&mut self, ctx: &mut AppContext, window: WindowId) {
        let platform = ctx.platform();
        let pixels_per_point = match (platform.window_size(window), platform.framebuffer_size(window)) {
            (Some(size), Some(resolution)) if size.width > 0 => {
                resolution.width as f32 / size.width as f32
            }
            _ => 1.0,
        };
        self.contexts.create(window, pixels_per_point);
    }

    fn on_window_destroyed(&mut self, _ctx: &mut AppContext, window: WindowId) {
        self.contexts.set_current(window);
        self.contexts.destroy(window);
        self.forwarded.remove(&window);
    }

    fn on_frame_begin(&mut self, ctx: &mut AppContext) {
        profile_function!();
        for window in ctx.window_ids() {
            let Some(gui) = self.contexts.get_mut(window) else {
                continue;
            };
            if let Some(scale) = ctx.events().last_content_scale(window) {
                tracing::debug!("GUI of {:?} now at {} pixels per point", window, scale.x);
                gui.input_mut().set_pixels_per_point(scale.x);
            }
            let forwarded = ctx.events().update_gui_events(window, gui.input_mut());
            self.forwarded.insert(window, forwarded);
        }
    }

    fn on_render(&mut self, ctx: &mut AppContext, window: WindowId) {
        profile_function!();
        let Some(size) = ctx.window(window).map(|w| w.frame_size()) else {
            return;
        };
        if !self.contexts.begin_frame(window, size) {
            return;
        }
        if let Some(gui) = self.contexts.get(window) {
            (self.ui)(window, gui.context());
        }
        let Some(output) = self.contexts.end_frame(window) else {
            return;
        };

        match self.output.as_mut() {
            Some(handler) => handler(ctx, window, output),
            None => tracing::trace!(
                "Dropping GUI output of {:?}: {} shape(s), {} forwarded event(s)",
                window,
                output.shapes.len(),
                self.forwarded.get(&window).copied().unwrap_or_default()
            ),
        }
    }
}
