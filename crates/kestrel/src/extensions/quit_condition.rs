use crate::app::AppContext;
use crate::extension::Extension;

/// Stops the host during update once every window has been closed.
///
/// A host that never opened a window is stopped on its first update.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuitOnLastWindowClosed;

impl Extension for QuitOnLastWindowClosed {
    fn name(&self) -> &'static str {
        "QuitOnLastWindowClosed"
    }

    fn on_update(&mut self, ctx: &mut AppContext, _dt: f32) {
        if ctx.windows().is_empty() {
            tracing::info!("Last window closed, stopping");
            ctx.stop();
        }
    }
}
