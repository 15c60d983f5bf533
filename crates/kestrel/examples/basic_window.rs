//! Opens two windows and closes the app when both are gone.
//!
//! Press Space in a window to pause or resume the colour animation.
//!
//! Run with: cargo run --example basic_window

use kestrel::prelude::*;
use kestrel::winit::event::{KeyCode, PhysicalKey};

#[derive(Default)]
struct Pulse {
    hue: f32,
}

impl Extension for Pulse {
    fn on_frame_begin(&mut self, ctx: &mut AppContext) {
        let space_pressed = ctx.window_ids().into_iter().any(|window| {
            ctx.events().has_event(window, |kind| {
                matches!(
                    kind,
                    WindowEventKind::KeyboardButton {
                        key: PhysicalKey::Code(KeyCode::Space),
                        state: kestrel::winit::ButtonState::Pressed,
                        ..
                    }
                )
            })
        });
        if space_pressed {
            if ctx.is_paused() {
                ctx.resume();
            } else {
                ctx.pause();
            }
        }
    }

    fn on_update(&mut self, _ctx: &mut AppContext, dt: f32) {
        self.hue = (self.hue + dt * 0.2).fract();
    }

    fn on_render(&mut self, ctx: &mut AppContext, window: WindowId) {
        let shade = (self.hue * 255.0) as u32;
        ctx.set_clear_color(window, (shade << 24) | (0x40 << 16) | ((255 - shade) << 8) | 0xFF);
    }

    fn on_window_destroyed(&mut self, ctx: &mut AppContext, window: WindowId) {
        if let Some(view) = ctx.window(window).map(Window::view) {
            tracing::info!("Window {:?} with view {} closed", window, view);
        }
    }
}

fn main() -> Result<(), AppError> {
    kestrel::core::logging::init();

    let mut app = kestrel::create_default_app()?.with_extension(Pulse::default());
    app.create_window(&WindowDescriptor::new("Kestrel", Size::new(800, 600)))?;
    app.create_window(&WindowDescriptor::new("Kestrel (second)", Size::new(400, 300)))?;
    app.run();
    Ok(())
}
