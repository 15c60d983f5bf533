//! A window running an egui panel.
//!
//! Run with: cargo run --example gui_window

use kestrel::prelude::*;

fn main() -> Result<(), AppError> {
    kestrel::core::logging::init();

    let mut clicks = 0u32;
    let mut app = kestrel::create_default_app()?.with_extension(kestrel::EguiExtension::new(
        move |_window, ctx| {
            kestrel::egui::egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading("Kestrel");
                if ui.button("Click").clicked() {
                    clicks += 1;
                }
                ui.label(format!("Clicked {} time(s)", clicks));
            });
        },
    ));
    app.create_window(&WindowDescriptor::new("Kestrel GUI", Size::new(640, 480)))?;
    app.run();
    Ok(())
}
