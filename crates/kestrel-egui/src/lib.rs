//! Egui integration for Kestrel.
//!
//! [`EguiInput`] receives the GUI-relevant events of one window through the
//! [`GuiInput`](kestrel_winit::gui::GuiInput) bridge and turns them into
//! `egui::RawInput`. [`GuiContexts`] keeps one egui context per window.
//! Tessellation and drawing of the output are left to the caller.

mod contexts;
mod input;

pub use contexts::{GuiContext, GuiContexts};
pub use input::EguiInput;

// Re-export egui types
pub use egui::{self, Context as EguiContext, FullOutput, RawInput, Ui};
