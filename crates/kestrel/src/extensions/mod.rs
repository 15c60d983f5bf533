//! Built-in extensions.

#[cfg(feature = "egui")]
mod gui;
mod quit_condition;

#[cfg(feature = "egui")]
pub use gui::EguiExtension;
pub use quit_condition::QuitOnLastWindowClosed;
