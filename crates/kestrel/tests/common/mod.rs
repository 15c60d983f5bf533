#![allow(dead_code)]

use kestrel::{AppContext, Extension};
use kestrel_core::geometry::Size;
use kestrel_test_utils::Journal;
use kestrel_winit::{WindowDescriptor, WindowId};

/// Notes every hook as `"<label>.<hook>"` into the journal, with the
/// window id for window hooks, e.g. `"E1.render(1)"`.
pub struct Recorder {
    label: &'static str,
    journal: Journal,
}

impl Recorder {
    pub fn new(label: &'static str, journal: &Journal) -> Self {
        Self {
            label,
            journal: journal.clone(),
        }
    }

    fn note(&self, hook: &str) {
        self.journal.note(format!("{}.{}", self.label, hook));
    }
}

pub fn window_key(window: WindowId) -> u64 {
    u64::from(window)
}

impl Extension for Recorder {
    fn on_initialize(&mut self, _ctx: &mut AppContext) {
        self.note("initialize");
    }

    fn on_terminate(&mut self, _ctx: &mut AppContext) {
        self.note("terminate");
    }

    fn on_window_created(&mut self, _ctx: &mut AppContext, window: WindowId) {
        self.note(&format!("created({})", window_key(window)));
    }

    fn on_window_destroyed(&mut self, ctx: &mut AppContext, window: WindowId) {
        // The window must still be fully alive here.
        let alive = ctx.window(window).is_some() && ctx.platform().has_window(window);
        self.note(&format!("destroyed({}, alive={})", window_key(window), alive));
    }

    fn on_frame_begin(&mut self, _ctx: &mut AppContext) {
        self.note("frame_begin");
    }

    fn on_update(&mut self, _ctx: &mut AppContext, _dt: f32) {
        self.note("update");
    }

    fn on_render(&mut self, _ctx: &mut AppContext, window: WindowId) {
        self.note(&format!("render({})", window_key(window)));
    }

    fn on_frame_end(&mut self, _ctx: &mut AppContext) {
        self.note("frame_end");
    }
}

pub fn descriptor(width: u32, height: u32) -> WindowDescriptor {
    WindowDescriptor::new("test", Size::new(width, height))
}
