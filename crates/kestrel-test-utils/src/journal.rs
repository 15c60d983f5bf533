use std::sync::Arc;

use kestrel_core::geometry::{Rect, Size};
use kestrel_render::{ClearPolicy, FramebufferHandle, ViewId};
use kestrel_winit::WindowId;
use parking_lot::Mutex;

/// A windowing-backend call recorded by [`MockPlatform`](crate::MockPlatform).
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    CreateWindow { window: WindowId, title: String },
    DestroyWindow(WindowId),
    SetWindowSize { window: WindowId, size: Size<u32> },
    SetResizable { window: WindowId, resizable: bool },
}

/// A GPU-backend call recorded by [`MockGpuBackend`](crate::MockGpuBackend).
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CreateFramebuffer {
        framebuffer: FramebufferHandle,
        window: WindowId,
        size: Size<u32>,
    },
    DestroyFramebuffer(FramebufferHandle),
    SetViewFramebuffer {
        view: ViewId,
        framebuffer: Option<FramebufferHandle>,
    },
    SetViewRect {
        view: ViewId,
        rect: Rect<u32>,
    },
    SetViewClear {
        view: ViewId,
        clear: ClearPolicy,
    },
    ResetView(ViewId),
    Touch(ViewId),
    SubmitFrame(u64),
    ResetBackbuffer(Size<u32>),
    ReleaseBackbuffer,
    Reinitialize {
        window: WindowId,
        size: Size<u32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum JournalEntry {
    Platform(PlatformCall),
    Gpu(GpuCall),
    /// Free-form marker recorded by a test, e.g. an extension callback.
    Note(String),
}

/// Ordered record shared by the mocks and the test.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: JournalEntry) {
        self.entries.lock().push(entry);
    }

    pub fn note(&self, note: impl Into<String>) {
        self.record(JournalEntry::Note(note.into()));
    }

    /// Snapshot of every entry so far.
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().clone()
    }

    pub fn notes(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Note(note) => Some(note.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn gpu_calls(&self) -> Vec<GpuCall> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Gpu(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn platform_calls(&self) -> Vec<PlatformCall> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Platform(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    /// Index of the first entry matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&JournalEntry) -> bool) -> Option<usize> {
        self.entries.lock().iter().position(predicate)
    }

    /// Index of the first occurrence of the note.
    pub fn note_position(&self, note: &str) -> Option<usize> {
        self.position(|entry| matches!(entry, JournalEntry::Note(n) if n == note))
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
