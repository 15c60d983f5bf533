//! Scripted windowing backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use kestrel_core::geometry::Size;
use kestrel_winit::{
    EventPump, EventSink, GlobalEvent, MonitorInfo, NativeWindow, Platform, PlatformError,
    WindowDescriptor, WindowEventKind, WindowId,
};
use parking_lot::Mutex;

use crate::journal::{Journal, JournalEntry, PlatformCall};

#[derive(Debug, Clone)]
struct MockWindow {
    title: String,
    size: Size<u32>,
    framebuffer: Size<u32>,
    should_close: bool,
    resizable: bool,
}

#[derive(Debug)]
struct MockPlatformState {
    windows: BTreeMap<WindowId, MockWindow>,
    next_window: u64,
    pending_window_events: Vec<(WindowId, WindowEventKind)>,
    pending_global_events: Vec<GlobalEvent>,
    monitors: Vec<MonitorInfo>,
    /// Physical pixels per logical pixel.
    scale: u32,
    fail_next_create: bool,
    pumps: u64,
}

/// [`Platform`] without an OS behind it.
///
/// Windows exist only as records; framebuffer sizes are the logical size
/// times an integer scale. Events queued through the [`MockPlatformHandle`]
/// are delivered by the next pump, in the order they were queued.
pub struct MockPlatform {
    state: Arc<Mutex<MockPlatformState>>,
    journal: Journal,
}

impl MockPlatform {
    pub fn new(journal: &Journal) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockPlatformState {
                windows: BTreeMap::new(),
                next_window: 1,
                pending_window_events: Vec::new(),
                pending_global_events: Vec::new(),
                monitors: Vec::new(),
                scale: 1,
                fail_next_create: false,
                pumps: 0,
            })),
            journal: journal.clone(),
        }
    }

    pub fn handle(&self) -> MockPlatformHandle {
        MockPlatformHandle {
            state: self.state.clone(),
        }
    }
}

impl EventPump for MockPlatform {
    fn pump_events(&mut self, sink: &mut dyn EventSink) {
        let (window_events, global_events) = {
            let mut state = self.state.lock();
            state.pumps += 1;
            (
                std::mem::take(&mut state.pending_window_events),
                std::mem::take(&mut state.pending_global_events),
            )
        };
        for (window, kind) in window_events {
            sink.push_window_event(window, kind);
        }
        for event in global_events {
            sink.push_global_event(event);
        }
    }
}

impl Platform for MockPlatform {
    fn name(&self) -> &str {
        "mock"
    }

    fn create_window(&mut self, descriptor: &WindowDescriptor) -> Result<WindowId, PlatformError> {
        let mut state = self.state.lock();
        if std::mem::take(&mut state.fail_next_create) {
            return Err(PlatformError::WindowCreation("scripted failure".into()));
        }
        if let Some(monitor) = descriptor.monitor
            && !state.monitors.iter().any(|info| info.id == monitor)
        {
            return Err(PlatformError::UnknownMonitor(monitor));
        }

        let id = WindowId::from(state.next_window);
        state.next_window += 1;
        let framebuffer = descriptor.size * state.scale;
        state.windows.insert(
            id,
            MockWindow {
                title: descriptor.title.clone(),
                size: descriptor.size,
                framebuffer,
                should_close: false,
                resizable: descriptor.resizable,
            },
        );
        drop(state);

        self.journal
            .record(JournalEntry::Platform(PlatformCall::CreateWindow {
                window: id,
                title: descriptor.title.clone(),
            }));
        Ok(id)
    }

    fn destroy_window(&mut self, window: WindowId) {
        kestrel_core::validate!(
            self.state.lock().windows.remove(&window).is_some(),
            "destroying unknown window {:?}",
            window
        );
        self.journal
            .record(JournalEntry::Platform(PlatformCall::DestroyWindow(window)));
    }

    fn has_window(&self, window: WindowId) -> bool {
        self.state.lock().windows.contains_key(&window)
    }

    fn window_size(&self, window: WindowId) -> Option<Size<u32>> {
        self.state.lock().windows.get(&window).map(|w| w.size)
    }

    fn framebuffer_size(&self, window: WindowId) -> Option<Size<u32>> {
        self.state.lock().windows.get(&window).map(|w| w.framebuffer)
    }

    fn should_close(&self, window: WindowId) -> bool {
        self.state
            .lock()
            .windows
            .get(&window)
            .is_some_and(|w| w.should_close)
    }

    fn set_should_close(&mut self, window: WindowId, should_close: bool) {
        if let Some(w) = self.state.lock().windows.get_mut(&window) {
            w.should_close = should_close;
        }
    }

    fn is_resizable(&self, window: WindowId) -> bool {
        self.state
            .lock()
            .windows
            .get(&window)
            .is_some_and(|w| w.resizable)
    }

    fn set_resizable(&mut self, window: WindowId, resizable: bool) {
        if let Some(w) = self.state.lock().windows.get_mut(&window) {
            w.resizable = resizable;
        }
        self.journal
            .record(JournalEntry::Platform(PlatformCall::SetResizable { window, resizable }));
    }

    fn set_window_size(&mut self, window: WindowId, size: Size<u32>) {
        self.handle().resize(window, size);
        self.journal
            .record(JournalEntry::Platform(PlatformCall::SetWindowSize { window, size }));
    }

    fn native_window(&self, window: WindowId) -> Option<NativeWindow> {
        self.state
            .lock()
            .windows
            .contains_key(&window)
            .then(|| NativeWindow::headless(window))
    }

    fn monitors(&self) -> Vec<MonitorInfo> {
        self.state.lock().monitors.clone()
    }
}

/// Test-side control of a [`MockPlatform`].
#[derive(Clone)]
pub struct MockPlatformHandle {
    state: Arc<Mutex<MockPlatformState>>,
}

impl MockPlatformHandle {
    /// Queues an event for the next pump.
    pub fn push_window_event(&self, window: WindowId, kind: WindowEventKind) {
        self.state
            .lock()
            .pending_window_events
            .push((window, kind));
    }

    pub fn push_global_event(&self, event: GlobalEvent) {
        self.state.lock().pending_global_events.push(event);
    }

    /// Simulates the user closing the window: raises its close flag and
    /// queues a `Closed` event.
    pub fn request_close(&self, window: WindowId) {
        let mut state = self.state.lock();
        if let Some(w) = state.windows.get_mut(&window) {
            w.should_close = true;
        }
        state
            .pending_window_events
            .push((window, WindowEventKind::Closed));
    }

    /// Simulates an OS resize to `size` logical pixels, queueing the
    /// matching resize and framebuffer-resize events.
    pub fn resize(&self, window: WindowId, size: Size<u32>) {
        let mut state = self.state.lock();
        let scale = state.scale;
        let Some(w) = state.windows.get_mut(&window) else {
            return;
        };
        w.size = size;
        w.framebuffer = size * scale;
        let framebuffer = w.framebuffer;
        state
            .pending_window_events
            .push((window, WindowEventKind::Resized { size }));
        state.pending_window_events.push((
            window,
            WindowEventKind::FramebufferResized { size: framebuffer },
        ));
    }

    /// Physical pixels per logical pixel for windows created afterwards.
    pub fn set_scale(&self, scale: u32) {
        self.state.lock().scale = scale;
    }

    pub fn set_monitors(&self, monitors: Vec<MonitorInfo>) {
        self.state.lock().monitors = monitors;
    }

    /// Makes the next `create_window` fail.
    pub fn fail_next_window_creation(&self) {
        self.state.lock().fail_next_create = true;
    }

    /// Ids of the windows currently open, in creation order.
    pub fn window_ids(&self) -> Vec<WindowId> {
        self.state.lock().windows.keys().copied().collect()
    }

    pub fn window_count(&self) -> usize {
        self.state.lock().windows.len()
    }

    pub fn is_open(&self, window: WindowId) -> bool {
        self.state.lock().windows.contains_key(&window)
    }

    pub fn title(&self, window: WindowId) -> Option<String> {
        self.state
            .lock()
            .windows
            .get(&window)
            .map(|w| w.title.clone())
    }

    pub fn pump_count(&self) -> u64 {
        self.state.lock().pumps
    }
}
