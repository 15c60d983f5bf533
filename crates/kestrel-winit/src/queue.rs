use kestrel_core::alloc::HashSet;
use kestrel_core::geometry::Size;
use kestrel_core::math::Vec2;
use kestrel_core::profiling::{profile_function, profile_scope};
use winit::window::WindowId;

use crate::event::{GlobalEvent, WindowEvent, WindowEventKind};
use crate::gui::{GuiInput, forward_gui_events};
use crate::platform::{EventPump, EventSink};

/// Per-frame buffer of captured events.
///
/// Every [`poll_events`](Self::poll_events) discards the previous frame's
/// events, pumps the platform and groups the new window events by window.
/// Events of one window keep the order in which the platform reported them.
/// Global events live in their own buffer and are read with
/// [`grab_global_events`](Self::grab_global_events).
///
/// Only windows registered with [`connect_window`](Self::connect_window)
/// have their events captured; events for any other window are dropped.
pub struct EventQueue {
    events: Vec<WindowEvent>,
    global_events: Vec<GlobalEvent>,
    connected: HashSet<WindowId>,
    initialized: bool,
    stats: EventStats,
}

/// Counters since creation or the last [`EventQueue::reset_stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EventStats {
    pub frames_polled: u64,
    pub events_received: usize,
    /// Events for windows that were not connected, or globals before initialization.
    pub events_dropped: usize,
    /// Window events captured by the latest poll.
    pub last_frame_events: usize,
}

#[inline]
fn window_key(window: WindowId) -> u64 {
    u64::from(window)
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(64),
            global_events: Vec::new(),
            connected: HashSet::new(),
            initialized: false,
            stats: EventStats::default(),
        }
    }

    /// Starts capturing global (monitor and gamepad) events.
    ///
    /// Calling it twice is reported and ignored; returns whether this call
    /// did the initialization.
    pub fn initialize(&mut self) -> bool {
        if !kestrel_core::soft_validate!(!self.initialized, "event queue is already initialized") {
            return false;
        }
        self.initialized = true;
        tracing::debug!("Event queue initialized");
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Starts capturing events for `window`.
    pub fn connect_window(&mut self, window: WindowId) {
        if !self.connected.insert(window) {
            tracing::trace!("Window {:?} already connected to the event queue", window);
        }
    }

    /// Stops capturing events for `window`. Events already captured this
    /// frame stay readable until the next poll.
    pub fn disconnect_window(&mut self, window: WindowId) {
        self.connected.remove(&window);
    }

    pub fn is_connected(&self, window: WindowId) -> bool {
        self.connected.contains(&window)
    }

    /// Replaces the buffered events with everything the platform has pending.
    ///
    /// Slices handed out by [`grab_events`](Self::grab_events) borrow the
    /// queue, so none can survive this call:
    ///
    /// ```compile_fail
    /// use kestrel_winit::platform::{EventPump, EventSink};
    /// use kestrel_winit::{EventQueue, WindowId};
    ///
    /// struct Idle;
    /// impl EventPump for Idle {
    ///     fn pump_events(&mut self, _sink: &mut dyn EventSink) {}
    /// }
    ///
    /// let mut queue = EventQueue::new();
    /// let events = queue.grab_events(WindowId::from(1));
    /// queue.poll_events(&mut Idle);
    /// println!("{}", events.len());
    /// ```
    pub fn poll_events(&mut self, pump: &mut dyn EventPump) {
        profile_function!();
        self.events.clear();
        self.global_events.clear();

        pump.pump_events(self);

        {
            profile_scope!("sort_events");
            // Stable: per-window order is the capture order.
            self.events.sort_by_key(|event| window_key(event.window));
        }

        self.stats.frames_polled += 1;
        self.stats.last_frame_events = self.events.len();
    }

    /// The contiguous run of this frame's events for `window`, in capture order.
    ///
    /// Empty when the window produced nothing this frame or is not connected.
    pub fn grab_events(&self, window: WindowId) -> &[WindowEvent] {
        let key = window_key(window);
        let start = self
            .events
            .partition_point(|event| window_key(event.window) < key);
        let len = self.events[start..].partition_point(|event| window_key(event.window) == key);
        &self.events[start..start + len]
    }

    pub fn grab_global_events(&self) -> &[GlobalEvent] {
        &self.global_events
    }

    /// All window events of this frame, grouped by window.
    pub fn events(&self) -> &[WindowEvent] {
        &self.events
    }

    pub fn has_event(&self, window: WindowId, predicate: impl Fn(&WindowEventKind) -> bool) -> bool {
        self.grab_events(window)
            .iter()
            .any(|event| predicate(&event.kind))
    }

    /// Size carried by the last framebuffer resize of `window` this frame.
    pub fn last_framebuffer_size(&self, window: WindowId) -> Option<Size<u32>> {
        self.grab_events(window)
            .iter()
            .rev()
            .find_map(|event| match event.kind {
                WindowEventKind::FramebufferResized { size } => Some(size),
                _ => None,
            })
    }

    /// Scale carried by the last content-scale change of `window` this frame.
    pub fn last_content_scale(&self, window: WindowId) -> Option<Vec2> {
        self.grab_events(window)
            .iter()
            .rev()
            .find_map(|event| match event.kind {
                WindowEventKind::ContentScaleChanged { scale } => Some(scale),
                _ => None,
            })
    }

    /// Forwards this frame's GUI-relevant events for `window` to `gui`.
    pub fn update_gui_events(&self, window: WindowId, gui: &mut dyn GuiInput) -> usize {
        forward_gui_events(self.grab_events(window), gui)
    }

    pub fn stats(&self) -> &EventStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = EventStats::default();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventQueue {
    fn push_window_event(&mut self, window: WindowId, kind: WindowEventKind) {
        self.stats.events_received += 1;
        if !self.connected.contains(&window) {
            self.stats.events_dropped += 1;
            tracing::trace!("Dropping {:?} for unconnected window {:?}", kind, window);
            return;
        }

        if let WindowEventKind::FileDrop { paths } = &kind {
            kestrel_core::validate!(
                paths.iter().all(|path| !path.as_os_str().is_empty()),
                "file drop on {:?} carried an empty path",
                window
            );
        }

        self.events.push(WindowEvent { window, kind });
    }

    fn push_global_event(&mut self, event: GlobalEvent) {
        self.stats.events_received += 1;
        if !self.initialized {
            self.stats.events_dropped += 1;
            return;
        }
        self.global_events.push(event);
    }
}
