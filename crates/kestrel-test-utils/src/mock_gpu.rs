//! Mock GPU backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use kestrel_core::geometry::{Rect, Size};
use kestrel_render::{ClearPolicy, FramebufferHandle, GpuBackend, GpuError, ViewId};
use kestrel_winit::{NativeWindow, WindowId};
use parking_lot::Mutex;

use crate::journal::{GpuCall, Journal, JournalEntry};

/// Capabilities reported by a [`MockGpuBackend`].
#[derive(Debug, Clone, Copy)]
pub struct MockGpuConfig {
    pub multiple_surfaces: bool,
    pub max_views: u16,
}

impl Default for MockGpuConfig {
    fn default() -> Self {
        Self {
            multiple_surfaces: true,
            max_views: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MockView {
    framebuffer: Option<FramebufferHandle>,
    rect: Rect<u32>,
    clear: ClearPolicy,
}

#[derive(Debug, Default)]
struct MockGpuState {
    framebuffers: BTreeMap<FramebufferHandle, (WindowId, Size<u32>)>,
    next_framebuffer: u32,
    views: BTreeMap<ViewId, MockView>,
    touched: Vec<ViewId>,
    last_frame_touched: Vec<ViewId>,
    backbuffer: Option<(WindowId, Size<u32>)>,
    frame: u64,
    fail_next_framebuffer: bool,
}

/// [`GpuBackend`] that keeps framebuffers and views as plain records.
///
/// Every call is appended to the shared [`Journal`]. Destroying or binding
/// an unknown framebuffer is a hard validation failure, as on a real backend.
pub struct MockGpuBackend {
    config: MockGpuConfig,
    state: Arc<Mutex<MockGpuState>>,
    journal: Journal,
}

impl MockGpuBackend {
    pub fn new(journal: &Journal) -> Self {
        Self::with_config(MockGpuConfig::default(), journal)
    }

    pub fn with_config(config: MockGpuConfig, journal: &Journal) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(MockGpuState::default())),
            journal: journal.clone(),
        }
    }

    pub fn handle(&self) -> MockGpuHandle {
        MockGpuHandle {
            state: self.state.clone(),
        }
    }

    fn record(&self, call: GpuCall) {
        self.journal.record(JournalEntry::Gpu(call));
    }
}

impl GpuBackend for MockGpuBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn supports_multiple_surfaces(&self) -> bool {
        self.config.multiple_surfaces
    }

    fn max_views(&self) -> u16 {
        self.config.max_views
    }

    fn create_framebuffer(
        &mut self,
        window: &NativeWindow,
        size: Size<u32>,
    ) -> Result<FramebufferHandle, GpuError> {
        let framebuffer = {
            let mut state = self.state.lock();
            if std::mem::take(&mut state.fail_next_framebuffer) {
                return Err(GpuError::SurfaceCreation("scripted failure".into()));
            }
            let framebuffer = FramebufferHandle(state.next_framebuffer);
            state.next_framebuffer += 1;
            state.framebuffers.insert(framebuffer, (window.id(), size));
            framebuffer
        };
        self.record(GpuCall::CreateFramebuffer {
            framebuffer,
            window: window.id(),
            size,
        });
        Ok(framebuffer)
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        let removed = self.state.lock().framebuffers.remove(&framebuffer).is_some();
        kestrel_core::validate!(removed, "destroying unknown framebuffer {:?}", framebuffer);
        self.record(GpuCall::DestroyFramebuffer(framebuffer));
    }

    fn set_view_framebuffer(&mut self, view: ViewId, framebuffer: Option<FramebufferHandle>) {
        {
            let mut state = self.state.lock();
            if let Some(handle) = framebuffer {
                kestrel_core::validate!(
                    state.framebuffers.contains_key(&handle),
                    "binding unknown framebuffer {:?} to view {}",
                    handle,
                    view
                );
            }
            state.views.entry(view).or_default().framebuffer = framebuffer;
        }
        self.record(GpuCall::SetViewFramebuffer { view, framebuffer });
    }

    fn set_view_rect(&mut self, view: ViewId, rect: Rect<u32>) {
        self.state.lock().views.entry(view).or_default().rect = rect;
        self.record(GpuCall::SetViewRect { view, rect });
    }

    fn set_view_clear(&mut self, view: ViewId, clear: ClearPolicy) {
        self.state.lock().views.entry(view).or_default().clear = clear;
        self.record(GpuCall::SetViewClear { view, clear });
    }

    fn reset_view(&mut self, view: ViewId) {
        self.state.lock().views.remove(&view);
        self.record(GpuCall::ResetView(view));
    }

    fn touch(&mut self, view: ViewId) {
        self.state.lock().touched.push(view);
        self.record(GpuCall::Touch(view));
    }

    fn submit_frame(&mut self) -> u64 {
        let frame = {
            let mut state = self.state.lock();
            state.frame += 1;
            state.last_frame_touched = std::mem::take(&mut state.touched);
            state.frame
        };
        self.record(GpuCall::SubmitFrame(frame));
        frame
    }

    fn reset_backbuffer(&mut self, size: Size<u32>) {
        if let Some((_, backbuffer)) = self.state.lock().backbuffer.as_mut() {
            *backbuffer = size;
        }
        self.record(GpuCall::ResetBackbuffer(size));
    }

    fn reinitialize(&mut self, window: &NativeWindow, size: Size<u32>) -> Result<(), GpuError> {
        self.state.lock().backbuffer = Some((window.id(), size));
        self.record(GpuCall::Reinitialize {
            window: window.id(),
            size,
        });
        Ok(())
    }

    fn release_backbuffer(&mut self) {
        self.state.lock().backbuffer = None;
        self.record(GpuCall::ReleaseBackbuffer);
    }
}

/// Test-side view of a [`MockGpuBackend`].
#[derive(Clone)]
pub struct MockGpuHandle {
    state: Arc<Mutex<MockGpuState>>,
}

impl MockGpuHandle {
    /// Live framebuffers with their window and size, in creation order.
    pub fn live_framebuffers(&self) -> Vec<(FramebufferHandle, WindowId, Size<u32>)> {
        self.state
            .lock()
            .framebuffers
            .iter()
            .map(|(handle, (window, size))| (*handle, *window, *size))
            .collect()
    }

    pub fn framebuffer_size(&self, framebuffer: FramebufferHandle) -> Option<Size<u32>> {
        self.state
            .lock()
            .framebuffers
            .get(&framebuffer)
            .map(|(_, size)| *size)
    }

    /// The live framebuffer created for `window`, if any.
    pub fn framebuffer_of_window(&self, window: WindowId) -> Option<(FramebufferHandle, Size<u32>)> {
        self.state
            .lock()
            .framebuffers
            .iter()
            .find(|(_, (owner, _))| *owner == window)
            .map(|(handle, (_, size))| (*handle, *size))
    }

    pub fn view_framebuffer(&self, view: ViewId) -> Option<FramebufferHandle> {
        self.state
            .lock()
            .views
            .get(&view)
            .and_then(|v| v.framebuffer)
    }

    pub fn view_rect(&self, view: ViewId) -> Option<Rect<u32>> {
        self.state.lock().views.get(&view).map(|v| v.rect)
    }

    pub fn view_clear(&self, view: ViewId) -> Option<ClearPolicy> {
        self.state.lock().views.get(&view).map(|v| v.clear)
    }

    /// Whether the view has any state bound.
    pub fn is_view_bound(&self, view: ViewId) -> bool {
        self.state.lock().views.contains_key(&view)
    }

    /// Views touched during the last submitted frame, in touch order.
    pub fn last_frame_touched(&self) -> Vec<ViewId> {
        self.state.lock().last_frame_touched.clone()
    }

    pub fn frame_count(&self) -> u64 {
        self.state.lock().frame
    }

    pub fn backbuffer(&self) -> Option<(WindowId, Size<u32>)> {
        self.state.lock().backbuffer
    }

    /// Makes the next `create_framebuffer` call fail.
    pub fn fail_next_framebuffer(&self) {
        self.state.lock().fail_next_framebuffer = true;
    }
}
