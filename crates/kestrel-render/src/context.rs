use kestrel_core::alloc::IdAllocator;
use kestrel_core::geometry::Size;
use kestrel_core::profiling::profile_function;
use kestrel_winit::NativeWindow;

use crate::backend::{GpuBackend, GpuError, ViewId};

/// The GPU context of one host.
///
/// Owns the backend and the pool of view ids. A host owns exactly one;
/// windows borrow it for creation, resizing and disposal.
pub struct GraphicsContext {
    backend: Box<dyn GpuBackend>,
    views: IdAllocator<ViewId>,
    frame_count: u64,
}

impl GraphicsContext {
    pub fn new(backend: Box<dyn GpuBackend>) -> Self {
        let max_views = backend.max_views();
        tracing::info!(
            "Graphics context on '{}' ({} views, multiple surfaces: {})",
            backend.name(),
            max_views,
            backend.supports_multiple_surfaces()
        );
        Self {
            backend,
            views: IdAllocator::with_max(max_views),
            frame_count: 0,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn supports_multiple_surfaces(&self) -> bool {
        self.backend.supports_multiple_surfaces()
    }

    /// Points the backbuffer at the first window of a backend that started
    /// without one.
    pub fn reinitialize_for_window(
        &mut self,
        window: &NativeWindow,
        size: Size<u32>,
    ) -> Result<(), GpuError> {
        tracing::debug!("Reinitializing backbuffer for window {:?}", window.id());
        self.backend.reinitialize(window, size)
    }

    /// Reserves the smallest free view id. Exhaustion is fatal.
    pub fn reserve_view(&mut self) -> ViewId {
        self.views.reserve()
    }

    pub fn free_view(&mut self, view: ViewId) {
        self.views.free(view);
    }

    pub fn is_view_reserved(&self, view: ViewId) -> bool {
        self.views.is_reserved(view)
    }

    pub fn reserved_views(&self) -> Vec<ViewId> {
        self.views.reserved_ids()
    }

    pub fn touch(&mut self, view: ViewId) {
        kestrel_core::validate!(
            self.views.is_reserved(view),
            "touching view {} which is not reserved",
            view
        );
        self.backend.touch(view);
    }

    /// Submits the current frame and returns its number.
    pub fn submit_frame(&mut self) -> u64 {
        profile_function!();
        self.frame_count = self.backend.submit_frame();
        self.frame_count
    }

    /// Number of the last submitted frame.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn backend(&self) -> &dyn GpuBackend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn GpuBackend {
        self.backend.as_mut()
    }
}
