//! Test utilities for Kestrel.
//!
//! Scripted stand-ins for the windowing and GPU backends, so hosts and
//! windows can be driven without a display or a GPU:
//!
//! - [`MockPlatform`]: a [`Platform`](kestrel_winit::Platform) whose events
//!   are injected through a [`MockPlatformHandle`]
//! - [`MockGpuBackend`]: a [`GpuBackend`](kestrel_render::GpuBackend) that
//!   tracks framebuffers and views, inspected through a [`MockGpuHandle`]
//! - [`Journal`]: a shared, ordered record of every call both mocks receive,
//!   to which tests can append their own notes
//!
//! # Example
//!
//! ```rust
//! use kestrel_core::geometry::Size;
//! use kestrel_render::{GraphicsContext, Window};
//! use kestrel_test_utils::{GpuCall, MockRig};
//! use kestrel_winit::WindowDescriptor;
//!
//! let (mut platform, backend, rig) = MockRig::multi_surface();
//! let mut graphics = GraphicsContext::new(backend);
//!
//! let window = Window::new(platform.as_mut(), &mut graphics, &WindowDescriptor::default()).unwrap();
//! assert_eq!(rig.gpu.live_framebuffers().len(), 1);
//!
//! window.dispose(platform.as_mut(), &mut graphics);
//! assert!(rig.gpu.live_framebuffers().is_empty());
//! assert!(rig.journal.gpu_calls().iter().any(|c| matches!(c, GpuCall::DestroyFramebuffer(_))));
//! ```
//!
//! # Interior Mutability
//!
//! The mocks are moved into the code under test as boxed trait objects. Their
//! state lives behind `Arc<parking_lot::Mutex<..>>` so the handles kept by the
//! test can still inject events and inspect results.

pub mod journal;
pub mod mock_gpu;
pub mod mock_platform;

pub use journal::{GpuCall, Journal, JournalEntry, PlatformCall};
pub use mock_gpu::{MockGpuBackend, MockGpuConfig, MockGpuHandle};
pub use mock_platform::{MockPlatform, MockPlatformHandle};

use kestrel_render::GpuBackend;
use kestrel_winit::Platform;

/// Handles to a mock platform and GPU backend sharing one journal.
#[derive(Clone)]
pub struct MockRig {
    pub journal: Journal,
    pub platform: MockPlatformHandle,
    pub gpu: MockGpuHandle,
}

impl MockRig {
    /// Mocks with independent per-window surfaces.
    pub fn multi_surface() -> (Box<dyn Platform>, Box<dyn GpuBackend>, MockRig) {
        Self::with_gpu_config(MockGpuConfig::default())
    }

    /// Mocks with one shared backbuffer.
    pub fn single_surface() -> (Box<dyn Platform>, Box<dyn GpuBackend>, MockRig) {
        Self::with_gpu_config(MockGpuConfig {
            multiple_surfaces: false,
            ..MockGpuConfig::default()
        })
    }

    pub fn with_gpu_config(config: MockGpuConfig) -> (Box<dyn Platform>, Box<dyn GpuBackend>, MockRig) {
        let journal = Journal::new();
        let platform = MockPlatform::new(&journal);
        let gpu = MockGpuBackend::with_config(config, &journal);
        let rig = MockRig {
            journal,
            platform: platform.handle(),
            gpu: gpu.handle(),
        };
        (Box::new(platform), Box::new(gpu), rig)
    }
}
