//! Kestrel Core
//!
//! Shared building blocks for the Kestrel application framework: logging
//! bootstrap, profiling, configuration, geometry, validation macros and the
//! id allocator used for GPU view slots.

pub mod alloc;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
pub mod validate;

#[doc(hidden)]
pub use tracing as __tracing;
