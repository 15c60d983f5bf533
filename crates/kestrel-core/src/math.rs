//! Math types re-exported from [`glam`].
//!
//! Event payloads such as cursor positions, scroll deltas and content scales
//! use [`Vec2`].
//!
//! ```
//! use kestrel_core::math::Vec2;
//!
//! let scale = Vec2::splat(2.0);
//! assert_eq!(Vec2::new(10.0, 5.0) * scale, Vec2::new(20.0, 10.0));
//! ```
//!
//! [`glam`]: https://docs.rs/glam

pub use glam::{IVec2, UVec2, Vec2};
