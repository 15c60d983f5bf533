//! Allocation and collection types for Kestrel.
//!
//! This module provides:
//! - Re-exports of hash collections using AHash
//! - [`IdAllocator`] for small bounded integer namespaces (GPU view slots)

pub mod id_allocator;

pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
pub use id_allocator::{IdAllocator, IdType};
