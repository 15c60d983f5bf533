use std::collections::BTreeSet;
use std::fmt::Debug;
use std::hash::Hash;

use crate::profiling::profile_function;

/// Unsigned integer types usable as ids in an [`IdAllocator`].
pub trait IdType: Copy + Ord + Hash + Debug {
    /// Largest representable value, used as the default namespace bound.
    const MAX: Self;

    fn from_index(index: usize) -> Self;

    fn index(self) -> usize;
}

macro_rules! impl_id_type {
    ($($ty:ty),*) => {
        $(
            impl IdType for $ty {
                const MAX: Self = <$ty>::MAX;

                #[inline]
                fn from_index(index: usize) -> Self {
                    index as $ty
                }

                #[inline]
                fn index(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_id_type!(u8, u16, u32);

/// Reserves and frees small integer ids from the bounded namespace `[0, max)`.
///
/// An id is either free or reserved. [`reserve`](Self::reserve) always hands
/// out the smallest free id, so freed ids are reused before the namespace grows.
///
/// Not thread-safe; each allocator is owned by a single host.
///
/// # Example
///
/// ```
/// use kestrel_core::alloc::IdAllocator;
///
/// let mut views = IdAllocator::<u16>::with_max(4);
/// let a = views.reserve();
/// let b = views.reserve();
/// assert_eq!((a, b), (0, 1));
///
/// views.free(a);
/// assert_eq!(views.reserve(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct IdAllocator<T: IdType> {
    reserved: BTreeSet<T>,
    max: T,
}

impl<T: IdType> IdAllocator<T> {
    /// Creates an allocator spanning the whole range of `T` (excluding `T::MAX`).
    pub fn new() -> Self {
        Self::with_max(T::MAX)
    }

    /// Creates an allocator for ids in `[0, max)`.
    pub fn with_max(max: T) -> Self {
        Self {
            reserved: BTreeSet::new(),
            max,
        }
    }

    /// Reserves the smallest free id.
    ///
    /// # Panics
    ///
    /// Panics when every id in `[0, max)` is reserved.
    pub fn reserve(&mut self) -> T {
        let Some(id) = self.try_reserve() else {
            crate::fatal!(
                "cannot reserve a new id, all {} ids are reserved",
                self.max.index()
            );
        };
        id
    }

    /// Reserves the smallest free id, or returns `None` when the namespace is exhausted.
    pub fn try_reserve(&mut self) -> Option<T> {
        profile_function!();
        let mut candidate = 0usize;
        // The set is ordered, so the first gap is the smallest free id.
        for id in &self.reserved {
            if id.index() != candidate {
                break;
            }
            candidate += 1;
        }

        if candidate >= self.max.index() {
            return None;
        }

        let id = T::from_index(candidate);
        self.reserved.insert(id);
        Some(id)
    }

    /// Marks a specific id as reserved.
    ///
    /// Reserving an id that is already reserved is reported and tolerated; the
    /// return value tells whether the id was free beforehand. Ids outside the
    /// namespace are rejected.
    pub fn reserve_id(&mut self, id: T) -> bool {
        if !crate::soft_validate!(
            id.index() < self.max.index(),
            "id {:?} is outside of the namespace [0, {})",
            id,
            self.max.index()
        ) {
            return false;
        }

        let was_free = crate::soft_validate!(self.is_free(id), "id {:?} is already reserved", id);
        self.reserved.insert(id);
        was_free
    }

    /// Frees an id. Freeing a free id does nothing.
    pub fn free(&mut self, id: T) {
        self.reserved.remove(&id);
    }

    pub fn is_free(&self, id: T) -> bool {
        !self.reserved.contains(&id)
    }

    pub fn is_reserved(&self, id: T) -> bool {
        self.reserved.contains(&id)
    }

    /// Snapshot of all reserved ids in ascending order.
    pub fn reserved_ids(&self) -> Vec<T> {
        self.reserved.iter().copied().collect()
    }

    /// Number of reserved ids.
    pub fn len(&self) -> usize {
        self.reserved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserved.is_empty()
    }

    /// Size of the namespace.
    pub fn capacity(&self) -> usize {
        self.max.index()
    }
}

impl<T: IdType> Default for IdAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_is_sequential() {
        let mut ids = IdAllocator::<u8>::with_max(8);
        assert_eq!(ids.reserve(), 0);
        assert_eq!(ids.reserve(), 1);
        assert_eq!(ids.reserve(), 2);
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_reserve_fills_lowest_gap() {
        let mut ids = IdAllocator::<u16>::with_max(8);
        for _ in 0..5 {
            ids.reserve();
        }
        ids.free(3);
        ids.free(1);

        assert_eq!(ids.reserve(), 1);
        assert_eq!(ids.reserve(), 3);
        assert_eq!(ids.reserve(), 5);
    }

    #[test]
    fn test_reserve_skips_explicitly_reserved() {
        let mut ids = IdAllocator::<u16>::with_max(8);
        assert!(ids.reserve_id(0));
        assert!(ids.reserve_id(2));

        assert_eq!(ids.reserve(), 1);
        assert_eq!(ids.reserve(), 3);
    }

    #[test]
    fn test_reserve_id_twice_reports_but_keeps_reservation() {
        let mut ids = IdAllocator::<u32>::with_max(4);
        assert!(ids.reserve_id(2));
        assert!(!ids.reserve_id(2));
        assert!(ids.is_reserved(2));
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_reserve_id_out_of_range_is_rejected() {
        let mut ids = IdAllocator::<u16>::with_max(4);
        assert!(!ids.reserve_id(4));
        assert!(ids.is_free(4));
        assert!(ids.is_empty());
    }

    #[test]
    fn test_free_is_idempotent() {
        let mut ids = IdAllocator::<u8>::with_max(4);
        let id = ids.reserve();
        ids.free(id);
        ids.free(id);
        assert!(ids.is_free(id));
        assert!(ids.is_empty());
    }

    #[test]
    fn test_try_reserve_exhausted() {
        let mut ids = IdAllocator::<u8>::with_max(2);
        assert_eq!(ids.try_reserve(), Some(0));
        assert_eq!(ids.try_reserve(), Some(1));
        assert_eq!(ids.try_reserve(), None);
    }

    #[test]
    #[should_panic(expected = "all 2 ids are reserved")]
    fn test_reserve_exhausted_panics() {
        let mut ids = IdAllocator::<u8>::with_max(2);
        ids.reserve();
        ids.reserve();
        ids.reserve();
    }

    #[test]
    fn test_default_spans_type_range() {
        let ids = IdAllocator::<u8>::new();
        assert_eq!(ids.capacity(), 255);
    }
}
