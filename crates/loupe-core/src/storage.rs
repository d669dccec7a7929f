use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{TensorDType, TensorError};

/// Shared physical buffer backing one or more views.
///
/// A `Storage` never changes capacity after construction; only its elements
/// are written. Sharing is expressed as `Arc<Storage<T>>`: every view that
/// begins sharing clones the handle, and the buffer is freed exactly once,
/// when the last handle drops.
#[derive(Debug)]
pub struct Storage<T> {
    data: RwLock<Box<[T]>>,
    capacity: usize,
}

impl<T: TensorDType> Storage<T> {
    /// Allocates a zero-filled buffer of `capacity` elements.
    ///
    /// Allocation is fallible; the caller decides whether to propagate or
    /// abort.
    pub fn try_new(capacity: usize) -> Result<Self, TensorError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(capacity)?;
        buf.resize(capacity, T::zero());
        log::trace!("allocated storage of {} elements", capacity);
        Ok(Self {
            data: RwLock::new(buf.into_boxed_slice()),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reads the element at a physical index.
    ///
    /// The view layer validates logical indices before translating them; a
    /// physical index at or past `capacity` here is a caller bug.
    pub fn get(&self, index: usize) -> T {
        debug_assert!(index < self.capacity);
        self.data.read()[index]
    }

    /// Writes the element at a physical index. Same precondition as `get`.
    pub fn set(&self, index: usize, value: T) {
        debug_assert!(index < self.capacity);
        self.data.write()[index] = value;
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Box<[T]>> {
        self.data.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Box<[T]>> {
        self.data.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_storage_is_zeroed() {
        let s = Storage::<f32>::try_new(4).unwrap();
        assert_eq!(s.capacity(), 4);
        for i in 0..4 {
            assert_eq!(s.get(i), 0.0);
        }
    }

    #[test]
    fn set_then_get_roundtrips() {
        let s = Storage::<f64>::try_new(3).unwrap();
        s.set(1, 7.5);
        assert_eq!(s.get(1), 7.5);
        assert_eq!(s.get(0), 0.0);
    }

    #[test]
    fn zero_capacity_is_valid() {
        let s = Storage::<f32>::try_new(0).unwrap();
        assert_eq!(s.capacity(), 0);
    }
}
