use core::{fmt, marker::PhantomData, mem, slice};

use bytemuck::Pod;

use crate::{
    config::VectorConfig, containers::vec::RawVector, error::VectorError, traits::Allocator,
};

/// A [`RawVector`] that knows its element type.
///
/// Elements are plain-old-data, so moving them around as raw bytes is all it takes to keep
/// them intact. The buffer is aligned for `T`, which lets the elements be viewed as `&[T]`.
pub struct Vector<T: Pod, A: Allocator> {
    raw: RawVector<A>,
    _marker: PhantomData<T>,
}

impl<T: Pod, A: Allocator> Vector<T, A> {
    /// Constructs a new, empty vector. Zero-sized `T` is rejected.
    pub fn new_in(alloc: A) -> Result<Self, VectorError> {
        Self::with_config_in(alloc, VectorConfig::default())
    }

    pub fn with_config_in(alloc: A, config: VectorConfig) -> Result<Self, VectorError> {
        let raw = RawVector::with_align_in(alloc, mem::size_of::<T>(), mem::align_of::<T>(), config)?;
        Ok(Self {
            raw,
            _marker: PhantomData,
        })
    }

    pub fn from_slice_in(alloc: A, values: &[T]) -> Result<Self, VectorError> {
        let mut vec = Self::new_in(alloc)?;
        vec.extend_from_slice(values)?;
        Ok(vec)
    }

    pub fn push(&mut self, value: T) -> Result<(), VectorError> {
        self.raw.push(bytemuck::bytes_of(&value))
    }

    pub fn insert(&mut self, index: usize, value: T) -> Result<(), VectorError> {
        self.raw.insert(index, bytemuck::bytes_of(&value))
    }

    pub fn erase(&mut self, index: usize) -> Result<(), VectorError> {
        self.raw.erase(index)
    }

    /// Removes the last element and returns it.
    pub fn pop(&mut self) -> Result<T, VectorError> {
        let last = self.back();
        self.raw.pop()?;
        last.ok_or(VectorError::Empty)
    }

    pub fn clear(&mut self) {
        self.raw.clear()
    }

    pub fn reserve(&mut self, capacity: usize) -> Result<(), VectorError> {
        self.raw.reserve(capacity)
    }

    pub fn shrink_to_fit(&mut self) -> Result<(), VectorError> {
        self.raw.shrink_to_fit()
    }

    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<(), VectorError> {
        self.raw.extend_from_bytes(bytemuck::cast_slice(values))
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.raw.get(index).map(bytemuck::pod_read_unaligned)
    }

    pub fn front(&self) -> Option<T> {
        self.raw.front().map(bytemuck::pod_read_unaligned)
    }

    pub fn back(&self) -> Option<T> {
        self.raw.back().map(bytemuck::pod_read_unaligned)
    }

    pub fn as_slice(&self) -> &[T] {
        if self.raw.is_empty() {
            // the dangling base of an unallocated vector is not aligned for `T`
            return &[];
        }
        bytemuck::cast_slice(self.raw.as_bytes())
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.raw.is_empty() {
            return &mut [];
        }
        bytemuck::cast_slice_mut(self.raw.as_bytes_mut())
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    pub fn as_raw(&self) -> &RawVector<A> {
        &self.raw
    }

    pub fn into_raw(self) -> RawVector<A> {
        self.raw
    }
}

impl<T: Pod + fmt::Debug, A: Allocator> fmt::Debug for Vector<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
