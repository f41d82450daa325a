use core::{
    alloc::Layout,
    fmt,
    ptr::{self, NonNull},
    slice,
};

use bytesize::ByteSize;
use log::{debug, trace};

use crate::{
    config::VectorConfig, constants::DEFAULT_ALIGN, error::VectorError, traits::Allocator,
};

/// A contiguous growable array of fixed-size byte records, short for 'vector'.
///
/// The vector has no element type. Every element is `elem_size` bytes, placed at byte offset
/// `index * elem_size` in a buffer obtained from the allocator `A`. Elements are copied in
/// and out as raw bytes and are never constructed or dropped.
///
/// No memory is allocated until the first operation that needs capacity. Dropping the vector,
/// or calling [`destroy`](RawVector::destroy), returns the buffer if the allocator can free it;
/// otherwise the buffer is left to the allocator.
pub struct RawVector<A: Allocator> {
    ptr: Option<NonNull<u8>>,
    len: usize,
    cap: usize,
    elem_size: usize,
    align: usize,
    config: VectorConfig,
    // `None` once destroyed
    alloc: Option<A>,
}

// SAFETY: the buffer is owned exclusively by the vector
unsafe impl<A: Allocator + Send> Send for RawVector<A> {}
unsafe impl<A: Allocator + Sync> Sync for RawVector<A> {}

/// Iterator over the elements of a [`RawVector`], one byte slice per element.
pub type Iter<'a> = slice::ChunksExact<'a, u8>;

/// Mutable iterator over the elements of a [`RawVector`].
pub type IterMut<'a> = slice::ChunksExactMut<'a, u8>;

impl<A: Allocator> RawVector<A> {
    /// Constructs a new, empty vector of `elem_size`-byte elements using the default growth
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `elem_size` is zero.
    pub fn new_in(alloc: A, elem_size: usize) -> Result<Self, VectorError> {
        Self::with_align_in(alloc, elem_size, DEFAULT_ALIGN, VectorConfig::default())
    }

    /// Constructs a new, empty vector that grows according to `config`.
    pub fn with_config_in(
        alloc: A,
        elem_size: usize,
        config: VectorConfig,
    ) -> Result<Self, VectorError> {
        Self::with_align_in(alloc, elem_size, DEFAULT_ALIGN, config)
    }

    /// Constructs a new, empty vector whose buffer will be aligned to `align`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `elem_size` is zero, `align` is not a power of two, or `config` cannot
    /// grow the vector.
    pub fn with_align_in(
        alloc: A,
        elem_size: usize,
        align: usize,
        config: VectorConfig,
    ) -> Result<Self, VectorError> {
        if elem_size == 0 {
            return Err(VectorError::ZeroElementSize);
        }
        if !align.is_power_of_two() {
            return Err(VectorError::InvalidAlignment { align });
        }
        if !config.is_valid() {
            return Err(VectorError::InvalidConfig);
        }

        Ok(Self {
            ptr: None,
            len: 0,
            cap: 0,
            elem_size,
            align,
            config,
            alloc: Some(alloc),
        })
    }

    /// Constructs a new vector with room for exactly `capacity` elements.
    pub fn with_capacity_in(
        alloc: A,
        elem_size: usize,
        capacity: usize,
    ) -> Result<Self, VectorError> {
        let mut vec = Self::new_in(alloc, elem_size)?;
        vec.reserve(capacity)?;
        Ok(vec)
    }

    /// Constructs a vector from a packed array of `elem_size`-byte elements.
    pub fn from_bytes_in(alloc: A, elem_size: usize, bytes: &[u8]) -> Result<Self, VectorError> {
        let mut vec = Self::new_in(alloc, elem_size)?;
        vec.extend_from_bytes(bytes)?;
        Ok(vec)
    }

    /// Tears down the current state, if any, and binds the vector to a new allocator and
    /// element size.
    pub fn reinit(&mut self, alloc: A, elem_size: usize) -> Result<(), VectorError> {
        self.destroy();
        *self = Self::new_in(alloc, elem_size)?;
        Ok(())
    }

    /// Ensures the vector can hold at least `capacity` elements.
    ///
    /// Grows to exactly `capacity` slots. Does nothing if there is already enough room; this
    /// never shrinks the buffer.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the byte size overflows or the allocator fails. The vector is left
    /// unchanged.
    pub fn reserve(&mut self, capacity: usize) -> Result<(), VectorError> {
        self.check_live()?;
        if capacity <= self.cap {
            return Ok(());
        }
        self.resize_buffer(capacity)
    }

    /// Appends an element to the back of the vector.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `elem` is not `elem_size` bytes long or the vector cannot grow.
    pub fn push(&mut self, elem: &[u8]) -> Result<(), VectorError> {
        self.check_live()?;
        self.check_elem(elem)?;
        self.grow_for_one()?;

        // SAFETY: len < cap after growing, elem is elem_size bytes and cannot alias the buffer
        unsafe {
            ptr::copy_nonoverlapping(elem.as_ptr(), self.slot(self.len), self.elem_size);
        }
        self.len += 1;
        Ok(())
    }

    /// Inserts an element at `index`, shifting everything after it one slot towards the back.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `index > len`, if `elem` is not `elem_size` bytes long, or if the
    /// vector cannot grow.
    pub fn insert(&mut self, index: usize, elem: &[u8]) -> Result<(), VectorError> {
        self.check_live()?;
        if index > self.len {
            return Err(VectorError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        self.check_elem(elem)?;
        self.grow_for_one()?;

        // SAFETY: len < cap after growing, so slots [index, len] are all in the buffer
        unsafe {
            let at = self.slot(index);
            ptr::copy(at, at.add(self.elem_size), (self.len - index) * self.elem_size);
            ptr::copy_nonoverlapping(elem.as_ptr(), at, self.elem_size);
        }
        self.len += 1;
        Ok(())
    }

    /// Removes the element at `index`, shifting everything after it one slot towards the front.
    ///
    /// Capacity is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `index >= len`.
    pub fn erase(&mut self, index: usize) -> Result<(), VectorError> {
        self.check_live()?;
        if index >= self.len {
            return Err(VectorError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }

        // SAFETY: index < len <= cap
        unsafe {
            let at = self.slot(index);
            ptr::copy(
                at.add(self.elem_size),
                at,
                (self.len - index - 1) * self.elem_size,
            );
        }
        self.len -= 1;
        Ok(())
    }

    /// Removes the last element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the vector is empty.
    pub fn pop(&mut self) -> Result<(), VectorError> {
        self.check_live()?;
        if self.len == 0 {
            return Err(VectorError::Empty);
        }
        self.erase(self.len - 1)
    }

    /// Forgets every element. The buffer is kept as is.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Shrinks the buffer to hold exactly `len` elements.
    ///
    /// An empty vector gives up its buffer entirely.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the allocator fails to provide the smaller buffer. The vector is left
    /// unchanged.
    pub fn shrink_to_fit(&mut self) -> Result<(), VectorError> {
        self.check_live()?;
        if self.len == self.cap {
            return Ok(());
        }

        if self.len == 0 {
            let layout = self.current_layout();
            if let (Some(ptr), Some(alloc)) = (self.ptr.take(), self.alloc.as_ref()) {
                release(alloc, ptr, layout);
            }
            debug!("vector released its buffer of {} slots", self.cap);
            self.cap = 0;
            return Ok(());
        }

        self.resize_buffer(self.len)
    }

    /// Releases the buffer (if the allocator can free it) and resets the vector to an empty,
    /// unbound state.
    ///
    /// Every fallible operation returns [`VectorError::Destroyed`] afterwards, until
    /// [`reinit`](RawVector::reinit).
    pub fn destroy(&mut self) {
        if self.cap != 0 {
            let layout = self.current_layout();
            if let (Some(ptr), Some(alloc)) = (self.ptr.take(), self.alloc.as_ref()) {
                release(alloc, ptr, layout);
            }
        }

        self.ptr = None;
        self.len = 0;
        self.cap = 0;
        self.elem_size = 0;
        self.align = DEFAULT_ALIGN;
        self.config = VectorConfig::default();
        self.alloc = None;
    }

    /// Appends a packed array of `elem_size`-byte elements.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `bytes.len()` is not a multiple of `elem_size` or the vector cannot
    /// grow.
    pub fn extend_from_bytes(&mut self, bytes: &[u8]) -> Result<(), VectorError> {
        self.check_live()?;
        if bytes.len() % self.elem_size != 0 {
            return Err(VectorError::ElementSizeMismatch {
                expected: self.elem_size,
                found: bytes.len(),
            });
        }

        let count = bytes.len() / self.elem_size;
        let new_len = self
            .len
            .checked_add(count)
            .ok_or(VectorError::CapacityOverflow)?;
        self.reserve(new_len)?;

        // SAFETY: reserved room for `count` more elements
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.slot(self.len), bytes.len());
        }
        self.len = new_len;
        Ok(())
    }
}

// capacity
impl<A: Allocator> RawVector<A> {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns the width of one element in bytes, or `0` once destroyed.
    #[inline]
    pub fn elem_size(&self) -> usize {
        self.elem_size
    }

    #[inline]
    pub fn align(&self) -> usize {
        self.align
    }

    #[inline]
    pub fn config(&self) -> &VectorConfig {
        &self.config
    }

    /// Returns `true` until the vector is destroyed.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.alloc.is_some()
    }

    #[inline]
    pub fn allocator(&self) -> Option<&A> {
        self.alloc.as_ref()
    }
}

// element access
impl<A: Allocator> RawVector<A> {
    /// Returns a pointer to the start of the buffer, dangling if there is none.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.base()
    }

    /// Returns the live elements as one packed byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the first len * elem_size bytes were written by push/insert/extend
        unsafe { slice::from_raw_parts(self.base(), self.len * self.elem_size) }
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: see `as_bytes`
        unsafe { slice::from_raw_parts_mut(self.base(), self.len * self.elem_size) }
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index < self.len {
            // SAFETY: bounds checked
            Some(unsafe { self.get_unchecked(index) })
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index < self.len {
            // SAFETY: bounds checked
            Some(unsafe { self.get_unchecked_mut(index) })
        } else {
            None
        }
    }

    /// Returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn at(&self, index: usize) -> &[u8] {
        let len = self.len;
        match self.get(index) {
            Some(elem) => elem,
            None => panic!("index {index} out of bounds for length {len}"),
        }
    }

    /// Returns the element at `index` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn at_mut(&mut self, index: usize) -> &mut [u8] {
        let len = self.len;
        match self.get_mut(index) {
            Some(elem) => elem,
            None => panic!("index {index} out of bounds for length {len}"),
        }
    }

    /// Returns the element at `index` without a bounds check in release builds.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &[u8] {
        debug_assert!(
            index < self.len,
            "index {index} out of bounds for length {}",
            self.len
        );
        slice::from_raw_parts(self.slot(index), self.elem_size)
    }

    /// Mutable version of [`get_unchecked`](RawVector::get_unchecked).
    ///
    /// # Safety
    ///
    /// `index` must be less than `len`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut [u8] {
        debug_assert!(
            index < self.len,
            "index {index} out of bounds for length {}",
            self.len
        );
        slice::from_raw_parts_mut(self.slot(index), self.elem_size)
    }

    pub fn front(&self) -> Option<&[u8]> {
        self.get(0)
    }

    pub fn back(&self) -> Option<&[u8]> {
        self.len.checked_sub(1).and_then(|last| self.get(last))
    }

    pub fn front_mut(&mut self) -> Option<&mut [u8]> {
        self.get_mut(0)
    }

    pub fn back_mut(&mut self) -> Option<&mut [u8]> {
        self.len.checked_sub(1).and_then(|last| self.get_mut(last))
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> Iter<'_> {
        let elem_size = self.elem_size.max(1);
        self.as_bytes().chunks_exact(elem_size)
    }

    pub fn iter_mut(&mut self) -> IterMut<'_> {
        let elem_size = self.elem_size.max(1);
        self.as_bytes_mut().chunks_exact_mut(elem_size)
    }
}

// internals
impl<A: Allocator> RawVector<A> {
    #[inline]
    fn check_live(&self) -> Result<(), VectorError> {
        if self.alloc.is_some() {
            Ok(())
        } else {
            Err(VectorError::Destroyed)
        }
    }

    #[inline]
    fn check_elem(&self, elem: &[u8]) -> Result<(), VectorError> {
        if elem.len() == self.elem_size {
            Ok(())
        } else {
            Err(VectorError::ElementSizeMismatch {
                expected: self.elem_size,
                found: elem.len(),
            })
        }
    }

    #[inline]
    fn base(&self) -> *mut u8 {
        self.ptr.unwrap_or(NonNull::dangling()).as_ptr()
    }

    /// Returns a pointer to the slot at `index`.
    ///
    /// # Safety
    ///
    /// `index` must be at most `cap`.
    #[inline]
    unsafe fn slot(&self, index: usize) -> *mut u8 {
        debug_assert!(index <= self.cap);
        self.base().add(index * self.elem_size)
    }

    /// Returns the layout of `capacity` elements.
    fn layout_for(&self, capacity: usize) -> Result<Layout, VectorError> {
        let size = capacity
            .checked_mul(self.elem_size)
            .ok_or(VectorError::CapacityOverflow)?;
        Layout::from_size_align(size, self.align).map_err(|_| VectorError::CapacityOverflow)
    }

    /// Returns the layout of the current buffer.
    fn current_layout(&self) -> Layout {
        // SAFETY: validated by `layout_for` when the buffer was allocated
        unsafe { Layout::from_size_align_unchecked(self.cap * self.elem_size, self.align) }
    }

    /// Makes room for one more element, following the growth policy.
    fn grow_for_one(&mut self) -> Result<(), VectorError> {
        if self.len < self.cap {
            return Ok(());
        }

        let new_cap = if self.cap == 0 {
            self.config.initial_capacity
        } else {
            self.cap
                .checked_mul(self.config.growth_factor)
                .ok_or(VectorError::CapacityOverflow)?
        };
        self.resize_buffer(new_cap)
    }

    /// Moves the elements into a buffer of exactly `new_cap` slots.
    ///
    /// Uses `reallocate` when the allocator has it. Otherwise allocates a new buffer, copies
    /// the live elements over, and frees the old buffer if the allocator can, abandoning it if
    /// not. Nothing changes on failure.
    fn resize_buffer(&mut self, new_cap: usize) -> Result<(), VectorError> {
        debug_assert!(new_cap >= self.len && new_cap != 0);
        let new_layout = self.layout_for(new_cap)?;
        let old_layout = self.current_layout();
        let alloc = self.alloc.as_ref().ok_or(VectorError::Destroyed)?;

        let new_ptr = match self.ptr {
            // SAFETY: `ptr` was allocated by `alloc` with `old_layout`
            Some(old) if alloc.can_reallocate() => unsafe {
                alloc.reallocate(old, old_layout, new_layout.size())?
            },
            old => {
                let new = alloc.allocate(new_layout)?;
                if let Some(old) = old {
                    // SAFETY: both blocks hold at least len elements and are distinct
                    unsafe {
                        ptr::copy_nonoverlapping(
                            old.as_ptr(),
                            new.as_ptr(),
                            self.len * self.elem_size,
                        );
                    }
                    release(alloc, old, old_layout);
                }
                new
            }
        };

        debug!(
            "vector resized from {} to {} slots ({})",
            self.cap,
            new_cap,
            ByteSize::b(new_layout.size() as u64).to_string_as(true)
        );
        self.ptr = Some(new_ptr);
        self.cap = new_cap;
        Ok(())
    }
}

/// Gives a block back to `alloc`, or abandons it if `alloc` never frees.
fn release<A: Allocator>(alloc: &A, ptr: NonNull<u8>, layout: Layout) {
    if alloc.can_deallocate() {
        // SAFETY: callers pass a block they own, allocated by `alloc` with `layout`
        unsafe { alloc.deallocate(ptr, layout) }
    } else {
        trace!(
            "abandoning {} block to an allocator that cannot free",
            ByteSize::b(layout.size() as u64).to_string_as(true)
        );
    }
}

impl<A: Allocator> Drop for RawVector<A> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<A: Allocator> fmt::Debug for RawVector<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawVector")
            .field("len", &self.len)
            .field("capacity", &self.cap)
            .field("elem_size", &self.elem_size)
            .field("align", &self.align)
            .field("live", &self.is_live())
            .finish()
    }
}
