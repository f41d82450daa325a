use core::{alloc::Layout, ptr::NonNull};

use crate::error::AllocError;

/// A source of memory for containers.
///
/// Only [`allocate`](Allocator::allocate) is mandatory. Reallocation and deallocation are
/// capabilities a provider may or may not have, queried through
/// [`can_reallocate`](Allocator::can_reallocate) and [`can_deallocate`](Allocator::can_deallocate).
/// Containers must behave correctly with either or both absent: an arena, for example, never
/// returns individual blocks.
///
/// # Safety
///
/// Implementors must return blocks that are valid for reads and writes of `layout.size()`
/// bytes, aligned to `layout.align()`, and not aliased by any other live block. A block stays
/// valid until it is passed to [`deallocate`](Allocator::deallocate), moved by a successful
/// [`reallocate`](Allocator::reallocate), or the provider itself goes away.
pub unsafe trait Allocator {
    /// Allocates an uninitialized block that fits `layout`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the provider cannot satisfy the request.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Returns `true` if [`reallocate`](Allocator::reallocate) is supported.
    fn can_reallocate(&self) -> bool {
        false
    }

    /// Resizes a block to `new_size` bytes, keeping its alignment, in place or by moving it.
    ///
    /// The first `min(old_layout.size(), new_size)` bytes are preserved. On failure the
    /// original block is untouched and still owned by the caller.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with `old_layout` and still be live.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        let _ = (ptr, old_layout, new_size);
        Err(AllocError::Unsupported)
    }

    /// Returns `true` if [`deallocate`](Allocator::deallocate) actually returns memory.
    fn can_deallocate(&self) -> bool {
        false
    }

    /// Releases a block.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this allocator with `layout` and still be live.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        let _ = (ptr, layout);
    }
}

// Lets one provider back many containers at once.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        (**self).allocate(layout)
    }

    #[inline]
    fn can_reallocate(&self) -> bool {
        (**self).can_reallocate()
    }

    #[inline]
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        (**self).reallocate(ptr, old_layout, new_size)
    }

    #[inline]
    fn can_deallocate(&self) -> bool {
        (**self).can_deallocate()
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).deallocate(ptr, layout)
    }
}
