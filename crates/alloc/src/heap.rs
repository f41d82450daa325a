use core::{alloc::Layout, ptr::NonNull};
use std::alloc;

use bytesize::ByteSize;
use log::error;

use crate::{error::AllocError, traits::Allocator};

/// The host's general-purpose heap. Supports every capability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Heap;

unsafe impl Allocator for Heap {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Err(AllocError::InvalidLayout);
        }
        // SAFETY: non-zero size
        let ptr = unsafe { alloc::alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| {
            error!(
                "heap could not allocate {}",
                ByteSize::b(layout.size() as u64).to_string_as(true)
            );
            AllocError::OutOfMemory
        })
    }

    fn can_reallocate(&self) -> bool {
        true
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        if new_size == 0 {
            return Err(AllocError::InvalidLayout);
        }
        // `realloc` requires the rounded size to stay within `isize::MAX`
        Layout::from_size_align(new_size, old_layout.align())
            .map_err(|_| AllocError::InvalidLayout)?;

        let new = alloc::realloc(ptr.as_ptr(), old_layout, new_size);
        NonNull::new(new).ok_or_else(|| {
            error!(
                "heap could not resize block from {} to {}",
                ByteSize::b(old_layout.size() as u64).to_string_as(true),
                ByteSize::b(new_size as u64).to_string_as(true)
            );
            AllocError::OutOfMemory
        })
    }

    fn can_deallocate(&self) -> bool {
        true
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        alloc::dealloc(ptr.as_ptr(), layout)
    }
}
