use core::{alloc::Layout, cell::Cell, ptr::NonNull};

use bytesize::ByteSize;
use log::error;
use nonmax::NonMaxUsize;

use crate::{config::ArenaConfig, error::AllocError, traits::Allocator};

/// A non-global allocator that bump-allocates blocks from one contiguous memory region.
///
/// Blocks are never freed individually. The whole region is reclaimed at once by
/// [`reset`](Arena::reset) or when the arena is dropped, so memory handed to a container
/// stays readable for as long as the arena lives, even after the container moves elsewhere.
///
/// Allocation goes through `&self` so that many containers can share one arena. The arena is
/// not `Sync`.
pub struct Arena {
    base: NonNull<u8>,
    capacity: usize,
    // offset of the next free byte
    cursor: Cell<usize>,
    // offset of the most recent block, the only one that can grow in place
    last: Cell<Option<NonMaxUsize>>,
    allocations: Cell<usize>,
}

// SAFETY: the arena owns its region outright, moving it moves the region
unsafe impl Send for Arena {}

impl Arena {
    /// Constructs a new `Arena` reserving `capacity` bytes up front.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(ArenaConfig::new(capacity))
    }

    pub fn with_config(config: ArenaConfig) -> Self {
        let buf = vec![0u8; config.capacity].into_boxed_slice();
        let capacity = buf.len();
        // SAFETY: Box::into_raw never returns null
        let base = unsafe { NonNull::new_unchecked(Box::into_raw(buf).cast::<u8>()) };

        Self {
            base,
            capacity,
            cursor: Cell::new(0),
            last: Cell::new(None),
            allocations: Cell::new(0),
        }
    }

    /// Allocates memory.
    ///
    /// Returns a pointer to a block that meets the size and alignment required by `layout`.
    /// The block's contents are whatever the region held before.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the request is empty, larger than the whole region, or if the remaining
    /// space cannot hold it.
    pub fn alloc(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let size = layout.size();
        if size == 0 {
            return Err(AllocError::InvalidLayout);
        }

        if size > self.capacity {
            error!(
                "size requested is larger than the arena: {} > {}",
                ByteSize::b(size as u64).to_string_as(true),
                ByteSize::b(self.capacity as u64).to_string_as(true)
            );
            return Err(AllocError::RequestTooLarge);
        }

        let base = self.base.as_ptr() as usize;
        let start = (base + self.cursor.get())
            .checked_next_multiple_of(layout.align())
            .map(|addr| addr - base);
        let Some((start, end)) = start
            .and_then(|start| Some((start, start.checked_add(size)?)))
            .filter(|&(_, end)| end <= self.capacity)
        else {
            error!(
                "arena exhausted: {} requested, {} of {} remaining",
                ByteSize::b(size as u64).to_string_as(true),
                ByteSize::b(self.remaining() as u64).to_string_as(true),
                ByteSize::b(self.capacity as u64).to_string_as(true)
            );
            return Err(AllocError::OutOfMemory);
        };

        self.cursor.set(end);
        self.last.set(NonMaxUsize::new(start));
        self.allocations.set(self.allocations.get() + 1);

        // SAFETY: start + size <= capacity
        Ok(unsafe { NonNull::new_unchecked(self.base.as_ptr().add(start)) })
    }

    /// Grows or shrinks a block.
    ///
    /// Shrinking always returns the same pointer. Growing the most recent block extends it in
    /// place when the region has room. Otherwise this allocates a new block and copies
    /// `old_layout.size()` bytes into it; the old block is abandoned, not reclaimed.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a new block is needed and cannot be allocated. The old block is left
    /// unaltered.
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by this arena with `old_layout`, since the last reset.
    pub unsafe fn grow_last(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        debug_assert!(self.contains(ptr.as_ptr()));
        if new_size <= old_layout.size() {
            return Ok(ptr);
        }

        let offset = ptr.as_ptr() as usize - self.base.as_ptr() as usize;
        if self.last.get().map(|last| last.get()) == Some(offset) {
            if let Some(end) = offset.checked_add(new_size).filter(|&end| end <= self.capacity) {
                // a block shrunk earlier may already end short of the cursor
                self.cursor.set(end.max(self.cursor.get()));
                return Ok(ptr);
            }
        }

        let new_layout = Layout::from_size_align(new_size, old_layout.align())
            .map_err(|_| AllocError::InvalidLayout)?;
        let new = self.alloc(new_layout)?;
        new.as_ptr()
            .copy_from_nonoverlapping(ptr.as_ptr(), old_layout.size());
        Ok(new)
    }

    /// Reclaims every block at once.
    ///
    /// Taking `&mut self` guarantees no container still borrows the arena.
    pub fn reset(&mut self) {
        self.cursor.set(0);
        self.last.set(None);
        self.allocations.set(0);
    }

    /// Returns the number of bytes consumed so far, padding included.
    #[inline]
    pub fn used(&self) -> usize {
        self.cursor.get()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.cursor.get()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of blocks handed out since the last reset.
    #[inline]
    pub fn allocation_count(&self) -> usize {
        self.allocations.get()
    }

    /// Returns `true` if the arena's region contains the pointer address.
    #[inline]
    pub fn contains(&self, ptr: *const u8) -> bool {
        let base = self.base.as_ptr() as usize;
        (base..base + self.capacity).contains(&(ptr as usize))
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::with_config(ArenaConfig::default())
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // SAFETY: reassembles the box taken apart in `with_config`
        unsafe {
            drop(Box::from_raw(core::ptr::slice_from_raw_parts_mut(
                self.base.as_ptr(),
                self.capacity,
            )));
        }
    }
}

/// Lets containers draw memory from an [`Arena`].
///
/// Never frees: containers backed by an arena consume more of it on every relocation and
/// give nothing back until the arena is reset or dropped.
#[derive(Clone, Copy)]
pub struct ArenaAllocator<'a> {
    arena: &'a Arena,
    realloc: bool,
}

impl<'a> ArenaAllocator<'a> {
    /// An adapter offering allocation only.
    pub fn new(arena: &'a Arena) -> Self {
        Self {
            arena,
            realloc: false,
        }
    }

    /// An adapter that also offers [`Arena::grow_last`] as reallocation.
    pub fn with_realloc(arena: &'a Arena) -> Self {
        Self {
            arena,
            realloc: true,
        }
    }

    pub fn arena(&self) -> &'a Arena {
        self.arena
    }
}

unsafe impl Allocator for ArenaAllocator<'_> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.arena.alloc(layout)
    }

    #[inline]
    fn can_reallocate(&self) -> bool {
        self.realloc
    }

    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, AllocError> {
        if !self.realloc {
            return Err(AllocError::Unsupported);
        }
        self.arena.grow_last(ptr, old_layout, new_size)
    }
}
