//! Type-erased growable vectors over pluggable allocators.
//!
//! A [`RawVector`] stores fixed-size byte records in one contiguous buffer and asks an
//! [`Allocator`] for that buffer whenever it has to grow, shrink, or go away. Allocators state
//! which capabilities they have: the [`Heap`] can do everything, while an [`Arena`] (through
//! [`ArenaAllocator`]) never frees, so vectors backed by it leave their old buffers behind
//! when they grow. [`Vector`] is a thin typed view for plain-old-data elements.
//!
//! ```
//! use stride_alloc::{Arena, ArenaAllocator, RawVector};
//!
//! let arena = Arena::new(4096);
//! let mut vec = RawVector::new_in(ArenaAllocator::new(&arena), 4)?;
//! vec.push(&7u32.to_ne_bytes())?;
//! assert_eq!(vec.at(0), &7u32.to_ne_bytes()[..]);
//! # Ok::<(), stride_alloc::VectorError>(())
//! ```
pub mod arena;
pub mod config;
pub mod constants;
pub mod containers;
pub mod error;
pub mod heap;
pub mod traits;

pub use arena::{Arena, ArenaAllocator};
pub use config::{ArenaConfig, VectorConfig};
pub use containers::{typed::Vector, vec::RawVector};
pub use error::{AllocError, VectorError};
pub use heap::Heap;
pub use traits::Allocator;
