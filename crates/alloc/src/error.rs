//! Error types for allocators and vectors.

use std::error::Error;
use std::fmt;

/// An error with allocating or reallocating memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The provider has no memory left to satisfy the request.
    OutOfMemory,
    /// The request can never be satisfied by this provider, whatever its state.
    RequestTooLarge,
    /// The size and alignment do not form a valid [`Layout`](core::alloc::Layout).
    InvalidLayout,
    /// The provider does not offer the requested capability.
    Unsupported,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::RequestTooLarge => write!(f, "request exceeds the allocator's maximum block size"),
            Self::InvalidLayout => write!(f, "invalid size or alignment"),
            Self::Unsupported => write!(f, "operation not supported by this allocator"),
        }
    }
}

impl Error for AllocError {}

/// Errors returned by [`RawVector`](crate::RawVector) and [`Vector`](crate::Vector) operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorError {
    /// Elements must be at least one byte wide.
    ZeroElementSize,
    /// The requested buffer alignment is not a power of two.
    InvalidAlignment {
        /// The rejected alignment.
        align: usize,
    },
    /// The growth policy cannot make progress (factor below 2 or no initial capacity).
    InvalidConfig,
    /// `capacity * elem_size` does not fit the address space.
    CapacityOverflow,
    /// The allocator failed to provide memory.
    Alloc(AllocError),
    /// An index was past the end of the vector.
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Length of the vector at the time of the call.
        len: usize,
    },
    /// A caller-supplied element did not match the vector's element size.
    ElementSizeMismatch {
        /// The vector's element size.
        expected: usize,
        /// Length of the supplied byte slice.
        found: usize,
    },
    /// The vector has no elements to remove.
    Empty,
    /// The vector was destroyed and has not been re-initialized.
    Destroyed,
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroElementSize => write!(f, "element size must be non-zero"),
            Self::InvalidAlignment { align } => {
                write!(f, "alignment {align} is not a power of two")
            }
            Self::InvalidConfig => {
                write!(f, "growth factor must be at least 2 and initial capacity non-zero")
            }
            Self::CapacityOverflow => write!(f, "capacity overflow"),
            Self::Alloc(err) => write!(f, "allocation failed: {err}"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::ElementSizeMismatch { expected, found } => {
                write!(f, "element is {found} bytes, expected {expected}")
            }
            Self::Empty => write!(f, "vector is empty"),
            Self::Destroyed => write!(f, "vector was destroyed"),
        }
    }
}

impl Error for VectorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Alloc(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AllocError> for VectorError {
    fn from(err: AllocError) -> Self {
        Self::Alloc(err)
    }
}
