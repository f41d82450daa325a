use std::default::Default;

use super::constants::*;

/// Growth policy of a [`RawVector`](crate::RawVector).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorConfig {
    /// Capacity is multiplied by this when a push or insert finds the vector full.
    pub growth_factor: usize,
    /// Number of slots reserved by the first push or insert into an empty vector.
    pub initial_capacity: usize,
}

impl VectorConfig {
    /// Sets the multiplier applied to capacity on each growth event.
    pub fn with_growth_factor(mut self, growth_factor: usize) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Sets the capacity of the first buffer.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Returns `true` if the policy always makes room for at least one more element.
    pub fn is_valid(&self) -> bool {
        self.growth_factor >= 2 && self.initial_capacity > 0
    }
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            growth_factor: DEFAULT_GROWTH_FACTOR,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

/// Sizing of an [`Arena`](crate::Arena).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the pre-reserved region, in bytes.
    pub capacity: usize,
}

impl ArenaConfig {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ARENA_BYTES)
    }
}
