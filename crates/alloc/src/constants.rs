use bytesize::MIB;

pub const DEFAULT_GROWTH_FACTOR: usize = 2;
pub const DEFAULT_INITIAL_CAPACITY: usize = 8;
pub const DEFAULT_ALIGN: usize = 16; // malloc's guarantee on 64-bit targets
pub const DEFAULT_ARENA_BYTES: usize = MIB as usize;
