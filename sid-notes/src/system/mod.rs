//! C64 memory system and platform timing.

mod c64_memory;
mod region;

pub use c64_memory::{
    C64Memory, ObservedWrite, BASIC_ROM_SIZE, CHAR_ROM_SIZE, KERNAL_ROM_SIZE,
};
pub use region::Region;
