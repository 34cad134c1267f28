//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait that decouples the CPU from specific
//! memory implementations, and `FlatMemory`, a plain 64KB array that also keeps an
//! access log: for every address, whether it has been read and/or written since the
//! log was last cleared.
//!
//! The access log is what lets a driver ask questions like "did the init routine
//! install an interrupt vector?" after the fact.
//!
//! ## Design Principles
//!
//! The MemoryBus trait follows 6502 hardware behavior:
//! - No bus errors - reads/writes always succeed
//! - Writes to ROM regions may be ignored or redirected by banked implementations
//! - Addresses are `u16`, so every access is within the 64KB space by construction

use bitflags::bitflags;
use std::cell::Cell;

/// Trait for memory bus implementations.
///
/// `read` takes `&self` so the CPU can fetch operands while holding other borrows;
/// implementations that record accesses use interior mutability for their logs.
pub trait MemoryBus {
    /// Reads a byte as the CPU would, marking the access where a log is kept.
    fn read(&self, addr: u16) -> u8;

    /// Writes a byte as the CPU would.
    fn write(&mut self, addr: u16, value: u8);

    /// Reads a byte without side effects on any access log.
    fn peek(&self, addr: u16) -> u8 {
        self.read(addr)
    }
}

bitflags! {
    /// Per-address access record kept by `FlatMemory`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Access: u8 {
        const READ = 0b01;
        const WRITTEN = 0b10;
    }
}

/// Simple flat 64KB memory with a parallel access log.
///
/// # Examples
///
/// ```
/// use lib6510::{FlatMemory, MemoryBus};
///
/// let mut mem = FlatMemory::new();
/// mem.write(0x0314, 0x00);
/// assert!(mem.was_written(0x0314));
/// assert!(!mem.was_written(0x0315));
///
/// mem.clear_access_log();
/// assert!(!mem.was_written(0x0314));
/// ```
pub struct FlatMemory {
    data: Box<[u8; 65536]>,
    access: Box<[Cell<Access>]>,
}

impl FlatMemory {
    /// Creates a new zero-filled memory with an empty access log.
    pub fn new() -> Self {
        Self {
            data: Box::new([0; 65536]),
            access: (0..65536).map(|_| Cell::new(Access::empty())).collect(),
        }
    }

    /// Records an access without touching the stored byte.
    ///
    /// Banked memory layers call this for accesses they redirect elsewhere, so
    /// the log always reflects the address the CPU used.
    #[inline]
    pub fn mark(&self, addr: u16, kind: Access) {
        let cell = &self.access[addr as usize];
        cell.set(cell.get() | kind);
    }

    /// Access record for one address.
    pub fn access(&self, addr: u16) -> Access {
        self.access[addr as usize].get()
    }

    /// Returns true if the address was written since the log was last cleared.
    pub fn was_written(&self, addr: u16) -> bool {
        self.access(addr).contains(Access::WRITTEN)
    }

    /// Returns true if the address was read since the log was last cleared.
    pub fn was_read(&self, addr: u16) -> bool {
        self.access(addr).contains(Access::READ)
    }

    /// Forgets every recorded access.
    pub fn clear_access_log(&mut self) {
        for cell in self.access.iter_mut() {
            *cell.get_mut() = Access::empty();
        }
    }

    /// Copies `bytes` into memory starting at `addr`, wrapping at $FFFF.
    ///
    /// Loading does not mark the access log.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        for (offset, &byte) in bytes.iter().enumerate() {
            let target = addr.wrapping_add(offset as u16);
            self.data[target as usize] = byte;
        }
    }

    /// Stores a byte without marking the access log.
    #[inline]
    pub fn poke(&mut self, addr: u16, value: u8) {
        self.data[addr as usize] = value;
    }
}

impl Default for FlatMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for FlatMemory {
    fn read(&self, addr: u16) -> u8 {
        self.mark(addr, Access::READ);
        self.data[addr as usize]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.mark(addr, Access::WRITTEN);
        self.data[addr as usize] = value;
    }

    fn peek(&self, addr: u16) -> u8 {
        self.data[addr as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_memory_read_write() {
        let mut mem = FlatMemory::new();

        // Initially all zeros
        assert_eq!(mem.read(0x0000), 0x00);
        assert_eq!(mem.read(0xFFFF), 0x00);

        mem.write(0x1234, 0x42);
        assert_eq!(mem.read(0x1234), 0x42);

        // Neighbours unchanged
        assert_eq!(mem.read(0x1233), 0x00);
        assert_eq!(mem.read(0x1235), 0x00);
    }

    #[test]
    fn test_access_log() {
        let mut mem = FlatMemory::new();

        mem.read(0x1000);
        mem.write(0x2000, 0x01);
        assert_eq!(mem.access(0x1000), Access::READ);
        assert_eq!(mem.access(0x2000), Access::WRITTEN);

        mem.read(0x2000);
        assert_eq!(mem.access(0x2000), Access::READ | Access::WRITTEN);

        mem.clear_access_log();
        assert_eq!(mem.access(0x2000), Access::empty());
        assert_eq!(mem.peek(0x2000), 0x01);
    }

    #[test]
    fn test_peek_and_load_leave_log_untouched() {
        let mut mem = FlatMemory::new();
        mem.load(0xFFFE, &[0xAA, 0xBB, 0xCC]);

        assert_eq!(mem.peek(0xFFFE), 0xAA);
        assert_eq!(mem.peek(0xFFFF), 0xBB);
        assert_eq!(mem.peek(0x0000), 0xCC);
        assert!(!mem.was_read(0xFFFE));
        assert!(!mem.was_written(0x0000));
    }
}
