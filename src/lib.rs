//! # 6510 CPU Emulator Core
//!
//! An instruction-level NMOS 6502/6510 CPU emulator built to run the machine
//! code embedded in C64 music files.
//!
//! This crate provides the CPU state, a trait-based memory bus abstraction with a
//! per-address access log, and a table-driven opcode metadata system. Cycle counts
//! are tracked per instruction (including page-crossing and branch penalties) but
//! the bus is not simulated cycle by cycle.
//!
//! ## Quick Start
//!
//! ```rust
//! use lib6510::{ExitPolicy, FlatMemory, StepOutcome, CPU};
//!
//! let mut memory = FlatMemory::new();
//! memory.load(0x1000, &[0xA9, 0x42, 0x60]); // LDA #$42; RTS
//!
//! let mut cpu = CPU::new(memory);
//! cpu.set_exit_policy(ExitPolicy::when_stack_empty(ExitPolicy::DEFAULT_WRAP_ZONE));
//! cpu.reset(0x1000, 0, 0, 0, 0);
//!
//! assert_eq!(cpu.step().unwrap(), StepOutcome::Continue);
//! assert_eq!(cpu.step().unwrap(), StepOutcome::Finished); // RTS on an empty stack
//! assert_eq!(cpu.a(), 0x42);
//! ```
//!
//! ## Modules
//!
//! - `cpu` - CPU state, exit policy and the fetch-decode-execute loop
//! - `memory` - MemoryBus trait and the access-logging flat memory
//! - `opcodes` - Opcode metadata table (all 256 opcode bytes)
//! - `addressing` - Addressing modes and resolved operand references

pub mod addressing;
pub mod cpu;
pub mod memory;
pub mod opcodes;

// Internal instruction implementations (not part of public API)
mod instructions;

// Re-export public API
pub use addressing::{AddressingMode, OperandRef};
pub use cpu::{ExitPolicy, StepOutcome, CPU};
pub use memory::{Access, FlatMemory, MemoryBus};
pub use opcodes::{Mnemonic, OpcodeMetadata, OPCODE_TABLE};

/// Errors that can occur during CPU execution.
///
/// Every variant carries the address involved so a failing music routine can be
/// located in the music file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// Opcode byte outside the recognised documented and no-op sets.
    #[error("opcode 0x{opcode:02X} at ${address:04X} is not implemented")]
    UnimplementedOpcode { opcode: u8, address: u16 },

    /// One of the JAM opcodes that lock up a real 6510.
    #[error("halt opcode 0x{opcode:02X} executed at ${address:04X}")]
    Halted { opcode: u8, address: u16 },

    /// An instruction tried to store into an immediate operand.
    ///
    /// Never raised by a correct opcode table; indicates an internal defect.
    #[error("store into immediate operand of instruction at ${address:04X}")]
    ReadOnlyOperand { address: u16 },
}
