//! # CPU State and Execution
//!
//! This module contains the CPU struct representing the 6510 processor state and
//! the fetch-decode-execute loop.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: Accumulator (A), index registers (X, Y)
//! - **Program counter** (PC): 16-bit address of next instruction
//! - **Stack pointer** (SP): 8-bit offset into stack page (0x0100-0x01FF)
//! - **Status flags**: N, V, B, D, I, Z, C (individual bool fields)
//! - **Cycle counter**: u64 monotonically increasing cycle count
//!
//! ## Execution Model
//!
//! `step()` executes one instruction and reports whether emulation should go on.
//! Music routines are usually entered with no caller frame on the stack; the
//! `ExitPolicy` turns the final RTS/RTI of such a routine into
//! `StepOutcome::Finished` instead of a jump through whatever the empty stack holds.

use crate::addressing::{AddressingMode, OperandRef};
use crate::{instructions, ExecutionError, MemoryBus, Mnemonic, OPCODE_TABLE};

/// Result of executing one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The instruction completed normally.
    Continue,
    /// An RTS/RTI found the stack empty under the active `ExitPolicy`.
    Finished,
}

/// Exit-on-empty-stack policy applied by RTS and RTI.
///
/// When enabled, a return whose pops would move SP into `0..wrap_zone` (that is,
/// past the empty-stack position 0xFF) finishes emulation instead of popping.
/// The zone is a heuristic; some players leave a few stray bytes pushed, so the
/// default tolerates a small wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPolicy {
    pub enabled: bool,
    pub wrap_zone: u8,
}

impl ExitPolicy {
    /// Default size of the low-stack wrap zone.
    pub const DEFAULT_WRAP_ZONE: u8 = 0x08;

    /// Enabled policy with the given wrap zone.
    pub const fn when_stack_empty(wrap_zone: u8) -> Self {
        Self {
            enabled: true,
            wrap_zone,
        }
    }

    /// Disabled policy: returns always pop, as on real hardware.
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            wrap_zone: Self::DEFAULT_WRAP_ZONE,
        }
    }

    pub(crate) fn fires(&self, sp: u8, pops: u8) -> bool {
        self.enabled && sp.wrapping_add(pops) < self.wrap_zone
    }
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// 6510 CPU state and execution context.
///
/// Generic over the memory implementation via the `MemoryBus` trait.
///
/// # Examples
///
/// ```
/// use lib6510::{CPU, FlatMemory, MemoryBus};
///
/// let mut memory = FlatMemory::new();
/// memory.write(0xFFFC, 0x00);
/// memory.write(0xFFFD, 0x80);
///
/// let cpu = CPU::new(memory);
///
/// assert_eq!(cpu.pc(), 0x8000);
/// assert_eq!(cpu.sp(), 0xFD);
/// assert!(cpu.flag_i()); // Interrupt disable set on reset
/// assert_eq!(cpu.cycles(), 0);
/// ```
pub struct CPU<M: MemoryBus> {
    /// Accumulator register
    pub(crate) a: u8,

    /// X index register
    pub(crate) x: u8,

    /// Y index register
    pub(crate) y: u8,

    /// Program counter (address of next instruction)
    pub(crate) pc: u16,

    /// Stack pointer (0x0100 + sp gives full stack address)
    pub(crate) sp: u8,

    pub(crate) flag_n: bool,
    pub(crate) flag_v: bool,
    pub(crate) flag_b: bool,
    pub(crate) flag_d: bool,
    pub(crate) flag_i: bool,
    pub(crate) flag_z: bool,
    pub(crate) flag_c: bool,

    /// Total CPU cycles executed
    pub(crate) cycles: u64,

    /// Address the instruction being executed was fetched from
    pub(crate) instruction_address: u16,

    pub(crate) exit_policy: ExitPolicy,

    /// Memory bus implementation
    pub(crate) memory: M,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a new CPU with the given memory bus.
    ///
    /// The CPU is initialized to the 6502 power-on reset state:
    /// - PC is loaded from the reset vector at 0xFFFC/0xFFFD (little-endian)
    /// - SP is set to 0xFD
    /// - Interrupt Disable is set
    /// - A, X, Y and the cycle counter are zeroed
    /// - The exit policy is disabled
    pub fn new(memory: M) -> Self {
        let pc_low = memory.peek(0xFFFC) as u16;
        let pc_high = memory.peek(0xFFFD) as u16;
        let pc = (pc_high << 8) | pc_low;

        Self {
            a: 0x00,
            x: 0x00,
            y: 0x00,
            pc,
            sp: 0xFD,
            flag_n: false,
            flag_v: false,
            flag_b: false,
            flag_d: false,
            flag_i: true,
            flag_z: false,
            flag_c: false,
            cycles: 0,
            instruction_address: pc,
            exit_policy: ExitPolicy::disabled(),
            memory,
        }
    }

    /// Prepares a subroutine call from an empty stack.
    ///
    /// Sets PC, A, X, Y and the packed status byte, then SP = 0xFF and cycles = 0.
    /// The unused status bit always reads back as 1 and Break as 0.
    pub fn reset(&mut self, entry: u16, a: u8, x: u8, y: u8, flags: u8) {
        self.pc = entry;
        self.a = a;
        self.x = x;
        self.y = y;
        self.set_status(flags);
        self.flag_b = false;
        self.sp = 0xFF;
        self.cycles = 0;
    }

    /// Re-enters code at `entry` keeping registers and flags.
    ///
    /// Only SP and the cycle counter are reset, as before each play call.
    pub fn prepare_call(&mut self, entry: u16) {
        self.pc = entry;
        self.sp = 0xFF;
        self.cycles = 0;
    }

    /// Executes one instruction and advances the CPU state.
    ///
    /// Performs the fetch-decode-execute cycle:
    /// 1. Fetch opcode byte at current PC
    /// 2. Look up instruction metadata in the opcode table
    /// 3. Reject JAM and unrecognised opcodes
    /// 4. Resolve the operand for the addressing mode
    /// 5. Advance PC past the operand bytes and add the base cycle cost,
    ///    plus one if an indexed read crossed a page
    /// 6. Execute the instruction
    ///
    /// # Errors
    ///
    /// - `ExecutionError::Halted` for a JAM opcode
    /// - `ExecutionError::UnimplementedOpcode` for other undocumented opcodes
    ///
    /// # Examples
    ///
    /// ```
    /// use lib6510::{CPU, ExitPolicy, FlatMemory, MemoryBus, StepOutcome};
    ///
    /// let mut mem = FlatMemory::new();
    /// mem.load(0x1000, &[0xEA, 0x60]); // NOP; RTS
    ///
    /// let mut cpu = CPU::new(mem);
    /// cpu.set_exit_policy(ExitPolicy::when_stack_empty(ExitPolicy::DEFAULT_WRAP_ZONE));
    /// cpu.reset(0x1000, 0, 0, 0, 0);
    ///
    /// assert_eq!(cpu.step(), Ok(StepOutcome::Continue));
    /// assert_eq!(cpu.step(), Ok(StepOutcome::Finished));
    /// ```
    pub fn step(&mut self) -> Result<StepOutcome, ExecutionError> {
        let address = self.pc;
        self.instruction_address = address;

        let opcode = self.memory.read(address);
        let metadata = &OPCODE_TABLE[opcode as usize];

        match metadata.mnemonic {
            Mnemonic::Jam => return Err(ExecutionError::Halted { opcode, address }),
            Mnemonic::Illegal => {
                return Err(ExecutionError::UnimplementedOpcode { opcode, address })
            }
            _ => {}
        }

        let (operand, page_crossed) = self.resolve_operand(metadata.addressing_mode);

        self.pc = self.pc.wrapping_add(metadata.size_bytes as u16);
        self.cycles += metadata.base_cycles as u64;
        if page_crossed && metadata.page_penalty {
            self.cycles += 1;
        }

        instructions::execute(self, metadata.mnemonic, operand)
    }

    /// Runs the CPU for a specified number of cycles.
    ///
    /// Stops early if an instruction reports `Finished`. Returns the cycles consumed,
    /// which may slightly exceed the budget due to instruction granularity.
    pub fn run_for_cycles(&mut self, cycle_budget: u64) -> Result<u64, ExecutionError> {
        let start_cycles = self.cycles;
        let target_cycles = start_cycles + cycle_budget;

        while self.cycles < target_cycles {
            if self.step()? == StepOutcome::Finished {
                break;
            }
        }

        Ok(self.cycles - start_cycles)
    }

    /// Resolves the operand of the instruction at PC.
    ///
    /// Returns the operand reference and whether indexing crossed a page boundary.
    /// PC is not modified.
    fn resolve_operand(&self, mode: AddressingMode) -> (OperandRef, bool) {
        let pc = self.pc;

        match mode {
            AddressingMode::Implicit | AddressingMode::Accumulator => {
                (OperandRef::Accumulator, false)
            }
            AddressingMode::Immediate => (
                OperandRef::ImmediateValue(self.memory.read(pc.wrapping_add(1))),
                false,
            ),
            AddressingMode::ZeroPage => {
                let zp = self.memory.read(pc.wrapping_add(1));
                (OperandRef::MemoryAddress(zp as u16), false)
            }
            AddressingMode::ZeroPageX => {
                let zp = self.memory.read(pc.wrapping_add(1)).wrapping_add(self.x);
                (OperandRef::MemoryAddress(zp as u16), false)
            }
            AddressingMode::ZeroPageY => {
                let zp = self.memory.read(pc.wrapping_add(1)).wrapping_add(self.y);
                (OperandRef::MemoryAddress(zp as u16), false)
            }
            AddressingMode::Relative => {
                let offset = self.memory.read(pc.wrapping_add(1)) as i8;
                let next = pc.wrapping_add(2);
                let target = next.wrapping_add(offset as i16 as u16);
                (OperandRef::MemoryAddress(target), false)
            }
            AddressingMode::Absolute => {
                let addr = self.read_word(pc.wrapping_add(1));
                (OperandRef::MemoryAddress(addr), false)
            }
            AddressingMode::AbsoluteX => {
                let base = self.read_word(pc.wrapping_add(1));
                self.indexed(base, self.x)
            }
            AddressingMode::AbsoluteY => {
                let base = self.read_word(pc.wrapping_add(1));
                self.indexed(base, self.y)
            }
            AddressingMode::Indirect => {
                let pointer = self.read_word(pc.wrapping_add(1));
                // The high byte is fetched from the same page as the low byte
                let high_addr = (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF);
                let low = self.memory.read(pointer) as u16;
                let high = self.memory.read(high_addr) as u16;
                (OperandRef::MemoryAddress((high << 8) | low), false)
            }
            AddressingMode::IndirectX => {
                let zp = self.memory.read(pc.wrapping_add(1)).wrapping_add(self.x);
                (OperandRef::MemoryAddress(self.read_zero_page_word(zp)), false)
            }
            AddressingMode::IndirectY => {
                let zp = self.memory.read(pc.wrapping_add(1));
                self.indexed(self.read_zero_page_word(zp), self.y)
            }
        }
    }

    fn indexed(&self, base: u16, index: u8) -> (OperandRef, bool) {
        let effective = base.wrapping_add(index as u16);
        let page_crossed = (base & 0xFF00) != (effective & 0xFF00);
        (OperandRef::MemoryAddress(effective), page_crossed)
    }

    fn read_word(&self, addr: u16) -> u16 {
        let low = self.memory.read(addr) as u16;
        let high = self.memory.read(addr.wrapping_add(1)) as u16;
        (high << 8) | low
    }

    /// Reads a pointer from zero page; the high byte wraps from $FF to $00.
    fn read_zero_page_word(&self, zp: u8) -> u16 {
        let low = self.memory.read(zp as u16) as u16;
        let high = self.memory.read(zp.wrapping_add(1) as u16) as u16;
        (high << 8) | low
    }

    // ========== Stack Helpers ==========

    pub(crate) fn push(&mut self, value: u8) {
        self.memory.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pop(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.memory.read(0x0100 | self.sp as u16)
    }

    pub(crate) fn push_word(&mut self, value: u16) {
        self.push((value >> 8) as u8);
        self.push(value as u8);
    }

    pub(crate) fn pop_word(&mut self) -> u16 {
        let low = self.pop() as u16;
        let high = self.pop() as u16;
        (high << 8) | low
    }

    /// Sets Z and N from a result byte.
    #[inline]
    pub(crate) fn set_nz(&mut self, value: u8) {
        self.flag_z = value == 0;
        self.flag_n = value & 0x80 != 0;
    }

    // ========== Register Getters ==========

    /// Returns the accumulator register value.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// Returns the X index register value.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Returns the Y index register value.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the stack pointer value.
    ///
    /// Note: The full stack address is 0x0100 + SP. The stack grows downward from 0x01FF.
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Returns the status register as a packed byte.
    ///
    /// Bit layout (NV-BDIZC), bit 5 always 1.
    pub fn status(&self) -> u8 {
        let mut status: u8 = 0b00100000;

        if self.flag_n {
            status |= 0b10000000;
        }
        if self.flag_v {
            status |= 0b01000000;
        }
        if self.flag_b {
            status |= 0b00010000;
        }
        if self.flag_d {
            status |= 0b00001000;
        }
        if self.flag_i {
            status |= 0b00000100;
        }
        if self.flag_z {
            status |= 0b00000010;
        }
        if self.flag_c {
            status |= 0b00000001;
        }

        status
    }

    /// Returns the total number of CPU cycles executed since the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Returns the active exit policy.
    pub fn exit_policy(&self) -> ExitPolicy {
        self.exit_policy
    }

    /// Returns a shared reference to the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Returns a mutable reference to the memory bus.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Consumes the CPU, returning its memory bus.
    pub fn into_memory(self) -> M {
        self.memory
    }

    // ========== Status Flag Getters ==========

    pub fn flag_n(&self) -> bool {
        self.flag_n
    }

    pub fn flag_v(&self) -> bool {
        self.flag_v
    }

    pub fn flag_b(&self) -> bool {
        self.flag_b
    }

    pub fn flag_d(&self) -> bool {
        self.flag_d
    }

    pub fn flag_i(&self) -> bool {
        self.flag_i
    }

    pub fn flag_z(&self) -> bool {
        self.flag_z
    }

    pub fn flag_c(&self) -> bool {
        self.flag_c
    }

    // ========== Setters ==========

    pub fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    pub fn set_x(&mut self, value: u8) {
        self.x = value;
    }

    pub fn set_y(&mut self, value: u8) {
        self.y = value;
    }

    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    pub fn set_sp(&mut self, value: u8) {
        self.sp = value;
    }

    /// Unpacks a status byte into the flag fields. Bit 5 is ignored.
    pub fn set_status(&mut self, value: u8) {
        self.flag_n = value & 0b10000000 != 0;
        self.flag_v = value & 0b01000000 != 0;
        self.flag_b = value & 0b00010000 != 0;
        self.flag_d = value & 0b00001000 != 0;
        self.flag_i = value & 0b00000100 != 0;
        self.flag_z = value & 0b00000010 != 0;
        self.flag_c = value & 0b00000001 != 0;
    }

    pub fn set_exit_policy(&mut self, policy: ExitPolicy) {
        self.exit_policy = policy;
    }

    pub fn set_flag_n(&mut self, value: bool) {
        self.flag_n = value;
    }

    pub fn set_flag_v(&mut self, value: bool) {
        self.flag_v = value;
    }

    pub fn set_flag_b(&mut self, value: bool) {
        self.flag_b = value;
    }

    pub fn set_flag_d(&mut self, value: bool) {
        self.flag_d = value;
    }

    pub fn set_flag_i(&mut self, value: bool) {
        self.flag_i = value;
    }

    pub fn set_flag_z(&mut self, value: bool) {
        self.flag_z = value;
    }

    pub fn set_flag_c(&mut self, value: bool) {
        self.flag_c = value;
    }
}
