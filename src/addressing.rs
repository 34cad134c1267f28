//! # Addressing Modes and Operand References
//!
//! `AddressingMode` names the 13 ways a 6502 instruction can locate its
//! operand. `OperandRef` is the resolved result: a tagged reference to where
//! the operand byte lives, so instruction bodies can read and write it without
//! caring which addressing mode produced it.

use crate::{ExecutionError, MemoryBus, CPU};

/// 6502 addressing mode enumeration.
///
/// # Operand Sizes
///
/// - **0 bytes**: Implicit, Accumulator
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, IndirectX, IndirectY
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY, Indirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    /// No operand, operation implied by instruction (CLC, RTS, NOP).
    Implicit,

    /// Operates directly on the accumulator register (LSR A, ROL A).
    Accumulator,

    /// 8-bit constant operand in instruction (LDA #$10).
    Immediate,

    /// 8-bit address in zero page (LDA $80).
    ZeroPage,

    /// Zero page address indexed by X, wrapping within zero page (LDA $80,X).
    ZeroPageX,

    /// Zero page address indexed by Y, wrapping within zero page (LDX $80,Y).
    ZeroPageY,

    /// Signed 8-bit offset for branch instructions, relative to the next instruction.
    Relative,

    /// Full 16-bit address (JMP $1234).
    Absolute,

    /// 16-bit address indexed by X. Reads may incur +1 cycle on page crossing.
    AbsoluteX,

    /// 16-bit address indexed by Y. Reads may incur +1 cycle on page crossing.
    AbsoluteY,

    /// Indirect jump through 16-bit pointer. Only used by JMP.
    ///
    /// The pointer high byte is fetched without carrying into the next page,
    /// so `JMP ($10FF)` reads its target from $10FF and $1000.
    Indirect,

    /// Indexed indirect: (ZP + X) then dereference (LDA ($40,X)).
    IndirectX,

    /// Indirect indexed: ZP dereference then + Y (LDA ($40),Y).
    ///
    /// Reads may incur +1 cycle on page crossing.
    IndirectY,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Implicit | AddressingMode::Accumulator => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            _ => 1,
        }
    }
}

/// Where an instruction's operand byte lives once its addressing mode is resolved.
///
/// Relative branches and jumps resolve to `MemoryAddress` holding the target.
/// Implicit instructions resolve to `Accumulator` and ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandRef {
    Accumulator,
    IndexX,
    IndexY,
    StackPointer,
    ImmediateValue(u8),
    MemoryAddress(u16),
}

impl OperandRef {
    /// Reads the referenced byte. Memory reads go through the bus (and its access log).
    pub fn get<M: MemoryBus>(self, cpu: &CPU<M>) -> u8 {
        match self {
            OperandRef::Accumulator => cpu.a,
            OperandRef::IndexX => cpu.x,
            OperandRef::IndexY => cpu.y,
            OperandRef::StackPointer => cpu.sp,
            OperandRef::ImmediateValue(value) => value,
            OperandRef::MemoryAddress(addr) => cpu.memory.read(addr),
        }
    }

    /// Stores a byte at the referenced location.
    ///
    /// # Errors
    ///
    /// `ExecutionError::ReadOnlyOperand` for an immediate operand.
    pub fn set<M: MemoryBus>(self, cpu: &mut CPU<M>, value: u8) -> Result<(), ExecutionError> {
        match self {
            OperandRef::Accumulator => cpu.a = value,
            OperandRef::IndexX => cpu.x = value,
            OperandRef::IndexY => cpu.y = value,
            OperandRef::StackPointer => cpu.sp = value,
            OperandRef::ImmediateValue(_) => {
                return Err(ExecutionError::ReadOnlyOperand {
                    address: cpu.instruction_address,
                })
            }
            OperandRef::MemoryAddress(addr) => cpu.memory.write(addr, value),
        }
        Ok(())
    }

    /// Effective address for jumps and branches; `None` for register or immediate operands.
    pub fn address(self) -> Option<u16> {
        match self {
            OperandRef::MemoryAddress(addr) => Some(addr),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlatMemory;

    #[test]
    fn test_operand_bytes() {
        assert_eq!(AddressingMode::Implicit.operand_bytes(), 0);
        assert_eq!(AddressingMode::Accumulator.operand_bytes(), 0);
        assert_eq!(AddressingMode::Immediate.operand_bytes(), 1);
        assert_eq!(AddressingMode::IndirectY.operand_bytes(), 1);
        assert_eq!(AddressingMode::Indirect.operand_bytes(), 2);
        assert_eq!(AddressingMode::AbsoluteX.operand_bytes(), 2);
    }

    #[test]
    fn test_operand_ref_get_set() {
        let mut cpu = CPU::new(FlatMemory::new());

        OperandRef::Accumulator.set(&mut cpu, 0x11).unwrap();
        OperandRef::IndexX.set(&mut cpu, 0x22).unwrap();
        OperandRef::IndexY.set(&mut cpu, 0x33).unwrap();
        OperandRef::StackPointer.set(&mut cpu, 0x44).unwrap();
        OperandRef::MemoryAddress(0x1234).set(&mut cpu, 0x55).unwrap();

        assert_eq!(cpu.a(), 0x11);
        assert_eq!(cpu.x(), 0x22);
        assert_eq!(cpu.y(), 0x33);
        assert_eq!(cpu.sp(), 0x44);
        assert_eq!(OperandRef::MemoryAddress(0x1234).get(&cpu), 0x55);
        assert_eq!(OperandRef::ImmediateValue(0x66).get(&cpu), 0x66);
    }

    #[test]
    fn test_immediate_is_read_only() {
        let mut cpu = CPU::new(FlatMemory::new());
        let result = OperandRef::ImmediateValue(0x10).set(&mut cpu, 0x20);
        assert!(matches!(result, Err(ExecutionError::ReadOnlyOperand { .. })));
    }
}
