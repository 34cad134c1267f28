//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements arithmetic and logical operations:
//! - ADC / SBC: Add and subtract with carry, binary and NMOS decimal mode
//! - AND / ORA / EOR: Bitwise logic on the accumulator
//! - CMP / CPX / CPY: Register compares
//! - BIT: Bit test

use crate::addressing::OperandRef;
use crate::{ExecutionError, MemoryBus, StepOutcome, CPU};

/// Executes the ADC (Add with Carry) instruction.
///
/// In binary mode C, Z, V and N follow the usual twos-complement rules.
///
/// In decimal mode the NMOS 6502 behaviour is reproduced: each nibble is
/// corrected by +6 when it exceeds 9, N and V are taken from the intermediate
/// result before the high nibble is corrected by +0x60, and Z is taken from the
/// plain binary sum.
pub(crate) fn execute_adc<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let value = operand.get(cpu);

    if cpu.flag_d {
        add_decimal(cpu, value);
    } else {
        add_binary(cpu, value);
    }

    Ok(StepOutcome::Continue)
}

/// Executes the SBC (Subtract with Carry) instruction.
///
/// All flags come from the binary difference in both modes; decimal mode only
/// changes the value stored in the accumulator.
pub(crate) fn execute_sbc<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let value = operand.get(cpu);

    if cpu.flag_d {
        subtract_decimal(cpu, value);
    } else {
        // A - M - (1 - C) == A + !M + C
        add_binary(cpu, !value);
    }

    Ok(StepOutcome::Continue)
}

fn add_binary<M: MemoryBus>(cpu: &mut CPU<M>, value: u8) {
    let a = cpu.a;
    let sum = a as u16 + value as u16 + cpu.flag_c as u16;
    let result = sum as u8;

    cpu.flag_c = sum > 0xFF;
    // Both operands had the same sign and the result's sign differs
    cpu.flag_v = ((a ^ result) & (value ^ result) & 0x80) != 0;
    cpu.set_nz(result);
    cpu.a = result;
}

fn add_decimal<M: MemoryBus>(cpu: &mut CPU<M>, value: u8) {
    let a = cpu.a as u16;
    let b = value as u16;
    let carry = cpu.flag_c as u16;

    cpu.flag_z = (a + b + carry) & 0xFF == 0;

    let mut low = (a & 0x0F) + (b & 0x0F) + carry;
    if low >= 0x0A {
        low = ((low + 0x06) & 0x0F) + 0x10;
    }

    let mut result = (a & 0xF0) + (b & 0xF0) + low;
    cpu.flag_n = result & 0x80 != 0;
    cpu.flag_v = (!(a ^ b) & (a ^ result) & 0x80) != 0;

    if result >= 0xA0 {
        result += 0x60;
    }

    cpu.flag_c = result >= 0x100;
    cpu.a = result as u8;
}

fn subtract_decimal<M: MemoryBus>(cpu: &mut CPU<M>, value: u8) {
    let a = cpu.a as i16;
    let b = value as i16;
    let carry = cpu.flag_c as i16;

    let difference = a - b - (1 - carry);
    let binary = difference as u8;
    cpu.flag_c = difference >= 0;
    cpu.flag_v = ((a ^ b) & (a ^ difference) & 0x80) != 0;
    cpu.set_nz(binary);

    let mut low = (a & 0x0F) - (b & 0x0F) + carry - 1;
    if low < 0 {
        low = ((low - 0x06) & 0x0F) - 0x10;
    }

    let mut result = (a & 0xF0) - (b & 0xF0) + low;
    if result < 0 {
        result -= 0x60;
    }

    cpu.a = (result & 0xFF) as u8;
}

/// Executes the AND (Logical AND) instruction. Updates Z and N.
pub(crate) fn execute_and<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let result = cpu.a & operand.get(cpu);
    cpu.set_nz(result);
    cpu.a = result;
    Ok(StepOutcome::Continue)
}

/// Executes the ORA (Logical Inclusive OR) instruction. Updates Z and N.
pub(crate) fn execute_ora<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let result = cpu.a | operand.get(cpu);
    cpu.set_nz(result);
    cpu.a = result;
    Ok(StepOutcome::Continue)
}

/// Executes the EOR (Exclusive OR) instruction. Updates Z and N.
pub(crate) fn execute_eor<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let result = cpu.a ^ operand.get(cpu);
    cpu.set_nz(result);
    cpu.a = result;
    Ok(StepOutcome::Continue)
}

/// Executes CMP, CPX or CPY.
///
/// Computes `(register - operand) & 0xFF`; C is set when register >= operand,
/// Z and N come from the truncated difference. The register is not modified.
pub(crate) fn execute_compare<M: MemoryBus>(
    cpu: &mut CPU<M>,
    register: OperandRef,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let left = register.get(cpu);
    let right = operand.get(cpu);

    cpu.flag_c = left >= right;
    cpu.set_nz(left.wrapping_sub(right));

    Ok(StepOutcome::Continue)
}

/// Executes the BIT (Bit Test) instruction.
///
/// Z reflects `A & M`; N and V are copied from bits 7 and 6 of the operand.
pub(crate) fn execute_bit<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let value = operand.get(cpu);

    cpu.flag_z = cpu.a & value == 0;
    cpu.flag_n = value & 0x80 != 0;
    cpu.flag_v = value & 0x40 != 0;

    Ok(StepOutcome::Continue)
}
