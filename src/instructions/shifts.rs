//! # Shift and Rotate Instructions
//!
//! ASL, LSR, ROL and ROR operate on the accumulator or a memory operand through
//! the same `OperandRef`. The bit shifted out lands in C; Z and N follow the result.

use crate::addressing::OperandRef;
use crate::{ExecutionError, MemoryBus, StepOutcome, CPU};

fn shift<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
    apply: impl FnOnce(u8, bool) -> (u8, bool),
) -> Result<StepOutcome, ExecutionError> {
    let value = operand.get(cpu);
    let (result, carry) = apply(value, cpu.flag_c);

    operand.set(cpu, result)?;
    cpu.flag_c = carry;
    cpu.set_nz(result);

    Ok(StepOutcome::Continue)
}

/// Executes ASL (Arithmetic Shift Left): bit 7 into C, 0 into bit 0.
pub(crate) fn execute_asl<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    shift(cpu, operand, |value, _| (value << 1, value & 0x80 != 0))
}

/// Executes LSR (Logical Shift Right): bit 0 into C, 0 into bit 7.
pub(crate) fn execute_lsr<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    shift(cpu, operand, |value, _| (value >> 1, value & 0x01 != 0))
}

/// Executes ROL (Rotate Left): old C into bit 0, bit 7 into C.
pub(crate) fn execute_rol<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    shift(cpu, operand, |value, carry| {
        ((value << 1) | carry as u8, value & 0x80 != 0)
    })
}

/// Executes ROR (Rotate Right): old C into bit 7, bit 0 into C.
pub(crate) fn execute_ror<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    shift(cpu, operand, |value, carry| {
        ((value >> 1) | ((carry as u8) << 7), value & 0x01 != 0)
    })
}
