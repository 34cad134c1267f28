//! # Stack Instructions
//!
//! This module implements stack operations:
//! - PHA / PLA: Push and pull the accumulator
//! - PHP / PLP: Push and pull the status register
//!
//! The stack lives in page one ($0100-$01FF) and grows downward; SP wraps
//! modulo 256 on every push and pull.

use crate::{ExecutionError, MemoryBus, StepOutcome, CPU};

/// Executes PHA (Push Accumulator).
pub(crate) fn execute_pha<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<StepOutcome, ExecutionError> {
    cpu.push(cpu.a);
    Ok(StepOutcome::Continue)
}

/// Executes PHP (Push Processor Status). The pushed copy has B and bit 5 set.
pub(crate) fn execute_php<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<StepOutcome, ExecutionError> {
    cpu.push(cpu.status() | 0b00110000);
    Ok(StepOutcome::Continue)
}

/// Executes PLA (Pull Accumulator), updating Z and N.
pub(crate) fn execute_pla<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<StepOutcome, ExecutionError> {
    let value = cpu.pop();
    cpu.a = value;
    cpu.set_nz(value);
    Ok(StepOutcome::Continue)
}

/// Executes PLP (Pull Processor Status).
///
/// Bits 4 and 5 of the pulled byte have no backing flag and are discarded.
pub(crate) fn execute_plp<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<StepOutcome, ExecutionError> {
    let status = cpu.pop();
    cpu.set_status(status);
    cpu.flag_b = false;
    Ok(StepOutcome::Continue)
}
