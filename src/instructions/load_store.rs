//! # Load and Store Instructions
//!
//! This module implements register loads and stores:
//! - LDA, LDX, LDY: Load a register, updating Z and N
//! - STA, STX, STY: Store a register, affecting no flags

use crate::addressing::OperandRef;
use crate::{ExecutionError, MemoryBus, StepOutcome, CPU};

/// Loads `register` from the operand.
pub(crate) fn execute_load<M: MemoryBus>(
    cpu: &mut CPU<M>,
    register: OperandRef,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let value = operand.get(cpu);
    register.set(cpu, value)?;
    cpu.set_nz(value);
    Ok(StepOutcome::Continue)
}

/// Stores `register` into the operand.
///
/// Stores never pay the page-crossing penalty; their base cost already includes it.
pub(crate) fn execute_store<M: MemoryBus>(
    cpu: &mut CPU<M>,
    register: OperandRef,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let value = register.get(cpu);
    operand.set(cpu, value)?;
    Ok(StepOutcome::Continue)
}
