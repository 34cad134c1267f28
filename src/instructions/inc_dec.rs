//! # Increment and Decrement Instructions
//!
//! INC/DEC modify memory, INX/INY/DEX/DEY modify an index register. All wrap
//! modulo 256 and update Z and N; C and V are untouched.

use crate::addressing::OperandRef;
use crate::{ExecutionError, MemoryBus, StepOutcome, CPU};

/// Adds `delta` (+1 or -1) to the operand in place.
pub(crate) fn execute_step<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
    delta: i8,
) -> Result<StepOutcome, ExecutionError> {
    let result = operand.get(cpu).wrapping_add(delta as u8);
    operand.set(cpu, result)?;
    cpu.set_nz(result);
    Ok(StepOutcome::Continue)
}
