//! # Branch Instructions
//!
//! BCC, BCS, BEQ, BNE, BMI, BPL, BVC and BVS share one implementation; only the
//! tested flag differs.
//!
//! Cycle timing:
//! - 2 cycles if branch not taken
//! - 3 cycles if branch taken to same page
//! - 4 cycles if branch taken to different page
//!
//! No flags are affected.

use crate::addressing::OperandRef;
use crate::{ExecutionError, MemoryBus, StepOutcome, CPU};

/// Branches to the resolved relative target when `condition` holds.
///
/// PC already points at the next instruction, so a page crossing is measured
/// between that address and the target.
pub(crate) fn branch_if<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
    condition: impl Fn(&CPU<M>) -> bool,
) -> Result<StepOutcome, ExecutionError> {
    if !condition(cpu) {
        return Ok(StepOutcome::Continue);
    }

    let Some(target) = operand.address() else {
        return Ok(StepOutcome::Continue);
    };

    cpu.cycles += 1;
    if (cpu.pc & 0xFF00) != (target & 0xFF00) {
        cpu.cycles += 1;
    }
    cpu.pc = target;

    Ok(StepOutcome::Continue)
}
