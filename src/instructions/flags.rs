//! # Status Flag Instructions
//!
//! CLC, SEC, CLI, SEI, CLD, SED and CLV each set or clear a single flag.
//! All take 2 cycles and affect no other state.

use crate::{ExecutionError, MemoryBus, StepOutcome, CPU};

/// Applies a single flag assignment.
pub(crate) fn assign<M: MemoryBus>(
    cpu: &mut CPU<M>,
    update: impl FnOnce(&mut CPU<M>),
) -> Result<StepOutcome, ExecutionError> {
    update(cpu);
    Ok(StepOutcome::Continue)
}
