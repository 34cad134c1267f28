//! # Register Transfer Instructions
//!
//! TAX, TAY, TXA, TYA and TSX copy one register into another and update Z and N.
//! TXS copies X into SP and affects no flags.

use crate::addressing::OperandRef;
use crate::{ExecutionError, MemoryBus, StepOutcome, CPU};

/// Copies `from` into `to`, updating Z and N.
pub(crate) fn execute_transfer<M: MemoryBus>(
    cpu: &mut CPU<M>,
    from: OperandRef,
    to: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let value = from.get(cpu);
    to.set(cpu, value)?;
    cpu.set_nz(value);
    Ok(StepOutcome::Continue)
}

/// Executes TXS (Transfer X to Stack Pointer).
pub(crate) fn execute_txs<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<StepOutcome, ExecutionError> {
    cpu.sp = cpu.x;
    Ok(StepOutcome::Continue)
}
