//! # Control Flow Instructions
//!
//! This module implements control flow operations:
//! - JMP: Jump to address
//! - JSR / RTS: Subroutine call and return
//! - RTI: Return from interrupt
//! - BRK: Force Interrupt
//!
//! RTS and RTI consult the CPU's `ExitPolicy` before popping, which is how a
//! routine entered with an empty stack signals that it has returned to its caller.

use crate::addressing::OperandRef;
use crate::{ExecutionError, MemoryBus, StepOutcome, CPU};

/// Executes the JMP (Jump) instruction.
///
/// The operand is already the jump target: the absolute address, or for
/// `JMP ($xxxx)` the pointer contents read with the NMOS page-wrap bug.
pub(crate) fn execute_jmp<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    if let Some(target) = operand.address() {
        cpu.pc = target;
    }
    Ok(StepOutcome::Continue)
}

/// Executes the JSR (Jump to Subroutine) instruction.
///
/// Pushes the address of the last byte of the JSR instruction (return address - 1),
/// high byte first, then jumps.
pub(crate) fn execute_jsr<M: MemoryBus>(
    cpu: &mut CPU<M>,
    operand: OperandRef,
) -> Result<StepOutcome, ExecutionError> {
    let return_address = cpu.pc.wrapping_sub(1);
    cpu.push_word(return_address);

    if let Some(target) = operand.address() {
        cpu.pc = target;
    }
    Ok(StepOutcome::Continue)
}

/// Executes the RTS (Return from Subroutine) instruction.
///
/// Pops the return address and adds one. Finishes emulation instead when the
/// exit policy detects an empty stack.
pub(crate) fn execute_rts<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<StepOutcome, ExecutionError> {
    if cpu.exit_policy.fires(cpu.sp, 2) {
        log::trace!("RTS at ${:04X} with empty stack", cpu.instruction_address);
        return Ok(StepOutcome::Finished);
    }

    cpu.pc = cpu.pop_word().wrapping_add(1);
    Ok(StepOutcome::Continue)
}

/// Executes the RTI (Return from Interrupt) instruction.
///
/// Pops the status register (unused bit forced on, Break cleared) and then the
/// return address. Finishes emulation instead when the exit policy detects an
/// empty stack.
pub(crate) fn execute_rti<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<StepOutcome, ExecutionError> {
    if cpu.exit_policy.fires(cpu.sp, 3) {
        log::trace!("RTI at ${:04X} with empty stack", cpu.instruction_address);
        return Ok(StepOutcome::Finished);
    }

    let status = cpu.pop();
    cpu.set_status(status);
    cpu.flag_b = false;
    cpu.pc = cpu.pop_word();
    Ok(StepOutcome::Continue)
}

/// Executes the BRK (Force Interrupt) instruction.
///
/// Pushes PC+2 relative to the BRK opcode, then the status byte with B set,
/// sets I and loads PC from the IRQ vector at $FFFE/F. The B flag itself is
/// only set in the pushed copy.
pub(crate) fn execute_brk<M: MemoryBus>(cpu: &mut CPU<M>) -> Result<StepOutcome, ExecutionError> {
    // PC already points past the one-byte opcode; skip the padding byte as well
    let return_address = cpu.pc.wrapping_add(1);
    cpu.push_word(return_address);
    cpu.push(cpu.status() | 0b00110000);

    cpu.flag_i = true;

    let pc_low = cpu.memory.read(0xFFFE) as u16;
    let pc_high = cpu.memory.read(0xFFFF) as u16;
    cpu.pc = (pc_high << 8) | pc_low;

    Ok(StepOutcome::Continue)
}
