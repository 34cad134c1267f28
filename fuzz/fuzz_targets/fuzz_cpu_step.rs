//! Fuzz target for CPU step execution.
//!
//! Creates arbitrary CPU states and memory contents, then executes one
//! instruction. Any error is acceptable; panics and impossible cycle counts
//! are not.

#![no_main]

use arbitrary::Arbitrary;
use lib6510::{ExitPolicy, FlatMemory, StepOutcome, CPU, OPCODE_TABLE};
use libfuzzer_sys::fuzz_target;

/// Arbitrary CPU initial state for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    status: u8,
    exit_on_empty_stack: bool,
    wrap_zone: u8,
}

/// Memory region for fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzMemory {
    /// Bytes at the PC location (instruction + operands)
    instruction_bytes: [u8; 3],
    zero_page: [u8; 256],
    stack_page: [u8; 256],
    /// Target of absolute addressing at $4000
    main_memory: [u8; 256],
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cpu_state: FuzzCpuState,
    memory: FuzzMemory,
}

fuzz_target!(|input: FuzzInput| {
    let mut memory = FlatMemory::new();
    memory.load(0xFFFC, &[0x00, 0x80]);
    memory.load(0xFFFE, &[0x00, 0x90]);
    memory.load(0x8000, &input.memory.instruction_bytes);
    memory.load(0x0000, &input.memory.zero_page);
    memory.load(0x0100, &input.memory.stack_page);
    memory.load(0x4000, &input.memory.main_memory);

    let mut cpu = CPU::new(memory);
    let state = &input.cpu_state;
    cpu.set_a(state.a);
    cpu.set_x(state.x);
    cpu.set_y(state.y);
    cpu.set_sp(state.sp);
    cpu.set_status(state.status);
    if state.exit_on_empty_stack {
        cpu.set_exit_policy(ExitPolicy::when_stack_empty(state.wrap_zone));
    }

    let opcode = input.memory.instruction_bytes[0];
    match cpu.step() {
        Ok(StepOutcome::Continue) => {
            let base = OPCODE_TABLE[opcode as usize].base_cycles as u64;
            // Page crossing and taken branches add at most two cycles
            assert!(cpu.cycles() >= base && cpu.cycles() <= base + 2);
            assert_eq!(cpu.status() & 0x20, 0x20);
        }
        Ok(StepOutcome::Finished) => assert!(matches!(opcode, 0x40 | 0x60)),
        Err(_) => assert_eq!(cpu.cycles(), 0),
    }
});
