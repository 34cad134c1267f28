//! Execution loop tests
//!
//! Verifies register state after construction and reset, the fetch-decode-execute
//! cycle, cycle counting and the access log.

use lib6510::{ExecutionError, ExitPolicy, FlatMemory, MemoryBus, StepOutcome, CPU};

fn setup_cpu() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::new(memory)
}

#[test]
fn test_new_cpu_power_on_state() {
    let cpu = setup_cpu();

    assert_eq!(cpu.pc(), 0x8000);
    assert_eq!(cpu.sp(), 0xFD);
    assert_eq!((cpu.a(), cpu.x(), cpu.y()), (0, 0, 0));
    assert_eq!(cpu.status(), 0x24);
    assert_eq!(cpu.cycles(), 0);
    assert_eq!(cpu.exit_policy(), ExitPolicy::disabled());
}

#[test]
fn test_reset_prepares_empty_stack_call() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().load(0x8000, &[0xEA, 0xEA]);
    cpu.step().unwrap();

    cpu.reset(0x1000, 0x01, 0x02, 0x03, 0xFF);

    assert_eq!(cpu.pc(), 0x1000);
    assert_eq!((cpu.a(), cpu.x(), cpu.y()), (0x01, 0x02, 0x03));
    assert_eq!(cpu.sp(), 0xFF);
    assert_eq!(cpu.cycles(), 0);
    // Break never survives a reset; bit 5 always reads as 1
    assert!(!cpu.flag_b());
    assert_eq!(cpu.status(), 0xEF);
}

#[test]
fn test_prepare_call_keeps_registers() {
    let mut cpu = setup_cpu();
    cpu.reset(0x1000, 0x11, 0x22, 0x33, 0x01);
    cpu.set_sp(0x80);

    cpu.prepare_call(0x2000);

    assert_eq!(cpu.pc(), 0x2000);
    assert_eq!(cpu.sp(), 0xFF);
    assert_eq!((cpu.a(), cpu.x(), cpu.y()), (0x11, 0x22, 0x33));
    assert!(cpu.flag_c());
}

#[test]
fn test_step_returns_unimplemented_error() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x8000, 0x03); // SLO (zp,X)

    assert_eq!(
        cpu.step(),
        Err(ExecutionError::UnimplementedOpcode {
            opcode: 0x03,
            address: 0x8000
        })
    );
    // Nothing executed
    assert_eq!(cpu.pc(), 0x8000);
    assert_eq!(cpu.cycles(), 0);
}

#[test]
fn test_step_increments_cycle_counter() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x8000, 0xEA);

    assert_eq!(cpu.step(), Ok(StepOutcome::Continue));
    assert_eq!(cpu.cycles(), 2, "NOP should add 2 cycles");
    assert_eq!(cpu.pc(), 0x8001);
}

#[test]
fn test_step_with_multi_byte_instruction() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().load(0x8000, &[0xAD, 0x34, 0x12]); // LDA $1234

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x8003);
    assert_eq!(cpu.cycles(), 4);
}

#[test]
fn test_run_for_cycles_executes_multiple_instructions() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().load(0x8000, &[0xEA; 16]);

    let consumed = cpu.run_for_cycles(10).unwrap();

    assert_eq!(consumed, 10);
    assert_eq!(cpu.pc(), 0x8005);
}

#[test]
fn test_run_for_cycles_stops_on_finished() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().load(0x1000, &[0xEA, 0x60, 0xEA, 0xEA]); // NOP; RTS
    cpu.set_exit_policy(ExitPolicy::when_stack_empty(ExitPolicy::DEFAULT_WRAP_ZONE));
    cpu.reset(0x1000, 0, 0, 0, 0);

    let consumed = cpu.run_for_cycles(100).unwrap();

    assert_eq!(consumed, 8);
    assert_eq!(cpu.sp(), 0xFF);
}

#[test]
fn test_run_for_cycles_propagates_errors() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().load(0x8000, &[0xEA, 0x02]); // NOP; JAM

    assert_eq!(
        cpu.run_for_cycles(100),
        Err(ExecutionError::Halted {
            opcode: 0x02,
            address: 0x8001
        })
    );
}

#[test]
fn test_pc_wraps_at_boundary() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0xFFFF, 0xEA);
    cpu.set_pc(0xFFFF);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x0000);
}

#[test]
fn test_access_log_records_operands() {
    let mut cpu = setup_cpu();
    // LDA $1234; STA $0314
    cpu.memory_mut()
        .load(0x8000, &[0xAD, 0x34, 0x12, 0x8D, 0x14, 0x03]);

    cpu.step().unwrap();
    cpu.step().unwrap();

    let memory = cpu.memory();
    assert!(memory.was_read(0x1234));
    assert!(!memory.was_written(0x1234));
    assert!(memory.was_written(0x0314));
    assert!(!memory.was_written(0x0315));
}

#[test]
fn test_peek_does_not_mark() {
    let mut memory = FlatMemory::new();
    memory.poke(0x2000, 0x99);

    assert_eq!(memory.peek(0x2000), 0x99);
    assert!(!memory.was_read(0x2000));
    assert_eq!(memory.read(0x2000), 0x99);
    assert!(memory.was_read(0x2000));
}
