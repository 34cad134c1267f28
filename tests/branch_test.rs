//! Tests for the conditional branch instructions.
//!
//! Cycle timing: 2 when not taken, 3 when taken within the page of the next
//! instruction, 4 when the target is on another page.

use lib6510::{FlatMemory, MemoryBus, CPU};

fn setup_cpu() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::new(memory)
}

#[test]
fn test_bne_not_taken() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x8000, 0xD0);
    cpu.memory_mut().write(0x8001, 0x10);
    cpu.set_flag_z(true);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x8002);
    assert_eq!(cpu.cycles(), 2);
}

#[test]
fn test_beq_taken_forward() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x8000, 0xF0);
    cpu.memory_mut().write(0x8001, 0x10);
    cpu.set_flag_z(true);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x8012);
    assert_eq!(cpu.cycles(), 3);
}

#[test]
fn test_bmi_taken_backward_across_page() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x8000, 0x30);
    cpu.memory_mut().write(0x8001, 0xFC); // -4
    cpu.set_flag_n(true);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x7FFE);
    assert_eq!(cpu.cycles(), 4);
}

#[test]
fn test_bpl_branch_to_self_offset() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write(0x8000, 0x10);
    cpu.memory_mut().write(0x8001, 0xFE); // -2: branch to itself
    cpu.set_flag_n(false);

    cpu.step().unwrap();

    assert_eq!(cpu.pc(), 0x8000);
    assert_eq!(cpu.cycles(), 3);
}

#[test]
fn test_each_branch_tests_its_flag() {
    // (opcode, flag setter, value that takes the branch)
    let cases: [(u8, fn(&mut CPU<FlatMemory>, bool), bool); 8] = [
        (0x90, CPU::set_flag_c, false),
        (0xB0, CPU::set_flag_c, true),
        (0xD0, CPU::set_flag_z, false),
        (0xF0, CPU::set_flag_z, true),
        (0x10, CPU::set_flag_n, false),
        (0x30, CPU::set_flag_n, true),
        (0x50, CPU::set_flag_v, false),
        (0x70, CPU::set_flag_v, true),
    ];

    for (opcode, set_flag, taken_when) in cases {
        for flag in [false, true] {
            let mut cpu = setup_cpu();
            cpu.memory_mut().write(0x8000, opcode);
            cpu.memory_mut().write(0x8001, 0x04);
            set_flag(&mut cpu, flag);

            cpu.step().unwrap();

            let expected = if flag == taken_when { 0x8006 } else { 0x8002 };
            assert_eq!(cpu.pc(), expected, "opcode 0x{:02X} flag {}", opcode, flag);
        }
    }
}
