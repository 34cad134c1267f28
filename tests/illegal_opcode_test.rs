//! Undocumented opcode handling: no-op variants execute with their real sizes
//! and cycle costs, JAM halts, everything else is rejected.

use lib6510::{ExecutionError, FlatMemory, MemoryBus, Mnemonic, CPU, OPCODE_TABLE};

fn setup_cpu() -> CPU<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write(0xFFFC, 0x00);
    memory.write(0xFFFD, 0x80);
    CPU::new(memory)
}

#[test]
fn test_undocumented_nop_sizes_and_cycles() {
    // (opcode, size, cycles)
    let cases = [
        (0x1A, 1, 2),
        (0xFA, 1, 2),
        (0x80, 2, 2),
        (0xE2, 2, 2),
        (0x04, 2, 3),
        (0x64, 2, 3),
        (0x14, 2, 4),
        (0xF4, 2, 4),
        (0x0C, 3, 4),
        (0x1C, 3, 4),
        (0xFC, 3, 4),
    ];

    for (opcode, size, cycles) in cases {
        let mut cpu = setup_cpu();
        cpu.memory_mut().load(0x8000, &[opcode, 0x10, 0x20]);
        cpu.set_a(0x55);
        let status = cpu.status();

        cpu.step().unwrap();

        assert_eq!(cpu.pc(), 0x8000 + size, "opcode 0x{:02X}", opcode);
        assert_eq!(cpu.cycles(), cycles, "opcode 0x{:02X}", opcode);
        assert_eq!(cpu.a(), 0x55);
        assert_eq!(cpu.status(), status);
    }
}

#[test]
fn test_undocumented_nop_absolute_x_page_penalty() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().load(0x8000, &[0x3C, 0xFF, 0x20]);
    cpu.set_x(0x01);

    cpu.step().unwrap();

    assert_eq!(cpu.cycles(), 5);
}

#[test]
fn test_every_jam_opcode_halts() {
    let jams: Vec<u8> = (0..=255u8)
        .filter(|&op| OPCODE_TABLE[op as usize].mnemonic == Mnemonic::Jam)
        .collect();
    assert_eq!(
        jams,
        vec![0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2]
    );

    for opcode in jams {
        let mut cpu = setup_cpu();
        cpu.memory_mut().write(0x8000, opcode);

        assert_eq!(
            cpu.step(),
            Err(ExecutionError::Halted {
                opcode,
                address: 0x8000
            })
        );
    }
}

#[test]
fn test_side_effect_opcodes_are_unimplemented() {
    // LAX, SAX, DCP, ISC, SLO and the SBC alias
    for opcode in [0xA7u8, 0x87, 0xC7, 0xE7, 0x07, 0xEB] {
        let mut cpu = setup_cpu();
        cpu.memory_mut().write(0x8000, opcode);

        let err = cpu.step().unwrap_err();
        assert_eq!(
            err,
            ExecutionError::UnimplementedOpcode {
                opcode,
                address: 0x8000
            }
        );
        assert!(err.to_string().contains("$8000"));
    }
}
