//! C64 bank switching and I/O mirroring through the CPU-visible bus.

use lib6510::MemoryBus;
use proptest::prelude::*;
use sid_notes::{BankState, C64Memory};
use sid_notes::system::{BASIC_ROM_SIZE, CHAR_ROM_SIZE, KERNAL_ROM_SIZE};

fn memory_with_roms() -> C64Memory {
    let mut memory = C64Memory::new();
    memory.load_basic(&[0xBA; BASIC_ROM_SIZE]);
    memory.load_kernal(&[0xCE; KERNAL_ROM_SIZE]);
    memory.load_charrom(&[0xC4; CHAR_ROM_SIZE]);
    // RAM under every banked region, plus one I/O register
    memory.ram_mut().poke(0xA000, 0x01);
    memory.ram_mut().poke(0xD800, 0x02);
    memory.ram_mut().poke(0xE000, 0x03);
    memory.write(0xD800, 0x0E);
    memory
}

#[test]
fn test_truth_table_through_bus() {
    // (control, $A000, $D800, $E000)
    let table = [
        (0x30, 0x01, 0x02, 0x03),
        (0x31, 0x01, 0xC4, 0x03),
        (0x32, 0x01, 0xC4, 0xCE),
        (0x33, 0xBA, 0xC4, 0xCE),
        (0x34, 0x01, 0x02, 0x03),
        (0x35, 0x01, 0x0E, 0x03),
        (0x36, 0x01, 0x0E, 0xCE),
        (0x37, 0xBA, 0x0E, 0xCE),
    ];

    let mut memory = memory_with_roms();
    for (control, basic, io, kernal) in table {
        memory.write(0x0001, control);
        assert_eq!(memory.bank(), BankState::from_control(control));
        assert_eq!(memory.read(0xA000), basic, "control ${:02X} at $A000", control);
        assert_eq!(memory.read(0xD800), io, "control ${:02X} at $D800", control);
        assert_eq!(memory.read(0xE000), kernal, "control ${:02X} at $E000", control);
    }
}

#[test]
fn test_fixed_ram_windows() {
    let mut memory = memory_with_roms();
    for control in 0x30..=0x37 {
        memory.write(0x0001, control);
        memory.write(0x9FFF, control);
        memory.write(0xC000, control);
        assert_eq!(memory.read(0x9FFF), control);
        assert_eq!(memory.read(0xC000), control);
    }
}

#[test]
fn test_rom_writes_land_in_ram() {
    let mut memory = memory_with_roms();
    memory.write(0xE123, 0x77);
    assert_eq!(memory.read(0xE123), 0xCE);
    memory.write(0x0001, 0x35);
    assert_eq!(memory.read(0xE123), 0x77);
}

#[test]
fn test_unmirrored_io() {
    let mut memory = C64Memory::new();
    memory.write(0xD800, 0x01);
    memory.write(0xDE00, 0x02);
    assert_eq!(memory.read(0xD800), 0x01);
    assert_eq!(memory.read(0xD840), 0x00);
    assert_eq!(memory.read(0xDE00), 0x02);
    assert_eq!(memory.read(0xDE20), 0x00);
}

proptest! {
    /// Flipping CHAREN only matters when LORAM or HIRAM is set
    #[test]
    fn prop_charen_flip(low in 0u8..4u8) {
        let without = BankState::from_control(low);
        let with = BankState::from_control(low | 0b100);
        if low == 0 {
            prop_assert_eq!(without, with);
        } else {
            prop_assert!(with.io && !without.io);
            prop_assert_eq!(with.basic, without.basic);
            prop_assert_eq!(with.kernal, without.kernal);
        }
    }

    /// A write anywhere in a mirrored block reads back at every address of its class
    #[test]
    fn prop_mirror_classes(
        (block_start, block_end, block_size) in prop_oneof![
            Just((0xD000u16, 0xD3FFu16, 0x40u16)),
            Just((0xD400u16, 0xD7FFu16, 0x20u16)),
            Just((0xDC00u16, 0xDCFFu16, 0x10u16)),
            Just((0xDD00u16, 0xDDFFu16, 0x10u16)),
        ],
        write_offset in 0u16..0x400,
        read_offset in 0u16..0x400,
        value in any::<u8>(),
    ) {
        let span = block_end - block_start + 1;
        let write_addr = block_start + write_offset % span;
        let register = write_addr % block_size;
        let read_addr = block_start + (read_offset % span) / block_size * block_size + register;

        let canonical = block_start + register;
        let hardwired = (0xD02F..=0xD03F).contains(&canonical)
            || (0xD41D..=0xD41F).contains(&canonical);

        let mut memory = C64Memory::new();
        memory.write(write_addr, value);
        let expected = if hardwired { 0xFF } else { value };
        prop_assert_eq!(memory.read(read_addr), expected);
    }
}
