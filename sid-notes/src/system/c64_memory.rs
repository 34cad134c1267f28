//! C64 memory system with bank switching.
//!
//! The C64 has a complex memory architecture where multiple ROMs, RAM,
//! and I/O devices are mapped to overlapping address ranges. The 6510
//! CPU's I/O port ($00-$01) controls which components are visible.
//!
//! Memory Map:
//! - $0000-$0001: 6510 I/O port
//! - $0002-$9FFF: RAM (always)
//! - $A000-$BFFF: BASIC ROM or RAM
//! - $C000-$CFFF: RAM (always)
//! - $D000-$DFFF: I/O, Character ROM, or RAM
//! - $E000-$FFFF: KERNAL ROM or RAM
//!
//! No device behind the I/O window is emulated. The window is a plain 4KB
//! register file with the chips' address decoding applied, so a music
//! routine's register writes can be read back afterwards.

use std::ops::RangeInclusive;

use crate::devices::cia::{CIA1_BASE, CIA2_BASE, CIA_BLOCK_SIZE};
use crate::devices::port_6510::{BankState, CONTROL_ADDRESS, DDR_ADDRESS};
use crate::devices::sid::{SID_BASE, SID_BLOCK_SIZE};
use crate::devices::Port6510;
use lib6510::{Access, FlatMemory, MemoryBus};

/// C64 I/O area start address.
const IO_START: u16 = 0xD000;
/// C64 I/O area end address (inclusive).
const IO_END: u16 = 0xDFFF;
/// BASIC ROM start address.
const BASIC_START: u16 = 0xA000;
/// BASIC ROM end address (inclusive).
const BASIC_END: u16 = 0xBFFF;
/// KERNAL ROM start address.
const KERNAL_START: u16 = 0xE000;

/// BASIC ROM image size.
pub const BASIC_ROM_SIZE: usize = 8192;
/// KERNAL ROM image size.
pub const KERNAL_ROM_SIZE: usize = 8192;
/// Character ROM image size.
pub const CHAR_ROM_SIZE: usize = 4096;

/// VIC-II registers repeat every 64 bytes across $D000-$D3FF.
const VIC_BLOCK_SIZE: u16 = 0x40;

/// Unconnected VIC-II and SID registers, canonical addresses.
const VIC_UNUSED: RangeInclusive<u16> = 0xD02F..=0xD03F;
const SID_UNUSED: RangeInclusive<u16> = 0xD41D..=0xD41F;

/// One store seen by the write observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedWrite {
    /// Address the CPU wrote, before mirroring.
    pub address: u16,
    /// Value written.
    pub value: u8,
}

#[derive(Debug, Clone)]
struct WriteObserver {
    window: RangeInclusive<u16>,
    writes: Vec<ObservedWrite>,
}

/// C64 memory system implementing bank switching over an access-logged RAM.
pub struct C64Memory {
    /// 64KB main RAM with its access log.
    ram: FlatMemory,

    /// $D000-$DFFF register file seen when I/O is banked in.
    io: Box<[u8; 4096]>,

    /// BASIC ROM (8KB at $A000-$BFFF), if supplied.
    basic_rom: Option<Box<[u8; BASIC_ROM_SIZE]>>,
    /// KERNAL ROM (8KB at $E000-$FFFF), if supplied.
    kernal_rom: Option<Box<[u8; KERNAL_ROM_SIZE]>>,
    /// Character ROM (4KB at $D000-$DFFF when visible), if supplied.
    char_rom: Option<Box<[u8; CHAR_ROM_SIZE]>>,

    /// 6510 I/O port (bank switching control).
    port: Port6510,

    /// SID base addresses in chip order.
    sid_bases: Vec<u16>,
    /// False when an extra SID lives inside the first SID's mirror range.
    sid_mirroring: bool,

    observer: Option<WriteObserver>,
}

impl C64Memory {
    /// Create a memory system with zeroed RAM, no ROMs and one SID at $D400.
    pub fn new() -> Self {
        let mut ram = FlatMemory::new();
        ram.poke(DDR_ADDRESS, 0x2F);
        ram.poke(CONTROL_ADDRESS, 0x37);

        Self {
            ram,
            io: Box::new([0; 4096]),
            basic_rom: None,
            kernal_rom: None,
            char_rom: None,
            port: Port6510::new(),
            sid_bases: vec![SID_BASE],
            sid_mirroring: true,
            observer: None,
        }
    }

    /// Load the BASIC ROM image.
    pub fn load_basic(&mut self, image: &[u8; BASIC_ROM_SIZE]) {
        self.basic_rom = Some(Box::new(*image));
    }

    /// Load the KERNAL ROM image.
    pub fn load_kernal(&mut self, image: &[u8; KERNAL_ROM_SIZE]) {
        self.kernal_rom = Some(Box::new(*image));
    }

    /// Load the character ROM image.
    pub fn load_charrom(&mut self, image: &[u8; CHAR_ROM_SIZE]) {
        self.char_rom = Some(Box::new(*image));
    }

    /// Configure the SID chip bases.
    ///
    /// SID mirroring across $D400-$D7FF is switched off when a second chip
    /// is decoded inside that window.
    pub fn set_sid_bases(&mut self, bases: &[u16]) {
        self.sid_bases = bases.to_vec();
        self.sid_mirroring = !bases
            .iter()
            .skip(1)
            .any(|base| (0xD400..=0xD7FF).contains(base));
    }

    /// True while $D400-$D7FF mirrors the first chip.
    pub fn sid_mirroring(&self) -> bool {
        self.sid_mirroring
    }

    /// Configured SID bases, first chip first.
    pub fn sid_bases(&self) -> &[u16] {
        &self.sid_bases
    }

    /// Current bank state.
    #[inline]
    pub fn bank(&self) -> BankState {
        self.port.bank()
    }

    /// Set the banking control byte without logging an access.
    pub fn set_control(&mut self, value: u8) {
        self.port.set_data(value);
        self.ram.poke(CONTROL_ADDRESS, value);
    }

    /// Bank I/O back in, keeping BASIC/KERNAL selection where the truth table allows.
    ///
    /// Configurations 1-3 become 5-7; the all-RAM configurations 0 and 4 become 5.
    pub fn force_io_visible(&mut self) {
        if self.bank().io {
            return;
        }
        let mut control = self.port.data() | 0x04;
        if control & 0x03 == 0 {
            control |= 0x01;
        }
        self.set_control(control);
    }

    /// Start recording every store that falls inside `window`.
    ///
    /// Any previously recorded writes are discarded.
    pub fn observe_writes(&mut self, window: RangeInclusive<u16>) {
        self.observer = Some(WriteObserver {
            window,
            writes: Vec::new(),
        });
    }

    /// Drain the writes recorded since the last call.
    pub fn take_observed_writes(&mut self) -> Vec<ObservedWrite> {
        self.observer
            .as_mut()
            .map(|observer| std::mem::take(&mut observer.writes))
            .unwrap_or_default()
    }

    /// Underlying RAM with its access log.
    pub fn ram(&self) -> &FlatMemory {
        &self.ram
    }

    /// Mutable access to RAM, for loading payloads.
    pub fn ram_mut(&mut self) -> &mut FlatMemory {
        &mut self.ram
    }

    /// Returns true if the CPU wrote `addr` since the log was last cleared.
    pub fn was_written(&self, addr: u16) -> bool {
        self.ram.was_written(addr)
    }

    /// Forget every recorded read and write.
    pub fn clear_access_log(&mut self) {
        self.ram.clear_access_log();
    }

    /// Read an I/O register regardless of the bank state.
    ///
    /// `addr` must lie in $D000-$DFFF; mirroring applies as for CPU reads.
    pub fn io_register(&self, addr: u16) -> u8 {
        let canonical = self.canonical_io_address(addr);
        if Self::hardwired(canonical) {
            0xFF
        } else {
            self.io[(canonical - IO_START) as usize]
        }
    }

    /// Little-endian word stored in RAM, ignoring ROM overlays.
    pub fn ram_word(&self, addr: u16) -> u16 {
        let low = self.ram.peek(addr) as u16;
        let high = self.ram.peek(addr.wrapping_add(1)) as u16;
        (high << 8) | low
    }

    /// Maps an I/O address to the register it decodes to.
    pub fn canonical_io_address(&self, addr: u16) -> u16 {
        match addr {
            0xD000..=0xD3FF => IO_START + addr % VIC_BLOCK_SIZE,
            0xD400..=0xD7FF if self.sid_mirroring => SID_BASE + addr % SID_BLOCK_SIZE,
            0xDC00..=0xDCFF => CIA1_BASE + addr % CIA_BLOCK_SIZE,
            0xDD00..=0xDDFF => CIA2_BASE + addr % CIA_BLOCK_SIZE,
            _ => addr,
        }
    }

    fn hardwired(canonical: u16) -> bool {
        VIC_UNUSED.contains(&canonical) || SID_UNUSED.contains(&canonical)
    }

    fn fetch(&self, addr: u16) -> u8 {
        let bank = self.port.bank();
        match addr {
            DDR_ADDRESS => self.port.ddr(),
            CONTROL_ADDRESS => self.port.data(),

            BASIC_START..=BASIC_END => match &self.basic_rom {
                Some(rom) if bank.basic => rom[(addr - BASIC_START) as usize],
                _ => self.ram.peek(addr),
            },

            IO_START..=IO_END => {
                if bank.io {
                    self.io_register(addr)
                } else {
                    match &self.char_rom {
                        Some(rom) if bank.char_rom => rom[(addr - IO_START) as usize],
                        _ => self.ram.peek(addr),
                    }
                }
            }

            KERNAL_START..=0xFFFF => match &self.kernal_rom {
                Some(rom) if bank.kernal => rom[(addr - KERNAL_START) as usize],
                _ => self.ram.peek(addr),
            },

            // $0002-$9FFF and $C000-$CFFF
            _ => self.ram.peek(addr),
        }
    }
}

impl Default for C64Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for C64Memory {
    fn read(&self, addr: u16) -> u8 {
        self.ram.mark(addr, Access::READ);
        self.fetch(addr)
    }

    fn write(&mut self, addr: u16, value: u8) {
        if let Some(observer) = self.observer.as_mut() {
            if observer.window.contains(&addr) {
                observer.writes.push(ObservedWrite {
                    address: addr,
                    value,
                });
            }
        }
        self.ram.mark(addr, Access::WRITTEN);

        match addr {
            DDR_ADDRESS => {
                self.port.set_ddr(value);
                self.ram.poke(addr, value);
            }
            CONTROL_ADDRESS => self.set_control(value),
            IO_START..=IO_END if self.port.bank().io => {
                let canonical = self.canonical_io_address(addr);
                if !Self::hardwired(canonical) {
                    self.io[(canonical - IO_START) as usize] = value;
                }
            }
            // RAM, including everything under the ROMs
            _ => self.ram.poke(addr, value),
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        self.fetch(addr)
    }
}
