//! 6510 CPU I/O Port implementation.
//!
//! The MOS 6510 CPU has a built-in 8-bit I/O port at addresses $00-$01:
//! - $00: Data Direction Register (DDR)
//! - $01: Data Register, whose low three bits select the memory configuration
//!
//! Bits 0-2 of the data register control C64 memory banking:
//! - Bit 0 (LORAM)
//! - Bit 1 (HIRAM): KERNAL ROM visible at $E000-$FFFF
//! - Bit 2 (CHAREN): together with the other two, I/O vs character ROM vs RAM at $D000-$DFFF
//!
//! The default configuration ($37) makes BASIC, KERNAL, and I/O visible.

/// Address of the banking control byte.
pub const CONTROL_ADDRESS: u16 = 0x0001;

/// Address of the data direction register.
pub const DDR_ADDRESS: u16 = 0x0000;

/// Power-on value of the control byte.
pub const DEFAULT_CONTROL: u8 = 0x37;

/// Which ROM and I/O regions are visible for one control byte.
///
/// | Low bits | $A000-$BFFF | $D000-$DFFF | $E000-$FFFF |
/// |----------|-------------|-------------|-------------|
/// | 0, 4     | RAM         | RAM         | RAM         |
/// | 1        | RAM         | CHAR ROM    | RAM         |
/// | 2        | RAM         | CHAR ROM    | KERNAL      |
/// | 3        | BASIC       | CHAR ROM    | KERNAL      |
/// | 5        | RAM         | I/O         | RAM         |
/// | 6        | RAM         | I/O         | KERNAL      |
/// | 7        | BASIC       | I/O         | KERNAL      |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankState {
    pub basic: bool,
    pub kernal: bool,
    pub io: bool,
    pub char_rom: bool,
}

impl BankState {
    /// Decodes the low three bits of a control byte.
    pub const fn from_control(value: u8) -> Self {
        let config = value & 0x07;
        Self {
            basic: config & 0x03 == 0x03,
            kernal: config & 0x02 != 0,
            io: matches!(config, 5..=7),
            char_rom: matches!(config, 1..=3),
        }
    }
}

impl Default for BankState {
    fn default() -> Self {
        Self::from_control(DEFAULT_CONTROL)
    }
}

/// 6510 CPU I/O port with its cached bank state.
#[derive(Debug, Clone)]
pub struct Port6510 {
    ddr: u8,
    data: u8,
    bank: BankState,
}

impl Port6510 {
    /// Create a port in the power-on configuration (DDR $2F, data $37).
    pub fn new() -> Self {
        Self {
            ddr: 0x2F,
            data: DEFAULT_CONTROL,
            bank: BankState::from_control(DEFAULT_CONTROL),
        }
    }

    /// Current bank state, recomputed on every data write.
    #[inline]
    pub fn bank(&self) -> BankState {
        self.bank
    }

    /// Get the raw data register value.
    #[inline]
    pub fn data(&self) -> u8 {
        self.data
    }

    /// Get the data direction register value.
    #[inline]
    pub fn ddr(&self) -> u8 {
        self.ddr
    }

    /// Write the data register and recompute visibility.
    pub fn set_data(&mut self, value: u8) {
        self.data = value;
        self.bank = BankState::from_control(value);
    }

    /// Write the data direction register.
    #[inline]
    pub fn set_ddr(&mut self, value: u8) {
        self.ddr = value;
    }
}

impl Default for Port6510 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_configuration() {
        let port = Port6510::new();
        assert_eq!(port.data(), 0x37);
        assert_eq!(port.ddr(), 0x2F);

        let bank = port.bank();
        assert!(bank.basic);
        assert!(bank.kernal);
        assert!(bank.io);
        assert!(!bank.char_rom);
    }

    #[test]
    fn test_truth_table() {
        // (low bits, basic, kernal, io, char_rom)
        let table = [
            (0b000, false, false, false, false),
            (0b001, false, false, false, true),
            (0b010, false, true, false, true),
            (0b011, true, true, false, true),
            (0b100, false, false, false, false),
            (0b101, false, false, true, false),
            (0b110, false, true, true, false),
            (0b111, true, true, true, false),
        ];

        for (bits, basic, kernal, io, char_rom) in table {
            let bank = BankState::from_control(bits);
            assert_eq!(
                bank,
                BankState {
                    basic,
                    kernal,
                    io,
                    char_rom
                },
                "control bits {:03b}",
                bits
            );
        }
    }

    #[test]
    fn test_set_data_recomputes() {
        let mut port = Port6510::new();
        port.set_data(0x34);
        assert_eq!(port.bank(), BankState::from_control(0x04));
        assert!(!port.bank().io);

        port.set_data(0x35);
        assert!(port.bank().io);
        assert!(!port.bank().kernal);
    }

    proptest! {
        /// Upper bits never influence banking
        #[test]
        fn prop_only_low_bits_matter(value in 0u8..=255u8) {
            prop_assert_eq!(BankState::from_control(value), BankState::from_control(value & 0x07));
        }

        /// With CHAREN set, I/O is visible whenever LORAM or HIRAM is
        #[test]
        fn prop_charen_selects_io(low in 1u8..=3u8) {
            prop_assert!(BankState::from_control(0b100 | low).io);
            prop_assert!(!BankState::from_control(low).io);
        }
    }
}
