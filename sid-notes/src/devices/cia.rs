//! CIA 6526 register addresses the driver watches.
//!
//! Players that run faster than once per frame reprogram CIA 1 timer A, which
//! drives the KERNAL's system interrupt. Only the latch registers matter here;
//! the timers themselves are not clocked.

/// CIA 1 base address (keyboard, joystick, system IRQ).
pub const CIA1_BASE: u16 = 0xDC00;

/// CIA 2 base address (serial bus, VIC bank, NMI).
pub const CIA2_BASE: u16 = 0xDD00;

/// Registers mirror every 16 bytes within the CIA's page.
pub const CIA_BLOCK_SIZE: u16 = 0x10;

/// CIA 1 timer A latch, low byte.
pub const CIA1_TIMER_A_LO: u16 = CIA1_BASE + 0x04;

/// CIA 1 timer A latch, high byte.
pub const CIA1_TIMER_A_HI: u16 = CIA1_BASE + 0x05;
