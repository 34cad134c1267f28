//! SID (MOS 6581/8580) register map.
//!
//! The SID is the C64's sound chip, featuring:
//! - 3 independent oscillator voices, 7 registers each
//! - 4 waveforms per voice (triangle, sawtooth, pulse, noise)
//! - ADSR envelope generator per voice
//! - Programmable multimode filter (LP/BP/HP)
//!
//! Only the register layout is modelled here; the note extractor reads the
//! registers a player routine wrote rather than synthesising audio.

use bitflags::bitflags;

/// Default base address of the first SID.
pub const SID_BASE: u16 = 0xD400;

/// Writable register count (29 registers at $D400-$D41C, 25 writable).
pub const SID_REGISTER_COUNT: u16 = 0x1D;

/// Size of the address block a SID decodes (registers mirror every 32 bytes).
pub const SID_BLOCK_SIZE: u16 = 0x20;

/// Last address of the window the first SID mirrors through.
pub const SID_MIRROR_END: u16 = 0xD7FF;

/// Number of voices in the SID.
pub const VOICE_COUNT: usize = 3;

/// Register stride between voices.
pub const VOICE_STRIDE: u16 = 7;

// Per-voice register offsets, relative to the voice base
pub const FREQ_LO: u16 = 0x00;
pub const FREQ_HI: u16 = 0x01;
pub const PW_LO: u16 = 0x02;
pub const PW_HI: u16 = 0x03;
pub const CONTROL: u16 = 0x04;
pub const ATTACK_DECAY: u16 = 0x05;
pub const SUSTAIN_RELEASE: u16 = 0x06;

// Global register offsets, relative to the chip base
pub const FILTER_CUTOFF_LO: u16 = 0x15;
pub const FILTER_CUTOFF_HI: u16 = 0x16;
pub const FILTER_RESONANCE_ROUTING: u16 = 0x17;
pub const MODE_VOLUME: u16 = 0x18;

/// Release times in milliseconds, indexed by the release nibble.
///
/// Decay uses the same table; attack is three times faster.
pub const RELEASE_MS: [u32; 16] = [
    6, 24, 48, 72, 114, 168, 204, 240, 300, 750, 1500, 2400, 3000, 9000, 15000, 24000,
];

bitflags! {
    /// Waveform select bits of a voice control register (upper nibble).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Waveform: u8 {
        const TRIANGLE = 0x10;
        const SAWTOOTH = 0x20;
        const PULSE = 0x40;
        const NOISE = 0x80;
    }
}

bitflags! {
    /// Lower nibble of a voice control register.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VoiceControl: u8 {
        const GATE = 0x01;
        const SYNC = 0x02;
        const RING = 0x04;
        const TEST = 0x08;
    }
}

bitflags! {
    /// Filter routing bits of $D417 (lower nibble).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FilterRouting: u8 {
        const VOICE1 = 0x01;
        const VOICE2 = 0x02;
        const VOICE3 = 0x04;
        const EXTERNAL = 0x08;
    }
}

bitflags! {
    /// Filter mode bits of $D418 (upper nibble).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FilterMode: u8 {
        const LOW_PASS = 0x10;
        const BAND_PASS = 0x20;
        const HIGH_PASS = 0x40;
        const VOICE3_OFF = 0x80;
    }
}

impl FilterRouting {
    /// Routing bit for a voice index (0-2).
    pub fn voice(voice: usize) -> Self {
        Self::from_bits_truncate(1 << voice)
    }
}

/// Address of a voice register on the chip at `base`.
#[inline]
pub fn voice_register(base: u16, voice: usize, offset: u16) -> u16 {
    base + voice as u16 * VOICE_STRIDE + offset
}

/// Returns the voice index (0-2) whose control register sits at `offset`
/// from a chip base.
pub fn control_register_voice(offset: u16) -> Option<usize> {
    (0..VOICE_COUNT).find(|&voice| voice as u16 * VOICE_STRIDE + CONTROL == offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_register_layout() {
        assert_eq!(voice_register(SID_BASE, 0, FREQ_LO), 0xD400);
        assert_eq!(voice_register(SID_BASE, 1, CONTROL), 0xD40B);
        assert_eq!(voice_register(SID_BASE, 2, SUSTAIN_RELEASE), 0xD414);
        assert_eq!(voice_register(0xD420, 0, CONTROL), 0xD424);
    }

    #[test]
    fn test_control_register_voice() {
        assert_eq!(control_register_voice(0x04), Some(0));
        assert_eq!(control_register_voice(0x0B), Some(1));
        assert_eq!(control_register_voice(0x12), Some(2));
        assert_eq!(control_register_voice(0x05), None);
    }

    #[test]
    fn test_release_table_monotonic() {
        assert!(RELEASE_MS.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(RELEASE_MS[0], 6);
        assert_eq!(RELEASE_MS[15], 24000);
    }
}
