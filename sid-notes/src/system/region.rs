//! C64 video standard and the timing derived from it.

use serde::{Deserialize, Serialize};

/// C64 region (PAL or NTSC) affecting timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// PAL (European) timing: 985,248 Hz, ~50 Hz, 312 scanlines
    #[default]
    Pal,
    /// NTSC (American) timing: 1,022,727 Hz, ~60 Hz, 263 scanlines
    Ntsc,
}

impl Region {
    /// Get the CPU clock frequency in Hz.
    pub fn clock_hz(&self) -> u32 {
        match self {
            Region::Pal => 985_248,
            Region::Ntsc => 1_022_727,
        }
    }

    /// Get the number of scanlines per frame.
    pub fn scanlines(&self) -> u16 {
        match self {
            Region::Pal => 312,
            Region::Ntsc => 263,
        }
    }

    /// Get the cycles per scanline.
    pub fn cycles_per_line(&self) -> u16 {
        match self {
            Region::Pal => 63,
            Region::Ntsc => 65,
        }
    }

    /// Get the number of visible scanlines.
    pub fn visible_lines(&self) -> u16 {
        match self {
            Region::Pal => 284,
            Region::Ntsc => 235,
        }
    }

    /// Get the total cycles per frame.
    pub fn cycles_per_frame(&self) -> u32 {
        self.scanlines() as u32 * self.cycles_per_line() as u32
    }

    /// Get the frame rate in Hz.
    pub fn frame_rate(&self) -> f64 {
        self.clock_hz() as f64 / self.cycles_per_frame() as f64
    }

    /// Duration of one frame in milliseconds.
    pub fn frame_duration_ms(&self) -> f64 {
        1000.0 / self.frame_rate()
    }

    /// CIA 1 timer A latch the KERNAL programs for its 60 Hz-ish system interrupt.
    ///
    /// A music routine that writes a smaller latch is being called more often
    /// than once per frame.
    pub fn cia_default_latch(&self) -> u16 {
        match self {
            Region::Pal => 0x4025,
            Region::Ntsc => 0x4295,
        }
    }

    /// Oscillator frequency in Hz for a 16-bit SID frequency register value.
    ///
    /// The SID adds the register to a 24-bit phase accumulator once per clock.
    pub fn sid_frequency_hz(&self, register: u16) -> f64 {
        register as f64 * self.clock_hz() as f64 / (1u32 << 24) as f64
    }
}
