//! Ordered capture of every sampled row of one subtune.

use crate::sampler::Row;
use crate::system::Region;

/// Rows of one subtune plus what the driver learned while producing them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dump {
    pub rows: Vec<Row>,
    /// CIA 1 timer A latch written by init.
    pub cia_latch: Option<u16>,
    /// Play calls per frame.
    pub multispeed: f64,
    /// Frequency registers at every note start.
    pub note_start_freqs: Vec<u16>,
}

impl Dump {
    pub fn new(multispeed: f64, cia_latch: Option<u16>) -> Self {
        Self {
            rows: Vec::new(),
            cia_latch,
            multispeed,
            note_start_freqs: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Estimates the concert pitch the tune's frequency table was built for.
    ///
    /// Each note start's offset from equal temperament at A4 = 440 Hz is
    /// folded into -50..50 cents and averaged. Returns `None` without notes.
    pub fn estimate_tuning(&self, region: Region) -> Option<f64> {
        let offsets: Vec<f64> = self
            .note_start_freqs
            .iter()
            .filter(|&&freq| freq != 0)
            .map(|&freq| {
                let cents = 1200.0 * (region.sid_frequency_hz(freq) / 440.0).log2();
                cents - 100.0 * (cents / 100.0).round()
            })
            .collect();

        if offsets.is_empty() {
            return None;
        }
        let mean = offsets.iter().sum::<f64>() / offsets.len() as f64;
        Some(440.0 * 2f64.powf(mean / 1200.0))
    }
}
