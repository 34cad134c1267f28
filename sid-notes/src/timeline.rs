//! Sparse per-voice note timeline.
//!
//! Every field of a `DeltaRow` other than its time is optional: `None` means
//! "unchanged since the previous row of this voice". Times are in milliframes
//! (1/1000 of a video frame), so multispeed tunes keep integer timestamps.

use serde::{Deserialize, Serialize};

use crate::devices::sid::{Waveform, VOICE_COUNT};
use crate::notes::VoiceEvent;
use crate::sampler::Channel;

/// Milliframes in one frame.
pub const MILLIFRAMES_PER_FRAME: u32 = 1000;

/// Gate change carried by a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gate {
    Off,
    On,
}

/// One change on one voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeltaRow {
    /// Milliframes since the first play call.
    pub time: u64,
    /// MIDI note of a starting note.
    pub note: Option<u8>,
    pub gate: Option<Gate>,
    /// Raw SID frequency register.
    pub freq: Option<u16>,
    /// Instrument table index.
    pub new_instrument: Option<usize>,
    /// Row duration in milliframes from this row on.
    pub new_tempo: Option<u32>,
}

/// Sound settings a note starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub waveform: u8,
    pub attack_decay: u8,
    pub sustain_release: u8,
}

impl Instrument {
    /// Instrument of a sampled channel.
    pub fn from_channel(channel: &Channel) -> Self {
        Self {
            waveform: channel.waveform.bits(),
            attack_decay: channel.attack_decay(),
            sustain_release: channel.sustain_release(),
        }
    }

    /// Waveform select bits.
    pub fn waveform(&self) -> Waveform {
        Waveform::from_bits_truncate(self.waveform)
    }
}

/// Distinct instruments in order of first use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstrumentTable {
    entries: Vec<Instrument>,
}

impl InstrumentTable {
    /// Index of `instrument`, adding it when new.
    pub fn index_of(&mut self, instrument: Instrument) -> usize {
        match self.entries.iter().position(|entry| *entry == instrument) {
            Some(index) => index,
            None => {
                self.entries.push(instrument);
                self.entries.len() - 1
            }
        }
    }

    /// Instrument by index.
    pub fn get(&self, index: usize) -> Option<&Instrument> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.entries.iter()
    }
}

/// Two alternating row durations ("funktable").
///
/// Some players alternate a long and a short tick to get a swing feel. One
/// `SwingTempo` is owned per subtune import and read by every voice of it, so
/// all voices agree on the duration of each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwingTempo {
    durations: [u32; 2],
    index: usize,
}

impl SwingTempo {
    /// Alternates between `first` and `second` milliframes, starting with `first`.
    pub fn new(first: u32, second: u32) -> Self {
        Self {
            durations: [first, second],
            index: 0,
        }
    }

    /// Duration of the current row.
    pub fn current(&self) -> u32 {
        self.durations[self.index]
    }

    /// Moves on to the next row.
    pub fn advance(&mut self) {
        self.index ^= 1;
    }
}

/// Row duration source of one subtune import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tempo {
    /// Every row lasts the same number of milliframes.
    Fixed(u32),
    Swing(SwingTempo),
}

impl Tempo {
    /// Fixed tempo for `multispeed` play calls per frame.
    pub fn for_multispeed(multispeed: f64) -> Self {
        Tempo::Fixed((MILLIFRAMES_PER_FRAME as f64 / multispeed).round().max(1.0) as u32)
    }

    /// Duration of the current row in milliframes.
    pub fn row_duration(&self) -> u32 {
        match self {
            Tempo::Fixed(duration) => *duration,
            Tempo::Swing(swing) => swing.current(),
        }
    }

    /// Moves on to the next row.
    pub fn advance(&mut self) {
        if let Tempo::Swing(swing) = self {
            swing.advance();
        }
    }
}

/// Timeline of every voice of one subtune.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timeline {
    /// One row list per voice, three voices per chip.
    pub voices: Vec<Vec<DeltaRow>>,
    pub instruments: InstrumentTable,
    #[serde(skip)]
    tempos: Vec<Option<u32>>,
}

impl Timeline {
    /// Empty timeline for `chips` SIDs.
    pub fn new(chips: usize) -> Self {
        let voices = chips * VOICE_COUNT;
        Self {
            voices: vec![Vec::new(); voices],
            instruments: InstrumentTable::default(),
            tempos: vec![None; voices],
        }
    }

    /// Appends the event of one voice at `time`.
    ///
    /// A row is written when the event carries a change, on the voice's first
    /// call, and whenever the row duration differs from the last one written.
    pub fn append(&mut self, voice: usize, time: u64, event: &VoiceEvent, tempo: &Tempo) {
        let Some(rows) = self.voices.get_mut(voice) else {
            return;
        };
        if self.tempos.len() <= voice {
            self.tempos.resize(voice + 1, None);
        }

        let duration = tempo.row_duration();
        let new_tempo = (self.tempos[voice] != Some(duration)).then_some(duration);
        if event.is_empty() && new_tempo.is_none() {
            return;
        }

        self.tempos[voice] = Some(duration);
        rows.push(DeltaRow {
            time,
            note: event.note,
            gate: event.gate,
            freq: event.freq,
            new_instrument: event.new_instrument,
            new_tempo,
        });
    }

    /// Rows of one voice.
    pub fn voice(&self, voice: usize) -> &[DeltaRow] {
        self.voices.get(voice).map(Vec::as_slice).unwrap_or(&[])
    }
}
