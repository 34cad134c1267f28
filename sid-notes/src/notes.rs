//! Note extraction from sampled chip state.
//!
//! A voice "sounds" while its gate is on, its test bit is off, it has a
//! waveform selected and it is not the muted third voice. Every play call
//! each voice is compared with what it was doing on the previous call, and the
//! differences become a `VoiceEvent` for the timeline.
//!
//! The gate-off of a note is reported on the call its voice stops sounding.
//! With `notes_in_release`, a pitch change after that, while the release is
//! still audible, starts a note without reopening the gate.

use crate::sampler::{Channel, GateState, Row};
use crate::system::Region;
use crate::timeline::{Gate, Instrument, InstrumentTable};

/// MIDI note of the tuning reference (A4).
const REFERENCE_NOTE: f64 = 69.0;

/// Converts a raw SID frequency to the nearest MIDI note and the offset from
/// it in cents.
///
/// Returns `None` for frequency 0 and for pitches outside MIDI 0-127.
///
/// # Examples
///
/// ```
/// use sid_notes::{frequency_to_note, Region};
///
/// let (note, cents) = frequency_to_note(0x1D45, Region::Pal, 440.0).unwrap();
/// assert_eq!(note, 69);
/// assert!(cents.abs() < 1.0);
/// assert_eq!(frequency_to_note(0, Region::Pal, 440.0), None);
/// ```
pub fn frequency_to_note(freq: u16, region: Region, tuning: f64) -> Option<(u8, f64)> {
    if freq == 0 {
        return None;
    }
    let hz = region.sid_frequency_hz(freq);
    let midi = REFERENCE_NOTE + 12.0 * (hz / tuning).log2();
    let note = midi.round();
    if !(0.0..=127.0).contains(&note) {
        return None;
    }
    Some((note as u8, (midi - note) * 100.0))
}

/// Keeps a reading one semitone away from `previous` on the previous note
/// when it lies within `margin` cents of the boundary between the two.
///
/// A margin of 0 never snaps.
pub fn snap_vibrato(previous: Option<u8>, note: u8, cents: f64, margin: f64) -> u8 {
    let Some(previous) = previous else {
        return note;
    };
    // Distance in cents from the semitone boundary between the two notes
    let distance = if note == previous.wrapping_add(1) {
        cents + 50.0
    } else if previous == note.wrapping_add(1) {
        50.0 - cents
    } else {
        return note;
    };
    if distance < margin {
        previous
    } else {
        note
    }
}

/// Settings that shape note extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    pub vibrato_cents_margin: f64,
    /// Start notes on pitch changes during the release phase.
    pub notes_in_release: bool,
    /// Report the frequency on every call, not only on note starts.
    pub freq_every_call: bool,
}

/// Changes of one voice during one play call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoiceEvent {
    pub note: Option<u8>,
    pub gate: Option<Gate>,
    pub freq: Option<u16>,
    /// Instrument table index, when a note starts with a different instrument.
    pub new_instrument: Option<usize>,
}

impl VoiceEvent {
    /// True when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.note.is_none()
            && self.gate.is_none()
            && self.freq.is_none()
            && self.new_instrument.is_none()
    }
}

/// What one voice was doing after the previous call.
#[derive(Debug, Clone, Copy, Default)]
struct VoiceTracker {
    active: bool,
    note: Option<u8>,
    freq: u16,
    instrument: Option<usize>,
}

/// Turns sampled rows into per-voice note events.
pub struct NoteExtractor {
    options: ExtractOptions,
    voices: Vec<VoiceTracker>,
    /// Register values at every note start, for tuning estimation.
    note_start_freqs: Vec<u16>,
}

impl NoteExtractor {
    /// Extractor for `voice_count` voices.
    pub fn new(voice_count: usize, options: ExtractOptions) -> Self {
        Self {
            options,
            voices: vec![VoiceTracker::default(); voice_count],
            note_start_freqs: Vec::new(),
        }
    }

    /// Frequency registers seen at note starts so far.
    pub fn note_start_freqs(&self) -> &[u16] {
        &self.note_start_freqs
    }

    /// Processes one row, marking note starts on its channels.
    ///
    /// Returns one event per voice, in voice order.
    pub fn process(&mut self, row: &mut Row, instruments: &mut InstrumentTable) -> Vec<VoiceEvent> {
        let mut events = Vec::with_capacity(self.voices.len());
        for chip in row.chips.iter_mut() {
            let voice3_off = chip.voice3_off;
            for (index, channel) in chip.channels.iter_mut().enumerate() {
                let voice = events.len();
                let silenced = index == 2 && voice3_off && !channel.filtered;
                let event = self.process_voice(voice, channel, silenced, instruments);
                events.push(event);
            }
        }
        events
    }

    fn process_voice(
        &mut self,
        voice: usize,
        channel: &mut Channel,
        silenced: bool,
        instruments: &mut InstrumentTable,
    ) -> VoiceEvent {
        let options = self.options;
        let Some(tracker) = self.voices.get_mut(voice) else {
            return VoiceEvent::default();
        };

        let sounding = channel.gate == GateState::On
            && !channel.test
            && !channel.waveform.is_empty()
            && !silenced;
        // Gate off but still audible: pitch changes here may start notes
        let releasing = options.notes_in_release
            && channel.gate == GateState::Off
            && channel.in_release
            && !channel.test
            && !channel.waveform.is_empty()
            && !silenced;

        let note = channel.note.map(|note| {
            snap_vibrato(tracker.note, note, channel.cents, options.vibrato_cents_margin)
        });
        let mut event = VoiceEvent::default();

        let retrigger = if sounding {
            !tracker.active || note != tracker.note || channel.gate_double_toggle
        } else {
            releasing && note != tracker.note
        };
        let starts = note.is_some() && retrigger;

        if starts {
            channel.new_note = true;
            event.note = note;
            event.freq = Some(channel.freq);

            let instrument = instruments.index_of(Instrument::from_channel(channel));
            if tracker.instrument != Some(instrument) {
                event.new_instrument = Some(instrument);
                tracker.instrument = Some(instrument);
            }

            if sounding {
                event.gate = Some(Gate::On);
                tracker.active = true;
            } else if tracker.active {
                // A note started in release leaves the gate closed
                event.gate = Some(Gate::Off);
                tracker.active = false;
            }
            tracker.note = note;
            self.note_start_freqs.push(channel.freq);
        } else if tracker.active && !sounding {
            event.gate = Some(Gate::Off);
            tracker.active = false;
        } else if tracker.active && (options.freq_every_call || channel.freq != tracker.freq) {
            event.freq = Some(channel.freq);
        }

        tracker.freq = channel.freq;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::sid::Waveform;
    use crate::sampler::ChipState;
    use approx::assert_relative_eq;

    #[test]
    fn test_frequency_to_note() {
        let (note, cents) = frequency_to_note(0x1D45, Region::Pal, 440.0).unwrap();
        assert_eq!(note, 69);
        assert_relative_eq!(cents, 0.13, epsilon = 0.1);

        // One octave up doubles the register
        let (note, _) = frequency_to_note(0x3A8A, Region::Pal, 440.0).unwrap();
        assert_eq!(note, 81);

        // Lower tuning shifts the same register up
        let (note, cents) = frequency_to_note(0x1D45, Region::Pal, 432.0).unwrap();
        assert_eq!(note, 69);
        assert!(cents > 30.0);
    }

    #[test]
    fn test_frequency_out_of_range() {
        assert_eq!(frequency_to_note(0, Region::Pal, 440.0), None);
        // About 0.06 Hz, far below MIDI note 0
        assert_eq!(frequency_to_note(1, Region::Pal, 440.0), None);
    }

    fn row_with(call: u64, gate: GateState, freq: u16, in_release: bool) -> Row {
        let mut chip = ChipState::default();
        let channel = &mut chip.channels[0];
        channel.freq = freq;
        if let Some((note, cents)) = frequency_to_note(freq, Region::Pal, 440.0) {
            channel.note = Some(note);
            channel.cents = cents;
        }
        channel.waveform = Waveform::TRIANGLE;
        channel.gate = gate;
        channel.in_release = in_release;
        Row {
            call,
            time: call * 1000,
            chips: vec![chip],
        }
    }

    fn extractor(notes_in_release: bool) -> NoteExtractor {
        NoteExtractor::new(
            3,
            ExtractOptions {
                vibrato_cents_margin: 0.0,
                notes_in_release,
                freq_every_call: false,
            },
        )
    }

    #[test]
    fn test_gate_off_lands_on_gate_off_call() {
        for notes_in_release in [false, true] {
            let mut extractor = extractor(notes_in_release);
            let mut instruments = InstrumentTable::default();

            let mut row = row_with(0, GateState::On, 0x1D45, false);
            let events = extractor.process(&mut row, &mut instruments);
            assert_eq!(events[0].gate, Some(Gate::On));

            let mut row = row_with(1, GateState::Off, 0x1D45, true);
            let events = extractor.process(&mut row, &mut instruments);
            assert_eq!(events[0].gate, Some(Gate::Off), "notes_in_release {}", notes_in_release);
            assert_eq!(events[0].note, None);

            let mut row = row_with(2, GateState::Off, 0x1D45, true);
            let events = extractor.process(&mut row, &mut instruments);
            assert!(events[0].is_empty());
        }
    }

    #[test]
    fn test_note_in_release() {
        let mut extractor = extractor(true);
        let mut instruments = InstrumentTable::default();

        let mut row = row_with(0, GateState::On, 0x1D45, false);
        extractor.process(&mut row, &mut instruments);
        let mut row = row_with(1, GateState::Off, 0x1D45, true);
        extractor.process(&mut row, &mut instruments);

        // B4 while the release still sounds
        let mut row = row_with(2, GateState::Off, 0x20DA, true);
        let events = extractor.process(&mut row, &mut instruments);
        assert_eq!(events[0].note, Some(71));
        assert_eq!(events[0].gate, None);
        assert_eq!(events[0].freq, Some(0x20DA));
        assert!(row.chips[0].channels[0].new_note);

        // Release over: pitch changes are ignored
        let mut row = row_with(3, GateState::Off, 0x1D45, false);
        let events = extractor.process(&mut row, &mut instruments);
        assert!(events[0].is_empty());
        assert_eq!(extractor.note_start_freqs(), &[0x1D45, 0x20DA]);
    }

    #[test]
    fn test_note_in_release_disabled() {
        let mut extractor = extractor(false);
        let mut instruments = InstrumentTable::default();

        let mut row = row_with(0, GateState::On, 0x1D45, false);
        extractor.process(&mut row, &mut instruments);
        let mut row = row_with(1, GateState::Off, 0x1D45, true);
        extractor.process(&mut row, &mut instruments);

        let mut row = row_with(2, GateState::Off, 0x20DA, true);
        let events = extractor.process(&mut row, &mut instruments);
        assert!(events[0].is_empty());
        assert!(!row.chips[0].channels[0].new_note);
    }

    #[test]
    fn test_double_toggle_retriggers() {
        let mut extractor = extractor(false);
        let mut instruments = InstrumentTable::default();

        let mut row = row_with(0, GateState::On, 0x1D45, false);
        extractor.process(&mut row, &mut instruments);

        let mut row = row_with(1, GateState::On, 0x1D45, false);
        row.chips[0].channels[0].gate_double_toggle = true;
        let events = extractor.process(&mut row, &mut instruments);
        assert_eq!(events[0].gate, Some(Gate::On));
        assert_eq!(events[0].note, Some(69));
        assert_eq!(events[0].new_instrument, None);
    }

    #[test]
    fn test_snap_vibrato() {
        // 30 cents into the next semitone from the boundary
        assert_eq!(snap_vibrato(Some(60), 61, -20.0, 40.0), 60);
        assert_eq!(snap_vibrato(Some(60), 61, -20.0, 20.0), 61);
        assert_eq!(snap_vibrato(Some(61), 60, 45.0, 10.0), 61);
        assert_eq!(snap_vibrato(Some(60), 62, -45.0, 100.0), 62);
        assert_eq!(snap_vibrato(None, 61, -49.0, 100.0), 61);
        assert_eq!(snap_vibrato(Some(60), 61, -50.0, 0.0), 61);
    }
}
