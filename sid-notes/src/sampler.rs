//! Chip state sampling after each play call.
//!
//! The sampler reads every SID register block through the banking layer
//! without touching the access log, decodes it into a `Row`, and keeps the
//! per-voice bookkeeping that a single snapshot cannot show: when a release
//! phase started, and whether the gate bit flipped back and forth within the
//! call.

use crate::devices::sid::{
    control_register_voice, voice_register, FilterMode, FilterRouting, VoiceControl,
    Waveform, ATTACK_DECAY, CONTROL, FILTER_CUTOFF_HI, FILTER_CUTOFF_LO,
    FILTER_RESONANCE_ROUTING, FREQ_HI, FREQ_LO, MODE_VOLUME, PW_HI, PW_LO, RELEASE_MS,
    SID_BLOCK_SIZE, SUSTAIN_RELEASE, VOICE_COUNT,
};
use crate::notes::frequency_to_note;
use crate::system::{C64Memory, ObservedWrite, Region};
use lib6510::MemoryBus;

/// Gate bit of a voice as last seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateState {
    /// The control register has not been written yet.
    #[default]
    Unset,
    Off,
    On,
}

/// One voice at the end of a play call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Channel {
    /// Raw 16-bit frequency register.
    pub freq: u16,
    /// Nearest MIDI note, if the frequency is audible.
    pub note: Option<u8>,
    /// Offset from `note` in cents.
    pub cents: f64,
    pub pulse_width: u16,
    pub attack: u8,
    pub decay: u8,
    pub sustain: u8,
    pub release: u8,
    pub waveform: Waveform,
    pub gate: GateState,
    pub sync: bool,
    pub ring: bool,
    pub test: bool,
    /// Routed through the filter.
    pub filtered: bool,
    /// Call index at which the gate last went from on to off.
    pub release_start: Option<u64>,
    /// Gate is off and the release time has not yet elapsed.
    pub in_release: bool,
    /// The gate bit changed at least twice during the call.
    pub gate_double_toggle: bool,
    /// Set by note extraction when a note starts on this row.
    pub new_note: bool,
}

impl Channel {
    /// Raw attack/decay register.
    pub fn attack_decay(&self) -> u8 {
        (self.attack << 4) | self.decay
    }

    /// Raw sustain/release register.
    pub fn sustain_release(&self) -> u8 {
        (self.sustain << 4) | self.release
    }
}

/// One SID at the end of a play call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChipState {
    pub volume: u8,
    /// 11-bit filter cutoff.
    pub cutoff: u16,
    pub resonance: u8,
    pub routing: FilterRouting,
    /// Filter mode bits with voice-3-off masked out.
    pub mode: FilterMode,
    pub voice3_off: bool,
    pub channels: [Channel; VOICE_COUNT],
}

/// Snapshot of every chip after one play call.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Zero-based play call index.
    pub call: u64,
    /// Start of the call in milliframes.
    pub time: u64,
    pub chips: Vec<ChipState>,
}

impl Row {
    /// Voice by flat index, three per chip.
    pub fn channel(&self, voice: usize) -> Option<&Channel> {
        self.chips
            .get(voice / VOICE_COUNT)
            .map(|chip| &chip.channels[voice % VOICE_COUNT])
    }

    /// Mutable voice by flat index.
    pub fn channel_mut(&mut self, voice: usize) -> Option<&mut Channel> {
        self.chips
            .get_mut(voice / VOICE_COUNT)
            .map(|chip| &mut chip.channels[voice % VOICE_COUNT])
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct VoiceHistory {
    gate: GateState,
    release_start: Option<u64>,
}

/// Reads chip state after each play call.
pub struct Sampler {
    bases: Vec<u16>,
    region: Region,
    tuning: f64,
    /// Duration of one play call in milliseconds.
    call_ms: f64,
    history: Vec<VoiceHistory>,
}

impl Sampler {
    /// Sampler for the given chips, at `multispeed` calls per frame.
    pub fn new(bases: &[u16], region: Region, tuning: f64, multispeed: f64) -> Self {
        Self {
            bases: bases.to_vec(),
            region,
            tuning,
            call_ms: region.frame_duration_ms() / multispeed,
            history: vec![VoiceHistory::default(); bases.len() * VOICE_COUNT],
        }
    }

    /// Number of voices across all chips.
    pub fn voice_count(&self) -> usize {
        self.history.len()
    }

    /// Decodes the chip registers after call number `call`.
    ///
    /// `writes` are the observed stores of that call, used to find gate
    /// double toggles.
    pub fn sample(
        &mut self,
        memory: &C64Memory,
        writes: &[ObservedWrite],
        call: u64,
        time: u64,
    ) -> Row {
        let mut chips = Vec::with_capacity(self.bases.len());
        for chip in 0..self.bases.len() {
            let base = self.bases[chip];
            let mut state = Self::read_chip(memory, base);
            for (index, channel) in state.channels.iter_mut().enumerate() {
                let voice = chip * VOICE_COUNT + index;
                let control_address = voice_register(base, index, CONTROL);
                let touched = memory.was_written(control_address)
                    || writes
                        .iter()
                        .any(|w| memory.canonical_io_address(w.address) == control_address);

                let previous = self.history[voice].gate;
                let toggles = Self::gate_transitions(memory, base, index, previous, writes);
                channel.gate_double_toggle = toggles >= 2;

                if !touched && previous == GateState::Unset {
                    channel.gate = GateState::Unset;
                }
                self.track_release(voice, call, channel);

                let reading = frequency_to_note(channel.freq, self.region, self.tuning);
                if let Some((note, cents)) = reading {
                    channel.note = Some(note);
                    channel.cents = cents;
                }
            }
            chips.push(state);
        }
        Row { call, time, chips }
    }

    fn read_chip(memory: &C64Memory, base: u16) -> ChipState {
        let reg = |offset: u16| memory.peek(base + offset);

        let mode_volume = reg(MODE_VOLUME);
        let resonance_routing = reg(FILTER_RESONANCE_ROUTING);
        let routing = FilterRouting::from_bits_truncate(resonance_routing);
        let mode = FilterMode::from_bits_truncate(mode_volume);

        let channels = std::array::from_fn(|voice| {
            let voice_reg = |offset: u16| memory.peek(voice_register(base, voice, offset));
            let control = voice_reg(CONTROL);
            let flags = VoiceControl::from_bits_truncate(control);
            let attack_decay = voice_reg(ATTACK_DECAY);
            let sustain_release = voice_reg(SUSTAIN_RELEASE);

            Channel {
                freq: u16::from_le_bytes([voice_reg(FREQ_LO), voice_reg(FREQ_HI)]),
                pulse_width: u16::from_le_bytes([voice_reg(PW_LO), voice_reg(PW_HI) & 0x0F]),
                attack: attack_decay >> 4,
                decay: attack_decay & 0x0F,
                sustain: sustain_release >> 4,
                release: sustain_release & 0x0F,
                waveform: Waveform::from_bits_truncate(control),
                gate: if flags.contains(VoiceControl::GATE) {
                    GateState::On
                } else {
                    GateState::Off
                },
                sync: flags.contains(VoiceControl::SYNC),
                ring: flags.contains(VoiceControl::RING),
                test: flags.contains(VoiceControl::TEST),
                filtered: routing.contains(FilterRouting::voice(voice)),
                ..Channel::default()
            }
        });

        ChipState {
            volume: mode_volume & 0x0F,
            cutoff: ((reg(FILTER_CUTOFF_HI) as u16) << 3) | (reg(FILTER_CUTOFF_LO) as u16 & 0x07),
            resonance: resonance_routing >> 4,
            routing,
            mode: mode.difference(FilterMode::VOICE3_OFF),
            voice3_off: mode.contains(FilterMode::VOICE3_OFF),
            channels,
        }
    }

    /// Counts gate bit changes in the observed writes to one voice's control
    /// register, starting from the gate state of the previous sample.
    fn gate_transitions(
        memory: &C64Memory,
        base: u16,
        voice: usize,
        previous: GateState,
        writes: &[ObservedWrite],
    ) -> usize {
        let mut gate = previous == GateState::On;
        let mut transitions = 0;
        for write in writes {
            let canonical = memory.canonical_io_address(write.address);
            if !(base..base + SID_BLOCK_SIZE).contains(&canonical) {
                continue;
            }
            if control_register_voice(canonical - base) != Some(voice) {
                continue;
            }
            let on = write.value & VoiceControl::GATE.bits() != 0;
            if on != gate {
                transitions += 1;
                gate = on;
            }
        }
        transitions
    }

    fn track_release(&mut self, voice: usize, call: u64, channel: &mut Channel) {
        let history = &mut self.history[voice];

        match channel.gate {
            GateState::On => history.release_start = None,
            GateState::Off if history.gate == GateState::On => history.release_start = Some(call),
            _ => {}
        }

        channel.release_start = history.release_start;
        channel.in_release = history.release_start.is_some_and(|start| {
            let elapsed_ms = (call - start) as f64 * self.call_ms;
            elapsed_ms < RELEASE_MS[channel.release as usize] as f64
        });
        if channel.gate != GateState::Unset {
            history.gate = channel.gate;
        }
    }
}
