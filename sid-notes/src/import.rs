//! Subtune import session: parse, init, then sample play calls into a timeline.
//!
//! ```no_run
//! use sid_notes::{import_sid, ImportOptions};
//!
//! let data = std::fs::read("Commando.sid").unwrap();
//! let options = ImportOptions {
//!     seconds: 30.0,
//!     ..ImportOptions::default()
//! };
//! let import = import_sid(&data, 1, &options).unwrap();
//! for (voice, rows) in import.timeline.voices.iter().enumerate() {
//!     println!("voice {}: {} rows", voice, rows.len());
//! }
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::driver::{DriverConfig, SidDriver};
use crate::dump::Dump;
use crate::error::{Result, SidError};
use crate::header::{SidFile, SidHeader};
use crate::notes::{ExtractOptions, NoteExtractor};
use crate::sampler::Sampler;
use crate::system::Region;
use crate::timeline::{SwingTempo, Tempo, Timeline};

/// Settings of one import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Length of music to capture.
    pub seconds: f64,
    /// Concert pitch of A4 in Hz.
    pub tuning: f64,
    /// Pitch wobble in cents tolerated before a semitone step counts as a new note.
    pub vibrato_cents_margin: f64,
    /// Start notes on pitch changes while a voice is releasing.
    pub notes_in_release: bool,
    /// Record the frequency register on every call.
    pub freq_every_call: bool,
    /// Alternating row durations in milliframes, for swing-tempo players.
    pub swing: Option<[u32; 2]>,
    /// Timing override; the header's clock flag decides when unset.
    pub region: Option<Region>,
    pub driver: DriverConfig,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            seconds: 60.0,
            tuning: 440.0,
            vibrato_cents_margin: 0.0,
            notes_in_release: false,
            freq_every_call: false,
            swing: None,
            region: None,
            driver: DriverConfig::default(),
        }
    }
}

impl ImportOptions {
    fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            vibrato_cents_margin: self.vibrato_cents_margin,
            notes_in_release: self.notes_in_release,
            freq_every_call: self.freq_every_call,
        }
    }
}

/// Result of importing one subtune.
#[derive(Debug, Clone)]
pub struct SidImport {
    pub header: SidHeader,
    pub dump: Dump,
    pub timeline: Timeline,
    pub play_address: u16,
    pub multispeed: f64,
    pub region: Region,
}

/// Step-by-step import of one subtune.
pub struct Importer {
    driver: SidDriver,
    sampler: Sampler,
    extractor: NoteExtractor,
    dump: Dump,
    timeline: Timeline,
    tempo: Tempo,
    play_address: u16,
    call: u64,
    time: u64,
    seconds: f64,
}

impl Importer {
    /// Parses `data` and runs init for the 1-based `subtune`.
    ///
    /// # Errors
    ///
    /// `InvalidOption` for a duration that is negative or not finite, header
    /// errors, `PayloadTooLarge`, `InvalidSubtune`, and every init failure of
    /// `SidDriver::run_init`.
    pub fn new(data: &[u8], subtune: u16, options: &ImportOptions) -> Result<Self> {
        if !options.seconds.is_finite() || options.seconds < 0.0 {
            return Err(SidError::InvalidOption {
                option: "seconds",
                reason: format!("{} is not a finite, non-negative duration", options.seconds),
            });
        }
        let file = SidFile::parse(data)?;
        let region = options
            .region
            .unwrap_or_else(|| file.header.clock.region());
        let bases = file.header.chip_bases.clone();

        let mut driver = SidDriver::new(file, region, options.driver.clone())?;
        driver.run_init(subtune)?;

        let multispeed = driver.multispeed();
        let play_address = driver.play_address().unwrap_or_default();
        let tempo = match options.swing {
            Some([first, second]) => Tempo::Swing(SwingTempo::new(first, second)),
            None => Tempo::for_multispeed(multispeed),
        };
        debug!(
            "subtune {}: play ${:04X}, x{:.2} speed, {:?}",
            subtune, play_address, multispeed, tempo
        );

        let sampler = Sampler::new(&bases, region, options.tuning, multispeed);
        let extractor = NoteExtractor::new(sampler.voice_count(), options.extract_options());

        Ok(Self {
            dump: Dump::new(multispeed, driver.cia_latch()),
            timeline: Timeline::new(bases.len()),
            driver,
            sampler,
            extractor,
            tempo,
            play_address,
            call: 0,
            time: 0,
            seconds: options.seconds,
        })
    }

    /// Play calls needed to cover the configured duration.
    pub fn play_calls(&self) -> u64 {
        let region = self.driver.region();
        (self.seconds * region.frame_rate() * self.driver.multispeed()).round() as u64
    }

    /// Runs one play call and appends what it did to the dump and timeline.
    pub fn step(&mut self) -> Result<()> {
        self.driver.run_play()?;
        let writes = self.driver.take_observed_writes();

        let mut row = self
            .sampler
            .sample(self.driver.memory(), &writes, self.call, self.time);
        let events = self.extractor.process(&mut row, &mut self.timeline.instruments);
        for (voice, event) in events.iter().enumerate() {
            self.timeline.append(voice, self.time, event, &self.tempo);
        }
        self.dump.push(row);

        self.call += 1;
        self.time += self.tempo.row_duration() as u64;
        self.tempo.advance();
        Ok(())
    }

    /// Play calls completed so far.
    pub fn calls(&self) -> u64 {
        self.call
    }

    /// Rows sampled so far.
    pub fn dump(&self) -> &Dump {
        &self.dump
    }

    /// Timeline built so far.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Ends the session.
    pub fn finish(mut self) -> SidImport {
        self.dump.note_start_freqs = self.extractor.note_start_freqs().to_vec();
        let region = self.driver.region();
        let multispeed = self.driver.multispeed();
        SidImport {
            header: self.driver.file().header.clone(),
            dump: self.dump,
            timeline: self.timeline,
            play_address: self.play_address,
            multispeed,
            region,
        }
    }
}

/// Imports one subtune for `options.seconds` of play time.
///
/// # Errors
///
/// Any error of `Importer::new` or of a play call; no partial result is
/// returned.
pub fn import_sid(data: &[u8], subtune: u16, options: &ImportOptions) -> Result<SidImport> {
    let mut importer = Importer::new(data, subtune, options)?;
    let calls = importer.play_calls();
    for _ in 0..calls {
        importer.step()?;
    }
    Ok(importer.finish())
}
