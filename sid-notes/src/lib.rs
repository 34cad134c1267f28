//! # SID Note Extraction
//!
//! Recovers the notes of a Commodore 64 SID tune by running its player code.
//!
//! The payload of a PSID/RSID file is loaded into an emulated C64 memory map
//! and driven on the `lib6510` CPU core: init once, then play once per tick.
//! After every play call the SID registers are sampled, and the gate and
//! frequency changes they show are turned into a per-voice note timeline.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sid_notes::{import_sid, ImportOptions};
//!
//! let data = std::fs::read("tune.sid").unwrap();
//! let import = import_sid(&data, 1, &ImportOptions::default()).unwrap();
//!
//! println!("{} by {}", import.header.name, import.header.author);
//! for row in import.timeline.voice(0) {
//!     if let Some(note) = row.note {
//!         println!("{:>8} note {}", row.time, note);
//!     }
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `devices`: SID, CIA and 6510 port register maps
//! - `system`: banked C64 memory and PAL/NTSC timing
//! - `header`: PSID/RSID header parsing and encoding
//! - `driver`: init/play execution, multispeed and play address detection
//! - `sampler`: chip register snapshots after each play call
//! - `notes`: note detection from consecutive snapshots
//! - `timeline`: sparse per-voice output model
//! - `import`: one-call import of a subtune

pub mod devices;
pub mod driver;
pub mod dump;
pub mod error;
pub mod header;
pub mod import;
pub mod notes;
pub mod sampler;
pub mod system;
pub mod timeline;

// Re-export commonly used types
pub use devices::{BankState, Port6510, Waveform};
pub use driver::{DriverConfig, SidDriver};
pub use dump::Dump;
pub use error::{Result, Routine, SidError};
pub use header::{ClockStandard, SidFile, SidFlags, SidHeader, SidMagic, SidModel, Speed};
pub use import::{import_sid, ImportOptions, Importer, SidImport};
pub use notes::{frequency_to_note, snap_vibrato, NoteExtractor, VoiceEvent};
pub use sampler::{Channel, ChipState, GateState, Row, Sampler};
pub use system::{C64Memory, ObservedWrite, Region};
pub use timeline::{DeltaRow, Gate, Instrument, InstrumentTable, SwingTempo, Tempo, Timeline};
