//! C64 hardware register maps used by the banking layer and the sampler.

pub mod cia;
pub mod port_6510;
pub mod sid;

pub use port_6510::{BankState, Port6510};
pub use sid::{FilterMode, FilterRouting, VoiceControl, Waveform};
