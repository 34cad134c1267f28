//! Error handling for SID parsing and emulation.

use lib6510::ExecutionError;
use thiserror::Error;

/// Convenient result alias for SID parsing and note extraction.
pub type Result<T> = std::result::Result<T, SidError>;

/// Which payload entry point was running when emulation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routine {
    Init,
    Play,
}

impl std::fmt::Display for Routine {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Routine::Init => f.write_str("init"),
            Routine::Play => f.write_str("play"),
        }
    }
}

/// Errors that abort the import of a subtune.
#[derive(Debug, Error)]
pub enum SidError {
    /// Buffer too small to contain the header or embedded load address.
    #[error("SID data too short: need {needed} bytes, got {actual}")]
    DataTooShort {
        /// Bytes required to continue parsing.
        needed: usize,
        /// Bytes available.
        actual: usize,
    },
    /// A header field violates the format rules.
    #[error("invalid SID header field '{field}': {reason}")]
    InvalidHeader {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
    /// Requested subtune outside `1..=songs`.
    #[error("subtune {requested} out of range 1..={songs}")]
    InvalidSubtune {
        /// 1-based subtune that was requested.
        requested: u16,
        /// Number of subtunes declared in the header.
        songs: u16,
    },
    /// Payload would run past the end of the 64KB address space.
    #[error("payload of {len} bytes at ${load_address:04X} exceeds the address space")]
    PayloadTooLarge {
        /// Effective load address.
        load_address: u16,
        /// Payload length in bytes.
        len: usize,
    },
    /// An import option is outside its usable range.
    #[error("invalid import option '{option}': {reason}")]
    InvalidOption {
        /// Name of the offending option.
        option: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
    /// The CPU rejected an instruction.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// A routine did not return within the instruction ceiling.
    #[error("runaway {routine} routine: still running at ${address:04X} after {instructions} instructions")]
    Runaway {
        /// Routine that was running.
        routine: Routine,
        /// PC when the ceiling was hit.
        address: u16,
        /// Instructions executed.
        instructions: u64,
    },
    /// Header declares no play address and init installed no interrupt vector.
    #[error("cannot determine play address: init at ${init:04X} wrote neither $0314/$0315 nor $FFFE/$FFFF")]
    NoPlayAddress {
        /// Init address that was run.
        init: u16,
    },
}

impl SidError {
    pub(crate) fn header(field: &'static str, reason: impl Into<String>) -> Self {
        SidError::InvalidHeader {
            field,
            reason: reason.into(),
        }
    }
}
