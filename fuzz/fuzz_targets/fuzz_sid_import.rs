//! Fuzz target for SID parsing and a short import.
//!
//! Arbitrary bytes must either fail to parse, fail with an error, or produce
//! a timeline; never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sid_notes::{import_sid, DriverConfig, ImportOptions, SidHeader};

fuzz_target!(|data: &[u8]| {
    let Ok(header) = SidHeader::parse(data) else {
        return;
    };
    assert_eq!(SidHeader::parse(&header.to_bytes()).ok(), Some(header.clone()));

    let options = ImportOptions {
        seconds: 0.05,
        driver: DriverConfig {
            instruction_limit: 20_000,
            ..DriverConfig::default()
        },
        ..ImportOptions::default()
    };
    if let Ok(import) = import_sid(data, header.start_song, &options) {
        assert_eq!(import.timeline.voices.len(), header.chip_count() * 3);
    }
});
