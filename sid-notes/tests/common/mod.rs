//! Handcrafted SID files for integration tests.

#![allow(dead_code)]

/// Fields of a test SID file; `build` lays them out in the v2+ format.
pub struct SidBuilder {
    pub magic: &'static [u8; 4],
    pub version: u16,
    pub load: u16,
    pub init: u16,
    pub play: u16,
    pub songs: u16,
    pub start_song: u16,
    pub speed: u32,
    pub name: &'static str,
    pub author: &'static str,
    pub released: &'static str,
    pub flags: u16,
    pub second_sid: u8,
    pub third_sid: u8,
    /// Prepended to the payload as a little-endian load address.
    pub embedded_load: Option<u16>,
    pub payload: Vec<u8>,
}

impl SidBuilder {
    /// PSID v2 loading `payload` at $1000 with init $1000 and the given play address.
    pub fn psid(play: u16, payload: &[u8]) -> Self {
        Self {
            magic: b"PSID",
            version: 2,
            load: 0x1000,
            init: 0x1000,
            play,
            songs: 1,
            start_song: 1,
            speed: 0,
            name: "Test Tune",
            author: "Nobody",
            released: "2024 Test",
            flags: 0x0014, // PAL, 6581
            second_sid: 0,
            third_sid: 0,
            embedded_load: None,
            payload: payload.to_vec(),
        }
    }

    /// RSID v2 with its load address embedded in the payload.
    pub fn rsid(load: u16, payload: &[u8]) -> Self {
        Self {
            magic: b"RSID",
            load: 0,
            init: 0,
            play: 0,
            embedded_load: Some(load),
            ..Self::psid(0, payload)
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let header_size = if self.version == 1 { 0x76 } else { 0x7C };
        let mut data = Vec::new();
        data.extend_from_slice(self.magic);
        data.extend_from_slice(&self.version.to_be_bytes());
        data.extend_from_slice(&(header_size as u16).to_be_bytes());
        data.extend_from_slice(&self.load.to_be_bytes());
        data.extend_from_slice(&self.init.to_be_bytes());
        data.extend_from_slice(&self.play.to_be_bytes());
        data.extend_from_slice(&self.songs.to_be_bytes());
        data.extend_from_slice(&self.start_song.to_be_bytes());
        data.extend_from_slice(&self.speed.to_be_bytes());
        for text in [self.name, self.author, self.released] {
            let mut field = [0u8; 32];
            field[..text.len()].copy_from_slice(text.as_bytes());
            data.extend_from_slice(&field);
        }
        if self.version >= 2 {
            data.extend_from_slice(&self.flags.to_be_bytes());
            data.push(0);
            data.push(0);
            data.push(self.second_sid);
            data.push(self.third_sid);
        }
        assert_eq!(data.len(), header_size);

        if let Some(load) = self.embedded_load {
            data.extend_from_slice(&load.to_le_bytes());
        }
        data.extend_from_slice(&self.payload);
        data
    }
}

/// Init that returns at once, followed by `play` at $1001.
pub fn rts_then(play: &[u8]) -> Vec<u8> {
    let mut payload = vec![0x60];
    payload.extend_from_slice(play);
    payload
}

/// Play routine toggling voice 1's gate each call, with A-440 triangle.
///
/// Uses zero page $10 as the toggle state.
pub const GATE_TOGGLE_PLAY: [u8; 23] = [
    0xA9, 0x45, // LDA #$45
    0x8D, 0x00, 0xD4, // STA $D400
    0xA9, 0x1D, // LDA #$1D
    0x8D, 0x01, 0xD4, // STA $D401
    0xA5, 0x10, // LDA $10
    0x49, 0x01, // EOR #$01
    0x85, 0x10, // STA $10
    0x09, 0x10, // ORA #$10
    0x8D, 0x04, 0xD4, // STA $D404
    0x60, // RTS
    0xEA, // padding, never reached
];
