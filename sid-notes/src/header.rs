//! PSID/RSID file header parsing and encoding.
//!
//! All header words are big-endian. Layout (version 2 and later):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | $00 | 4 | magic (`PSID` or `RSID`) |
//! | $04 | 2 | version (1-4) |
//! | $06 | 2 | data offset ($76 for v1, $7C otherwise) |
//! | $08 | 2 | load address (0: first two payload bytes) |
//! | $0A | 2 | init address (0: load address) |
//! | $0C | 2 | play address (0: installed by init) |
//! | $0E | 2 | songs |
//! | $10 | 2 | start song |
//! | $12 | 4 | speed bits, one per subtune |
//! | $16 | 32 | name |
//! | $36 | 32 | author |
//! | $56 | 32 | released |
//! | $76 | 2 | flags |
//! | $78 | 1 | relocation start page |
//! | $79 | 1 | relocation page length |
//! | $7A | 1 | second SID address |
//! | $7B | 1 | third SID address |

use bitflags::bitflags;
use log::{debug, warn};

use crate::devices::sid::SID_BASE;
use crate::error::{Result, SidError};
use crate::system::Region;

/// Header length for version 1 files.
pub const V1_HEADER_SIZE: usize = 0x76;

/// Header length for version 2 and later.
pub const V2_HEADER_SIZE: usize = 0x7C;

const TEXT_FIELD_SIZE: usize = 32;

/// File format variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidMagic {
    /// Player-driven: the host calls init, then play once per tick.
    Psid,
    /// Real C64 environment: init installs its own interrupt handler.
    Rsid,
}

impl SidMagic {
    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            b"PSID" => Some(SidMagic::Psid),
            b"RSID" => Some(SidMagic::Rsid),
            _ => None,
        }
    }

    /// The four magic bytes.
    pub fn as_bytes(&self) -> &'static [u8; 4] {
        match self {
            SidMagic::Psid => b"PSID",
            SidMagic::Rsid => b"RSID",
        }
    }
}

bitflags! {
    /// Header flags word (version 2 and later).
    ///
    /// Unknown bits are retained so the word re-encodes unchanged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SidFlags: u16 {
        /// Compute!'s Sidplayer MUS data; an external player is required.
        const EXTERNAL_PLAYER = 0x0001;
        /// PSID: PlaySID specific. RSID: the payload contains a BASIC program.
        const PLATFORM_SPECIFIC = 0x0002;
        const CLOCK = 0x000C;
        const MODEL_1 = 0x0030;
        const MODEL_2 = 0x00C0;
        const MODEL_3 = 0x0300;
        const RESERVED = 0xFC00;
    }
}

/// Video standard the tune was written for (flags bits 2-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockStandard {
    #[default]
    Unknown,
    Pal,
    Ntsc,
    Both,
}

impl ClockStandard {
    fn from_bits(bits: u16) -> Self {
        match bits & 0x03 {
            1 => ClockStandard::Pal,
            2 => ClockStandard::Ntsc,
            3 => ClockStandard::Both,
            _ => ClockStandard::Unknown,
        }
    }

    /// Timing used to play the tune. Anything but NTSC-only plays at PAL speed.
    pub fn region(&self) -> Region {
        match self {
            ClockStandard::Ntsc => Region::Ntsc,
            _ => Region::Pal,
        }
    }
}

/// SID chip revision (two bits per chip in the flags word).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SidModel {
    #[default]
    Unknown,
    Mos6581,
    Mos8580,
    Both,
}

impl SidModel {
    fn from_bits(bits: u16) -> Self {
        match bits & 0x03 {
            1 => SidModel::Mos6581,
            2 => SidModel::Mos8580,
            3 => SidModel::Both,
            _ => SidModel::Unknown,
        }
    }
}

/// Interrupt source a subtune's play routine is timed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    /// Once per frame (raster interrupt).
    VerticalBlank,
    /// CIA 1 timer A, 60 Hz unless the tune reprograms it.
    CiaTimer,
}

/// Parsed PSID/RSID header.
///
/// Raw fields keep the values stored in the file; derived fields are
/// decoded from them once while parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct SidHeader {
    pub magic: SidMagic,
    pub version: u16,
    pub data_offset: u16,
    /// Load address as stored; 0 means the payload starts with it.
    pub load_address: u16,
    /// Init address as stored; 0 means the load address.
    pub init_address: u16,
    /// Play address as stored; 0 means init installs an interrupt handler.
    pub play_address: u16,
    pub songs: u16,
    pub start_song: u16,
    pub speed: u32,
    pub name: String,
    pub author: String,
    pub released: String,
    pub flags: SidFlags,
    pub start_page: u8,
    pub page_length: u8,
    pub second_sid: u8,
    pub third_sid: u8,

    // Derived
    pub clock: ClockStandard,
    pub models: [SidModel; 3],
    /// Base address of every usable chip; the first is always $D400.
    pub chip_bases: Vec<u16>,
}

fn word(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

fn long(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// NUL-terminated Latin-1 text field.
fn text(data: &[u8], offset: usize) -> String {
    data[offset..offset + TEXT_FIELD_SIZE]
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect()
}

fn encode_text(out: &mut Vec<u8>, value: &str) {
    let mut field = [0u8; TEXT_FIELD_SIZE];
    for (slot, ch) in field.iter_mut().zip(value.chars()) {
        *slot = u8::try_from(u32::from(ch)).unwrap_or(b'?');
    }
    out.extend_from_slice(&field);
}

/// Maps an extra-chip header byte to its base address.
///
/// Legal values are even and in $42-$7F or $E0-$FE, giving $D420-$D7E0 and
/// $DE00-$DFE0.
pub fn chip_address(byte: u8) -> Option<u16> {
    let legal = byte % 2 == 0 && matches!(byte, 0x42..=0x7F | 0xE0..=0xFE);
    legal.then(|| 0xD000 + byte as u16 * 16)
}

impl SidHeader {
    /// Parses and validates the header at the start of `data`.
    ///
    /// # Errors
    ///
    /// `DataTooShort` when `data` is shorter than the header, `InvalidHeader`
    /// naming the first field that breaks the format rules.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < V1_HEADER_SIZE {
            return Err(SidError::DataTooShort {
                needed: V1_HEADER_SIZE,
                actual: data.len(),
            });
        }

        let magic = SidMagic::from_bytes(&data[0..4]).ok_or_else(|| {
            SidError::header("magic", format!("{:02X?} is neither PSID nor RSID", &data[0..4]))
        })?;

        let version = word(data, 0x04);
        if !(1..=4).contains(&version) {
            return Err(SidError::header("version", format!("{} is outside 1-4", version)));
        }
        if magic == SidMagic::Rsid && version == 1 {
            return Err(SidError::header("version", "RSID requires version 2 or later"));
        }

        let header_size = if version == 1 {
            V1_HEADER_SIZE
        } else {
            V2_HEADER_SIZE
        };
        let data_offset = word(data, 0x06);
        if data_offset as usize != header_size {
            return Err(SidError::header(
                "data_offset",
                format!(
                    "expected ${:04X} for version {}, found ${:04X}",
                    header_size, version, data_offset
                ),
            ));
        }
        if data.len() < header_size {
            return Err(SidError::DataTooShort {
                needed: header_size,
                actual: data.len(),
            });
        }

        let load_address = word(data, 0x08);
        let init_address = word(data, 0x0A);
        let play_address = word(data, 0x0C);
        let songs = word(data, 0x0E);
        let start_song = word(data, 0x10);
        let speed = long(data, 0x12);

        if !(1..=256).contains(&songs) {
            return Err(SidError::header("songs", format!("{} is outside 1-256", songs)));
        }
        if !(1..=256).contains(&start_song) {
            return Err(SidError::header("start_song", format!("{} is outside 1-256", start_song)));
        }

        let mut header = SidHeader {
            magic,
            version,
            data_offset,
            load_address,
            init_address,
            play_address,
            songs,
            start_song,
            speed,
            name: text(data, 0x16),
            author: text(data, 0x36),
            released: text(data, 0x56),
            flags: SidFlags::empty(),
            start_page: 0,
            page_length: 0,
            second_sid: 0,
            third_sid: 0,
            clock: ClockStandard::Unknown,
            models: [SidModel::Unknown; 3],
            chip_bases: vec![SID_BASE],
        };

        if version >= 2 {
            header.decode_v2_fields(data);
        }

        if magic == SidMagic::Rsid {
            header.validate_rsid()?;
        }

        debug!(
            "{:?} v{}: {} songs, load ${:04X}, init ${:04X}, play ${:04X}, {} chip(s)",
            header.magic,
            header.version,
            header.songs,
            header.load_address,
            header.init_address,
            header.play_address,
            header.chip_bases.len()
        );

        Ok(header)
    }

    fn decode_v2_fields(&mut self, data: &[u8]) {
        let flags = word(data, 0x76);
        self.flags = SidFlags::from_bits_retain(flags);
        self.start_page = data[0x78];
        self.page_length = data[0x79];
        self.second_sid = data[0x7A];
        self.third_sid = data[0x7B];

        if self.flags.intersects(SidFlags::RESERVED) {
            warn!("reserved header flag bits set: ${:04X}", flags & SidFlags::RESERVED.bits());
        }

        self.clock = ClockStandard::from_bits(flags >> 2);
        let first = SidModel::from_bits(flags >> 4);
        let model_or_first = |bits: u16| match SidModel::from_bits(bits) {
            SidModel::Unknown => first,
            model => model,
        };
        self.models = [first, model_or_first(flags >> 6), model_or_first(flags >> 8)];

        let extra_chips = [
            (3, "second_sid", self.second_sid),
            (4, "third_sid", self.third_sid),
        ];
        for (min_version, field, byte) in extra_chips {
            if self.version < min_version || byte == 0 {
                continue;
            }
            match chip_address(byte) {
                Some(base) if self.chip_bases.contains(&base) => {
                    warn!("{} ${:04X} duplicates another chip, ignored", field, base);
                }
                Some(base) => self.chip_bases.push(base),
                None => warn!("{} byte ${:02X} is not a valid chip address, ignored", field, byte),
            }
        }
    }

    fn validate_rsid(&self) -> Result<()> {
        if self.play_address != 0 {
            return Err(SidError::header("play_address", "must be 0 for RSID"));
        }
        if self.speed != 0 {
            return Err(SidError::header("speed", "must be 0 for RSID"));
        }
        if self.load_address != 0 {
            return Err(SidError::header("load_address", "must be 0 for RSID"));
        }
        // Init 0 means "same as load address", checked once the payload is known
        if self.init_address != 0 {
            self.validate_rsid_init(self.init_address)?;
        }
        Ok(())
    }

    fn validate_rsid_init(&self, init: u16) -> Result<()> {
        if self.flags.contains(SidFlags::PLATFORM_SPECIFIC) {
            return Ok(());
        }
        if matches!(init, 0x0000..=0x07E7 | 0xA000..=0xBFFF | 0xD000..=0xFFFF) {
            return Err(SidError::header(
                "init_address",
                format!("${:04X} is in a ROM, I/O or system area", init),
            ));
        }
        Ok(())
    }

    /// Header length implied by the version.
    pub fn header_size(&self) -> usize {
        if self.version == 1 {
            V1_HEADER_SIZE
        } else {
            V2_HEADER_SIZE
        }
    }

    /// Interrupt source for a 1-based subtune.
    ///
    /// Subtunes past 32 share bit 31. RSID files always report vertical blank.
    pub fn speed(&self, subtune: u16) -> Speed {
        let bit = subtune.saturating_sub(1).min(31);
        if self.speed & (1 << bit) != 0 {
            Speed::CiaTimer
        } else {
            Speed::VerticalBlank
        }
    }

    /// Whether the payload carries its own load address.
    pub fn embedded_load_address(&self) -> bool {
        self.load_address == 0 || self.magic == SidMagic::Rsid
    }

    /// Number of SID chips the tune drives.
    pub fn chip_count(&self) -> usize {
        self.chip_bases.len()
    }

    /// Encodes the header fields back into the on-disk layout.
    ///
    /// Derived fields are ignored; the raw fields are written as stored.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(V2_HEADER_SIZE);
        out.extend_from_slice(self.magic.as_bytes());
        out.extend_from_slice(&self.version.to_be_bytes());
        out.extend_from_slice(&self.data_offset.to_be_bytes());
        out.extend_from_slice(&self.load_address.to_be_bytes());
        out.extend_from_slice(&self.init_address.to_be_bytes());
        out.extend_from_slice(&self.play_address.to_be_bytes());
        out.extend_from_slice(&self.songs.to_be_bytes());
        out.extend_from_slice(&self.start_song.to_be_bytes());
        out.extend_from_slice(&self.speed.to_be_bytes());
        encode_text(&mut out, &self.name);
        encode_text(&mut out, &self.author);
        encode_text(&mut out, &self.released);

        if self.version >= 2 {
            out.extend_from_slice(&self.flags.bits().to_be_bytes());
            out.push(self.start_page);
            out.push(self.page_length);
            out.push(self.second_sid);
            out.push(self.third_sid);
        }
        out
    }
}

/// A parsed SID file: header plus the payload ready to be placed in RAM.
#[derive(Debug, Clone)]
pub struct SidFile {
    pub header: SidHeader,
    /// Payload with any embedded load address stripped.
    pub payload: Vec<u8>,
    /// Address the payload is loaded at.
    pub load_address: u16,
}

impl SidFile {
    /// Parses a complete SID file.
    ///
    /// # Errors
    ///
    /// Any header error, `DataTooShort` when an embedded load address is
    /// required but missing, and `InvalidHeader` for an RSID whose effective
    /// init address is in a forbidden range.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = SidHeader::parse(data)?;
        let body = &data[header.header_size()..];

        let (load_address, payload) = if header.embedded_load_address() {
            if body.len() < 2 {
                return Err(SidError::DataTooShort {
                    needed: header.header_size() + 2,
                    actual: data.len(),
                });
            }
            (u16::from_le_bytes([body[0], body[1]]), &body[2..])
        } else {
            (header.load_address, body)
        };

        let file = SidFile {
            header,
            payload: payload.to_vec(),
            load_address,
        };

        if file.header.magic == SidMagic::Rsid && file.header.init_address == 0 {
            file.header.validate_rsid_init(file.init_address())?;
        }

        Ok(file)
    }

    /// Effective init address.
    pub fn init_address(&self) -> u16 {
        match self.header.init_address {
            0 => self.load_address,
            init => init,
        }
    }

    /// Play address from the header, if it declares one.
    pub fn play_address(&self) -> Option<u16> {
        match self.header.play_address {
            0 => None,
            play => Some(play),
        }
    }

    /// Checks a 1-based subtune number against the header.
    pub fn validate_subtune(&self, subtune: u16) -> Result<()> {
        if (1..=self.header.songs).contains(&subtune) {
            Ok(())
        } else {
            Err(SidError::InvalidSubtune {
                requested: subtune,
                songs: self.header.songs,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn psid_v2() -> Vec<u8> {
        let mut data = vec![0u8; V2_HEADER_SIZE];
        data[0..4].copy_from_slice(b"PSID");
        data[0x05] = 2;
        data[0x07] = 0x7C;
        data[0x08] = 0x10; // load $1000
        data[0x0A] = 0x10; // init $1000
        data[0x0C] = 0x10;
        data[0x0D] = 0x03; // play $1003
        data[0x0F] = 1;
        data[0x11] = 1;
        data
    }

    #[test]
    fn test_chip_address() {
        assert_eq!(chip_address(0x42), Some(0xD420));
        assert_eq!(chip_address(0x7E), Some(0xD7E0));
        assert_eq!(chip_address(0xE0), Some(0xDE00));
        assert_eq!(chip_address(0xFE), Some(0xDFE0));
        assert_eq!(chip_address(0x43), None);
        assert_eq!(chip_address(0x40), None);
        assert_eq!(chip_address(0x80), None);
        assert_eq!(chip_address(0xFF), None);
    }

    #[test]
    fn test_short_data() {
        let err = SidHeader::parse(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, SidError::DataTooShort { needed: 0x76, actual: 10 }));
    }

    #[test]
    fn test_speed_bits() {
        let mut data = psid_v2();
        data[0x12..0x16].copy_from_slice(&0x8000_0002u32.to_be_bytes());
        let header = SidHeader::parse(&data).unwrap();
        assert_eq!(header.speed(1), Speed::VerticalBlank);
        assert_eq!(header.speed(2), Speed::CiaTimer);
        assert_eq!(header.speed(32), Speed::CiaTimer);
        assert_eq!(header.speed(200), Speed::CiaTimer);
    }

    #[test]
    fn test_flags_decoding() {
        let mut data = psid_v2();
        // NTSC, 8580 first chip, second chip unknown
        data[0x76..0x78].copy_from_slice(&0x0028u16.to_be_bytes());
        let header = SidHeader::parse(&data).unwrap();
        assert_eq!(header.clock, ClockStandard::Ntsc);
        assert_eq!(header.clock.region(), Region::Ntsc);
        assert_eq!(header.models, [SidModel::Mos8580; 3]);
    }

    #[test]
    fn test_version_2_ignores_extra_chip_bytes() {
        let mut data = psid_v2();
        data[0x7A] = 0x42;
        let header = SidHeader::parse(&data).unwrap();
        assert_eq!(header.chip_bases, vec![0xD400]);
    }

    #[test]
    fn test_embedded_load_address() {
        let mut data = psid_v2();
        data[0x08] = 0;
        data.extend_from_slice(&[0x00, 0x20, 0x60]);
        let file = SidFile::parse(&data).unwrap();
        assert_eq!(file.load_address, 0x2000);
        assert_eq!(file.payload, vec![0x60]);
    }

    #[test]
    fn test_missing_embedded_load_address() {
        let mut data = psid_v2();
        data[0x08] = 0;
        data.push(0x00);
        assert!(matches!(
            SidFile::parse(&data),
            Err(SidError::DataTooShort { .. })
        ));
    }

    #[test]
    fn test_validate_subtune() {
        let file = SidFile::parse(&psid_v2()).unwrap();
        assert!(file.validate_subtune(1).is_ok());
        assert!(matches!(
            file.validate_subtune(2),
            Err(SidError::InvalidSubtune { requested: 2, songs: 1 })
        ));
        assert!(file.validate_subtune(0).is_err());
    }
}
