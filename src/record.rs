//! Board-info record: persisted wire format and validation.
//!
//! Layout (little-endian, byte-exact, 60 bytes total):
//!
//! ```text
//!   +---------------------------+ 0
//!   | magic = "msc"             | 3   (u8[3])
//!   | magic reserved            | 1   (u8)
//!   | version (maj << 4 | min)  | 1   (u8)
//!   | version reserved          | 1   (u8)
//!   | body_len                  | 2   (u16)
//!   | body_off                  | 2   (u16)
//!   | body_checksum             | 2   (u16)
//!   | reserved                  | 8   (u32[2])
//!   +---------------------------+ 20
//!   | body, v1.0:               |
//!   |   feature_bits            | 4   (u32)
//!   |   company                 | 4   (3 chars + NUL)
//!   |   feature                 | 9   (8 chars + NUL)
//!   |   serial_number           | 12  (11 chars + NUL)
//!   |   revision                | 3   (2 chars + NUL)
//!   |   boot_count              | 4   (u32)
//!   |   reserved                | 2   (u16)
//!   |   tail padding            | 2
//!   +---------------------------+ 60
//! ```
//!
//! The body checksum is a wrapping 16-bit sum over every body byte, tail
//! padding included. Records in the field were produced by a C toolchain that
//! padded the v1.0 body to 40 bytes, so those two bytes are part of the format.
//!
//! A record is valid iff the magic matches, the version is one this crate can
//! parse, and the stored checksum equals the recomputed one. Reserved bytes,
//! body length and body offset are rewritten on save but not checked on load.

use core::fmt;
use core::mem::size_of;

use bitflags::bitflags;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::BoardInfoError;

/// Returned by every accessor whose data is missing or not authoritative.
pub const NOT_AVAILABLE: &str = "N/A";

pub const MAGIC: [u8; 3] = *b"msc";

pub const HEADER_LEN: usize = 20;
/// Room reserved for the body; the largest known body version fills it.
pub const BODY_AREA_LEN: usize = 40;
pub const RECORD_LEN: usize = HEADER_LEN + BODY_AREA_LEN;

pub const COMPANY_LEN: usize = 3;
pub const FEATURE_LEN: usize = 8;
pub const SERIAL_LEN: usize = 11;
pub const REVISION_LEN: usize = 2;

bitflags! {
    /// Which optional body fields carry meaningful data.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureBits: u32 {
        const COMPANY  = 1 << 0;
        const FEATURE  = 1 << 1;
        const SERIAL   = 1 << 2;
        const REVISION = 1 << 3;

        // bits set by newer writers survive a read-modify-write cycle
        const _ = !0;
    }
}

// ───────────────────────────────── Version ─────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const V1_0: Self = Self { major: 1, minor: 0 };

    /// Unpack the on-wire nibble encoding.
    #[inline]
    pub const fn from_byte(b: u8) -> Self {
        Self { major: b >> 4, minor: b & 0x0f }
    }

    #[inline]
    pub const fn to_byte(self) -> u8 {
        (self.major << 4) | (self.minor & 0x0f)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

// ─────────────────────────────── Wire images ───────────────────────────────

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct RecordHeader {
    pub magic: [u8; 3],
    pub magic_reserved: u8,
    pub version: u8,
    pub version_reserved: u8,
    pub body_len: U16,
    pub body_off: U16,
    pub body_checksum: U16,
    pub reserved: [U32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct BodyV1_0 {
    pub feature_bits: U32,
    pub company: [u8; COMPANY_LEN + 1],
    pub feature: [u8; FEATURE_LEN + 1],
    pub serial_number: [u8; SERIAL_LEN + 1],
    pub revision: [u8; REVISION_LEN + 1],
    pub boot_count: U32,
    pub reserved: U16,
    pub padding: [u8; 2],
}

#[repr(C)]
#[derive(Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
struct RecordImage {
    header: RecordHeader,
    body: [u8; BODY_AREA_LEN],
}

const _: () = assert!(size_of::<RecordHeader>() == HEADER_LEN);
const _: () = assert!(size_of::<BodyV1_0>() == BODY_AREA_LEN);
const _: () = assert!(size_of::<RecordImage>() == RECORD_LEN);

/// Wrapping 16-bit additive checksum, no carry folding.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)))
}

// ──────────────────────────────── Body union ───────────────────────────────

/// Version-tagged body. New record versions add a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    V1_0(BodyV1_0),
}

impl Body {
    /// Interpret the raw body area according to `version`.
    pub fn parse(version: Version, area: &[u8; BODY_AREA_LEN]) -> Result<Self, BoardInfoError> {
        match version {
            Version::V1_0 => Ok(Body::V1_0(zerocopy::transmute!(*area))),
            Version { major, minor } => Err(BoardInfoError::UnsupportedVersion { major, minor }),
        }
    }

    pub fn version(&self) -> Version {
        match self {
            Body::V1_0(_) => Version::V1_0,
        }
    }

    /// Exactly the bytes covered by the checksum for this version.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::V1_0(b) => b.as_bytes(),
        }
    }

    pub fn checksum(&self) -> u16 {
        checksum(self.as_bytes())
    }

    fn to_area(&self) -> [u8; BODY_AREA_LEN] {
        let mut area = [0u8; BODY_AREA_LEN];
        let bytes = self.as_bytes();
        area[..bytes.len()].copy_from_slice(bytes);
        area
    }
}

// ─────────────────────────────── Text fields ───────────────────────────────

/// Optional text fields gated by a feature bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Company,
    Feature,
    Serial,
    Revision,
}

impl Field {
    pub const fn bit(self) -> FeatureBits {
        match self {
            Field::Company => FeatureBits::COMPANY,
            Field::Feature => FeatureBits::FEATURE,
            Field::Serial => FeatureBits::SERIAL,
            Field::Revision => FeatureBits::REVISION,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Field::Company => "company",
            Field::Feature => "feature",
            Field::Serial => "serial",
            Field::Revision => "revision",
        }
    }

    /// Characters available, terminator excluded.
    pub const fn max_len(self) -> usize {
        match self {
            Field::Company => COMPANY_LEN,
            Field::Feature => FEATURE_LEN,
            Field::Serial => SERIAL_LEN,
            Field::Revision => REVISION_LEN,
        }
    }
}

fn nul_terminated(raw: &[u8]) -> &str {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    core::str::from_utf8(&raw[..end]).unwrap_or(NOT_AVAILABLE)
}

// ──────────────────────────────── BoardInfo ────────────────────────────────

/// Decoded, validated board-info record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardInfo {
    header: RecordHeader,
    body: Body,
}

impl Default for BoardInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardInfo {
    /// Blank v1.0 record: no feature bits, zero boot count, unsealed header.
    pub fn new() -> Self {
        Self { header: RecordHeader::default(), body: Body::V1_0(BodyV1_0::default()) }
    }

    /// Validate and decode the first `RECORD_LEN` bytes of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, BoardInfoError> {
        let raw: [u8; RECORD_LEN] = bytes
            .get(..RECORD_LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or(BoardInfoError::NoData)?;
        let image: RecordImage = zerocopy::transmute!(raw);

        if image.header.magic != MAGIC {
            return Err(BoardInfoError::InvalidFormat { magic: image.header.magic });
        }

        let body = Body::parse(Version::from_byte(image.header.version), &image.body)?;

        let stored = image.header.body_checksum.get();
        let computed = body.checksum();
        if stored != computed {
            return Err(BoardInfoError::ChecksumMismatch { stored, computed });
        }

        Ok(Self { header: image.header, body })
    }

    /// Recompute every header field that describes the body. Always writes
    /// version 1.0, the only version this crate produces.
    pub fn seal(&mut self) {
        let body_len = self.body.as_bytes().len() as u16;
        let h = &mut self.header;
        h.magic = MAGIC;
        h.version = Version::V1_0.to_byte();
        h.body_checksum = U16::new(self.body.checksum());
        h.body_off = U16::new(HEADER_LEN as u16);
        h.body_len = U16::new(body_len);
    }

    /// Wire image as it currently stands; call [`seal`](Self::seal) first
    /// when the result is going to storage.
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let image = RecordImage { header: self.header, body: self.body.to_area() };
        zerocopy::transmute!(image)
    }

    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn version(&self) -> Version {
        self.body.version()
    }

    fn v1(&self) -> &BodyV1_0 {
        match &self.body {
            Body::V1_0(b) => b,
        }
    }

    fn v1_mut(&mut self) -> &mut BodyV1_0 {
        match &mut self.body {
            Body::V1_0(b) => b,
        }
    }

    pub fn feature_bits(&self) -> FeatureBits {
        FeatureBits::from_bits_retain(self.v1().feature_bits.get())
    }

    #[inline]
    pub fn has(&self, bits: FeatureBits) -> bool {
        self.feature_bits().contains(bits)
    }

    pub fn enable(&mut self, bits: FeatureBits) {
        let b = self.feature_bits() | bits;
        self.v1_mut().feature_bits = U32::new(b.bits());
    }

    pub fn clear_feature(&mut self, bits: FeatureBits) {
        let b = self.feature_bits() - bits;
        self.v1_mut().feature_bits = U32::new(b.bits());
    }

    fn raw_field(&self, field: Field) -> &[u8] {
        let b = self.v1();
        match field {
            Field::Company => &b.company,
            Field::Feature => &b.feature,
            Field::Serial => &b.serial_number,
            Field::Revision => &b.revision,
        }
    }

    /// Field text when its feature bit is set, `"N/A"` otherwise.
    pub fn text(&self, field: Field) -> &str {
        if self.has(field.bit()) {
            nul_terminated(self.raw_field(field))
        } else {
            NOT_AVAILABLE
        }
    }

    /// Store `value` NUL-padded and mark the field present.
    pub fn set_text(&mut self, field: Field, value: &str) -> Result<(), BoardInfoError> {
        if value.len() > field.max_len() {
            return Err(BoardInfoError::FieldTooLong { field: field.name(), max: field.max_len() });
        }
        let b = self.v1_mut();
        let dst: &mut [u8] = match field {
            Field::Company => &mut b.company,
            Field::Feature => &mut b.feature,
            Field::Serial => &mut b.serial_number,
            Field::Revision => &mut b.revision,
        };
        dst.fill(0);
        dst[..value.len()].copy_from_slice(value.as_bytes());
        self.enable(field.bit());
        Ok(())
    }

    pub fn company(&self) -> &str {
        self.text(Field::Company)
    }

    pub fn feature(&self) -> &str {
        self.text(Field::Feature)
    }

    pub fn serial(&self) -> &str {
        self.text(Field::Serial)
    }

    pub fn revision(&self) -> &str {
        self.text(Field::Revision)
    }

    pub fn set_company(&mut self, value: &str) -> Result<(), BoardInfoError> {
        self.set_text(Field::Company, value)
    }

    pub fn set_feature(&mut self, value: &str) -> Result<(), BoardInfoError> {
        self.set_text(Field::Feature, value)
    }

    pub fn set_serial(&mut self, value: &str) -> Result<(), BoardInfoError> {
        self.set_text(Field::Serial, value)
    }

    pub fn set_revision(&mut self, value: &str) -> Result<(), BoardInfoError> {
        self.set_text(Field::Revision, value)
    }

    pub fn boot_count(&self) -> u32 {
        self.v1().boot_count.get()
    }

    pub fn set_boot_count(&mut self, count: u32) {
        self.v1_mut().boot_count = U32::new(count);
    }

    /// Bump the counter in memory only; wraps at `u32::MAX`.
    pub fn increment_boot_count(&mut self) -> u32 {
        let next = self.boot_count().wrapping_add(1);
        self.set_boot_count(next);
        next
    }
}
