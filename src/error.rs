//! Error taxonomy for the board-info path.
//!
//! Load failures are distinguished here so they can be logged, but the store
//! collapses all of them into "no board info" before a caller sees them.
//! Save failures surface the transport error unchanged.

use thiserror::Error;

/// Failure reported by a block transport (serial EEPROM or similar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No device answered on the configured bus.
    #[error("no device on bus {bus}")]
    NoDevice { bus: u32 },

    /// A transaction was not acknowledged.
    #[error("bus transfer failed (chip {chip:#04x}, offset {offset:#x})")]
    Bus { chip: u8, offset: u32 },

    /// The write-protect line could not be released.
    #[error("write protect could not be released")]
    WriteProtect,

    /// Page size is not a power of two, or the block cap is zero.
    #[error("invalid EEPROM geometry (page {page_size}, block {rw_block_size})")]
    BadGeometry { page_size: u32, rw_block_size: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoardInfoError {
    /// Nothing to read, or no backing device wired for this board.
    #[error("no board info data")]
    NoData,

    /// Magic bytes are not "msc".
    #[error("invalid magic {magic:02x?}")]
    InvalidFormat { magic: [u8; 3] },

    #[error("body checksum mismatch (stored {stored:#06x}, computed {computed:#06x})")]
    ChecksumMismatch { stored: u16, computed: u16 },

    #[error("unsupported record version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// A field setter was handed more characters than the body reserves.
    #[error("{field} exceeds {max} characters")]
    FieldTooLong { field: &'static str, max: usize },
}

/// Failure reported by the boot environment store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error("environment rejected {name}")]
    Rejected { name: &'static str },
}
