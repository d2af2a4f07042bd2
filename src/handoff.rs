//! SPL handoff block
//!
//! Written by the SPL into a fixed memory region once DRAM is up, and read
//! by the next stage to learn how much RAM the selected variant provides
//! without repeating variant resolution.
//!
//! # Layout
//! - 24 bytes, little-endian, no padding
//! - `magic` guards against reading an uninitialized region
//! - `reserved` is zero and ignored by readers

use zerocopy::byteorder::little_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

pub const HANDOFF_LEN: usize = 24;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct SplHandoff {
    pub magic: U32,      // "MSCH"
    pub ram_size: U64,   // bytes of DRAM trained by the SPL
    pub boot_count: U32, // counter value after this boot's update
    pub reserved: [u8; 8],
}

const _: () = assert!(core::mem::size_of::<SplHandoff>() == HANDOFF_LEN);

impl SplHandoff {
    pub const MAGIC: u32 = u32::from_le_bytes(*b"MSCH");

    pub fn new(ram_size: u64, boot_count: u32) -> Self {
        Self {
            magic: U32::new(Self::MAGIC),
            ram_size: U64::new(ram_size),
            boot_count: U32::new(boot_count),
            reserved: [0u8; 8],
        }
    }

    /// Parse a handoff region; `None` if it is short or never written.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (handoff, _) = Self::read_from_prefix(bytes).ok()?;
        (handoff.magic.get() == Self::MAGIC).then_some(handoff)
    }

    pub fn ram_size(&self) -> u64 {
        self.ram_size.get()
    }

    pub fn boot_count(&self) -> u32 {
        self.boot_count.get()
    }
}

/// RAM size for the later stage: the handed-off value when the SPL left a
/// valid block, else `default`.
pub fn phys_sdram_size(handoff: Option<&[u8]>, default: u64) -> u64 {
    match handoff.and_then(SplHandoff::parse) {
        Some(h) => h.ram_size(),
        None => {
            log::debug!(target: "boot", "no SPL handoff, assuming {:#x} bytes", default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dram::{SZ_2G, SZ_4G};

    #[test]
    fn image_is_little_endian() {
        let bytes = SplHandoff::new(SZ_4G, 7).as_bytes().to_vec();
        assert_eq!(bytes.len(), HANDOFF_LEN);
        assert_eq!(&bytes[0..4], b"MSCH");
        assert_eq!(&bytes[4..12], &SZ_4G.to_le_bytes());
        assert_eq!(&bytes[12..16], &7u32.to_le_bytes());
        assert!(bytes[16..].iter().all(|&b| b == 0));
    }

    #[test]
    fn valid_block_overrides_default() {
        let h = SplHandoff::new(SZ_4G, 3);
        assert_eq!(phys_sdram_size(Some(h.as_bytes()), SZ_2G), SZ_4G);
    }

    #[test]
    fn missing_or_blank_block_uses_default() {
        assert_eq!(phys_sdram_size(None, SZ_2G), SZ_2G);
        assert_eq!(phys_sdram_size(Some(&[0u8; HANDOFF_LEN]), SZ_2G), SZ_2G);
    }

    #[test]
    fn short_block_is_rejected() {
        let h = SplHandoff::new(SZ_4G, 3);
        assert_eq!(SplHandoff::parse(&h.as_bytes()[..HANDOFF_LEN - 1]), None);
        assert_eq!(phys_sdram_size(Some(&h.as_bytes()[..10]), SZ_2G), SZ_2G);
    }

    #[test]
    fn parse_reads_fields() {
        let h = SplHandoff::parse(SplHandoff::new(SZ_2G, 41).as_bytes()).unwrap();
        assert_eq!(h.ram_size(), SZ_2G);
        assert_eq!(h.boot_count(), 41);
    }
}
