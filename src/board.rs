//! Per-board-family hooks used by the board-info store and the boot path.
//!
//! A board family describes where its record lives, what it can say about
//! itself without the record (form factor, SoC platform, processor grade),
//! and which DRAM variants it ships. Every hook except the variant table has
//! a default, so a family only overrides what it actually knows.
//!
//! To add a family:
//!
//! 1. Implement [`BoardFamily`] for a type holding whatever transport the
//!    record needs.
//! 2. Give it a static [`VariantTable`].
//! 3. Add a Cargo feature and a branch in the `cfg_if!` below if it should
//!    become a build's default board.

use crate::error::BoardInfoError;
use crate::record::NOT_AVAILABLE;
use crate::transport::BlockTransport;
use crate::variant::{VariantTable, IMX8MM_VARIANTS, IMX8MP_VARIANTS};

/// EEPROM offset of the board-info record.
pub const RECORD_OFFSET: u32 = 0;

/// Extra identity exported to the environment during late init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardVars {
    pub name: &'static str,
    pub rev: &'static str,
}

pub trait BoardFamily {
    /// Fill `buf` with the raw record image.
    fn read_record(&mut self, _buf: &mut [u8]) -> Result<(), BoardInfoError> {
        Err(BoardInfoError::NoData)
    }

    /// Persist a sealed record image.
    fn write_record(&mut self, _buf: &[u8]) -> Result<(), BoardInfoError> {
        Err(BoardInfoError::NoData)
    }

    fn form_factor(&self) -> &'static str {
        NOT_AVAILABLE
    }

    fn platform(&self) -> &'static str {
        NOT_AVAILABLE
    }

    fn processor(&self) -> &'static str {
        NOT_AVAILABLE
    }

    fn board_vars(&self) -> Option<BoardVars> {
        None
    }

    fn variants(&self) -> &'static VariantTable;
}

/// SoC identity as reported by the CPU type probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocType {
    Imx8mm,
    Imx8mp,
    Other,
}

impl SocType {
    pub const fn platform(self) -> &'static str {
        match self {
            SocType::Imx8mm => "imx8mm",
            SocType::Imx8mp => "imx8mp",
            SocType::Other => NOT_AVAILABLE,
        }
    }

    /// Processor grade string used in device-tree names.
    pub const fn processor(self) -> &'static str {
        match self {
            SocType::Imx8mm | SocType::Imx8mp => "qc",
            SocType::Other => NOT_AVAILABLE,
        }
    }
}

/// SMARC 2.x module with the record in a serial EEPROM.
pub struct Sm2sBoard<T> {
    transport: T,
    soc: SocType,
    variants: &'static VariantTable,
    vars: BoardVars,
}

impl<T: BlockTransport> Sm2sBoard<T> {
    pub fn imx8mm(transport: T, soc: SocType) -> Self {
        Self {
            transport,
            soc,
            variants: &IMX8MM_VARIANTS,
            vars: BoardVars { name: "SM2S", rev: "iMX8MM" },
        }
    }

    pub fn imx8mp(transport: T, soc: SocType) -> Self {
        Self {
            transport,
            soc,
            variants: &IMX8MP_VARIANTS,
            vars: BoardVars { name: "SM2S", rev: "iMX8MP" },
        }
    }

    pub fn soc(&self) -> SocType {
        self.soc
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

impl<T: BlockTransport> BoardFamily for Sm2sBoard<T> {
    fn read_record(&mut self, buf: &mut [u8]) -> Result<(), BoardInfoError> {
        Ok(self.transport.read(RECORD_OFFSET, buf)?)
    }

    fn write_record(&mut self, buf: &[u8]) -> Result<(), BoardInfoError> {
        Ok(self.transport.write(RECORD_OFFSET, buf)?)
    }

    fn form_factor(&self) -> &'static str {
        "sm2s"
    }

    fn platform(&self) -> &'static str {
        self.soc.platform()
    }

    fn processor(&self) -> &'static str {
        self.soc.processor()
    }

    fn board_vars(&self) -> Option<BoardVars> {
        Some(self.vars)
    }

    fn variants(&self) -> &'static VariantTable {
        self.variants
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "imx8mp")] {
        /// Board family selected for this build.
        pub fn default_board<T: BlockTransport>(transport: T, soc: SocType) -> Sm2sBoard<T> {
            Sm2sBoard::imx8mp(transport, soc)
        }
    } else {
        /// Board family selected for this build.
        pub fn default_board<T: BlockTransport>(transport: T, soc: SocType) -> Sm2sBoard<T> {
            Sm2sBoard::imx8mm(transport, soc)
        }
    }
}
