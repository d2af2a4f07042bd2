//! MSC board information and SPL DRAM variant selection
//!
//! Boards in the SM2S family carry a small checksummed identity record in a
//! serial EEPROM. This crate:
//! - reads, validates and rewrites that record (`record`, `store`)
//! - talks to the EEPROM in page-bounded chunks (`eeprom`)
//! - picks the DRAM timing table for the module variant (`variant`, `boot`)
//! - derives the device-tree file name for the next stage (`env`)
//!
//! A missing or corrupt record never stops the boot: every accessor has a
//! defined "N/A" fallback and variant resolution always returns an entry.
//!
//! The SoC, DDR controller, I2C controller and environment store are external
//! and plug in through the traits in `board`, `dram`, `eeprom` and `env`.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod boot;
pub mod dram;
pub mod eeprom;
pub mod env;
pub mod error;
pub mod handoff;
pub mod record;
pub mod store;
pub mod transport;
pub mod variant;

pub use board::{default_board, BoardFamily, BoardVars, SocType, Sm2sBoard};
pub use boot::{spl_dram_init, DramSelection};
pub use dram::{DramTiming, MemoryController};
pub use eeprom::{AddressWidth, DelayMs, EepromConfig, I2cBus, I2cEeprom, SM2S_BOARDINFO_EEPROM};
pub use env::{fdt_file_name, late_init, Environment, LateInitConfig};
pub use error::{BoardInfoError, EnvError, TransportError};
pub use handoff::{phys_sdram_size, SplHandoff};
pub use record::{BoardInfo, FeatureBits, Version, NOT_AVAILABLE};
pub use store::{BoardInfoStore, Summary};
pub use transport::BlockTransport;
pub use variant::{Variant, VariantTable};
