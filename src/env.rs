//! Late-init environment setup: device-tree file name and board variables.

use core::fmt::{self, Write};

use arrayvec::ArrayString;
use log::{debug, info};

use crate::board::BoardFamily;
use crate::error::EnvError;
use crate::store::BoardInfoStore;

pub const FDT_FILE_VAR: &str = "fdt_file";
pub const BOARD_NAME_VAR: &str = "board_name";
pub const BOARD_REV_VAR: &str = "board_rev";

/// Longest device-tree file name ever exported, in bytes.
pub const FDT_FILE_MAX: usize = 63;

pub type FdtFileName = ArrayString<{ FDT_FILE_MAX + 1 }>;

/// The boot environment store (the loader's `env_get`/`env_set`).
pub trait Environment {
    fn get(&self, name: &str) -> Option<&str>;
    fn set(&mut self, name: &'static str, value: &str) -> Result<(), EnvError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LateInitConfig {
    /// Also export `board_name` / `board_rev` when the board provides them.
    pub export_board_vars: bool,
}

impl Default for LateInitConfig {
    fn default() -> Self {
        Self { export_board_vars: cfg!(feature = "env-runtime-config") }
    }
}

/// Keeps the longest prefix that fits; once anything is dropped, every
/// later piece is dropped too.
struct Truncating<'a> {
    buf: &'a mut FdtFileName,
    full: bool,
}

impl<'a> Truncating<'a> {
    fn new(buf: &'a mut FdtFileName) -> Self {
        Self { buf, full: false }
    }
}

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.full {
            return Ok(());
        }
        for c in s.chars() {
            if self.buf.len() + c.len_utf8() > FDT_FILE_MAX {
                self.full = true;
                break;
            }
            self.buf.push(c);
        }
        Ok(())
    }
}

/// `company-formfactor-platform-processor-feature.dtb`, each part falling
/// back to "N/A".
pub fn fdt_file_name<B: BoardFamily>(store: &BoardInfoStore<B>) -> FdtFileName {
    let mut name = FdtFileName::new();
    // Truncating never reports an error
    let _ = write!(
        Truncating::new(&mut name),
        "{}-{}-{}-{}-{}.dtb",
        store.company(),
        store.form_factor(),
        store.platform(),
        store.processor(),
        store.feature(),
    );
    name
}

/// Populate the environment once a valid record has been loaded. Leaves an
/// existing `fdt_file` alone, and in that case exports nothing else either.
pub fn late_init<B, E>(
    store: &BoardInfoStore<B>,
    env: &mut E,
    config: LateInitConfig,
) -> Result<(), EnvError>
where
    B: BoardFamily,
    E: Environment + ?Sized,
{
    if !store.is_loaded() {
        debug!(target: "boardinfo", "late init: no board info, environment untouched");
        return Ok(());
    }
    if let Some(existing) = env.get(FDT_FILE_VAR) {
        debug!(target: "boardinfo", "late init: keeping {}={}", FDT_FILE_VAR, existing);
        return Ok(());
    }

    let name = fdt_file_name(store);
    info!(target: "boardinfo", "{}={}", FDT_FILE_VAR, name);
    env.set(FDT_FILE_VAR, &name)?;

    if config.export_board_vars {
        if let Some(vars) = store.board().board_vars() {
            env.set(BOARD_NAME_VAR, vars.name)?;
            env.set(BOARD_REV_VAR, vars.rev)?;
        }
    }
    Ok(())
}
