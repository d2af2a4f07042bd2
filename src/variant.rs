//! Board variant lookup: (feature code, revision code) → DRAM configuration.
//!
//! Tables are static and ordered; the first exact match wins. A table can
//! never be empty, so resolution is total: an unknown or unreadable identity
//! falls back to the entry at `DEFAULT_VARIANT_INDEX`.

use crate::dram::{
    DramTiming, LPDDR4_MT53B512M32D2NP_2GIB_2CHN_2CS_DV1, LPDDR4_MT53D1024M32D4DT_4GIB_2CHN_2CS,
    LPDDR4_MT53D512M32D2DS_2GIB_2CHN_2CS, LPDDR4_NT6AN512T32AVJ2I_2GIB_2CHN_1CS, SZ_2G, SZ_4G,
};

pub const DEFAULT_VARIANT_INDEX: usize = 0;

#[derive(Debug, PartialEq, Eq)]
pub struct Variant {
    pub revision: &'static str,
    pub feature: &'static str,
    pub dram_size: u64,
    pub timing: &'static DramTiming,
}

impl Variant {
    #[inline]
    fn matches(&self, feature: &str, revision: &str) -> bool {
        if self.feature.len() != feature.len() || self.revision.len() != revision.len() {
            return false;
        }
        self.feature == feature && self.revision == revision
    }
}

#[derive(Debug)]
pub struct VariantTable {
    entries: &'static [Variant],
}

impl VariantTable {
    /// Fails const evaluation on an empty table.
    pub const fn new(entries: &'static [Variant]) -> Self {
        assert!(!entries.is_empty(), "variant table must not be empty");
        Self { entries }
    }

    pub fn entries(&self) -> &'static [Variant] {
        self.entries
    }

    pub fn default_variant(&self) -> &'static Variant {
        &self.entries[DEFAULT_VARIANT_INDEX]
    }

    /// First entry matching both codes exactly, else the default entry.
    pub fn resolve(&self, feature: &str, revision: &str) -> &'static Variant {
        match self.entries.iter().find(|v| v.matches(feature, revision)) {
            Some(v) => {
                log::debug!(target: "variant", "matched {} rev {}", feature, revision);
                v
            }
            None => {
                log::warn!(target: "variant", "using default variant settings");
                self.default_variant()
            }
        }
    }
}

static IMX8MM_ENTRIES: [Variant; 2] = [
    Variant {
        revision: "E0",
        feature: "13N4200I",
        dram_size: SZ_2G,
        timing: &LPDDR4_NT6AN512T32AVJ2I_2GIB_2CHN_1CS,
    },
    Variant {
        revision: "C0",
        feature: "13N4200I",
        dram_size: SZ_2G,
        timing: &LPDDR4_MT53B512M32D2NP_2GIB_2CHN_2CS_DV1,
    },
];

pub static IMX8MM_VARIANTS: VariantTable = VariantTable::new(&IMX8MM_ENTRIES);

static IMX8MP_ENTRIES: [Variant; 2] = [
    Variant {
        revision: "20",
        feature: "24N0680I",
        dram_size: SZ_4G,
        timing: &LPDDR4_MT53D1024M32D4DT_4GIB_2CHN_2CS,
    },
    Variant {
        revision: "A0",
        feature: "14N0740I",
        dram_size: SZ_2G,
        timing: &LPDDR4_MT53D512M32D2DS_2GIB_2CHN_2CS,
    },
];

pub static IMX8MP_VARIANTS: VariantTable = VariantTable::new(&IMX8MP_ENTRIES);
