//! DRAM timing references handed to the memory controller.
//!
//! The register-level content of each table lives with the DDR training code;
//! this crate only needs a stable identity for every table plus the geometry
//! that tells them apart.

pub const SZ_2G: u64 = 2 << 30;
pub const SZ_4G: u64 = 4 << 30;

#[derive(Debug, PartialEq, Eq)]
pub struct DramTiming {
    /// Symbol of the timing table in the DDR training blob.
    pub name: &'static str,
    /// LPDDR4 part number the table was trained for.
    pub part: &'static str,
    pub size: u64,
    pub channels: u8,
    pub chip_selects: u8,
}

pub static LPDDR4_NT6AN512T32AVJ2I_2GIB_2CHN_1CS: DramTiming = DramTiming {
    name: "lpddr4_nt6an512t32avj2i_2gib_2chn_1cs_timing",
    part: "NT6AN512T32AV-J2I",
    size: SZ_2G,
    channels: 2,
    chip_selects: 1,
};

pub static LPDDR4_MT53B512M32D2NP_2GIB_2CHN_2CS_DV1: DramTiming = DramTiming {
    name: "lpddr4_mt53b512m32d2np_2gib_2chn_2cs_dv1_timing",
    part: "MT53B512M32D2NP",
    size: SZ_2G,
    channels: 2,
    chip_selects: 2,
};

pub static LPDDR4_MT53D1024M32D4DT_4GIB_2CHN_2CS: DramTiming = DramTiming {
    name: "lpddr4_mt53d1024m32d4dt_4gib_2chn_2cs_timing",
    part: "MT53D1024M32D4DT",
    size: SZ_4G,
    channels: 2,
    chip_selects: 2,
};

pub static LPDDR4_MT53D512M32D2DS_2GIB_2CHN_2CS: DramTiming = DramTiming {
    name: "lpddr4_mt53d512m32d2ds_2gib_2chn_2cs_timing",
    part: "MT53D512M32D2DS",
    size: SZ_2G,
    channels: 2,
    chip_selects: 2,
};

/// DDR controller bring-up, provided by the SoC support code.
pub trait MemoryController {
    /// Record the usable RAM size and train the controller with `timing`.
    fn init(&mut self, ram_size: u64, timing: &'static DramTiming);
}
