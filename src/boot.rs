//! SPL DRAM bring-up: board info in, timing table out.
//!
//! Sequence:
//! 1. load the record (absence is only a warning)
//! 2. count this boot and persist it
//! 3. resolve the DRAM variant from feature and revision codes
//! 4. hand size and timing to the memory controller
//!
//! Nothing here can stop the boot. A blank or corrupt EEPROM still yields the
//! table's default variant.

use log::{info, warn};

use crate::board::BoardFamily;
use crate::dram::{DramTiming, MemoryController};
use crate::handoff::SplHandoff;
use crate::store::BoardInfoStore;
use crate::variant::Variant;

/// What the SPL trained DRAM with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DramSelection {
    pub ram_size: u64,
    pub timing: &'static DramTiming,
    pub variant: &'static Variant,
}

impl DramSelection {
    pub fn handoff(&self, boot_count: u32) -> SplHandoff {
        SplHandoff::new(self.ram_size, boot_count)
    }
}

pub fn spl_dram_init<B, M>(store: &mut BoardInfoStore<B>, ddr: &mut M) -> DramSelection
where
    B: BoardFamily,
    M: MemoryController + ?Sized,
{
    if store.load().is_none() {
        warn!(target: "boot", "failed to load board information");
    } else {
        if let Err(e) = store.increment_boot_count_and_save() {
            warn!(target: "boot", "boot count not saved: {}", e);
        }
        store.log_summary();
    }

    let variant = store
        .board()
        .variants()
        .resolve(store.feature(), store.revision());
    let selection = DramSelection {
        ram_size: variant.dram_size,
        timing: variant.timing,
        variant,
    };

    info!(
        target: "boot",
        "DRAM {} MiB, timing {}",
        selection.ram_size >> 20,
        selection.timing.name
    );
    ddr.init(selection.ram_size, selection.timing);
    selection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{SocType, Sm2sBoard};
    use crate::dram::{
        LPDDR4_MT53B512M32D2NP_2GIB_2CHN_2CS_DV1, LPDDR4_MT53D1024M32D4DT_4GIB_2CHN_2CS,
        LPDDR4_NT6AN512T32AVJ2I_2GIB_2CHN_1CS, SZ_2G, SZ_4G,
    };
    use crate::error::TransportError;
    use crate::record::{BoardInfo, RECORD_LEN};
    use crate::transport::mock::RamTransport;
    use crate::variant::{IMX8MM_VARIANTS, IMX8MP_VARIANTS};

    #[derive(Default)]
    struct RecordingDdr {
        calls: Vec<(u64, &'static str)>,
    }

    impl MemoryController for RecordingDdr {
        fn init(&mut self, ram_size: u64, timing: &'static DramTiming) {
            self.calls.push((ram_size, timing.name));
        }
    }

    type Store = BoardInfoStore<Sm2sBoard<RamTransport>>;

    fn programmed(board: Sm2sBoard<RamTransport>, feature: &str, revision: &str) -> Store {
        let mut store = BoardInfoStore::new(board);
        let rec = store.provision(BoardInfo::new());
        rec.set_company("MSC").unwrap();
        rec.set_feature(feature).unwrap();
        rec.set_revision(revision).unwrap();
        store.save().unwrap();
        store.clear();
        store
    }

    fn imx8mm() -> Sm2sBoard<RamTransport> {
        Sm2sBoard::imx8mm(RamTransport::new(256), SocType::Imx8mm)
    }

    #[test]
    fn e0_trains_single_chip_select() {
        let mut store = programmed(imx8mm(), "13N4200I", "E0");
        let mut ddr = RecordingDdr::default();
        let sel = spl_dram_init(&mut store, &mut ddr);

        assert!(core::ptr::eq(sel.timing, &LPDDR4_NT6AN512T32AVJ2I_2GIB_2CHN_1CS));
        assert_eq!(sel.ram_size, SZ_2G);
        assert_eq!(ddr.calls, [(SZ_2G, LPDDR4_NT6AN512T32AVJ2I_2GIB_2CHN_1CS.name)]);
        assert_eq!(store.boot_count(), 1);
    }

    #[test]
    fn c0_trains_dual_chip_select() {
        let mut store = programmed(imx8mm(), "13N4200I", "C0");
        let sel = spl_dram_init(&mut store, &mut RecordingDdr::default());
        assert!(core::ptr::eq(sel.timing, &LPDDR4_MT53B512M32D2NP_2GIB_2CHN_2CS_DV1));
    }

    #[test]
    fn blank_eeprom_uses_default_variant() {
        let mut store = BoardInfoStore::new(imx8mm());
        let mut ddr = RecordingDdr::default();
        let sel = spl_dram_init(&mut store, &mut ddr);

        assert!(core::ptr::eq(sel.variant, IMX8MM_VARIANTS.default_variant()));
        assert_eq!(ddr.calls.len(), 1);
        assert_eq!(store.boot_count(), 0);
        // nothing is written back when there was nothing to load
        assert_eq!(store.board_mut().transport_mut().writes, 0);
        assert!(store.board_mut().transport_mut().mem[..RECORD_LEN].iter().all(|&b| b == 0));
    }

    #[test]
    fn boot_count_persists_across_boots() {
        let mut store = programmed(imx8mm(), "13N4200I", "E0");
        for _ in 0..3 {
            spl_dram_init(&mut store, &mut RecordingDdr::default());
        }
        store.clear();
        store.load();
        assert_eq!(store.boot_count(), 3);
    }

    #[test]
    fn save_failure_does_not_stop_boot() {
        let mut store = programmed(imx8mm(), "13N4200I", "C0");
        store.board_mut().transport_mut().fail_write = Some(TransportError::WriteProtect);
        let mut ddr = RecordingDdr::default();
        let sel = spl_dram_init(&mut store, &mut ddr);

        assert!(core::ptr::eq(sel.timing, &LPDDR4_MT53B512M32D2NP_2GIB_2CHN_2CS_DV1));
        assert_eq!(ddr.calls.len(), 1);
        assert_eq!(store.boot_count(), 1);
    }

    #[test]
    fn imx8mp_four_gig_variant() {
        let board = Sm2sBoard::imx8mp(RamTransport::new(256), SocType::Imx8mp);
        let mut store = programmed(board, "24N0680I", "20");
        let sel = spl_dram_init(&mut store, &mut RecordingDdr::default());
        assert_eq!(sel.ram_size, SZ_4G);
        assert!(core::ptr::eq(sel.timing, &LPDDR4_MT53D1024M32D4DT_4GIB_2CHN_2CS));

        let mut unknown = programmed(
            Sm2sBoard::imx8mp(RamTransport::new(256), SocType::Imx8mp),
            "99X9999X",
            "20",
        );
        let sel = spl_dram_init(&mut unknown, &mut RecordingDdr::default());
        assert!(core::ptr::eq(sel.variant, IMX8MP_VARIANTS.default_variant()));
    }

    #[test]
    fn handoff_carries_selection() {
        let mut store = programmed(imx8mm(), "13N4200I", "E0");
        let sel = spl_dram_init(&mut store, &mut RecordingDdr::default());
        let h = sel.handoff(store.boot_count());
        assert_eq!(h.ram_size(), SZ_2G);
        assert_eq!(h.boot_count(), 1);
    }
}
