//! Board-info store, owner of the one in-memory record for this boot stage.
//!
//! The store is the only place the record is read from or written back to
//! the board's medium. It hands out sentinel-safe accessors so callers never
//! have to care whether a record was found: a missing, corrupt or unsupported
//! record reads exactly like a blank one.
//!
//! Exclusive access (`&mut self`) is what makes load / mutate / save a single
//! critical section. Wrap the store in a lock before sharing it.

use core::fmt;

use log::{debug, info};

use crate::board::BoardFamily;
use crate::error::BoardInfoError;
use crate::record::{BoardInfo, NOT_AVAILABLE, RECORD_LEN};

pub struct BoardInfoStore<B> {
    board: B,
    record: Option<BoardInfo>,
}

impl<B: BoardFamily> BoardInfoStore<B> {
    /// Empty store; nothing is read until [`load`](Self::load).
    pub fn new(board: B) -> Self {
        Self { board, record: None }
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn into_board(self) -> B {
        self.board
    }

    /// Read and validate the record, replacing whatever was held before.
    /// Every failure reads as "no board info"; the cause is logged at debug.
    pub fn load(&mut self) -> Option<&BoardInfo> {
        self.record = None;
        match self.fetch() {
            Ok(bi) => {
                debug!(target: "boardinfo", "record v{} loaded", bi.version());
                self.record = Some(bi);
            }
            Err(e) => debug!(target: "boardinfo", "no valid record: {}", e),
        }
        self.record.as_ref()
    }

    fn fetch(&mut self) -> Result<BoardInfo, BoardInfoError> {
        let mut scratch = [0u8; RECORD_LEN];
        self.board.read_record(&mut scratch)?;
        BoardInfo::decode(&scratch)
    }

    pub fn is_loaded(&self) -> bool {
        self.record.is_some()
    }

    pub fn record(&self) -> Option<&BoardInfo> {
        self.record.as_ref()
    }

    pub fn record_mut(&mut self) -> Option<&mut BoardInfo> {
        self.record.as_mut()
    }

    /// Install a freshly built record, e.g. when programming a new board.
    /// Nothing is written until [`save`](Self::save).
    pub fn provision(&mut self, record: BoardInfo) -> &mut BoardInfo {
        self.record.insert(record)
    }

    pub fn clear(&mut self) {
        self.record = None;
    }

    /// Seal the header and write the full record back.
    pub fn save(&mut self) -> Result<(), BoardInfoError> {
        let record = self.record.as_mut().ok_or(BoardInfoError::NoData)?;
        record.seal();
        let image = record.to_bytes();
        self.board.write_record(&image)
    }

    /// Count this boot and persist it. The in-memory count stays bumped even
    /// when the write fails, so a later successful save may carry more than
    /// one increment.
    pub fn increment_boot_count_and_save(&mut self) -> Result<(), BoardInfoError> {
        let record = self.record.as_mut().ok_or(BoardInfoError::NoData)?;
        let count = record.increment_boot_count();
        debug!(target: "boardinfo", "boot count -> {}", count);
        self.save()
    }

    pub fn company(&self) -> &str {
        self.record.as_ref().map_or(NOT_AVAILABLE, BoardInfo::company)
    }

    pub fn form_factor(&self) -> &'static str {
        self.board.form_factor()
    }

    pub fn platform(&self) -> &'static str {
        self.board.platform()
    }

    pub fn processor(&self) -> &'static str {
        self.board.processor()
    }

    pub fn feature(&self) -> &str {
        self.record.as_ref().map_or(NOT_AVAILABLE, BoardInfo::feature)
    }

    pub fn serial(&self) -> &str {
        self.record.as_ref().map_or(NOT_AVAILABLE, BoardInfo::serial)
    }

    pub fn revision(&self) -> &str {
        self.record.as_ref().map_or(NOT_AVAILABLE, BoardInfo::revision)
    }

    pub fn boot_count(&self) -> u32 {
        self.record.as_ref().map_or(0, BoardInfo::boot_count)
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary {
            company: self.company(),
            form_factor: self.form_factor(),
            platform: self.platform(),
            processor: self.processor(),
            feature: self.feature(),
            serial: self.serial(),
            revision: self.revision(),
            boot_count: self.boot_count(),
        }
    }

    pub fn log_summary(&self) {
        info!(target: "boardinfo", "\n{}", self.summary());
    }
}

/// Console dump of the identity, one field per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary<'a> {
    pub company: &'a str,
    pub form_factor: &'a str,
    pub platform: &'a str,
    pub processor: &'a str,
    pub feature: &'a str,
    pub serial: &'a str,
    pub revision: &'a str,
    pub boot_count: u32,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "company .......... {}", self.company)?;
        writeln!(f, "form factor ...... {}", self.form_factor)?;
        writeln!(f, "platform ......... {}", self.platform)?;
        writeln!(f, "processor ........ {}", self.processor)?;
        writeln!(f, "feature .......... {}", self.feature)?;
        writeln!(f, "serial ........... {}", self.serial)?;
        writeln!(f, "revision (MES) ... {}", self.revision)?;
        write!(f, "boot count ....... {}", self.boot_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{SocType, Sm2sBoard};
    use crate::error::TransportError;
    use crate::record::{FeatureBits, HEADER_LEN};
    use crate::transport::mock::RamTransport;
    use pretty_assertions::assert_eq;

    type Store = BoardInfoStore<Sm2sBoard<RamTransport>>;

    fn programmed() -> Store {
        let mut store = Store::new(Sm2sBoard::imx8mm(RamTransport::new(256), SocType::Imx8mm));
        let rec = store.provision(BoardInfo::new());
        rec.set_company("MSC").unwrap();
        rec.set_feature("13N4200I").unwrap();
        rec.set_serial("SN000000042").unwrap();
        rec.set_revision("E0").unwrap();
        store.save().unwrap();
        store.clear();
        store
    }

    fn medium(store: &mut Store) -> &mut RamTransport {
        store.board_mut().transport_mut()
    }

    #[test]
    fn save_then_load_preserves_fields() {
        let mut store = programmed();
        assert!(store.load().is_some());
        assert_eq!(store.company(), "MSC");
        assert_eq!(store.feature(), "13N4200I");
        assert_eq!(store.serial(), "SN000000042");
        assert_eq!(store.revision(), "E0");
        assert_eq!(store.boot_count(), 0);
    }

    #[test]
    fn boot_count_accumulates_across_loads() {
        let mut store = programmed();
        for _ in 0..5 {
            assert!(store.load().is_some());
            store.increment_boot_count_and_save().unwrap();
        }
        store.clear();
        store.load();
        assert_eq!(store.boot_count(), 5);
    }

    #[test]
    fn blank_medium_loads_nothing() {
        let mut store = Store::new(Sm2sBoard::imx8mm(RamTransport::new(256), SocType::Imx8mm));
        assert!(store.load().is_none());
        assert_eq!(store.company(), NOT_AVAILABLE);
        assert_eq!(store.feature(), NOT_AVAILABLE);
        assert_eq!(store.serial(), NOT_AVAILABLE);
        assert_eq!(store.revision(), NOT_AVAILABLE);
        assert_eq!(store.boot_count(), 0);
        // board-derived identity does not depend on the record
        assert_eq!(store.form_factor(), "sm2s");
        assert_eq!(store.platform(), "imx8mm");
    }

    #[test]
    fn corrupt_body_discards_previous_record() {
        let mut store = programmed();
        assert!(store.load().is_some());
        medium(&mut store).mem[HEADER_LEN + 6] ^= 0x20;
        assert!(store.load().is_none());
        assert!(!store.is_loaded());
        assert_eq!(store.feature(), NOT_AVAILABLE);
    }

    #[test]
    fn read_failure_loads_nothing() {
        let mut store = programmed();
        medium(&mut store).fail_read = Some(TransportError::NoDevice { bus: 0 });
        assert!(store.load().is_none());
    }

    #[test]
    fn save_without_record_is_no_data() {
        let mut store = Store::new(Sm2sBoard::imx8mm(RamTransport::new(256), SocType::Imx8mm));
        assert_eq!(store.save(), Err(BoardInfoError::NoData));
        assert_eq!(store.increment_boot_count_and_save(), Err(BoardInfoError::NoData));
        assert_eq!(medium(&mut store).writes, 0);
    }

    #[test]
    fn failed_save_keeps_increment() {
        let mut store = programmed();
        store.load();
        let err = TransportError::Bus { chip: 0x50, offset: 0 };
        medium(&mut store).fail_write = Some(err);
        assert_eq!(store.increment_boot_count_and_save(), Err(BoardInfoError::Transport(err)));
        assert_eq!(store.boot_count(), 1);

        medium(&mut store).fail_write = None;
        store.increment_boot_count_and_save().unwrap();
        store.clear();
        store.load();
        assert_eq!(store.boot_count(), 2);
    }

    #[test]
    fn cleared_field_survives_save() {
        let mut store = programmed();
        store.load();
        store.record_mut().unwrap().clear_feature(FeatureBits::SERIAL);
        store.save().unwrap();
        store.clear();
        store.load();
        assert_eq!(store.serial(), NOT_AVAILABLE);
        assert_eq!(store.company(), "MSC");
    }

    #[test]
    fn summary_layout() {
        let mut store = programmed();
        store.load();
        let text = std::format!("{}", store.summary());
        assert_eq!(
            text,
            "company .......... MSC\n\
             form factor ...... sm2s\n\
             platform ......... imx8mm\n\
             processor ........ qc\n\
             feature .......... 13N4200I\n\
             serial ........... SN000000042\n\
             revision (MES) ... E0\n\
             boot count ....... 0"
        );
    }
}
