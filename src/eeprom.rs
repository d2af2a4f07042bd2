//! I2C serial EEPROM transport.
//!
//! Transfers are split so that no single transaction crosses a write page or
//! exceeds the controller's block cap. The high bits of the offset that do not
//! fit into the address bytes are folded into the device-select byte, which is
//! how 24Cxx parts larger than their addressing width expose extra blocks.
//! Every write chunk is followed by the part's write-cycle settle delay.

use crate::error::TransportError;
use crate::transport::BlockTransport;

/// Number of address bytes sent ahead of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressWidth {
    One = 1,
    Two = 2,
}

impl AddressWidth {
    #[inline]
    pub const fn bytes(self) -> u8 {
        self as u8
    }
}

/// Static wiring and timing of one EEPROM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EepromConfig {
    pub bus_id: u32,
    pub dev_addr: u8,
    pub addr_width: AddressWidth,
    /// Largest transfer the I2C controller handles in one go.
    pub rw_block_size: u32,
    /// Write page size; must be a power of two.
    pub page_size: u32,
    pub write_delay_ms: u32,
}

/// Default page-write bits for parts that do not say otherwise.
pub const PAGE_WRITE_BITS: u32 = 8;

/// Board-info EEPROM on the SM2S carrier.
pub const SM2S_BOARDINFO_EEPROM: EepromConfig = EepromConfig {
    bus_id: 0,
    dev_addr: 0x50,
    addr_width: AddressWidth::Two,
    rw_block_size: 16,
    page_size: 1 << PAGE_WRITE_BITS,
    write_delay_ms: 5,
};

/// Raw I2C access as provided by the bootloader's bus driver.
pub trait I2cBus {
    fn read(
        &mut self,
        bus: u32,
        chip: u8,
        offset: u32,
        width: AddressWidth,
        buf: &mut [u8],
    ) -> Result<(), TransportError>;

    fn write(
        &mut self,
        bus: u32,
        chip: u8,
        offset: u32,
        width: AddressWidth,
        buf: &[u8],
    ) -> Result<(), TransportError>;

    /// Drive the write-protect line. Boards without one keep the default.
    fn set_write_enable(&mut self, _enable: bool) -> Result<(), TransportError> {
        Ok(())
    }
}

pub trait DelayMs {
    fn delay_ms(&mut self, ms: u32);
}

pub struct I2cEeprom<B, D> {
    bus: B,
    delay: D,
    config: EepromConfig,
}

impl EepromConfig {
    /// Rejects geometry the chunking cannot make progress with.
    pub const fn validate(&self) -> Result<(), TransportError> {
        if self.page_size.is_power_of_two() && self.rw_block_size > 0 {
            Ok(())
        } else {
            Err(TransportError::BadGeometry {
                page_size: self.page_size,
                rw_block_size: self.rw_block_size,
            })
        }
    }

    /// End offset of a `len`-byte transfer at `offset`, if it is addressable.
    fn end_of(&self, offset: u32, len: usize) -> Result<u32, TransportError> {
        u32::try_from(len)
            .ok()
            .and_then(|len| offset.checked_add(len))
            .ok_or(TransportError::Bus { chip: chip_address(self, offset), offset })
    }
}

impl<B: I2cBus, D: DelayMs> I2cEeprom<B, D> {
    pub fn new(bus: B, delay: D, config: EepromConfig) -> Result<Self, TransportError> {
        config.validate()?;
        Ok(Self { bus, delay, config })
    }

    pub fn config(&self) -> &EepromConfig {
        &self.config
    }

    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    fn write_chunks(&mut self, offset: u32, buf: &[u8]) -> Result<(), TransportError> {
        let end = self.config.end_of(offset, buf.len())?;
        let mut pos = offset;
        let mut rest = buf;
        while pos < end {
            let len = chunk_len(&self.config, pos, end) as usize;
            let chip = chip_address(&self.config, pos);
            let (chunk, tail) = rest.split_at(len);
            self.bus.write(self.config.bus_id, chip, pos, self.config.addr_width, chunk)?;
            self.delay.delay_ms(self.config.write_delay_ms);
            rest = tail;
            pos += len as u32;
        }
        Ok(())
    }
}

impl<B: I2cBus, D: DelayMs> BlockTransport for I2cEeprom<B, D> {
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), TransportError> {
        // The address has to be re-sent at each page: the next page may sit
        // behind a different device-select byte.
        let end = self.config.end_of(offset, buf.len())?;
        let mut pos = offset;
        let mut rest = buf;
        while pos < end {
            let len = chunk_len(&self.config, pos, end) as usize;
            let chip = chip_address(&self.config, pos);
            let (chunk, tail) = rest.split_at_mut(len);
            let res = self.bus.read(self.config.bus_id, chip, pos, self.config.addr_width, chunk);
            if let Err(e) = res {
                log::debug!(target: "eeprom", "read failed at {:#x}: {}", pos, e);
                return Err(e);
            }
            rest = tail;
            pos += len as u32;
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, buf: &[u8]) -> Result<(), TransportError> {
        self.bus.set_write_enable(true)?;
        let result = self.write_chunks(offset, buf);
        let relock = self.bus.set_write_enable(false);
        if let Err(e) = &result {
            log::debug!(target: "eeprom", "write failed: {}", e);
        }
        result.and(relock)
    }
}

/// Device-select byte for `offset`: base address with the offset bits above
/// the address bytes folded into its low bits.
pub fn chip_address(config: &EepromConfig, offset: u32) -> u8 {
    let block = match config.addr_width {
        AddressWidth::One => offset >> 8,
        AddressWidth::Two => offset >> 16,
    };
    (block as u8) | config.dev_addr
}

/// Length of the next transaction starting at `offset` and ending no later
/// than `end`.
pub fn chunk_len(config: &EepromConfig, offset: u32, end: u32) -> u32 {
    let blk_off = offset & 0xff;
    let to_page_end = config.page_size - (blk_off & (config.page_size - 1));
    (end - offset).min(to_page_end).min(config.rw_block_size)
}
