//! Block transport seam between the record store and the storage medium.
//!
//! Offsets are byte addresses on the medium. Implementations are responsible
//! for splitting transfers at whatever boundaries the device imposes; callers
//! always hand over the whole range.

use crate::error::TransportError;

pub trait BlockTransport {
    /// Fill `buf` with the bytes starting at `offset`.
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Program `buf` starting at `offset`.
    fn write(&mut self, offset: u32, buf: &[u8]) -> Result<(), TransportError>;
}

impl<T: BlockTransport + ?Sized> BlockTransport for &mut T {
    fn read(&mut self, offset: u32, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read(offset, buf)
    }

    fn write(&mut self, offset: u32, buf: &[u8]) -> Result<(), TransportError> {
        (**self).write(offset, buf)
    }
}
