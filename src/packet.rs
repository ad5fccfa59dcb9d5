//! Big-endian reader over a decoded archive entry.

use bytes::{Buf, Bytes};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("read of {wanted} bytes with only {remaining} remaining")]
    Underflow { wanted: usize, remaining: usize },
}

#[derive(Debug, Clone)]
pub struct Packet {
    buf: Bytes,
}

impl Packet {
    pub fn new(buf: impl Into<Bytes>) -> Self {
        Self { buf: buf.into() }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    #[inline]
    fn ensure(&self, wanted: usize) -> Result<(), PacketError> {
        let remaining = self.buf.remaining();
        if remaining < wanted {
            return Err(PacketError::Underflow { wanted, remaining });
        }
        Ok(())
    }

    pub fn g1(&mut self) -> Result<u8, PacketError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn g2(&mut self) -> Result<u16, PacketError> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn g3(&mut self) -> Result<u32, PacketError> {
        self.ensure(3)?;
        Ok(self.buf.get_uint(3) as u32)
    }

    pub fn g4(&mut self) -> Result<u32, PacketError> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    /// Split off the next `len` bytes without copying.
    pub fn gdata(&mut self, len: usize) -> Result<Bytes, PacketError> {
        self.ensure(len)?;
        Ok(self.buf.split_to(len))
    }

    /// A one-byte length followed by that many bytes, read as Latin-1 chars.
    pub fn gstr1(&mut self) -> Result<Vec<char>, PacketError> {
        let len = usize::from(self.g1()?);
        Ok(self.gdata(len)?.iter().map(|&b| char::from(b)).collect())
    }
}
