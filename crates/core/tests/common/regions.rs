//! MMIO stub regions.

use mirv_core::common::{Address, ByteOrder, MemError};
use mirv_core::mem::{MemoryKind, Region};

/// A one-register MMIO device that latches the last 32-bit value written.
///
/// Implements only the 32-bit width; everything else falls through to the
/// shared no-memory fallback and fails with a bus error.
pub struct Latch {
    size: Address,
    pub value: u32,
    pub writes: Vec<u32>,
}

impl Latch {
    pub fn new(size: Address) -> Self {
        Self { size, value: 0, writes: Vec::new() }
    }
}

impl Region for Latch {
    fn size(&self) -> Address {
        self.size
    }

    fn kind(&self) -> MemoryKind {
        MemoryKind::Io
    }

    fn byte_order(&self) -> ByteOrder {
        ByteOrder::Little
    }

    fn read_u32(&mut self, offset: Address) -> Result<u32, MemError> {
        if offset > self.size - 4 {
            return Err(MemError::Page);
        }
        Ok(self.value)
    }

    fn write_u32(&mut self, offset: Address, v: u32) -> Result<(), MemError> {
        if offset > self.size - 4 {
            return Err(MemError::Page);
        }
        self.value = v;
        self.writes.push(v);
        Ok(())
    }
}

/// Wraps another region and reports it as MMIO.
///
/// Lets a test back an I/O range with plain RAM while keeping `mapped_range`
/// queries honest about the kind.
pub struct IoRam {
    inner: Box<dyn Region>,
}

impl IoRam {
    pub fn new(inner: Box<dyn Region>) -> Self {
        Self { inner }
    }
}

impl Region for IoRam {
    fn size(&self) -> Address {
        self.inner.size()
    }

    fn kind(&self) -> MemoryKind {
        MemoryKind::Io
    }

    fn byte_order(&self) -> ByteOrder {
        self.inner.byte_order()
    }

    fn read_u8(&mut self, offset: Address) -> Result<u8, MemError> {
        self.inner.read_u8(offset)
    }

    fn read_u16(&mut self, offset: Address) -> Result<u16, MemError> {
        self.inner.read_u16(offset)
    }

    fn read_u32(&mut self, offset: Address) -> Result<u32, MemError> {
        self.inner.read_u32(offset)
    }

    fn read_u64(&mut self, offset: Address) -> Result<u64, MemError> {
        self.inner.read_u64(offset)
    }

    fn write_u8(&mut self, offset: Address, v: u8) -> Result<(), MemError> {
        self.inner.write_u8(offset, v)
    }

    fn write_u16(&mut self, offset: Address, v: u16) -> Result<(), MemError> {
        self.inner.write_u16(offset, v)
    }

    fn write_u32(&mut self, offset: Address, v: u32) -> Result<(), MemError> {
        self.inner.write_u32(offset, v)
    }

    fn write_u64(&mut self, offset: Address, v: u64) -> Result<(), MemError> {
        self.inner.write_u64(offset, v)
    }
}
