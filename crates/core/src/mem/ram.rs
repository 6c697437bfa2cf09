//! RAM region implementations.
//!
//! A RAM region is a bounds check followed by a codec pack/unpack over the
//! backing buffer. The byte order is a type parameter, so the bus dispatches
//! into one of two monomorphised variants and the access path itself carries
//! no endianness branch.

use std::marker::PhantomData;

use crate::common::{Address, Be, ByteOrder, Endian, Le, MemError};
use crate::mem::buffer::RamBuffer;
use crate::mem::{MemoryKind, Region};

/// A RAM region with compile-time byte order.
pub struct Ram<E: Endian> {
    buf: RamBuffer,
    _order: PhantomData<E>,
}

impl<E: Endian> Ram<E> {
    /// Creates a zero-filled RAM region of the given size in bytes.
    pub fn new(size: Address) -> Self {
        let size = usize::try_from(size)
            .unwrap_or_else(|_| panic!("RAM size {:#x} exceeds the host address space", size));
        Self { buf: RamBuffer::new(size), _order: PhantomData }
    }

    fn tail(&self, offset: Address) -> &[u8] {
        match usize::try_from(offset) {
            Ok(offset) => self.buf.tail(offset),
            Err(_) => &[],
        }
    }

    fn tail_mut(&mut self, offset: Address) -> &mut [u8] {
        match usize::try_from(offset) {
            Ok(offset) => self.buf.tail_mut(offset),
            Err(_) => &mut [],
        }
    }
}

impl<E: Endian> Region for Ram<E> {
    fn size(&self) -> Address {
        self.buf.len() as Address
    }

    fn kind(&self) -> MemoryKind {
        MemoryKind::Ram
    }

    fn byte_order(&self) -> ByteOrder {
        E::ORDER
    }

    fn read_u8(&mut self, offset: Address) -> Result<u8, MemError> {
        self.tail(offset).first().copied().ok_or(MemError::Page)
    }

    fn read_u16(&mut self, offset: Address) -> Result<u16, MemError> {
        E::get_u16(self.tail(offset))
    }

    fn read_u32(&mut self, offset: Address) -> Result<u32, MemError> {
        E::get_u32(self.tail(offset))
    }

    fn read_u64(&mut self, offset: Address) -> Result<u64, MemError> {
        E::get_u64(self.tail(offset))
    }

    fn write_u8(&mut self, offset: Address, v: u8) -> Result<(), MemError> {
        match self.tail_mut(offset).first_mut() {
            Some(b) => {
                *b = v;
                Ok(())
            }
            None => Err(MemError::Page),
        }
    }

    fn write_u16(&mut self, offset: Address, v: u16) -> Result<(), MemError> {
        E::put_u16(self.tail_mut(offset), v)
    }

    fn write_u32(&mut self, offset: Address, v: u32) -> Result<(), MemError> {
        E::put_u32(self.tail_mut(offset), v)
    }

    fn write_u64(&mut self, offset: Address, v: u64) -> Result<(), MemError> {
        E::put_u64(self.tail_mut(offset), v)
    }
}

/// Returns a new RAM region of the requested size and byte order.
///
/// # Arguments
///
/// * `size` - Region size in bytes.
/// * `byte_order` - Layout of multi-byte words in the region.
///
/// # Returns
///
/// A boxed region ready to be mapped. Panics when asked for
/// [`ByteOrder::Unknown`] RAM; that order belongs to the void region alone.
pub fn new_ram(size: Address, byte_order: ByteOrder) -> Box<dyn Region> {
    match byte_order {
        ByteOrder::Little => Box::new(Ram::<Le>::new(size)),
        ByteOrder::Big => Box::new(Ram::<Be>::new(size)),
        ByteOrder::Unknown => panic!("RAM byte order must be little or big"),
    }
}
