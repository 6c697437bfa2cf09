//! Guest memory subsystem.
//!
//! This module implements the guest-to-host memory plumbing. It provides:
//! 1. **`Region`:** The capability trait implemented by anything that can be
//!    mapped on the bus (RAM, MMIO devices, the void sentinel).
//! 2. **`Bus`:** Address-indexed routing of sized accesses to mapped regions,
//!    plus a streaming byte writer for image loading.
//! 3. **RAM:** A flat-buffer region monomorphised per byte order.
//!
//! Offsets passed to a region are always relative to the start of its block.
//! For example:
//!
//! ```no_run
//! use mirv_core::common::ByteOrder;
//! use mirv_core::mem::{new_ram, Bus, Region};
//!
//! // a small system with ROM semantics at 0x0000, RAM at 0x8000
//! let mut bus = Bus::new();
//! bus.map(0x0000, new_ram(0x8000, ByteOrder::Little)).unwrap();
//! bus.map(0x8000, new_ram(0x8000, ByteOrder::Little)).unwrap();
//! bus.write_u8(0x8000 + 4096, 42).unwrap();
//! let (base, ram) = bus.memory(0x8000 + 4096);
//! assert_eq!(base, 0x8000);
//! assert_eq!(ram.read_u8(4096).unwrap(), 42); // offset 4096 into the block
//! ```

/// Flat byte buffer backing RAM regions.
pub mod buffer;

/// The memory bus.
pub mod bus;

/// RAM region implementations.
pub mod ram;

/// The void sentinel region.
pub mod void;

/// Streaming byte writer over the bus.
pub mod writer;

use crate::common::{Address, BusOp, ByteOrder, MemError};
use crate::devices::uart::Uart;

pub use bus::Bus;
pub use ram::{new_ram, Ram};
pub use void::Void;
pub use writer::BusWriter;

/// Classification of a mapped region.
///
/// The kind never affects routing; it is a query filter for
/// [`Bus::mapped_range`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryKind {
    /// Non-functional memory; reported only by the void region.
    None,
    /// Random-access memory.
    Ram,
    /// Memory-mapped I/O.
    Io,
}

/// Trait for anything that can be mapped on the bus.
///
/// A region has a fixed size, a kind, a byte order, and read/write accessors
/// for the four access widths. Offsets are relative to the start of the
/// region's block, and an access whose `offset + width` exceeds the size
/// fails with [`MemError::Page`] without side effects.
///
/// The width accessors all default to the shared "no-memory" fallback, which
/// fails every access with [`MemError::Bus`]. MMIO devices override only the
/// widths they support (side effects on read and write are permitted and
/// are the point), while RAM overrides all of them. The void region overrides
/// none: its block base is 0, so the offset a default accessor reports equals
/// the absolute guest address of the fault.
pub trait Region {
    /// Size of the region in bytes; constant over the region's lifetime.
    fn size(&self) -> Address;

    /// Classification used by [`Bus::mapped_range`].
    fn kind(&self) -> MemoryKind;

    /// Byte order governing multi-byte accesses to this region.
    fn byte_order(&self) -> ByteOrder;

    /// Reads one byte at the given region-relative offset.
    fn read_u8(&mut self, offset: Address) -> Result<u8, MemError> {
        Err(MemError::Bus { op: BusOp::Read, width: 1, addr: offset })
    }
    /// Reads a 16-bit value at the given offset.
    fn read_u16(&mut self, offset: Address) -> Result<u16, MemError> {
        Err(MemError::Bus { op: BusOp::Read, width: 2, addr: offset })
    }
    /// Reads a 32-bit value at the given offset.
    fn read_u32(&mut self, offset: Address) -> Result<u32, MemError> {
        Err(MemError::Bus { op: BusOp::Read, width: 4, addr: offset })
    }
    /// Reads a 64-bit value at the given offset.
    fn read_u64(&mut self, offset: Address) -> Result<u64, MemError> {
        Err(MemError::Bus { op: BusOp::Read, width: 8, addr: offset })
    }

    /// Writes one byte at the given region-relative offset.
    fn write_u8(&mut self, offset: Address, _v: u8) -> Result<(), MemError> {
        Err(MemError::Bus { op: BusOp::Write, width: 1, addr: offset })
    }
    /// Writes a 16-bit value at the given offset.
    fn write_u16(&mut self, offset: Address, _v: u16) -> Result<(), MemError> {
        Err(MemError::Bus { op: BusOp::Write, width: 2, addr: offset })
    }
    /// Writes a 32-bit value at the given offset.
    fn write_u32(&mut self, offset: Address, _v: u32) -> Result<(), MemError> {
        Err(MemError::Bus { op: BusOp::Write, width: 4, addr: offset })
    }
    /// Writes a 64-bit value at the given offset.
    fn write_u64(&mut self, offset: Address, _v: u64) -> Result<(), MemError> {
        Err(MemError::Bus { op: BusOp::Write, width: 8, addr: offset })
    }

    /// Returns a mutable reference as [`Uart`] if this region is a UART.
    fn as_uart_mut(&mut self) -> Option<&mut Uart> {
        None
    }
}
