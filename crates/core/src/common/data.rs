//! Byte order tag and endian codecs.
//!
//! Byte order is a property of a memory region, not of the call site: the bus
//! exposes plain `read_u32`-style accessors and each region packs and unpacks
//! multi-byte words in its own declared order. This module provides:
//! 1. **`ByteOrder`:** The runtime tag a region reports.
//! 2. **`Endian`:** A compile-time codec trait with zero-sized `Le`/`Be`
//!    implementations, so RAM monomorphises into two variants with no
//!    endianness branch on the access path.
//!
//! The codecs are the only place byte-layout decisions live. A codec fails
//! with [`MemError::Page`] when the buffer is shorter than the access width,
//! which is exactly the "access runs past the end of the region" condition
//! when the buffer is a region's tail slice.

use serde::Deserialize;

use super::error::MemError;

/// Byte order of a memory region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Least-significant byte first.
    Little,
    /// Most-significant byte first.
    Big,
    /// No defined byte order; reported only by the void region.
    Unknown,
}

/// Compile-time endian codec.
///
/// Implemented by the zero-sized [`Le`] and [`Be`] types. For each width the
/// getter decodes from the front of `buf` and the putter encodes to it; both
/// fail with [`MemError::Page`] when `buf` holds fewer bytes than the width
/// requires. 8-bit accesses need no codec.
pub trait Endian: 'static {
    /// The runtime tag corresponding to this codec.
    const ORDER: ByteOrder;

    /// Decodes a 16-bit value from the front of `buf`.
    fn get_u16(buf: &[u8]) -> Result<u16, MemError>;
    /// Encodes a 16-bit value to the front of `buf`.
    fn put_u16(buf: &mut [u8], v: u16) -> Result<(), MemError>;
    /// Decodes a 32-bit value from the front of `buf`.
    fn get_u32(buf: &[u8]) -> Result<u32, MemError>;
    /// Encodes a 32-bit value to the front of `buf`.
    fn put_u32(buf: &mut [u8], v: u32) -> Result<(), MemError>;
    /// Decodes a 64-bit value from the front of `buf`.
    fn get_u64(buf: &[u8]) -> Result<u64, MemError>;
    /// Encodes a 64-bit value to the front of `buf`.
    fn put_u64(buf: &mut [u8], v: u64) -> Result<(), MemError>;
}

/// Little-endian codec.
pub struct Le;

/// Big-endian codec.
pub struct Be;

macro_rules! impl_endian {
    ($ty:ty, $order:expr, $from:ident, $to:ident) => {
        impl Endian for $ty {
            const ORDER: ByteOrder = $order;

            impl_endian!(@width $from, $to, get_u16, put_u16, u16, 2);
            impl_endian!(@width $from, $to, get_u32, put_u32, u32, 4);
            impl_endian!(@width $from, $to, get_u64, put_u64, u64, 8);
        }
    };
    (@width $from:ident, $to:ident, $get:ident, $put:ident, $uint:ty, $n:literal) => {
        fn $get(buf: &[u8]) -> Result<$uint, MemError> {
            let bytes: &[u8; $n] = buf
                .get(..$n)
                .and_then(|s| s.try_into().ok())
                .ok_or(MemError::Page)?;
            Ok(<$uint>::$from(*bytes))
        }

        fn $put(buf: &mut [u8], v: $uint) -> Result<(), MemError> {
            let bytes: &mut [u8; $n] = buf
                .get_mut(..$n)
                .and_then(|s| s.try_into().ok())
                .ok_or(MemError::Page)?;
            *bytes = v.$to();
            Ok(())
        }
    };
}

impl_endian!(Le, ByteOrder::Little, from_le_bytes, to_le_bytes);
impl_endian!(Be, ByteOrder::Big, from_be_bytes, to_be_bytes);
