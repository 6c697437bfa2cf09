//! Streaming byte writer over the bus.

use std::io;

use crate::common::Address;
use crate::mem::Bus;

/// A [`std::io::Write`] sink that advances one byte per write through mapped
/// memory.
///
/// The writer caches the bounds of the block it is currently inside and
/// re-resolves only when the address leaves them, so a stream may span any
/// number of contiguous blocks, which the sized bus accessors never do. Crossing
/// into an unmapped address ends the stream: `write` returns the number of
/// bytes that made it, and `Ok(0)` once nothing more can be written (which
/// `write_all` surfaces as a `WriteZero` error).
pub struct BusWriter<'a> {
    bus: &'a mut Bus,
    addr: Address,
}

impl<'a> BusWriter<'a> {
    pub(crate) fn new(bus: &'a mut Bus, addr: Address) -> Self {
        Self { bus, addr }
    }

    /// Returns the guest address the next byte would be written to.
    pub fn position(&self) -> Address {
        self.addr
    }
}

impl io::Write for BusWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            let (base, region) = self.bus.memory(self.addr);
            let size = region.size();
            if size == 0 {
                return Ok(n);
            }
            let end = base.wrapping_add(size - 1);
            while n < buf.len() && self.addr >= base && self.addr <= end {
                if region.write_u8(self.addr.wrapping_sub(base), buf[n]).is_err() {
                    return Ok(n);
                }
                self.addr = self.addr.wrapping_add(1);
                n += 1;
            }
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
