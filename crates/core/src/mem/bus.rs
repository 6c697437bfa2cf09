//! The memory bus.
//!
//! This module implements the bus that routes guest accesses to mapped
//! regions. It provides:
//! 1. **Mapping:** `map`, `unmap` and `remap` maintain an ordered,
//!    non-overlapping set of blocks, each pairing a base address with an
//!    owned region.
//! 2. **Routing:** A one-entry "preferred block" cache backed by binary
//!    search over the sorted sequence; unmapped addresses resolve to a void
//!    sentinel so the access path never branches on a missing region.
//! 3. **Sized access:** `read_u8`..`write_u64` resolve the address once and
//!    delegate to the region with a block-relative offset. A single sized
//!    access never crosses a block boundary.
//! 4. **Streaming:** [`Bus::writer`] returns a byte sink that, unlike the
//!    sized accessors, may span any number of contiguous blocks.
//!
//! Reads and writes do not need to be aligned but cannot cross the end of a
//! block: with RAM of size 4096 mapped alone, reading a `u64` at offset 4095
//! is a page error. This is of no consequence where the simulated CPU does
//! not support unaligned accesses, but extra steps must be taken with others.

use crate::common::{Address, MemError};
use crate::common::constants::PAGE_SIZE;
use crate::mem::void::Void;
use crate::mem::writer::BusWriter;
use crate::mem::{MemoryKind, Region};

/// A mapped block: a base address, an inclusive end, and the owned region.
struct Block {
    start: Address,
    end: Address,
    region: Box<dyn Region>,
}

impl Block {
    fn contains(&self, addr: Address) -> bool {
        self.start <= addr && addr <= self.end
    }

    fn overlaps(&self, start: Address, end: Address) -> bool {
        self.start <= end && start <= self.end
    }
}

/// The guest memory bus.
///
/// Owns the mapped blocks, sorted ascending by base address, plus a single
/// preferred block acting as a one-entry resolution cache. The preferred
/// block is never also present in the sorted sequence; promotion swaps the
/// old one back in. Regions are transferred to the bus at `map` time and
/// handed back by `unmap`/`remap`.
pub struct Bus {
    blocks: Vec<Block>,
    preferred: Option<Block>,
    page_size: Address,
    void: Void,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Creates an empty bus with the default 4 KiB page size.
    pub fn new() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }

    /// Creates an empty bus with the given page size.
    ///
    /// The page size does not affect routing; it is the granularity at which
    /// the ELF loader scans for unmapped holes. It should match at least the
    /// simulated CPU's natural page size. Panics unless `page_size` is a
    /// nonzero power of two.
    pub fn with_page_size(page_size: Address) -> Self {
        if page_size == 0 || page_size & (page_size - 1) != 0 {
            panic!("page size must be a power of two");
        }
        Self { blocks: Vec::new(), preferred: None, page_size, void: Void }
    }

    /// Returns the configured page size.
    pub fn page_size(&self) -> Address {
        self.page_size
    }

    /// Maps a region at the given base address, transferring ownership.
    ///
    /// Mapping an empty region is a no-op. The first mapping on a fresh bus
    /// fills the preferred slot directly instead of joining the sequence.
    ///
    /// # Arguments
    ///
    /// * `base` - Guest address of the region's first byte.
    /// * `region` - The region to map; owned by the bus until unmapped.
    ///
    /// # Returns
    ///
    /// `MemError::Overflow` when the range would wrap past the end of the
    /// address space, `MemError::Overlap` when it intersects an existing
    /// block; the bus is unchanged on failure.
    pub fn map(&mut self, base: Address, region: Box<dyn Region>) -> Result<(), MemError> {
        let size = region.size();
        if size == 0 {
            return Ok(());
        }
        let end = base.wrapping_add(size - 1);
        if end < base {
            return Err(MemError::Overflow);
        }
        self.check_free(base, end)?;

        let block = Block { start: base, end, region };
        if self.blocks.is_empty() && self.preferred.is_none() {
            self.preferred = Some(block);
        } else {
            let i = self.blocks.partition_point(|b| b.start < base);
            self.blocks.insert(i, block);
        }
        Ok(())
    }

    /// Unmaps every block intersecting `[base, base + n_bytes - 1]`.
    ///
    /// Returns the regions of the removed blocks, preferred block included.
    /// `n_bytes == 0` removes nothing.
    pub fn unmap(&mut self, base: Address, n_bytes: Address) -> Vec<Box<dyn Region>> {
        let mut removed = Vec::new();
        if n_bytes == 0 {
            return removed;
        }
        let end = match base.checked_add(n_bytes - 1) {
            Some(end) => end,
            None => Address::MAX,
        };

        if self.preferred.as_ref().is_some_and(|p| p.overlaps(base, end)) {
            if let Some(p) = self.preferred.take() {
                removed.push(p.region);
            }
        }
        let mut i = 0;
        while i < self.blocks.len() {
            if self.blocks[i].overlaps(base, end) {
                removed.push(self.blocks.remove(i).region);
            } else {
                i += 1;
            }
        }
        removed
    }

    /// Replaces the block containing `addr` with a new region, or maps the
    /// region at `addr` if the address is unmapped.
    ///
    /// The replacement keeps the old block's base. Growing is rejected with
    /// `MemError::Overlap` when the new end would collide with another block
    /// and with `MemError::Overflow` when it would wrap; shrinking is always
    /// allowed. Returns the replaced region, or `None` when the address was
    /// unmapped. Replacing with an empty region is a no-op.
    pub fn remap(
        &mut self,
        addr: Address,
        region: Box<dyn Region>,
    ) -> Result<Option<Box<dyn Region>>, MemError> {
        let size = region.size();
        if size == 0 {
            return Ok(None);
        }

        if self.preferred.as_ref().is_some_and(|p| p.contains(addr)) {
            if let Some(p) = self.preferred.as_mut() {
                let end = p.start.wrapping_add(size - 1);
                if end < p.start {
                    return Err(MemError::Overflow);
                }
                if self.blocks.iter().any(|b| b.overlaps(p.start, end)) {
                    return Err(MemError::Overlap);
                }
                let old = std::mem::replace(&mut p.region, region);
                p.end = end;
                return Ok(Some(old));
            }
        }

        if let Some(i) = self.find(addr) {
            let start = self.blocks[i].start;
            let end = start.wrapping_add(size - 1);
            if end < start {
                return Err(MemError::Overflow);
            }
            let collides = self
                .blocks
                .iter()
                .enumerate()
                .any(|(j, b)| j != i && b.overlaps(start, end))
                || self.preferred.as_ref().is_some_and(|p| p.overlaps(start, end));
            if collides {
                return Err(MemError::Overlap);
            }
            let b = &mut self.blocks[i];
            let old = std::mem::replace(&mut b.region, region);
            b.end = end;
            return Ok(Some(old));
        }

        self.map(addr, region)?;
        Ok(None)
    }

    /// Promotes the block containing `addr` to the preferred slot.
    ///
    /// The previous preferred block, if any, is swapped back into the
    /// sequence at its sorted position. An unmapped `addr`, or one already
    /// resolving through the preferred block, is a no-op. This is the only
    /// way the preferred block changes once set.
    pub fn preferred(&mut self, addr: Address) {
        if self.preferred.as_ref().is_some_and(|p| p.contains(addr)) {
            return;
        }
        let Some(i) = self.find(addr) else {
            return;
        };
        let hit = self.blocks.remove(i);
        if let Some(old) = self.preferred.replace(hit) {
            let j = self.blocks.partition_point(|b| b.start < old.start);
            self.blocks.insert(j, old);
        }
    }

    /// Returns the routing result for `addr`: the containing block's base
    /// address and its region.
    ///
    /// Unmapped addresses resolve to `(0, void)`; the void region has size 0,
    /// so `memory(addr).1.size() == 0` tests for an unmapped address.
    /// Resolution never mutates the preferred slot.
    pub fn memory(&mut self, addr: Address) -> (Address, &mut dyn Region) {
        let use_preferred = self.preferred.as_ref().is_some_and(|p| p.contains(addr));
        if use_preferred {
            let p = self.preferred.as_mut().unwrap();
            (p.start, p.region.as_mut())
        } else {
            match self.find(addr) {
                Some(i) => {
                    let b = &mut self.blocks[i];
                    (b.start, b.region.as_mut())
                }
                None => (0, &mut self.void),
            }
        }
    }

    /// Reports the smallest range `[low, high)` covering every mapped block
    /// of the given kind.
    ///
    /// Only `low` and `high - 1` are guaranteed to be mapped; there may be
    /// holes in between. When a block covers the top of the address space,
    /// two's-complement arithmetic makes `high` come out as 0, which callers
    /// treat as one past the last address. The purpose of this query is to
    /// ease setup of CPUs that default registers to the start or end of
    /// memory.
    pub fn mapped_range(&self, kind: MemoryKind) -> Result<(Address, Address), MemError> {
        let mut low = Address::MAX;
        let mut high = 0;
        let mut found = false;
        for b in self.blocks.iter().chain(self.preferred.as_ref()) {
            if b.region.kind() != kind {
                continue;
            }
            found = true;
            low = low.min(b.start);
            high = high.max(b.end);
        }
        if !found {
            return Err(MemError::NoMapping);
        }
        Ok((low, high.wrapping_add(1)))
    }

    /// Returns a streaming byte sink writing to mapped memory from `addr`.
    ///
    /// The writer borrows the bus for its lifetime.
    pub fn writer(&mut self, addr: Address) -> BusWriter<'_> {
        BusWriter::new(self, addr)
    }

    /// Reads the 8-bit value at `addr`.
    pub fn read_u8(&mut self, addr: Address) -> Result<u8, MemError> {
        let (base, region) = self.memory(addr);
        region.read_u8(addr.wrapping_sub(base))
    }

    /// Reads the 16-bit value at `addr` in the region's byte order.
    pub fn read_u16(&mut self, addr: Address) -> Result<u16, MemError> {
        let (base, region) = self.memory(addr);
        region.read_u16(addr.wrapping_sub(base))
    }

    /// Reads the 32-bit value at `addr` in the region's byte order.
    pub fn read_u32(&mut self, addr: Address) -> Result<u32, MemError> {
        let (base, region) = self.memory(addr);
        region.read_u32(addr.wrapping_sub(base))
    }

    /// Reads the 64-bit value at `addr` in the region's byte order.
    pub fn read_u64(&mut self, addr: Address) -> Result<u64, MemError> {
        let (base, region) = self.memory(addr);
        region.read_u64(addr.wrapping_sub(base))
    }

    /// Writes the 8-bit value `v` to `addr`.
    pub fn write_u8(&mut self, addr: Address, v: u8) -> Result<(), MemError> {
        let (base, region) = self.memory(addr);
        region.write_u8(addr.wrapping_sub(base), v)
    }

    /// Writes the 16-bit value `v` to `addr` in the region's byte order.
    pub fn write_u16(&mut self, addr: Address, v: u16) -> Result<(), MemError> {
        let (base, region) = self.memory(addr);
        region.write_u16(addr.wrapping_sub(base), v)
    }

    /// Writes the 32-bit value `v` to `addr` in the region's byte order.
    pub fn write_u32(&mut self, addr: Address, v: u32) -> Result<(), MemError> {
        let (base, region) = self.memory(addr);
        region.write_u32(addr.wrapping_sub(base), v)
    }

    /// Writes the 64-bit value `v` to `addr` in the region's byte order.
    pub fn write_u64(&mut self, addr: Address, v: u64) -> Result<(), MemError> {
        let (base, region) = self.memory(addr);
        region.write_u64(addr.wrapping_sub(base), v)
    }

    /// Binary search for the sequence block containing `addr`.
    fn find(&self, addr: Address) -> Option<usize> {
        let i = self.blocks.partition_point(|b| b.start <= addr);
        if i > 0 && self.blocks[i - 1].contains(addr) {
            Some(i - 1)
        } else {
            None
        }
    }

    /// Rejects a candidate range overlapping any block, preferred included.
    fn check_free(&self, start: Address, end: Address) -> Result<(), MemError> {
        if self.preferred.as_ref().is_some_and(|p| p.overlaps(start, end)) {
            return Err(MemError::Overlap);
        }
        let i = self.blocks.partition_point(|b| b.start < start);
        if i > 0 && self.blocks[i - 1].end >= start {
            return Err(MemError::Overlap);
        }
        if i < self.blocks.len() && self.blocks[i].start <= end {
            return Err(MemError::Overlap);
        }
        Ok(())
    }
}
