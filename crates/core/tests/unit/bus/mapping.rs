//! Bus Mapping Unit Tests.
//!
//! Verifies map/unmap/remap: overlap and overflow rejection, the
//! first-map-to-preferred rule, ownership handback, and that failed
//! operations leave the bus unchanged.

use mirv_core::common::{ByteOrder, MemError};
use mirv_core::mem::{new_ram, Bus};

const PSZ: u64 = 4096;

fn ram(size: u64) -> Box<dyn mirv_core::mem::Region> {
    new_ram(size, ByteOrder::Little)
}

// ══════════════════════════════════════════════════════════
// 1. Basic mapping
// ══════════════════════════════════════════════════════════

#[test]
fn map_resolves_the_mapped_range_only() {
    let mut bus = Bus::new();
    let base = 4242 << 20;
    bus.map(base, ram(PSZ * 2)).unwrap();

    assert_eq!(bus.memory(base - 1).1.size(), 0);
    assert_eq!(bus.memory(base).1.size(), PSZ * 2);
    assert_eq!(bus.memory(base + PSZ * 2 - 1).1.size(), PSZ * 2);
    assert_eq!(bus.memory(base + PSZ * 2).1.size(), 0);
}

#[test]
fn map_empty_region_is_a_noop() {
    let mut bus = Bus::new();
    bus.map(0x1000, ram(0)).unwrap();
    assert_eq!(bus.memory(0x1000).1.size(), 0);
}

#[test]
fn map_rejects_wrap_past_the_top() {
    let mut bus = Bus::new();
    let base = 0u64.wrapping_sub(PSZ);
    assert_eq!(bus.map(base + 8, ram(PSZ)), Err(MemError::Overflow));
    // exactly up to the top is fine
    bus.map(base, ram(PSZ)).unwrap();
    assert_eq!(bus.memory(u64::MAX).1.size(), PSZ);
}

// ══════════════════════════════════════════════════════════
// 2. Overlap rejection
// ══════════════════════════════════════════════════════════

#[test]
fn map_rejects_overlaps_in_every_position() {
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ * 2)).unwrap(); // becomes the preferred block
    bus.map(0x8000, ram(PSZ * 2)).unwrap();

    // against the preferred block
    assert_eq!(bus.map(0x4000, ram(PSZ)), Err(MemError::Overlap));
    // overlapping the tail of a sequence block
    assert_eq!(bus.map(0x9000, ram(PSZ * 2)), Err(MemError::Overlap));
    // overlapping the head
    assert_eq!(bus.map(0x7000, ram(PSZ * 2)), Err(MemError::Overlap));
    // fully containing an existing block
    assert_eq!(bus.map(0x7000, ram(PSZ * 4)), Err(MemError::Overlap));
    // fully contained inside an existing block
    assert_eq!(bus.map(0x8800, ram(0x100)), Err(MemError::Overlap));

    // failure left both mappings intact
    assert_eq!(bus.memory(0x4000).0, 0x4000);
    assert_eq!(bus.memory(0x8000).0, 0x8000);
}

#[test]
fn adjacent_blocks_do_not_overlap() {
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ)).unwrap();
    bus.map(0x5000, ram(PSZ)).unwrap();
    bus.map(0x3000, ram(PSZ)).unwrap();
    assert_eq!(bus.memory(0x3fff).0, 0x3000);
    assert_eq!(bus.memory(0x4000).0, 0x4000);
    assert_eq!(bus.memory(0x5000).0, 0x5000);
}

// ══════════════════════════════════════════════════════════
// 3. Unmap
// ══════════════════════════════════════════════════════════

#[test]
fn unmap_returns_the_removed_regions() {
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ)).unwrap();
    bus.map(0x8000, ram(PSZ * 2)).unwrap();

    let removed = bus.unmap(0x8000, PSZ * 2);
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].size(), PSZ * 2);
    assert_eq!(bus.memory(0x8000).1.size(), 0);
    assert_eq!(bus.memory(0x4000).1.size(), PSZ);
}

#[test]
fn unmap_removes_any_intersecting_block() {
    // a one-byte range still takes out the whole containing block
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ * 4)).unwrap();
    let removed = bus.unmap(0x5000, 1);
    assert_eq!(removed.len(), 1);
    assert_eq!(bus.memory(0x4000).1.size(), 0);
}

#[test]
fn unmap_spanning_several_blocks_removes_them_all() {
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ)).unwrap();
    bus.map(0x6000, ram(PSZ)).unwrap();
    bus.map(0x8000, ram(PSZ)).unwrap();
    bus.map(0xA000, ram(PSZ)).unwrap();

    let removed = bus.unmap(0x6800, 0x2000);
    assert_eq!(removed.len(), 2);
    assert_eq!(bus.memory(0x4000).1.size(), PSZ);
    assert_eq!(bus.memory(0x6000).1.size(), 0);
    assert_eq!(bus.memory(0x8000).1.size(), 0);
    assert_eq!(bus.memory(0xA000).1.size(), PSZ);
}

#[test]
fn unmap_of_zero_bytes_removes_nothing() {
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ)).unwrap();
    assert!(bus.unmap(0x4000, 0).is_empty());
    assert_eq!(bus.memory(0x4000).1.size(), PSZ);
}

#[test]
fn unmap_takes_out_the_preferred_block_too() {
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ)).unwrap(); // preferred
    bus.map(0x8000, ram(PSZ)).unwrap();
    let removed = bus.unmap(0x4000, PSZ);
    assert_eq!(removed.len(), 1);
    assert_eq!(bus.memory(0x4000).1.size(), 0);
    assert_eq!(bus.memory(0x8000).1.size(), PSZ);
}

// ══════════════════════════════════════════════════════════
// 4. Remap
// ══════════════════════════════════════════════════════════

#[test]
fn remap_replaces_the_containing_block() {
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ)).unwrap();
    bus.write_u8(0x4000, 0xAA).unwrap();

    // addr anywhere inside the block selects it; the base is kept
    let old = bus.remap(0x4800, ram(PSZ)).unwrap().expect("old region");
    assert_eq!(old.size(), PSZ);
    assert_eq!(bus.memory(0x4800).0, 0x4000);
    assert_eq!(bus.read_u8(0x4000).unwrap(), 0); // fresh RAM
}

#[test]
fn remap_on_an_unmapped_address_maps() {
    let mut bus = Bus::new();
    bus.map(0x8000, ram(PSZ)).unwrap();
    assert!(bus.remap(0x4000, ram(PSZ)).unwrap().is_none());
    assert_eq!(bus.memory(0x4000).0, 0x4000);
}

#[test]
fn remap_shrink_is_allowed() {
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ * 2)).unwrap();
    bus.remap(0x4000, ram(PSZ)).unwrap();
    assert_eq!(bus.memory(0x4000).1.size(), PSZ);
    assert_eq!(bus.memory(0x5000).1.size(), 0);
}

#[test]
fn remap_grow_into_free_space_is_allowed() {
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ)).unwrap();
    bus.map(0x8000, ram(PSZ)).unwrap();
    bus.remap(0x4000, ram(PSZ * 2)).unwrap();
    assert_eq!(bus.memory(0x5fff).0, 0x4000);
}

#[test]
fn remap_grow_colliding_with_the_next_block_is_rejected() {
    let mut bus = Bus::new();
    bus.map(0x4000, ram(PSZ)).unwrap(); // preferred
    bus.map(0x6000, ram(PSZ)).unwrap();
    bus.map(0x7000, ram(PSZ)).unwrap();

    // sequence block growing into its neighbour
    assert_eq!(bus.remap(0x6000, ram(PSZ * 2)), Err(MemError::Overlap));
    // preferred block growing into a sequence block
    assert_eq!(bus.remap(0x4000, ram(PSZ * 3)), Err(MemError::Overlap));

    // nothing changed
    assert_eq!(bus.memory(0x6000).1.size(), PSZ);
    assert_eq!(bus.memory(0x4000).1.size(), PSZ);
}

#[test]
fn remap_grow_wrapping_the_address_space_is_rejected() {
    let mut bus = Bus::new();
    let base = 0u64.wrapping_sub(PSZ);
    bus.map(base, ram(PSZ)).unwrap();
    assert_eq!(bus.remap(base, ram(PSZ * 2)), Err(MemError::Overflow));
}
