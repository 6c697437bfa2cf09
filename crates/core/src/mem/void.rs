//! The void sentinel region.

use crate::common::{Address, ByteOrder};
use crate::mem::{MemoryKind, Region};

/// A zero-sized region that fails every access with a bus error.
///
/// The bus resolves unmapped addresses to a void region with a block base of
/// 0, keeping the access path branch-free: every access dispatches through a
/// region, and a base of 0 makes the reported fault offset equal the absolute
/// guest address. It also doubles as a scaffolding stub for device types that
/// implement only a few access widths.
pub struct Void;

impl Region for Void {
    fn size(&self) -> Address {
        0
    }

    fn kind(&self) -> MemoryKind {
        MemoryKind::None
    }

    fn byte_order(&self) -> ByteOrder {
        ByteOrder::Unknown
    }
}
