//! Error kinds for memory and bus operations.
//!
//! Two families of failure exist on the access path and are deliberately kept
//! distinguishable:
//! 1. **Bus errors:** The access was routed to unmapped memory (the void
//!    region), or to a device that does not implement the access width.
//! 2. **Page errors:** The access landed inside a region but would run past
//!    its end. A sized access never crosses a block boundary, so this also
//!    covers would-be cross-region accesses.
//!
//! The remaining variants report mapping failures (`Overlap`, `Overflow`) and
//! an empty `mapped_range` query (`NoMapping`). None of these are retried;
//! all are returned to the immediate caller with the bus state unchanged.

use std::fmt;

use thiserror::Error;

use super::addr::Address;

/// Direction of a failed bus access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusOp {
    /// A read access.
    Read,
    /// A write access.
    Write,
}

impl fmt::Display for BusOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusOp::Read => write!(f, "read"),
            BusOp::Write => write!(f, "write"),
        }
    }
}

/// Errors reported by regions and the bus.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MemError {
    /// The access reached unmapped memory or an unimplemented access width.
    #[error("bus error: {op}/{width} @ address {addr:#x}")]
    Bus {
        /// Direction of the failing access.
        op: BusOp,
        /// Access width in bytes (1, 2, 4 or 8).
        width: u8,
        /// Faulting guest address (block-relative for device widths).
        addr: Address,
    },

    /// The access would run past the end of the region.
    #[error("memory access past the end of a region")]
    Page,

    /// The requested mapping overlaps an existing block.
    #[error("mapping overlaps an existing block")]
    Overlap,

    /// The requested mapping wraps past the end of the address space.
    #[error("mapping wraps past the end of the address space")]
    Overflow,

    /// No region of the requested kind is mapped.
    #[error("no mapped region of the requested kind")]
    NoMapping,
}
