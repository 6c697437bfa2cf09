//! Guest address type.
//!
//! The simulated machine's address space is flat: a guest address is the
//! physical address, with no translation layer in between. All address
//! arithmetic is modular in the address width, so code manipulating addresses
//! uses the `wrapping_*` operations throughout.

/// A guest (physical) address.
///
/// 64 bits wide regardless of the simulated machine's natural width; narrower
/// guests simply never produce addresses above their own range.
pub type Address = u64;
