//! Page geometry constants.

use super::addr::Address;

/// Default bus page size in bytes (4 KiB).
///
/// Pages play no part in access routing; the loader uses this granularity
/// when scanning for unmapped holes to allocate RAM under an image.
pub const PAGE_SIZE: Address = 4096;

/// Mask for extracting the page offset from an address.
pub const PAGE_OFFSET_MASK: Address = PAGE_SIZE - 1;
