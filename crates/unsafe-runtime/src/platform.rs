//! Facts about the native platform the host needs to lay out memory

use crate::vmem;

/// Virtual memory page size in bytes
pub fn page_size() -> usize {
    vmem::page_size()
}

/// Width of a native pointer in bytes
pub const fn pointer_size() -> usize {
    std::mem::size_of::<*const u8>()
}

pub const fn is_little_endian() -> bool {
    cfg!(target_endian = "little")
}
