//! Process heap allocation and bulk byte operations
//!
//! Thin wrappers over the C allocator so buffers can be handed to, and freed by,
//! native code. Allocation failure is a null sentinel, never an error.

use crate::address::NativeAddress;

/// Allocate `size` bytes from the process heap
///
/// Returns [`NativeAddress::NULL`] for a zero size or when the allocator is exhausted.
pub fn allocate(size: usize) -> NativeAddress {
    if size == 0 {
        return NativeAddress::NULL;
    }
    let ptr = unsafe { libc::malloc(size) };
    let address = NativeAddress::from_mut_ptr(ptr);
    tracing::debug!(size, %address, "heap allocate");
    address
}

/// Release a buffer obtained from [`allocate`]. Null is a no-op.
///
/// # Safety
///
/// `address` must come from [`allocate`] and must not have been freed already.
pub unsafe fn free(address: NativeAddress) {
    if address.is_null() {
        return;
    }
    tracing::debug!(%address, "heap free");
    libc::free(address.as_mut_ptr());
}

/// Copy `n` bytes from `src` to `dest` (regions must not overlap)
///
/// # Safety
///
/// Both regions must be valid for `n` bytes and must not overlap.
pub unsafe fn copy(dest: NativeAddress, src: NativeAddress, n: usize) {
    std::ptr::copy_nonoverlapping(src.as_ptr::<u8>(), dest.as_mut_ptr::<u8>(), n);
}

/// Copy `n` bytes from `src` to `dest`; the regions may overlap
///
/// # Safety
///
/// Both regions must be valid for `n` bytes.
pub unsafe fn move_bytes(dest: NativeAddress, src: NativeAddress, n: usize) {
    std::ptr::copy(src.as_ptr::<u8>(), dest.as_mut_ptr::<u8>(), n);
}

/// Fill `size` bytes at `base + offset` with the low byte of `value`
///
/// # Safety
///
/// The region must be valid and writable for `size` bytes.
pub unsafe fn set(base: NativeAddress, offset: i64, value: i64, size: usize) {
    std::ptr::write_bytes(base.offset(offset).as_mut_ptr::<u8>(), value as u8, size);
}
