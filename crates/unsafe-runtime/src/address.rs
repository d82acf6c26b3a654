//! Native address and handle value types
//!
//! Addresses cross the host boundary as plain 64-bit integers. Inside the crate they
//! are wrapped so they cannot be mixed up with sizes, offsets or status codes. The
//! wrapper adds no runtime checks: validity is entirely the caller's responsibility.

use std::fmt;

/// A process-virtual address with no type, size or liveness information attached.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NativeAddress(u64);

impl NativeAddress {
    /// Null sentinel returned by failed allocations and lookups
    pub const NULL: NativeAddress = NativeAddress(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Reinterpret a host integer as an address (two's complement bit pattern)
    pub const fn from_host(raw: i64) -> Self {
        Self(raw as u64)
    }

    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize as u64)
    }

    pub fn from_mut_ptr<T>(ptr: *mut T) -> Self {
        Self(ptr as usize as u64)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Integer handed back to the host runtime
    pub const fn to_host(self) -> i64 {
        self.0 as i64
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Effective address `self + offset`; negative offsets are allowed and wrap.
    pub const fn offset(self, offset: i64) -> Self {
        Self(self.0.wrapping_add(offset as u64))
    }

    pub fn as_ptr<T>(self) -> *const T {
        self.0 as usize as *const T
    }

    pub fn as_mut_ptr<T>(self) -> *mut T {
        self.0 as usize as *mut T
    }

    /// Whether the address is a multiple of `align` (must be a power of two)
    pub fn is_aligned_to(self, align: usize) -> bool {
        debug_assert!(align.is_power_of_two());
        self.0 & (align as u64 - 1) == 0
    }
}

impl fmt::Display for NativeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for NativeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Opaque dynamic library handle returned by the loader
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LibraryHandle(NativeAddress);

impl LibraryHandle {
    pub const fn from_address(address: NativeAddress) -> Self {
        Self(address)
    }

    pub const fn address(self) -> NativeAddress {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0.is_null()
    }
}
