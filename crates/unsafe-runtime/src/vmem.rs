//! Page-granular virtual memory
//!
//! Regions start with no access rights. Callers grant rights with [`protect`], which
//! supports the usual write-then-execute sequence for generated code:
//! allocate, protect read-write, fill, protect read-execute, call.

use crate::address::NativeAddress;
use std::io;
use thiserror::Error;

/// Page access rights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtectionMode {
    NoAccess,
    ReadOnly,
    ReadWrite,
    ReadExecute,
    ReadWriteExecute,
}

impl ProtectionMode {
    pub const ALL: [ProtectionMode; 5] = [
        ProtectionMode::NoAccess,
        ProtectionMode::ReadOnly,
        ProtectionMode::ReadWrite,
        ProtectionMode::ReadExecute,
        ProtectionMode::ReadWriteExecute,
    ];

    /// Decode the host encoding (`0..=4`, in declaration order)
    pub fn from_host(value: i64) -> Option<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn to_host(self) -> i64 {
        self as i64
    }

    #[cfg(unix)]
    fn native(self) -> libc::c_int {
        match self {
            ProtectionMode::NoAccess => libc::PROT_NONE,
            ProtectionMode::ReadOnly => libc::PROT_READ,
            ProtectionMode::ReadWrite => libc::PROT_READ | libc::PROT_WRITE,
            ProtectionMode::ReadExecute => libc::PROT_READ | libc::PROT_EXEC,
            ProtectionMode::ReadWriteExecute => {
                libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC
            }
        }
    }

    #[cfg(windows)]
    fn native(self) -> winapi::shared::minwindef::DWORD {
        use winapi::um::winnt;
        match self {
            ProtectionMode::NoAccess => winnt::PAGE_NOACCESS,
            ProtectionMode::ReadOnly => winnt::PAGE_READONLY,
            ProtectionMode::ReadWrite => winnt::PAGE_READWRITE,
            ProtectionMode::ReadExecute => winnt::PAGE_EXECUTE_READ,
            ProtectionMode::ReadWriteExecute => winnt::PAGE_EXECUTE_READWRITE,
        }
    }
}

/// Virtual memory release failure, reported to the host
#[derive(Debug, Error)]
pub enum VmError {
    #[error("Failed to release virtual memory at {address} ({size} bytes): {source}")]
    ReleaseFailed {
        address: NativeAddress,
        size: usize,
        #[source]
        source: io::Error,
    },
}

/// Size of a virtual memory page in bytes
pub fn page_size() -> usize {
    platform::page_size()
}

/// Reserve and commit `size` bytes with [`ProtectionMode::NoAccess`]
///
/// Returns [`NativeAddress::NULL`] on failure.
pub fn allocate(size: usize) -> NativeAddress {
    let address = platform::allocate(size);
    if address.is_null() {
        tracing::debug!(size, "virtual allocate failed");
    } else {
        tracing::debug!(size, %address, "virtual allocate");
    }
    address
}

/// Release a region obtained from [`allocate`]
///
/// # Safety
///
/// `address`/`size` must describe a region from [`allocate`]. Nothing may access it
/// afterwards. Releasing the same region twice is undefined.
pub unsafe fn release(address: NativeAddress, size: usize) -> Result<(), VmError> {
    platform::release(address, size).map_err(|source| {
        tracing::warn!(%address, size, error = %source, "virtual release failed");
        VmError::ReleaseFailed {
            address,
            size,
            source,
        }
    })?;
    tracing::debug!(%address, size, "virtual release");
    Ok(())
}

/// Change the access rights of an allocated region; returns whether the OS call succeeded
///
/// # Safety
///
/// Revoking access to memory still referenced elsewhere (or granting execute on
/// arbitrary bytes) is the caller's responsibility.
pub unsafe fn protect(address: NativeAddress, size: usize, mode: ProtectionMode) -> bool {
    let ok = platform::protect(address, size, mode);
    tracing::debug!(%address, size, ?mode, ok, "virtual protect");
    ok
}

#[cfg(unix)]
mod platform {
    use super::*;

    pub(super) fn page_size() -> usize {
        unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
    }

    pub(super) fn allocate(size: usize) -> NativeAddress {
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                size,
                ProtectionMode::NoAccess.native(),
                libc::MAP_PRIVATE | libc::MAP_ANON,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            NativeAddress::NULL
        } else {
            NativeAddress::from_mut_ptr(ptr)
        }
    }

    pub(super) unsafe fn release(address: NativeAddress, size: usize) -> io::Result<()> {
        if libc::munmap(address.as_mut_ptr(), size) == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    pub(super) unsafe fn protect(
        address: NativeAddress,
        size: usize,
        mode: ProtectionMode,
    ) -> bool {
        libc::mprotect(address.as_mut_ptr(), size, mode.native()) == 0
    }
}

#[cfg(windows)]
mod platform {
    use super::*;
    use winapi::um::memoryapi::{VirtualAlloc, VirtualFree, VirtualProtect};
    use winapi::um::sysinfoapi::{GetSystemInfo, SYSTEM_INFO};
    use winapi::um::winnt::{MEM_COMMIT, MEM_RELEASE, MEM_RESERVE};

    pub(super) fn page_size() -> usize {
        let mut info: SYSTEM_INFO = unsafe { std::mem::zeroed() };
        unsafe { GetSystemInfo(&mut info) };
        info.dwPageSize as usize
    }

    pub(super) fn allocate(size: usize) -> NativeAddress {
        let ptr = unsafe {
            VirtualAlloc(
                std::ptr::null_mut(),
                size,
                MEM_RESERVE | MEM_COMMIT,
                ProtectionMode::NoAccess.native(),
            )
        };
        NativeAddress::from_mut_ptr(ptr)
    }

    // MEM_RELEASE requires a zero size; the size is still tracked for unix parity
    pub(super) unsafe fn release(address: NativeAddress, _size: usize) -> io::Result<()> {
        if VirtualFree(address.as_mut_ptr(), 0, MEM_RELEASE) != 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    pub(super) unsafe fn protect(
        address: NativeAddress,
        size: usize,
        mode: ProtectionMode,
    ) -> bool {
        let mut old = 0;
        VirtualProtect(address.as_mut_ptr(), size, mode.native(), &mut old) != 0
    }
}
