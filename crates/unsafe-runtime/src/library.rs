//! Dynamic library loading
//!
//! Unlike a scoped `libloading::Library`, handles here are plain integers owned by
//! the host: the library stays open until the host calls [`free`], and symbol
//! addresses stay valid exactly that long.

use crate::address::{LibraryHandle, NativeAddress};
use thiserror::Error;

/// Library loading errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The OS loader rejected the path
    #[error("Failed to load library '{path}': {cause}")]
    LoadFailed { path: String, cause: String },
}

/// Open a shared library with lazy symbol binding
///
/// # Safety
///
/// Loading a library runs its initializers inside this process. The caller must trust
/// the library.
pub unsafe fn load(path: &str) -> Result<LibraryHandle, LoadError> {
    match platform::load(path) {
        Ok(handle) => {
            tracing::debug!(path, handle = %handle.address(), "library loaded");
            Ok(handle)
        }
        Err(cause) => {
            tracing::warn!(path, %cause, "library load failed");
            Err(LoadError::LoadFailed {
                path: path.to_string(),
                cause,
            })
        }
    }
}

/// Close a library; 0 on success, nonzero on failure (on every platform)
///
/// # Safety
///
/// `handle` must come from [`load`] and must not be used afterwards, including any
/// symbol address resolved from it.
pub unsafe fn free(handle: LibraryHandle) -> i32 {
    let status = platform::free(handle);
    tracing::debug!(handle = %handle.address(), status, "library freed");
    status
}

/// Resolve an exported symbol; [`NativeAddress::NULL`] when it does not exist
///
/// # Safety
///
/// `handle` must be a live handle from [`load`].
pub unsafe fn symbol(handle: LibraryHandle, name: &str) -> NativeAddress {
    let address = platform::symbol(handle, name);
    tracing::debug!(handle = %handle.address(), name, %address, "symbol lookup");
    address
}

#[cfg(unix)]
mod platform {
    use super::*;
    use libloading::os::unix::Library;
    use std::ffi::c_void;
    use std::mem::ManuallyDrop;

    pub(super) unsafe fn load(path: &str) -> Result<LibraryHandle, String> {
        let library = Library::open(Some(path), libc::RTLD_LAZY).map_err(|e| e.to_string())?;
        Ok(LibraryHandle::from_address(NativeAddress::from_mut_ptr(
            library.into_raw(),
        )))
    }

    pub(super) unsafe fn free(handle: LibraryHandle) -> i32 {
        let library = Library::from_raw(handle.address().as_mut_ptr::<c_void>());
        match library.close() {
            Ok(()) => 0,
            Err(_) => 1,
        }
    }

    pub(super) unsafe fn symbol(handle: LibraryHandle, name: &str) -> NativeAddress {
        // Borrow the handle without taking ownership; dropping would dlclose it
        let library = ManuallyDrop::new(Library::from_raw(
            handle.address().as_mut_ptr::<c_void>(),
        ));
        match library.get::<*mut c_void>(name.as_bytes()) {
            Ok(sym) => NativeAddress::from_mut_ptr(sym.into_raw()),
            Err(_) => NativeAddress::NULL,
        }
    }
}

#[cfg(windows)]
mod platform {
    use super::*;
    use std::ffi::{CString, OsStr};
    use std::os::windows::ffi::OsStrExt;
    use winapi::shared::minwindef::HINSTANCE__;
    use winapi::um::libloaderapi::{FreeLibrary, GetProcAddress, LoadLibraryW};

    pub(super) unsafe fn load(path: &str) -> Result<LibraryHandle, String> {
        let wide: Vec<u16> = OsStr::new(path)
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();
        let module = LoadLibraryW(wide.as_ptr());
        if module.is_null() {
            Err(std::io::Error::last_os_error().to_string())
        } else {
            Ok(LibraryHandle::from_address(NativeAddress::from_mut_ptr(
                module,
            )))
        }
    }

    // FreeLibrary returns nonzero on success; flip it to the dlclose convention
    pub(super) unsafe fn free(handle: LibraryHandle) -> i32 {
        if FreeLibrary(handle.address().as_mut_ptr::<HINSTANCE__>()) == 0 {
            1
        } else {
            0
        }
    }

    pub(super) unsafe fn symbol(handle: LibraryHandle, name: &str) -> NativeAddress {
        let Ok(name) = CString::new(name) else {
            return NativeAddress::NULL;
        };
        let proc = GetProcAddress(
            handle.address().as_mut_ptr::<HINSTANCE__>(),
            name.as_ptr(),
        );
        NativeAddress::from_mut_ptr(proc as *mut std::ffi::c_void)
    }
}
