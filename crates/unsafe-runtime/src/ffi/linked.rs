//! Addresses of the libffi copy linked into this crate
//!
//! Hosts may resolve libffi from a system library with the loader, or use these
//! addresses directly when they do not ship one.

use super::invoke::FfiAbi;
use crate::address::NativeAddress;
use libffi::raw;
use std::ptr::addr_of_mut;

/// Bytes needed for one `ffi_cif` buffer
pub const CIF_SIZE: usize = std::mem::size_of::<raw::ffi_cif>();

/// Entry points of a libffi instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibffiRoutines {
    pub prep_cif: NativeAddress,
    pub prep_cif_var: NativeAddress,
    pub call: NativeAddress,
}

impl LibffiRoutines {
    /// Routines of the statically linked libffi
    pub fn linked() -> Self {
        Self {
            prep_cif: NativeAddress::from_ptr(raw::ffi_prep_cif as *const ()),
            prep_cif_var: NativeAddress::from_ptr(raw::ffi_prep_cif_var as *const ()),
            call: NativeAddress::from_ptr(raw::ffi_call as *const ()),
        }
    }

    /// `FFI_DEFAULT_ABI` of the linked libffi
    pub fn default_abi() -> FfiAbi {
        raw::ffi_abi_FFI_DEFAULT_ABI
    }
}

/// Address of a linked libffi routine or builtin `ffi_type` by its C name
///
/// Returns [`NativeAddress::NULL`] for unknown names, like a failed symbol lookup.
pub fn linked_symbol(name: &str) -> NativeAddress {
    let routines = LibffiRoutines::linked();
    let descriptor = match name {
        "ffi_prep_cif" => return routines.prep_cif,
        "ffi_prep_cif_var" => return routines.prep_cif_var,
        "ffi_call" => return routines.call,
        "ffi_type_void" => addr_of_mut!(raw::ffi_type_void),
        "ffi_type_uint8" => addr_of_mut!(raw::ffi_type_uint8),
        "ffi_type_sint8" => addr_of_mut!(raw::ffi_type_sint8),
        "ffi_type_uint16" => addr_of_mut!(raw::ffi_type_uint16),
        "ffi_type_sint16" => addr_of_mut!(raw::ffi_type_sint16),
        "ffi_type_uint32" => addr_of_mut!(raw::ffi_type_uint32),
        "ffi_type_sint32" => addr_of_mut!(raw::ffi_type_sint32),
        "ffi_type_uint64" => addr_of_mut!(raw::ffi_type_uint64),
        "ffi_type_sint64" => addr_of_mut!(raw::ffi_type_sint64),
        "ffi_type_float" => addr_of_mut!(raw::ffi_type_float),
        "ffi_type_double" => addr_of_mut!(raw::ffi_type_double),
        "ffi_type_pointer" => addr_of_mut!(raw::ffi_type_pointer),
        _ => return NativeAddress::NULL,
    };
    NativeAddress::from_mut_ptr(descriptor)
}
