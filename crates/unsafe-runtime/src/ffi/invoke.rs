//! Generic calls into libffi's `ffi_prep_cif`, `ffi_prep_cif_var` and `ffi_call`

use crate::address::NativeAddress;
use libffi::raw::{ffi_abi, ffi_cif, ffi_status, ffi_type};
use std::ffi::c_void;
use std::os::raw::c_uint;

/// Status code returned by libffi preparation routines (`FFI_OK` is 0)
pub type FfiStatus = ffi_status;

/// Calling convention selector (`FFI_DEFAULT_ABI` and friends)
pub type FfiAbi = ffi_abi;

type PrepCifFn = unsafe extern "C" fn(
    cif: *mut ffi_cif,
    abi: ffi_abi,
    nargs: c_uint,
    rtype: *mut ffi_type,
    atypes: *mut *mut ffi_type,
) -> ffi_status;

type PrepCifVarFn = unsafe extern "C" fn(
    cif: *mut ffi_cif,
    abi: ffi_abi,
    nfixedargs: c_uint,
    ntotalargs: c_uint,
    rtype: *mut ffi_type,
    atypes: *mut *mut ffi_type,
) -> ffi_status;

// `fn_` is `void (*)(void)` in C; any code pointer has the same representation
type CallFn = unsafe extern "C" fn(
    cif: *mut ffi_cif,
    fn_: *const c_void,
    rvalue: *mut c_void,
    avalue: *mut *mut c_void,
);

/// Prepare `cif` for a fixed-arity signature via the `ffi_prep_cif` at `routine`
///
/// # Safety
///
/// `routine` must be the address of `ffi_prep_cif`. `cif` must point to a writable
/// `ffi_cif`-sized buffer, `rtype` to an `ffi_type` and `atypes` to `nargs` type
/// pointers, all outliving every later use of the CIF.
pub unsafe fn prep_cif(
    routine: NativeAddress,
    cif: NativeAddress,
    abi: FfiAbi,
    nargs: u32,
    rtype: NativeAddress,
    atypes: NativeAddress,
) -> FfiStatus {
    let prep: PrepCifFn = std::mem::transmute::<*const c_void, PrepCifFn>(routine.as_ptr());
    let status = prep(
        cif.as_mut_ptr(),
        abi,
        nargs,
        rtype.as_mut_ptr(),
        atypes.as_mut_ptr(),
    );
    tracing::debug!(%cif, abi, nargs, status, "ffi_prep_cif");
    status
}

/// Prepare `cif` for a variadic signature via the `ffi_prep_cif_var` at `routine`
///
/// # Safety
///
/// As [`prep_cif`], with `atypes` holding `ntotal` entries and `routine` being
/// `ffi_prep_cif_var`.
pub unsafe fn prep_cif_var(
    routine: NativeAddress,
    cif: NativeAddress,
    abi: FfiAbi,
    nfixed: u32,
    ntotal: u32,
    rtype: NativeAddress,
    atypes: NativeAddress,
) -> FfiStatus {
    let prep: PrepCifVarFn =
        std::mem::transmute::<*const c_void, PrepCifVarFn>(routine.as_ptr());
    let status = prep(
        cif.as_mut_ptr(),
        abi,
        nfixed,
        ntotal,
        rtype.as_mut_ptr(),
        atypes.as_mut_ptr(),
    );
    tracing::debug!(%cif, abi, nfixed, ntotal, status, "ffi_prep_cif_var");
    status
}

/// Call `function` as described by `cif` via the `ffi_call` at `routine`
///
/// The result is written to `rvalue`; `avalues` is an array of pointers to argument
/// values.
///
/// # Safety
///
/// `routine` must be `ffi_call`, `cif` a prepared CIF matching `function`'s real
/// signature, `rvalue` large enough for the return type (at least `ffi_arg` for
/// small integers) and `avalues` must hold one valid pointer per argument.
pub unsafe fn call(
    routine: NativeAddress,
    cif: NativeAddress,
    function: NativeAddress,
    rvalue: NativeAddress,
    avalues: NativeAddress,
) {
    let ffi_call: CallFn = std::mem::transmute::<*const c_void, CallFn>(routine.as_ptr());
    tracing::debug!(%cif, %function, "ffi_call");
    ffi_call(
        cif.as_mut_ptr(),
        function.as_ptr(),
        rvalue.as_mut_ptr(),
        avalues.as_mut_ptr(),
    );
}
