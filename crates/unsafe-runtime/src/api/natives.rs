//! Entry point bodies
//!
//! Each function marshals its positional arguments, performs one unsafe operation and
//! sets the return value. None of them validate addresses: the managed caller owns
//! every pointer it passes in.

use super::args::{Args, HostArg};
use super::extension::Extension;
use crate::error::BridgeResult;
use crate::ffi::{self, LibffiRoutines, CIF_SIZE};
use crate::memory::{self, Scalar};
use crate::peer::ReleaseStrategy;
use crate::{heap, library, platform, vmem};

// Platform

pub(super) fn get_page_size(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    args.ret(platform::page_size() as i64);
    Ok(())
}

pub(super) fn get_size_of_pointer(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    args.ret(platform::pointer_size() as i64);
    Ok(())
}

pub(super) fn is_little_endian(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    args.ret(platform::is_little_endian());
    Ok(())
}

// Heap

pub(super) fn memory_allocate(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let size = args.size(0)?;
    args.ret(heap::allocate(size));
    Ok(())
}

pub(super) fn memory_free(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let address = args.address(0)?;
    unsafe { heap::free(address) };
    Ok(())
}

pub(super) fn memory_set(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let base = args.address(0)?;
    let offset = args.int(1)?;
    let value = args.int(2)?;
    let size = args.size(3)?;
    unsafe { heap::set(base, offset, value, size) };
    Ok(())
}

pub(super) fn memory_copy(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let dest = args.address(0)?;
    let src = args.address(1)?;
    let n = args.size(2)?;
    unsafe { heap::copy(dest, src, n) };
    Ok(())
}

pub(super) fn memory_move(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let dest = args.address(0)?;
    let src = args.address(1)?;
    let n = args.size(2)?;
    unsafe { heap::move_bytes(dest, src, n) };
    Ok(())
}

// Typed access

pub(super) fn read<T: Scalar>(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()>
where
    T::Host: HostArg,
{
    let base = args.address(0)?;
    let offset = args.int(1)?;
    let value = unsafe { memory::read_host::<T>(base, offset) };
    args.ret(value);
    Ok(())
}

pub(super) fn write<T: Scalar>(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()>
where
    T::Host: HostArg,
{
    let base = args.address(0)?;
    let offset = args.int(1)?;
    let value = T::Host::from_args(args, 2)?;
    unsafe { memory::write_host::<T>(base, offset, value) };
    Ok(())
}

// Finalizers

pub(super) fn peer_register(ext: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let object = args.object(0)?;
    let address = args.address(1)?;
    let size_hint = args.size(2)?;
    let handle = ext.register_peer(object, address, ReleaseStrategy::Heap, size_hint)?;
    args.ret(handle.0 as i64);
    Ok(())
}

pub(super) fn virtual_peer_register(ext: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let object = args.object(0)?;
    let address = args.address(1)?;
    let size = args.size(2)?;
    let handle = ext.register_peer(
        object,
        address,
        ReleaseStrategy::VirtualMemory { size },
        size,
    )?;
    args.ret(handle.0 as i64);
    Ok(())
}

// Libraries

pub(super) fn library_load(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let path = args.c_name(0)?;
    let handle = unsafe { library::load(&path) }?;
    args.ret(handle.address());
    Ok(())
}

pub(super) fn library_free(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let handle = args.library(0)?;
    let status = unsafe { library::free(handle) };
    args.ret(i64::from(status));
    Ok(())
}

pub(super) fn library_symbol(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let handle = args.library(0)?;
    let name = args.c_name(1)?;
    args.ret(unsafe { library::symbol(handle, &name) });
    Ok(())
}

// Virtual memory

pub(super) fn virtual_memory_allocate(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let size = args.size(0)?;
    args.ret(vmem::allocate(size));
    Ok(())
}

pub(super) fn virtual_memory_free(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let address = args.address(0)?;
    let size = args.size(1)?;
    unsafe { vmem::release(address, size) }?;
    Ok(())
}

pub(super) fn virtual_memory_protect(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let address = args.address(0)?;
    let size = args.size(1)?;
    let mode = args.mode(2)?;
    args.ret(unsafe { vmem::protect(address, size, mode) });
    Ok(())
}

// libffi

pub(super) fn ffi_prep_cif(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let routine = args.address(0)?;
    let cif = args.address(1)?;
    let abi = args.abi(2)?;
    let nargs = args.count(3)?;
    let rtype = args.address(4)?;
    let atypes = args.address(5)?;
    let status = unsafe { ffi::prep_cif(routine, cif, abi, nargs, rtype, atypes) };
    args.ret(status as i64);
    Ok(())
}

pub(super) fn ffi_prep_cif_var(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let routine = args.address(0)?;
    let cif = args.address(1)?;
    let abi = args.abi(2)?;
    let nfixed = args.count(3)?;
    let ntotal = args.count(4)?;
    let rtype = args.address(5)?;
    let atypes = args.address(6)?;
    let status = unsafe { ffi::prep_cif_var(routine, cif, abi, nfixed, ntotal, rtype, atypes) };
    args.ret(status as i64);
    Ok(())
}

pub(super) fn ffi_call(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let routine = args.address(0)?;
    let cif = args.address(1)?;
    let function = args.address(2)?;
    let rvalue = args.address(3)?;
    let avalues = args.address(4)?;
    unsafe { ffi::call(routine, cif, function, rvalue, avalues) };
    Ok(())
}

pub(super) fn ffi_linked_symbol(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    let name = args.string(0)?;
    args.ret(ffi::linked_symbol(&name));
    Ok(())
}

pub(super) fn ffi_cif_size(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    args.ret(CIF_SIZE as i64);
    Ok(())
}

pub(super) fn ffi_default_abi(_: &Extension, args: &mut Args<'_>) -> BridgeResult<()> {
    args.ret(i64::from(LibffiRoutines::default_abi()));
    Ok(())
}
