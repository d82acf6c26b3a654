//! Host-facing function names
//!
//! The host resolves a name once and keeps the [`FunctionId`]. Names match exactly.

use super::args::Args;
use super::extension::Extension;
use super::natives;
use crate::error::BridgeResult;
use crate::value::Value;

/// Signature shared by every entry point
pub type NativeFunction = fn(&Extension, &mut Args<'_>) -> BridgeResult<()>;

macro_rules! native_table {
    ($($id:ident = $name:literal => $entry:expr,)*) => {
        /// One exported native function
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum FunctionId {
            $($id,)*
        }

        impl FunctionId {
            pub const ALL: &'static [FunctionId] = &[$(FunctionId::$id,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(FunctionId::$id => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(FunctionId::$id),)*
                    _ => None,
                }
            }

            pub fn entry(self) -> NativeFunction {
                match self {
                    $(FunctionId::$id => $entry,)*
                }
            }
        }
    };
}

native_table! {
    GetPageSize = "Unsafe_GetPageSize" => natives::get_page_size,
    GetSizeOfPointer = "Unsafe_GetSizeOfPointer" => natives::get_size_of_pointer,
    IsLittleEndian = "Unsafe_IsLittleEndian" => natives::is_little_endian,

    MemoryAllocate = "Unsafe_MemoryAllocate" => natives::memory_allocate,
    MemoryFree = "Unsafe_MemoryFree" => natives::memory_free,
    MemorySet = "Unsafe_MemorySet" => natives::memory_set,
    MemoryCopy = "Unsafe_MemoryCopy" => natives::memory_copy,
    MemoryMove = "Unsafe_MemoryMove" => natives::memory_move,

    PeerRegister = "Unsafe_PeerRegister" => natives::peer_register,
    VirtualPeerRegister = "Unsafe_VirtualPeerRegister" => natives::virtual_peer_register,

    LibraryLoad = "Unsafe_LibraryLoad" => natives::library_load,
    LibraryFree = "Unsafe_LibraryFree" => natives::library_free,
    LibrarySymbol = "Unsafe_LibrarySymbol" => natives::library_symbol,

    ReadInt8 = "Unsafe_ReadInt8" => natives::read::<i8>,
    ReadInt16 = "Unsafe_ReadInt16" => natives::read::<i16>,
    ReadInt32 = "Unsafe_ReadInt32" => natives::read::<i32>,
    ReadInt64 = "Unsafe_ReadInt64" => natives::read::<i64>,
    ReadUInt8 = "Unsafe_ReadUInt8" => natives::read::<u8>,
    ReadUInt16 = "Unsafe_ReadUInt16" => natives::read::<u16>,
    ReadUInt32 = "Unsafe_ReadUInt32" => natives::read::<u32>,
    ReadUInt64 = "Unsafe_ReadUInt64" => natives::read::<u64>,
    ReadFloat32 = "Unsafe_ReadFloat32" => natives::read::<f32>,
    ReadFloat64 = "Unsafe_ReadFloat64" => natives::read::<f64>,

    WriteInt8 = "Unsafe_WriteInt8" => natives::write::<i8>,
    WriteInt16 = "Unsafe_WriteInt16" => natives::write::<i16>,
    WriteInt32 = "Unsafe_WriteInt32" => natives::write::<i32>,
    WriteInt64 = "Unsafe_WriteInt64" => natives::write::<i64>,
    WriteUInt8 = "Unsafe_WriteUInt8" => natives::write::<u8>,
    WriteUInt16 = "Unsafe_WriteUInt16" => natives::write::<u16>,
    WriteUInt32 = "Unsafe_WriteUInt32" => natives::write::<u32>,
    WriteUInt64 = "Unsafe_WriteUInt64" => natives::write::<u64>,
    WriteFloat32 = "Unsafe_WriteFloat32" => natives::write::<f32>,
    WriteFloat64 = "Unsafe_WriteFloat64" => natives::write::<f64>,

    VirtualMemoryAllocate = "Unsafe_VirtualMemoryAllocate" => natives::virtual_memory_allocate,
    VirtualMemoryFree = "Unsafe_VirtualMemoryFree" => natives::virtual_memory_free,
    VirtualMemoryProtect = "Unsafe_VirtualMemoryProtect" => natives::virtual_memory_protect,

    FfiPrepCif = "Unsafe_FfiPrepCif" => natives::ffi_prep_cif,
    FfiPrepCifVar = "Unsafe_FfiPrepCifVar" => natives::ffi_prep_cif_var,
    FfiCall = "Unsafe_FfiCall" => natives::ffi_call,
    FfiLinkedSymbol = "Unsafe_FfiLinkedSymbol" => natives::ffi_linked_symbol,
    FfiCifSize = "Unsafe_FfiCifSize" => natives::ffi_cif_size,
    FfiDefaultAbi = "Unsafe_FfiDefaultAbi" => natives::ffi_default_abi,
}

/// Resolve a host value naming a function; anything but a string is not found
pub fn resolve(name: &Value) -> Option<FunctionId> {
    match name {
        Value::String(s) => FunctionId::from_name(s),
        _ => None,
    }
}
