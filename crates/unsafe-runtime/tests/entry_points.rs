//! Entry points driven by name, the way the host calls them

mod common;

use common::*;
use pretty_assertions::{assert_eq, assert_ne};
use rstest::rstest;
use unsafe_runtime::{BridgeError, CallArgs, ErrorKind, Extension, FunctionId, Value};

fn extension() -> Extension {
    Extension::new(TestHost::new())
}

fn page_size(ext: &Extension) -> i64 {
    call_int(ext, "Unsafe_GetPageSize", vec![])
}

#[test]
fn test_platform_info() {
    let ext = extension();
    assert!(page_size(&ext) >= 4096);
    assert_eq!(
        call_int(&ext, "Unsafe_GetSizeOfPointer", vec![]),
        std::mem::size_of::<usize>() as i64
    );
    assert_eq!(
        call(&ext, "Unsafe_IsLittleEndian", vec![]).unwrap(),
        Value::Bool(cfg!(target_endian = "little"))
    );
}

#[test]
fn test_heap_scenario_deadbeef() {
    let ext = extension();
    let address = call_int(&ext, "Unsafe_MemoryAllocate", vec![int(4096)]);
    assert_ne!(address, 0);

    call(
        &ext,
        "Unsafe_WriteUInt32",
        vec![int(address), int(0), int(0xDEADBEEF)],
    )
    .unwrap();
    assert_eq!(
        call_int(&ext, "Unsafe_ReadUInt32", vec![int(address), int(0)]),
        3735928559
    );
    // Same bytes read signed
    assert_eq!(
        call_int(&ext, "Unsafe_ReadInt32", vec![int(address), int(0)]),
        0xDEADBEEFu32 as i32 as i64
    );

    call(&ext, "Unsafe_MemoryFree", vec![int(address)]).unwrap();
}

#[rstest]
#[case("Int8", -5, -5)]
#[case("UInt8", 300, 44)]
#[case("Int16", -1, -1)]
#[case("UInt16", -1, 65535)]
#[case("Int64", i64::MIN, i64::MIN)]
#[case("UInt64", -1, -1)]
fn test_integer_widths(#[case] width: &str, #[case] written: i64, #[case] read: i64) {
    let ext = extension();
    let address = call_int(&ext, "Unsafe_MemoryAllocate", vec![int(16)]);

    call(
        &ext,
        &format!("Unsafe_Write{}", width),
        vec![int(address), int(3), int(written)],
    )
    .unwrap();
    assert_eq!(
        call_int(&ext, &format!("Unsafe_Read{}", width), vec![int(address), int(3)]),
        read
    );

    call(&ext, "Unsafe_MemoryFree", vec![int(address)]).unwrap();
}

#[test]
fn test_float_widths() {
    let ext = extension();
    let address = call_int(&ext, "Unsafe_MemoryAllocate", vec![int(16)]);

    call(
        &ext,
        "Unsafe_WriteFloat32",
        vec![int(address), int(0), Value::Double(1.5)],
    )
    .unwrap();
    call(
        &ext,
        "Unsafe_WriteFloat64",
        vec![int(address), int(8), Value::Double(-0.1)],
    )
    .unwrap();

    assert_eq!(
        call(&ext, "Unsafe_ReadFloat32", vec![int(address), int(0)]).unwrap(),
        Value::Double(1.5)
    );
    assert_eq!(
        call(&ext, "Unsafe_ReadFloat64", vec![int(address), int(8)]).unwrap(),
        Value::Double(-0.1)
    );

    call(&ext, "Unsafe_MemoryFree", vec![int(address)]).unwrap();
}

#[test]
fn test_negative_offset_reaches_before_base() {
    let ext = extension();
    let address = call_int(&ext, "Unsafe_MemoryAllocate", vec![int(16)]);

    call(
        &ext,
        "Unsafe_WriteUInt8",
        vec![int(address), int(4), int(0x7f)],
    )
    .unwrap();
    assert_eq!(
        call_int(&ext, "Unsafe_ReadUInt8", vec![int(address + 8), int(-4)]),
        0x7f
    );

    call(&ext, "Unsafe_MemoryFree", vec![int(address)]).unwrap();
}

#[test]
fn test_set_copy_and_move() {
    let ext = extension();
    let a = call_int(&ext, "Unsafe_MemoryAllocate", vec![int(16)]);
    let b = call_int(&ext, "Unsafe_MemoryAllocate", vec![int(16)]);

    call(
        &ext,
        "Unsafe_MemorySet",
        vec![int(a), int(0), int(0x1AB), int(16)],
    )
    .unwrap();
    assert_eq!(call_int(&ext, "Unsafe_ReadUInt8", vec![int(a), int(15)]), 0xAB);

    call(&ext, "Unsafe_MemoryCopy", vec![int(b), int(a), int(16)]).unwrap();
    assert_eq!(
        call_int(&ext, "Unsafe_ReadUInt64", vec![int(b), int(8)]),
        0xABABABABABABABABu64 as i64
    );

    for i in 0..8 {
        call(&ext, "Unsafe_WriteUInt8", vec![int(a), int(i), int(i)]).unwrap();
    }
    // Overlapping: shift bytes 0..8 up by two
    call(&ext, "Unsafe_MemoryMove", vec![int(a + 2), int(a), int(8)]).unwrap();
    let shifted: Vec<i64> = (0..10)
        .map(|i| call_int(&ext, "Unsafe_ReadUInt8", vec![int(a), int(i)]))
        .collect();
    assert_eq!(shifted, vec![0, 1, 0, 1, 2, 3, 4, 5, 6, 7]);

    call(&ext, "Unsafe_MemoryFree", vec![int(a)]).unwrap();
    call(&ext, "Unsafe_MemoryFree", vec![int(b)]).unwrap();
}

#[test]
fn test_zero_size_allocation_is_null_and_free_of_null_is_noop() {
    let ext = extension();
    assert_eq!(call_int(&ext, "Unsafe_MemoryAllocate", vec![int(0)]), 0);
    call(&ext, "Unsafe_MemoryFree", vec![int(0)]).unwrap();
}

#[test]
fn test_virtual_memory_scenario() {
    let ext = extension();
    let page = page_size(&ext);
    let address = call_int(&ext, "Unsafe_VirtualMemoryAllocate", vec![int(4096)]);
    assert_ne!(address, 0);
    assert_eq!(address % page, 0);

    assert_eq!(
        call(
            &ext,
            "Unsafe_VirtualMemoryProtect",
            vec![int(address), int(4096), int(2)]
        )
        .unwrap(),
        Value::Bool(true)
    );
    call(
        &ext,
        "Unsafe_WriteInt64",
        vec![int(address), int(0), int(42)],
    )
    .unwrap();
    assert_eq!(
        call_int(&ext, "Unsafe_ReadInt64", vec![int(address), int(0)]),
        42
    );
    assert_eq!(
        call(
            &ext,
            "Unsafe_VirtualMemoryProtect",
            vec![int(address), int(4096), int(3)]
        )
        .unwrap(),
        Value::Bool(true)
    );

    call(
        &ext,
        "Unsafe_VirtualMemoryFree",
        vec![int(address), int(4096)],
    )
    .unwrap();
}

#[cfg(unix)]
#[test]
fn test_virtual_free_failure_is_unhandled() {
    let ext = extension();
    // Not page aligned, munmap rejects it
    let err = call(&ext, "Unsafe_VirtualMemoryFree", vec![int(1), int(4096)]).unwrap_err();
    assert!(matches!(err, BridgeError::VirtualMemory(_)));
    assert_eq!(err.kind(), ErrorKind::Unhandled);
}

#[rstest]
#[case("Unsafe_MemoryAllocate", vec![int(-1)])]
#[case("Unsafe_MemoryAllocate", vec![Value::from("4096")])]
#[case("Unsafe_MemoryAllocate", vec![])]
#[case("Unsafe_MemoryCopy", vec![int(0), int(0), int(-8)])]
#[case("Unsafe_VirtualMemoryProtect", vec![int(0), int(4096), int(9)])]
#[case("Unsafe_LibraryLoad", vec![int(1)])]
#[case("Unsafe_PeerRegister", vec![int(1), int(0), int(0)])]
#[case("Unsafe_WriteFloat64", vec![int(0), int(0), Value::from("x")])]
#[case("Unsafe_FfiPrepCif", vec![int(0), int(0), int((1 << 32) + 2), int(1), int(0), int(0)])]
fn test_argument_errors(#[case] name: &str, #[case] args: Vec<Value>) {
    let ext = extension();
    let err = call(&ext, name, args).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Argument, "{}", err);
    assert!(err.to_string().starts_with(name));
}

#[test]
fn test_unknown_function() {
    let ext = extension();
    let err = call(&ext, "Unsafe_Nope", vec![]).unwrap_err();
    assert!(matches!(err, BridgeError::UnknownFunction(ref name) if name == "Unsafe_Nope"));
}

#[test]
fn test_missing_library_is_unhandled() {
    let ext = extension();
    let err = call(
        &ext,
        "Unsafe_LibraryLoad",
        vec![Value::from("/definitely/not/here.so")],
    )
    .unwrap_err();
    assert!(matches!(err, BridgeError::Load(_)));
    assert_eq!(err.kind(), ErrorKind::Unhandled);
    assert!(err.to_string().contains("/definitely/not/here.so"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_library_load_symbol_free() {
    let ext = extension();
    let handle = call_int(&ext, "Unsafe_LibraryLoad", vec![Value::from("libc.so.6")]);
    assert_ne!(handle, 0);

    let malloc = call_int(
        &ext,
        "Unsafe_LibrarySymbol",
        vec![int(handle), Value::from("malloc")],
    );
    assert_ne!(malloc, 0);
    assert_eq!(
        call_int(
            &ext,
            "Unsafe_LibrarySymbol",
            vec![int(handle), Value::from("no_such_symbol_here")]
        ),
        0
    );

    assert_eq!(call_int(&ext, "Unsafe_LibraryFree", vec![int(handle)]), 0);
}

extern "C" fn add(a: i32, b: i32) -> i32 {
    a + b
}

#[test]
fn test_foreign_call_through_linked_libffi() {
    let ext = extension();
    let linked = |name: &str| call_int(&ext, "Unsafe_FfiLinkedSymbol", vec![Value::from(name)]);
    let prep_cif = linked("ffi_prep_cif");
    let ffi_call = linked("ffi_call");
    let sint32 = linked("ffi_type_sint32");
    assert!(prep_cif != 0 && ffi_call != 0 && sint32 != 0);

    let cif_size = call_int(&ext, "Unsafe_FfiCifSize", vec![]);
    let abi = call_int(&ext, "Unsafe_FfiDefaultAbi", vec![]);
    let alloc = |n: i64| call_int(&ext, "Unsafe_MemoryAllocate", vec![int(n)]);
    let write_ptr = |base: i64, slot: i64, value: i64| {
        call(
            &ext,
            "Unsafe_WriteUInt64",
            vec![int(base), int(slot * 8), int(value)],
        )
        .unwrap();
    };

    let cif = alloc(cif_size);
    let atypes = alloc(16);
    write_ptr(atypes, 0, sint32);
    write_ptr(atypes, 1, sint32);

    let status = call_int(
        &ext,
        "Unsafe_FfiPrepCif",
        vec![int(prep_cif), int(cif), int(abi), int(2), int(sint32), int(atypes)],
    );
    assert_eq!(status, 0);

    let values = alloc(8);
    call(&ext, "Unsafe_WriteInt32", vec![int(values), int(0), int(40)]).unwrap();
    call(&ext, "Unsafe_WriteInt32", vec![int(values), int(4), int(2)]).unwrap();
    let avalues = alloc(16);
    write_ptr(avalues, 0, values);
    write_ptr(avalues, 1, values + 4);
    let rvalue = alloc(8);

    call(
        &ext,
        "Unsafe_FfiCall",
        vec![
            int(ffi_call),
            int(cif),
            int(add as usize as i64),
            int(rvalue),
            int(avalues),
        ],
    )
    .unwrap();
    // Integral returns are widened to a full `ffi_arg`
    assert_eq!(call_int(&ext, "Unsafe_ReadInt64", vec![int(rvalue), int(0)]), 42);

    for buffer in [cif, atypes, values, avalues, rvalue] {
        call(&ext, "Unsafe_MemoryFree", vec![int(buffer)]).unwrap();
    }
}

#[test]
fn test_unknown_linked_name_is_null() {
    let ext = extension();
    assert_eq!(
        call_int(&ext, "Unsafe_FfiLinkedSymbol", vec![Value::from("ffi_closure_alloc")]),
        0
    );
}

#[test]
fn test_every_entry_rejects_empty_arguments_or_succeeds() {
    // Entry points with no parameters succeed; every other one reports a missing argument
    let ext = extension();
    for id in FunctionId::ALL {
        let mut args = CallArgs::new(vec![]);
        match ext.call(*id, &mut args) {
            Ok(()) => assert_ne!(args.return_value(), &Value::Null, "{}", id.name()),
            Err(e) => assert_eq!(e.kind(), ErrorKind::Argument, "{}", id.name()),
        }
    }
}
