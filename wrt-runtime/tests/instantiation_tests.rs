//! Instantiation tests: import linking, initialisers, segments and start

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use wrt_error::{codes, Error};
use wrt_format::{
    module::Module,
    types::{FuncType, GlobalType, Limits, MemoryType, ValueType},
};
use wrt_runtime::{instantiate, Extern, Global, Imports, Memory, Value};

fn decode(source: &str) -> Module {
    let bytes = wat::parse_str(source).unwrap();
    wrt_decoder::decode_module(&bytes).unwrap()
}

fn unary_i32() -> FuncType {
    FuncType::new(vec![ValueType::I32], vec![ValueType::I32])
}

const HOST_MODULE: &str = r#"(module
    (import "env" "double" (func $double (param i32) (result i32)))
    (func (export "quadruple") (param i32) (result i32)
      (call $double (call $double (local.get 0)))))"#;

#[test]
fn test_host_function_import() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let mut imports = Imports::new();
    imports.func("env", "double", unary_i32(), move |args| {
        counter.fetch_add(1, Ordering::Relaxed);
        Ok(vec![Value::I32(args[0].as_i32().unwrap_or_default() * 2)])
    });

    let mut instance = instantiate(decode(HOST_MODULE), &mut imports).unwrap();
    assert_eq!(instance.invoke("quadruple", &[Value::I32(5)]).unwrap(), [Value::I32(20)]);
    assert_eq!(calls.load(Ordering::Relaxed), 2);
}

#[test]
fn test_host_failures_become_traps() {
    let mut imports = Imports::new();
    imports.func("env", "double", unary_i32(), |_| {
        Err(Error::runtime_error(codes::INVALID_ARGUMENTS, "host refused"))
    });
    let mut instance = instantiate(decode(HOST_MODULE), &mut imports).unwrap();
    let error = instance.invoke("quadruple", &[Value::I32(1)]).unwrap_err();
    assert!(error.is_trap());
    assert_eq!(error.code, codes::HOST_TRAP);

    let mut imports = Imports::new();
    imports.func("env", "double", unary_i32(), |_| Ok(vec![Value::I64(1)]));
    let mut instance = instantiate(decode(HOST_MODULE), &mut imports).unwrap();
    let error = instance.invoke("quadruple", &[Value::I32(1)]).unwrap_err();
    assert_eq!(error.code, codes::HOST_RESULT_MISMATCH);
}

#[test]
fn test_missing_and_mismatched_imports() {
    let error = instantiate(decode(HOST_MODULE), &mut Imports::new()).unwrap_err();
    assert!(error.is_initialization_error());
    assert_eq!(error.code, codes::UNKNOWN_IMPORT);

    let mut imports = Imports::new();
    imports.func("env", "double", FuncType::new(vec![ValueType::I64], vec![ValueType::I64]), |args| {
        Ok(args.to_vec())
    });
    let error = instantiate(decode(HOST_MODULE), &mut imports).unwrap_err();
    assert_eq!(error.code, codes::IMPORT_TYPE_MISMATCH);

    // A memory where a function is expected
    let mut imports = Imports::new();
    let memory = Memory::new(MemoryType { limits: Limits::new(1, None) }).unwrap();
    imports.define("env", "double", Extern::Memory(memory));
    let error = instantiate(decode(HOST_MODULE), &mut imports).unwrap_err();
    assert_eq!(error.code, codes::IMPORT_TYPE_MISMATCH);
}

#[test]
fn test_imported_memory_limits() {
    let module = r#"(module
        (import "env" "mem" (memory 2 4))
        (func (export "size") (result i32) memory.size))"#;

    let mut imports = Imports::new();
    let small = Memory::new(MemoryType { limits: Limits::new(1, Some(4)) }).unwrap();
    imports.define("env", "mem", Extern::Memory(small));
    assert_eq!(instantiate(decode(module), &mut imports).unwrap_err().code, codes::IMPORT_TYPE_MISMATCH);

    // An unbounded memory cannot stand in for one with a maximum
    let unbounded = Memory::new(MemoryType { limits: Limits::new(2, None) }).unwrap();
    imports.define("env", "mem", Extern::Memory(unbounded));
    assert_eq!(instantiate(decode(module), &mut imports).unwrap_err().code, codes::IMPORT_TYPE_MISMATCH);

    let mut grown = Memory::new(MemoryType { limits: Limits::new(1, Some(3)) }).unwrap();
    grown.grow(2).unwrap();
    imports.define("env", "mem", Extern::Memory(grown));
    let mut instance = instantiate(decode(module), &mut imports).unwrap();
    assert_eq!(instance.invoke("size", &[]).unwrap(), [Value::I32(3)]);
}

#[test]
fn test_imported_memory_is_copied() {
    let module = r#"(module
        (import "env" "mem" (memory 1))
        (func (export "poke") (i32.store8 (i32.const 0) (i32.const 0x5A))))"#;

    let mut imports = Imports::new();
    let memory = Memory::new(MemoryType { limits: Limits::new(1, None) }).unwrap();
    imports.define("env", "mem", Extern::Memory(memory));
    let mut instance = instantiate(decode(module), &mut imports).unwrap();
    instance.invoke("poke", &[]).unwrap();

    assert_eq!(instance.memory(0).unwrap().data()[0], 0x5A);
    let Some(Extern::Memory(registered)) = imports.get("env", "mem") else {
        panic!("memory import missing from registry");
    };
    assert_eq!(registered.data()[0], 0);
}

#[test]
fn test_oversized_table_is_rejected() {
    let error = instantiate(decode("(module (table 4294967295 funcref))"), &mut Imports::new())
        .unwrap_err();
    assert_eq!(error.code, codes::LIMIT_EXCEEDED);
    assert!(!error.is_trap());

    let error = instantiate(
        decode("(module (table 1 funcref) (table 4294967295 funcref))"),
        &mut Imports::new(),
    )
    .unwrap_err();
    assert_eq!(error.code, codes::MULTIPLE_MEMORIES_OR_TABLES);
}

#[test]
fn test_imported_global_initialises_others() {
    let module = r#"(module
        (import "env" "base" (global $base i32))
        (global $derived (export "derived") i32 (global.get $base))
        (memory 1)
        (data (global.get $base) "\01")
        (func (export "peek") (result i32) (i32.load8_u (global.get $derived))))"#;

    let mut imports = Imports::new();
    let base = Global::new(GlobalType { value_type: ValueType::I32, mutable: false }, Value::I32(16))
        .unwrap();
    imports.define("env", "base", Extern::Global(base));
    let mut instance = instantiate(decode(module), &mut imports).unwrap();
    assert_eq!(instance.exported_global("derived").unwrap().value(), Value::I32(16));
    assert_eq!(instance.invoke("peek", &[]).unwrap(), [Value::I32(1)]);

    let mutable = Global::new(GlobalType { value_type: ValueType::I32, mutable: true }, Value::I32(0))
        .unwrap();
    imports.define("env", "base", Extern::Global(mutable));
    assert_eq!(instantiate(decode(module), &mut imports).unwrap_err().code, codes::IMPORT_TYPE_MISMATCH);
}

#[test]
fn test_segments_are_bounds_checked() {
    let data = r#"(module (memory 1) (data (i32.const 65535) "ab"))"#;
    let error = instantiate(decode(data), &mut Imports::new()).unwrap_err();
    assert_eq!(error.code, codes::SEGMENT_OUT_OF_BOUNDS);

    let elem = r#"(module (table 1 funcref) (func $f) (elem (i32.const 1) $f))"#;
    let error = instantiate(decode(elem), &mut Imports::new()).unwrap_err();
    assert_eq!(error.code, codes::SEGMENT_OUT_OF_BOUNDS);

    // A segment ending exactly at the boundary fits
    let edge = r#"(module (memory 1) (data (i32.const 65534) "ab"))"#;
    let instance = instantiate(decode(edge), &mut Imports::new()).unwrap();
    assert_eq!(&instance.memory(0).unwrap().data()[65534..], b"ab");
}

#[test]
fn test_start_function_runs_after_initialisation() {
    let module = r#"(module
        (memory 1)
        (global $seen (export "seen") (mut i32) (i32.const 0))
        (data (i32.const 0) "\07")
        (func $start (global.set $seen (i32.load8_u (i32.const 0))))
        (start $start))"#;
    let instance = instantiate(decode(module), &mut Imports::new()).unwrap();
    assert_eq!(instance.exported_global("seen").unwrap().value(), Value::I32(7));

    let trapping = r#"(module (func $start unreachable) (start $start))"#;
    let error = instantiate(decode(trapping), &mut Imports::new()).unwrap_err();
    assert_eq!(error.code, codes::UNREACHABLE);
}

#[test]
fn test_closure_resolver_and_exports() {
    let module = r#"(module
        (import "env" "answer" (func $answer (result i32)))
        (export "answer" (func $answer))
        (table (export "table") 2 funcref)
        (elem (i32.const 1) $answer))"#;
    let mut resolver = |module: &wrt_format::types::Name, name: &wrt_format::types::Name| {
        (module.as_str() == Some("env") && name.as_str() == Some("answer")).then(|| {
            Extern::Func(wrt_runtime::Function::host(
                FuncType::new(vec![], vec![ValueType::I32]),
                |_| Ok(vec![Value::I32(42)]),
            ))
        })
    };
    let mut instance = instantiate(decode(module), &mut resolver).unwrap();
    // Re-exported host functions are invoked directly
    assert_eq!(instance.invoke("answer", &[]).unwrap(), [Value::I32(42)]);
    assert_eq!(instance.table(0).unwrap().get(1).unwrap(), Some(0));
    assert_eq!(instance.table(0).unwrap().get(0).unwrap(), None);
    assert_eq!(instance.exports().len(), 2);
}
