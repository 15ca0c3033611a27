//! End-to-end tests through the public facade: bytes in, values out.

use anyhow::Result;
use wrt::{codes, Imports, Value};

/// Generated from: (module (func (export "main") (result i32) i32.const 42))
const ANSWER_WASM: &[u8] = &[
    0x00, 0x61, 0x73, 0x6D, // WASM magic
    0x01, 0x00, 0x00, 0x00, // Version
    // Type section: () -> i32
    0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7F,
    // Function section
    0x03, 0x02, 0x01, 0x00,
    // Export section: "main" -> func 0
    0x07, 0x08, 0x01, 0x04, b'm', b'a', b'i', b'n', 0x00, 0x00,
    // Code section: i32.const 42; end
    0x0A, 0x06, 0x01, 0x04, 0x00, 0x41, 0x2A, 0x0B,
];

#[test]
fn test_constant_function_from_bytes() -> Result<()> {
    let module = wrt::decode(ANSWER_WASM)?;
    let mut instance = wrt::instantiate(module, &mut Imports::new())?;
    assert_eq!(wrt::invoke(&mut instance, "main", &[])?, [Value::I32(42)]);
    Ok(())
}

#[test]
fn test_loop_returns_iteration_count() -> Result<()> {
    let bytes = wat::parse_str(
        r#"(module
            (func (export "iterate") (param $n i32) (result i32) (local $count i32)
              (loop $again
                (local.set $count (i32.add (local.get $count) (i32.const 1)))
                (br_if $again (i32.lt_u (local.get $count) (local.get $n))))
              (local.get $count)))"#,
    )?;
    let mut instance = wrt::load(&bytes, &mut Imports::new())?;
    for n in [1, 2, 17, 10_000] {
        assert_eq!(wrt::invoke(&mut instance, "iterate", &[Value::I32(n)])?, [Value::I32(n)]);
    }
    Ok(())
}

#[test]
fn test_decode_errors_are_not_traps() {
    // Export section (7) before the type section (1)
    let mut bytes = ANSWER_WASM[..8].to_vec();
    bytes.extend_from_slice(&[0x07, 0x01, 0x00, 0x01, 0x01, 0x00]);
    let error = wrt::decode(&bytes).unwrap_err();
    assert!(error.is_parse_error());
    assert!(!error.is_trap());

    let truncated = &ANSWER_WASM[..ANSWER_WASM.len() - 1];
    assert_eq!(wrt::decode(truncated).unwrap_err().code, codes::UNEXPECTED_END);
}

#[test]
fn test_memory_growth_preserves_and_zero_fills() -> Result<()> {
    let bytes = wat::parse_str(
        r#"(module
            (memory (export "memory") 1)
            (func (export "fill") (param i32 i32) (i32.store8 (local.get 0) (local.get 1)))
            (func (export "grow") (param i32) (result i32) (memory.grow (local.get 0))))"#,
    )?;
    let mut instance = wrt::load(&bytes, &mut Imports::new())?;
    wrt::invoke(&mut instance, "fill", &[Value::I32(65535), Value::I32(0xAB)])?;
    assert_eq!(wrt::invoke(&mut instance, "grow", &[Value::I32(3)])?, [Value::I32(1)]);

    let memory = instance.exported_memory("memory").unwrap();
    assert_eq!(memory.size(), 4);
    assert_eq!(memory.data()[65535], 0xAB);
    assert!(memory.data()[65536..].iter().all(|&byte| byte == 0));
    Ok(())
}

#[test]
fn test_i64_global_round_trip() -> Result<()> {
    let bytes = wat::parse_str(
        r#"(module
            (global $g (export "g") (mut i64) (i64.const 0))
            (global $k (export "k") i64 (i64.const 1))
            (func (export "set") (param i64) (global.set $g (local.get 0)))
            (func (export "get") (result i64) (global.get $g)))"#,
    )?;
    let mut instance = wrt::load(&bytes, &mut Imports::new())?;
    let value = Value::I64(-0x0123_4567_89AB_CDEF);
    wrt::invoke(&mut instance, "set", &[value])?;
    assert_eq!(wrt::invoke(&mut instance, "get", &[])?, [value]);

    let constant = instance.exported_global("k").unwrap().ty();
    assert!(!constant.mutable);
    assert!(instance.global_mut(1).unwrap().set_bits(5).is_err());
    Ok(())
}

#[test]
fn test_host_round_trip() -> Result<()> {
    let bytes = wat::parse_str(
        r#"(module
            (import "math" "hypot" (func $hypot (param f64 f64) (result f64)))
            (func (export "diagonal") (param f64) (result f64)
              (call $hypot (local.get 0) (local.get 0))))"#,
    )?;
    let mut imports = Imports::new();
    let ty = wrt::FuncType::new(
        vec![wrt::ValueType::F64, wrt::ValueType::F64],
        vec![wrt::ValueType::F64],
    );
    imports.func("math", "hypot", ty, |args| {
        let (a, b) = (args[0].as_f64().unwrap_or_default(), args[1].as_f64().unwrap_or_default());
        Ok(vec![Value::from(a.hypot(b))])
    });

    let mut instance = wrt::load(&bytes, &mut imports)?;
    assert_eq!(wrt::invoke(&mut instance, "diagonal", &[Value::from(3.0)])?, [Value::from(
        3.0f64.hypot(3.0)
    )]);
    Ok(())
}
