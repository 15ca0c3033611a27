//! Execution tests for the stackless engine
//!
//! Modules are written in the text format, compiled with `wat`, decoded with
//! `wrt-decoder` and run through a fresh instance.

use wrt_error::{codes, Result};
use wrt_runtime::{
    instantiate, instantiate_with_config, Imports, ModuleInstance, RuntimeConfig, Value,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn load(source: &str) -> ModuleInstance {
    init_tracing();
    let bytes = wat::parse_str(source).unwrap();
    let module = wrt_decoder::decode_module(&bytes).unwrap();
    instantiate(module, &mut Imports::new()).unwrap()
}

fn trap_code(instance: &mut ModuleInstance, name: &str, args: &[Value]) -> u16 {
    let error = instance.invoke(name, args).unwrap_err();
    assert!(error.is_trap(), "expected a trap, got {error}");
    error.code
}

#[test]
fn test_constant_result() -> Result<()> {
    let mut instance = load(r#"(module (func (export "answer") (result i32) i32.const 42))"#);
    assert_eq!(instance.invoke("answer", &[])?, [Value::I32(42)]);
    Ok(())
}

#[test]
fn test_loop_counts_to_n() -> Result<()> {
    let mut instance = load(
        r#"(module
            (func (export "count") (param $n i32) (result i32) (local $i i32)
              (block $done
                (loop $next
                  (br_if $done (i32.ge_s (local.get $i) (local.get $n)))
                  (local.set $i (i32.add (local.get $i) (i32.const 1)))
                  (br $next)))
              (local.get $i)))"#,
    );
    for n in [0, 1, 10, 1000] {
        assert_eq!(instance.invoke("count", &[Value::I32(n)])?, [Value::I32(n)]);
    }
    Ok(())
}

#[test]
fn test_recursive_calls() -> Result<()> {
    let mut instance = load(
        r#"(module
            (func $fac (export "fac") (param i64) (result i64)
              (if (result i64) (i64.eqz (local.get 0))
                (then (i64.const 1))
                (else (i64.mul (local.get 0) (call $fac (i64.sub (local.get 0) (i64.const 1)))))))
            (func $fib (export "fib") (param i32) (result i32)
              (if (result i32) (i32.lt_u (local.get 0) (i32.const 2))
                (then (local.get 0))
                (else (i32.add
                  (call $fib (i32.sub (local.get 0) (i32.const 1)))
                  (call $fib (i32.sub (local.get 0) (i32.const 2))))))))"#,
    );
    assert_eq!(instance.invoke("fac", &[Value::I64(20)])?, [Value::I64(2_432_902_008_176_640_000)]);
    assert_eq!(instance.invoke("fib", &[Value::I32(20)])?, [Value::I32(6765)]);
    Ok(())
}

#[test]
fn test_branches_carry_label_values() -> Result<()> {
    let mut instance = load(
        r#"(module
            (func (export "classify") (param i32) (result i32)
              (block $default
                (block $one
                  (block $zero
                    (br_table $zero $one $default (local.get 0)))
                  (return (i32.const 10)))
                (return (i32.const 20)))
              (i32.const 100))
            (func (export "early") (param i32) (result i32)
              (block
                (block
                  (br_if 1 (local.get 0))
                  (return (i32.const 1))))
              (i32.const 2))
            (func (export "block-params") (param i32 i32) (result i32)
              (local.get 0)
              (local.get 1)
              (block (param i32 i32) (result i32) i32.sub)))"#,
    );
    assert_eq!(instance.invoke("classify", &[Value::I32(0)])?, [Value::I32(10)]);
    assert_eq!(instance.invoke("classify", &[Value::I32(1)])?, [Value::I32(20)]);
    assert_eq!(instance.invoke("classify", &[Value::I32(2)])?, [Value::I32(100)]);
    // Out-of-range selectors take the default label
    assert_eq!(instance.invoke("classify", &[Value::I32(-1)])?, [Value::I32(100)]);

    assert_eq!(instance.invoke("early", &[Value::I32(0)])?, [Value::I32(1)]);
    assert_eq!(instance.invoke("early", &[Value::I32(1)])?, [Value::I32(2)]);

    assert_eq!(instance.invoke("block-params", &[Value::I32(50), Value::I32(8)])?, [Value::I32(42)]);
    Ok(())
}

#[test]
fn test_select_and_locals() -> Result<()> {
    let mut instance = load(
        r#"(module
            (func (export "max") (param i64 i64) (result i64)
              (select (local.get 0) (local.get 1) (i64.gt_s (local.get 0) (local.get 1))))
            (func (export "tee") (param i32) (result i32) (local i32)
              (i32.add (local.tee 1 (local.get 0)) (local.get 1))))"#,
    );
    assert_eq!(instance.invoke("max", &[Value::I64(-3), Value::I64(7)])?, [Value::I64(7)]);
    assert_eq!(instance.invoke("max", &[Value::I64(9), Value::I64(7)])?, [Value::I64(9)]);
    assert_eq!(instance.invoke("tee", &[Value::I32(21)])?, [Value::I32(42)]);
    Ok(())
}

#[test]
fn test_arithmetic_traps() {
    let mut instance = load(
        r#"(module
            (func (export "div") (param i32 i32) (result i32) (i32.div_s (local.get 0) (local.get 1)))
            (func (export "rem") (param i64 i64) (result i64) (i64.rem_s (local.get 0) (local.get 1)))
            (func (export "trunc") (param f64) (result i32) (i32.trunc_f64_s (local.get 0)))
            (func (export "trunc-sat") (param f64) (result i32) (i32.trunc_sat_f64_s (local.get 0)))
            (func (export "boom") unreachable))"#,
    );
    assert_eq!(trap_code(&mut instance, "div", &[Value::I32(1), Value::I32(0)]), codes::DIVISION_BY_ZERO);
    assert_eq!(
        trap_code(&mut instance, "div", &[Value::I32(i32::MIN), Value::I32(-1)]),
        codes::INTEGER_OVERFLOW
    );
    assert_eq!(instance.invoke("rem", &[Value::I64(i64::MIN), Value::I64(-1)]).unwrap(), [Value::I64(0)]);
    assert_eq!(trap_code(&mut instance, "trunc", &[Value::from(f64::NAN)]), codes::INVALID_CONVERSION);
    assert_eq!(trap_code(&mut instance, "trunc", &[Value::from(3e9)]), codes::INTEGER_OVERFLOW);
    assert_eq!(instance.invoke("trunc-sat", &[Value::from(3e9)]).unwrap(), [Value::I32(i32::MAX)]);
    assert_eq!(trap_code(&mut instance, "boom", &[]), codes::UNREACHABLE);
}

#[test]
fn test_float_semantics() -> Result<()> {
    let mut instance = load(
        r#"(module
            (func (export "nearest") (param f32) (result f32) (f32.nearest (local.get 0)))
            (func (export "min") (param f64 f64) (result f64) (f64.min (local.get 0) (local.get 1)))
            (func (export "bits") (param f32) (result i32) (i32.reinterpret_f32 (local.get 0)))
            (func (export "neg") (param f64) (result f64) (f64.neg (local.get 0))))"#,
    );
    assert_eq!(instance.invoke("nearest", &[Value::from(2.5f32)])?, [Value::from(2.0f32)]);
    assert_eq!(instance.invoke("nearest", &[Value::from(-3.5f32)])?, [Value::from(-4.0f32)]);
    assert_eq!(instance.invoke("min", &[Value::from(0.0), Value::from(-0.0)])?, [Value::from(-0.0)]);
    let nan = instance.invoke("min", &[Value::from(f64::NAN), Value::from(1.0)])?;
    assert!(nan[0].as_f64().unwrap().is_nan());
    assert_eq!(instance.invoke("bits", &[Value::from(-1.0f32)])?, [Value::I32(0xBF80_0000_u32 as i32)]);
    assert_eq!(instance.invoke("neg", &[Value::from(0.0)])?, [Value::from(-0.0)]);
    Ok(())
}

#[test]
fn test_call_indirect() {
    let mut instance = load(
        r#"(module
            (type $binop (func (param i32 i32) (result i32)))
            (type $nullary (func (result i32)))
            (table 3 funcref)
            (elem (i32.const 0) $add $answer)
            (func $add (type $binop) (i32.add (local.get 0) (local.get 1)))
            (func $answer (type $nullary) (i32.const 42))
            (func (export "dispatch") (param i32) (result i32)
              (call_indirect (type $binop) (i32.const 20) (i32.const 22) (local.get 0))))"#,
    );
    assert_eq!(instance.invoke("dispatch", &[Value::I32(0)]).unwrap(), [Value::I32(42)]);
    assert_eq!(
        trap_code(&mut instance, "dispatch", &[Value::I32(1)]),
        codes::INDIRECT_CALL_TYPE_MISMATCH
    );
    assert_eq!(trap_code(&mut instance, "dispatch", &[Value::I32(2)]), codes::UNINITIALIZED_ELEMENT);
    assert_eq!(trap_code(&mut instance, "dispatch", &[Value::I32(3)]), codes::TABLE_OUT_OF_BOUNDS);
}

#[test]
fn test_memory_access_and_growth() -> Result<()> {
    let mut instance = load(
        r#"(module
            (memory (export "mem") 1 2)
            (data (i32.const 8) "\2a\00\00\00")
            (func (export "load") (param i32) (result i32) (i32.load (local.get 0)))
            (func (export "load8") (param i32) (result i32) (i32.load8_s offset=8 (local.get 0)))
            (func (export "store") (param i32 i32) (i32.store (local.get 0) (local.get 1)))
            (func (export "grow") (param i32) (result i32) (memory.grow (local.get 0)))
            (func (export "size") (result i32) (memory.size)))"#,
    );
    assert_eq!(instance.invoke("load", &[Value::I32(8)])?, [Value::I32(42)]);
    instance.invoke("store", &[Value::I32(8), Value::I32(-2)])?;
    assert_eq!(instance.invoke("load8", &[Value::I32(0)])?, [Value::I32(-2)]);
    assert_eq!(
        trap_code(&mut instance, "load", &[Value::I32(65533)]),
        codes::MEMORY_OUT_OF_BOUNDS
    );

    assert_eq!(instance.invoke("grow", &[Value::I32(1)])?, [Value::I32(1)]);
    // Past the declared maximum the program sees -1 instead of a trap
    assert_eq!(instance.invoke("grow", &[Value::I32(1)])?, [Value::I32(-1)]);
    assert_eq!(instance.invoke("size", &[])?, [Value::I32(2)]);
    assert_eq!(instance.invoke("load", &[Value::I32(65533)])?, [Value::I32(0)]);
    assert_eq!(instance.exported_memory("mem").unwrap().size_in_bytes(), 2 * 65536);
    Ok(())
}

#[test]
fn test_globals() -> Result<()> {
    let mut instance = load(
        r#"(module
            (global $counter (export "counter") (mut i32) (i32.const 0))
            (global $step i32 (i32.const 5))
            (func (export "bump") (result i32)
              (global.set $counter (i32.add (global.get $counter) (global.get $step)))
              (global.get $counter)))"#,
    );
    assert_eq!(instance.invoke("bump", &[])?, [Value::I32(5)]);
    assert_eq!(instance.invoke("bump", &[])?, [Value::I32(10)]);
    assert_eq!(instance.exported_global("counter").unwrap().value(), Value::I32(10));

    instance.exported_global_mut("counter").unwrap().set_value(Value::I32(100))?;
    assert_eq!(instance.invoke("bump", &[])?, [Value::I32(105)]);
    let step = instance.global_mut(1).unwrap();
    assert_eq!(step.set_value(Value::I32(0)).unwrap_err().code, codes::IMMUTABLE_GLOBAL);
    Ok(())
}

#[test]
fn test_trap_keeps_committed_writes() -> Result<()> {
    let mut instance = load(
        r#"(module
            (memory 1)
            (global $g (export "g") (mut i64) (i64.const 0))
            (func (export "write-then-trap")
              (i32.store (i32.const 0) (i32.const 7))
              (global.set $g (i64.const 9))
              unreachable)
            (func (export "read") (result i32) (i32.load (i32.const 0))))"#,
    );
    assert_eq!(trap_code(&mut instance, "write-then-trap", &[]), codes::UNREACHABLE);
    assert_eq!(instance.invoke("read", &[])?, [Value::I32(7)]);
    assert_eq!(instance.exported_global("g").unwrap().value(), Value::I64(9));
    Ok(())
}

#[test]
fn test_loop_branch_keeps_parameters() -> Result<()> {
    init_tracing();
    // Each iteration leaves two surplus cells under the loop parameter
    let bytes = wat::parse_str(
        r#"(module
            (func (export "count-down") (param $n i32) (result i32) (local $k i32) (local $steps i32)
              (local.get $n)
              (loop $next (param i32) (result i32)
                (local.set $k)
                (local.set $steps (i32.add (local.get $steps) (i32.const 1)))
                (i32.const 555)
                (i32.const 555)
                (i32.sub (local.get $k) (i32.const 1))
                (br_if $next (i32.ne (local.get $k) (i32.const 1)))
                (local.set $k)
                (drop)
                (drop)
                (local.get $steps))))"#,
    )
    .unwrap();
    let module = wrt_decoder::decode_module(&bytes).unwrap();
    let config = RuntimeConfig::new().with_max_operand_stack(32);
    let mut instance = instantiate_with_config(module, &mut Imports::new(), config)?;

    for n in [1, 2, 1000] {
        assert_eq!(instance.invoke("count-down", &[Value::I32(n)])?, [Value::I32(n)]);
    }
    Ok(())
}

#[test]
fn test_block_branch_discards_surplus() -> Result<()> {
    let mut instance = load(
        r#"(module
            (func (export "single") (result i32)
              (block $out (result i32)
                (i32.const 1)
                (i32.const 2)
                (i32.const 3)
                (br $out)))
            (func (export "nested") (result i32 i32)
              (i32.const 7)
              (block $outer (result i32)
                (i32.const 100)
                (block $inner
                  (i32.const 200)
                  (i32.const 9)
                  (br $outer)))))"#,
    );
    assert_eq!(instance.invoke("single", &[])?, [Value::I32(3)]);
    // Values below the block survive the branch
    assert_eq!(instance.invoke("nested", &[])?, [Value::I32(7), Value::I32(9)]);
    Ok(())
}

#[test]
fn test_call_depth_is_bounded() {
    init_tracing();
    let bytes = wat::parse_str(
        r#"(module
            (func $down (export "down") (param i32) (result i32)
              (if (result i32) (i32.eqz (local.get 0))
                (then (i32.const 0))
                (else (call $down (i32.sub (local.get 0) (i32.const 1)))))))"#,
    )
    .unwrap();
    let module = wrt_decoder::decode_module(&bytes).unwrap();
    let config = RuntimeConfig::new().with_max_call_depth(64);
    let mut instance = instantiate_with_config(module, &mut Imports::new(), config).unwrap();

    assert_eq!(instance.invoke("down", &[Value::I32(63)]).unwrap(), [Value::I32(0)]);
    assert_eq!(trap_code(&mut instance, "down", &[Value::I32(64)]), codes::CALL_STACK_EXHAUSTED);
    // The instance is still usable after exhausting the stack
    assert_eq!(instance.invoke("down", &[Value::I32(3)]).unwrap(), [Value::I32(0)]);
}

#[test]
fn test_invoke_checks_export_and_arguments() {
    let mut instance = load(
        r#"(module
            (memory (export "mem") 1)
            (func (export "id") (param i32) (result i32) (local.get 0)))"#,
    );
    assert_eq!(instance.invoke("missing", &[]).unwrap_err().code, codes::EXPORT_NOT_FOUND);
    assert_eq!(instance.invoke("mem", &[]).unwrap_err().code, codes::EXPORT_NOT_FOUND);
    assert_eq!(instance.invoke("id", &[]).unwrap_err().code, codes::INVALID_ARGUMENTS);
    assert_eq!(instance.invoke("id", &[Value::I64(1)]).unwrap_err().code, codes::INVALID_ARGUMENTS);
    assert!(!instance.invoke("id", &[Value::I64(1)]).unwrap_err().is_trap());
}
