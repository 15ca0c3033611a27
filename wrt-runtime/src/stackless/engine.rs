// WRT - wrt-runtime
// Module: Stackless Execution Engine
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Stackless WebAssembly execution engine
//!
//! The engine never recurses on the host stack: nested calls and structured
//! scopes are [`StacklessFrame`]s on an explicit control stack, and values
//! live on one [`OperandStack`]. An engine lives for a single invocation, so
//! a trap simply drops both stacks; the instance state it was mutating keeps
//! every write committed before the trap.

use alloc::vec::Vec;

use tracing::trace;
use wrt_error::{codes, kinds, Error, ErrorContext, Result};
use wrt_format::{
    binary as op,
    instructions::{Args, Instruction, MemArg},
    types::{BlockType, FuncType},
};
use wrt_math as math;

use super::{
    frame::{FrameKind, StacklessFrame},
    stack::OperandStack,
};
use crate::{
    config::RuntimeConfig,
    func::{Function, HostFunc},
    memory::Memory,
    module_instance::Store,
    value::Value,
};

macro_rules! unary {
    ($self:ident, $pop:ident => $push:ident, |$a:ident| $body:expr) => {{
        let $a = $self.stack.$pop()?;
        $self.stack.$push($body)?;
    }};
}

macro_rules! binary {
    ($self:ident, $pop:ident => $push:ident, |$a:ident, $b:ident| $body:expr) => {{
        let $b = $self.stack.$pop()?;
        let $a = $self.stack.$pop()?;
        $self.stack.$push($body)?;
    }};
}

/// Interpreter for one invocation against one instance's state.
pub struct StacklessEngine<'a> {
    functions:  &'a [Function],
    types:      &'a [FuncType],
    store:      &'a mut Store,
    config:     RuntimeConfig,
    stack:      OperandStack,
    frames:     Vec<StacklessFrame<'a>>,
    call_depth: usize,
}

impl<'a> StacklessEngine<'a> {
    /// Create an engine over an instance's functions, types and state.
    pub fn new(
        functions: &'a [Function],
        types: &'a [FuncType],
        store: &'a mut Store,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            functions,
            types,
            store,
            config,
            stack: OperandStack::new(config.max_operand_stack),
            frames: Vec::new(),
            call_depth: 0,
        }
    }

    /// Call function `func_idx` with `args` and run it to completion.
    ///
    /// Arguments are assumed to match the signature; callers check them.
    pub fn invoke(&mut self, func_idx: u32, args: &[Value]) -> Result<Vec<Value>> {
        let ty = self.function(func_idx)?.ty();
        for arg in args {
            self.stack.push(arg.to_bits())?;
        }

        self.call(func_idx)?;
        self.run()?;

        let cells = self.stack.pop_n(ty.results.len())?;
        Ok(ty.results.iter().zip(cells).map(|(&ty, cell)| Value::from_bits(ty, cell)).collect())
    }

    fn run(&mut self) -> Result<()> {
        while let Some(frame) = self.frames.last_mut() {
            let instrs = frame.instrs;
            match instrs.get(frame.pc) {
                Some(instr) => {
                    frame.pc += 1;
                    self.execute(instr)?;
                }
                None => self.end_frame()?,
            }
        }
        Ok(())
    }

    fn function(&self, func_idx: u32) -> Result<&'a Function> {
        let functions = self.functions;
        functions.get(func_idx as usize).ok_or(kinds::invalid_index(
            codes::INVALID_FUNCTION_INDEX,
            "Function index out of range",
            "function",
            func_idx,
        ))
    }

    fn current(&self) -> Result<&StacklessFrame<'a>> {
        self.frames.last().ok_or(Error::STACK_UNDERFLOW)
    }

    // --- Calls ---------------------------------------------------------------

    fn call(&mut self, func_idx: u32) -> Result<()> {
        match self.function(func_idx)? {
            Function::Host { ty, callback } => self.call_host(func_idx, ty, callback),
            Function::Internal { ty, code } => {
                if self.call_depth >= self.config.max_call_depth {
                    return Err(Error::CALL_STACK_EXHAUSTED);
                }
                let params = ty.params.len();
                let bp = self.stack.len().checked_sub(params).ok_or(Error::STACK_UNDERFLOW)?;
                let declared = code.local_count()? as usize;
                self.stack.push_zeros(declared)?;

                trace!(func_idx, depth = self.call_depth, "call");
                let call = self.frames.len();
                self.frames.push(StacklessFrame {
                    kind: FrameKind::Call,
                    params,
                    results: ty.results.len(),
                    instrs: &code.body,
                    pc: 0,
                    bp,
                    locals: bp,
                    local_count: params + declared,
                    call,
                });
                self.call_depth += 1;
                Ok(())
            }
        }
    }

    fn call_host(&mut self, func_idx: u32, ty: &FuncType, callback: &HostFunc) -> Result<()> {
        let cells = self.stack.pop_n(ty.params.len())?;
        let args: Vec<Value> =
            ty.params.iter().zip(cells).map(|(&ty, cell)| Value::from_bits(ty, cell)).collect();

        trace!(func_idx, "host call");
        let results = callback(&args).map_err(|error| {
            if error.is_trap() { error } else { Error::runtime_trap(codes::HOST_TRAP, error.message) }
        })?;

        let matches = results.len() == ty.results.len()
            && results.iter().zip(&ty.results).all(|(value, &ty)| value.matches_type(ty));
        if !matches {
            return Err(Error::runtime_trap(
                codes::HOST_RESULT_MISMATCH,
                "Host function results don't match its signature",
            ));
        }
        for value in results {
            self.stack.push(value.to_bits())?;
        }
        Ok(())
    }

    fn call_indirect(&mut self, type_idx: u32) -> Result<()> {
        let elem = self.stack.pop_i32()? as u32;
        let table = self
            .store
            .tables
            .first()
            .ok_or(Error::runtime_trap(codes::MISSING_TABLE, "No table defined"))?;
        let func_idx = table.get(elem)?.ok_or(Error::UNINITIALIZED_ELEMENT)?;

        let expected = self.types.get(type_idx as usize).ok_or(kinds::invalid_index(
            codes::INVALID_TYPE_INDEX,
            "Type index out of range",
            "type",
            type_idx,
        ))?;
        if self.function(func_idx)?.ty() != expected {
            return Err(Error::INDIRECT_CALL_TYPE_MISMATCH);
        }
        self.call(func_idx)
    }

    // --- Structured control --------------------------------------------------

    fn enter(&mut self, kind: FrameKind, block_type: BlockType, body: &'a [Instruction]) -> Result<()> {
        let (params, results) = block_type.arity(self.types)?;
        let current = self.current()?;
        let bp = self.stack.len().checked_sub(params).ok_or(Error::STACK_UNDERFLOW)?;
        let frame = StacklessFrame {
            kind,
            params,
            results,
            instrs: body,
            pc: 0,
            bp,
            locals: current.locals,
            local_count: current.local_count,
            call: current.call,
        };
        self.frames.push(frame);
        Ok(())
    }

    /// The innermost frame's instructions ran out: leave it with its results.
    fn end_frame(&mut self) -> Result<()> {
        let frame = self.frames.pop().ok_or(Error::STACK_UNDERFLOW)?;
        self.stack.unwind(frame.bp, frame.results)?;
        if frame.kind == FrameKind::Call {
            self.call_depth -= 1;
            trace!(depth = self.call_depth, "return");
        }
        Ok(())
    }

    fn branch(&mut self, depth: u32) -> Result<()> {
        let top = self.frames.len().checked_sub(1).ok_or(Error::STACK_UNDERFLOW)?;
        let call = self.frames[top].call;
        let target = top.checked_sub(depth as usize).filter(|&target| target >= call).ok_or(
            kinds::invalid_index(codes::INVALID_LABEL, "Branch depth out of range", "label", depth),
        )?;
        self.branch_to(target)
    }

    /// Transfer control to the label of `frames[target]`.
    ///
    /// A loop keeps its parameters and restarts; any other frame keeps its
    /// results and is exited, resuming after its construct.
    fn branch_to(&mut self, target: usize) -> Result<()> {
        let frame = &mut self.frames[target];
        let (bp, kind, arity) = (frame.bp, frame.kind, frame.label_arity());
        self.stack.unwind(bp, arity)?;

        if kind == FrameKind::Loop {
            frame.pc = 0;
            self.frames.truncate(target + 1);
        } else {
            self.frames.truncate(target);
            if kind == FrameKind::Call {
                self.call_depth -= 1;
                trace!(depth = self.call_depth, "return");
            }
        }
        Ok(())
    }

    // --- Locals, globals, memory ---------------------------------------------

    fn local_slot(&self, idx: u32) -> Result<usize> {
        let frame = self.current()?;
        if idx as usize >= frame.local_count {
            return Err(kinds::invalid_index(
                codes::INVALID_LOCAL_INDEX,
                "Local index out of range",
                "local",
                idx,
            ));
        }
        Ok(frame.locals + idx as usize)
    }

    fn global_index(&self, idx: u32) -> Result<usize> {
        if (idx as usize) < self.store.globals.len() {
            Ok(idx as usize)
        } else {
            Err(kinds::invalid_index(codes::INVALID_GLOBAL_INDEX, "Global index out of range", "global", idx))
        }
    }

    fn memory(&self) -> Result<&Memory> {
        self.store.memories.first().ok_or(MISSING_MEMORY)
    }

    fn memory_mut(&mut self) -> Result<&mut Memory> {
        self.store.memories.first_mut().ok_or(MISSING_MEMORY)
    }

    fn effective_address(&mut self, memarg: &MemArg) -> Result<u64> {
        let base = self.stack.pop_i32()? as u32;
        Ok(u64::from(base) + u64::from(memarg.offset))
    }

    fn load<const N: usize>(&mut self, memarg: &MemArg) -> Result<[u8; N]> {
        let address = self.effective_address(memarg)?;
        self.memory()?.load::<N>(address)
    }

    /// Pops the address; the value must already be popped into `bytes`.
    fn store(&mut self, memarg: &MemArg, bytes: &[u8]) -> Result<()> {
        let address = self.effective_address(memarg)?;
        self.memory_mut()?.write(address, bytes)
    }

    // --- Dispatch ------------------------------------------------------------

    fn execute(&mut self, instr: &'a Instruction) -> Result<()> {
        match (instr.opcode, &instr.args) {
            (op::UNREACHABLE, _) => return Err(Error::UNREACHABLE),
            (op::NOP, _) => {}
            (op::BLOCK, Args::Block(block)) => self.enter(FrameKind::Block, block.block_type, &block.body)?,
            (op::LOOP, Args::Block(block)) => self.enter(FrameKind::Loop, block.block_type, &block.body)?,
            (op::IF, Args::If(branch)) => {
                let condition = self.stack.pop_i32()?;
                let body = if condition != 0 { Some(&branch.then_body) } else { branch.else_body.as_ref() };
                match body {
                    Some(body) => self.enter(FrameKind::If, branch.block_type, body)?,
                    // No else arm: the parameters pass straight through
                    None => {
                        branch.block_type.arity(self.types)?;
                    }
                }
            }
            (op::BR, &Args::Index(depth)) => self.branch(depth)?,
            (op::BR_IF, &Args::Index(depth)) => {
                if self.stack.pop_i32()? != 0 {
                    self.branch(depth)?;
                }
            }
            (op::BR_TABLE, Args::BrTable(table)) => {
                let selector = self.stack.pop_i32()? as u32;
                self.branch(table.target(selector))?;
            }
            (op::RETURN, _) => {
                let call = self.current()?.call;
                self.branch_to(call)?;
            }
            (op::CALL, &Args::Index(func_idx)) => self.call(func_idx)?,
            (op::CALL_INDIRECT, &Args::CallIndirect(type_idx)) => self.call_indirect(type_idx)?,

            (op::DROP, _) => {
                self.stack.pop()?;
            }
            (op::SELECT, _) => {
                let condition = self.stack.pop_i32()?;
                let second = self.stack.pop()?;
                let first = self.stack.pop()?;
                self.stack.push(if condition != 0 { first } else { second })?;
            }

            (op::LOCAL_GET, &Args::Index(idx)) => {
                let cell = self.stack.get(self.local_slot(idx)?)?;
                self.stack.push(cell)?;
            }
            (op::LOCAL_SET, &Args::Index(idx)) => {
                let slot = self.local_slot(idx)?;
                let cell = self.stack.pop()?;
                self.stack.set(slot, cell)?;
            }
            (op::LOCAL_TEE, &Args::Index(idx)) => {
                let slot = self.local_slot(idx)?;
                let cell = self.stack.peek()?;
                self.stack.set(slot, cell)?;
            }
            (op::GLOBAL_GET, &Args::Index(idx)) => {
                let cell = self.store.globals[self.global_index(idx)?].get_bits();
                self.stack.push(cell)?;
            }
            (op::GLOBAL_SET, &Args::Index(idx)) => {
                let idx = self.global_index(idx)?;
                let cell = self.stack.pop()?;
                self.store.globals[idx].set_bits(cell)?;
            }

            (op::I32_LOAD, Args::Memory(m)) => {
                let value = i32::from_le_bytes(self.load(m)?);
                self.stack.push_i32(value)?;
            }
            (op::I64_LOAD, Args::Memory(m)) => {
                let value = i64::from_le_bytes(self.load(m)?);
                self.stack.push_i64(value)?;
            }
            (op::F32_LOAD, Args::Memory(m)) => {
                let bits = u32::from_le_bytes(self.load(m)?);
                self.stack.push(u64::from(bits))?;
            }
            (op::F64_LOAD, Args::Memory(m)) => {
                let bits = u64::from_le_bytes(self.load(m)?);
                self.stack.push(bits)?;
            }
            (op::I32_LOAD8_S, Args::Memory(m)) => {
                let [byte] = self.load::<1>(m)?;
                self.stack.push_i32(i32::from(byte as i8))?;
            }
            (op::I32_LOAD8_U, Args::Memory(m)) => {
                let [byte] = self.load::<1>(m)?;
                self.stack.push_i32(i32::from(byte))?;
            }
            (op::I32_LOAD16_S, Args::Memory(m)) => {
                let value = i16::from_le_bytes(self.load(m)?);
                self.stack.push_i32(i32::from(value))?;
            }
            (op::I32_LOAD16_U, Args::Memory(m)) => {
                let value = u16::from_le_bytes(self.load(m)?);
                self.stack.push_i32(i32::from(value))?;
            }
            (op::I64_LOAD8_S, Args::Memory(m)) => {
                let [byte] = self.load::<1>(m)?;
                self.stack.push_i64(i64::from(byte as i8))?;
            }
            (op::I64_LOAD8_U, Args::Memory(m)) => {
                let [byte] = self.load::<1>(m)?;
                self.stack.push_i64(i64::from(byte))?;
            }
            (op::I64_LOAD16_S, Args::Memory(m)) => {
                let value = i16::from_le_bytes(self.load(m)?);
                self.stack.push_i64(i64::from(value))?;
            }
            (op::I64_LOAD16_U, Args::Memory(m)) => {
                let value = u16::from_le_bytes(self.load(m)?);
                self.stack.push_i64(i64::from(value))?;
            }
            (op::I64_LOAD32_S, Args::Memory(m)) => {
                let value = i32::from_le_bytes(self.load(m)?);
                self.stack.push_i64(i64::from(value))?;
            }
            (op::I64_LOAD32_U, Args::Memory(m)) => {
                let value = u32::from_le_bytes(self.load(m)?);
                self.stack.push_i64(i64::from(value))?;
            }

            (op::I32_STORE, Args::Memory(m)) => {
                let value = self.stack.pop_i32()?;
                self.store(m, &value.to_le_bytes())?;
            }
            (op::I64_STORE, Args::Memory(m)) => {
                let value = self.stack.pop_i64()?;
                self.store(m, &value.to_le_bytes())?;
            }
            (op::F32_STORE, Args::Memory(m)) => {
                let bits = self.stack.pop()? as u32;
                self.store(m, &bits.to_le_bytes())?;
            }
            (op::F64_STORE, Args::Memory(m)) => {
                let bits = self.stack.pop()?;
                self.store(m, &bits.to_le_bytes())?;
            }
            (op::I32_STORE8, Args::Memory(m)) => {
                let value = self.stack.pop_i32()?;
                self.store(m, &[value as u8])?;
            }
            (op::I32_STORE16, Args::Memory(m)) => {
                let value = self.stack.pop_i32()?;
                self.store(m, &(value as u16).to_le_bytes())?;
            }
            (op::I64_STORE8, Args::Memory(m)) => {
                let value = self.stack.pop_i64()?;
                self.store(m, &[value as u8])?;
            }
            (op::I64_STORE16, Args::Memory(m)) => {
                let value = self.stack.pop_i64()?;
                self.store(m, &(value as u16).to_le_bytes())?;
            }
            (op::I64_STORE32, Args::Memory(m)) => {
                let value = self.stack.pop_i64()?;
                self.store(m, &(value as u32).to_le_bytes())?;
            }

            (op::MEMORY_SIZE, _) => {
                let pages = self.memory()?.size();
                self.stack.push_i32(pages as i32)?;
            }
            (op::MEMORY_GROW, _) => {
                let delta = self.stack.pop_i32()? as u32;
                // Failure is reported to the program, not trapped
                let previous = match self.memory_mut()?.grow(delta) {
                    Ok(old_pages) => old_pages as i32,
                    Err(_) => -1,
                };
                trace!(delta, previous, "memory.grow");
                self.stack.push_i32(previous)?;
            }

            (op::I32_CONST, &Args::I32(value)) => self.stack.push_i32(value)?,
            (op::I64_CONST, &Args::I64(value)) => self.stack.push_i64(value)?,
            (op::F32_CONST, &Args::F32(bits)) => self.stack.push(u64::from(bits))?,
            (op::F64_CONST, &Args::F64(bits)) => self.stack.push(bits)?,

            (op::I32_EQZ, _) => unary!(self, pop_i32 => push_bool, |a| a == 0),
            (op::I32_EQ, _) => binary!(self, pop_i32 => push_bool, |a, b| a == b),
            (op::I32_NE, _) => binary!(self, pop_i32 => push_bool, |a, b| a != b),
            (op::I32_LT_S, _) => binary!(self, pop_i32 => push_bool, |a, b| a < b),
            (op::I32_LT_U, _) => binary!(self, pop_i32 => push_bool, |a, b| (a as u32) < (b as u32)),
            (op::I32_GT_S, _) => binary!(self, pop_i32 => push_bool, |a, b| a > b),
            (op::I32_GT_U, _) => binary!(self, pop_i32 => push_bool, |a, b| (a as u32) > (b as u32)),
            (op::I32_LE_S, _) => binary!(self, pop_i32 => push_bool, |a, b| a <= b),
            (op::I32_LE_U, _) => binary!(self, pop_i32 => push_bool, |a, b| (a as u32) <= (b as u32)),
            (op::I32_GE_S, _) => binary!(self, pop_i32 => push_bool, |a, b| a >= b),
            (op::I32_GE_U, _) => binary!(self, pop_i32 => push_bool, |a, b| (a as u32) >= (b as u32)),

            (op::I64_EQZ, _) => unary!(self, pop_i64 => push_bool, |a| a == 0),
            (op::I64_EQ, _) => binary!(self, pop_i64 => push_bool, |a, b| a == b),
            (op::I64_NE, _) => binary!(self, pop_i64 => push_bool, |a, b| a != b),
            (op::I64_LT_S, _) => binary!(self, pop_i64 => push_bool, |a, b| a < b),
            (op::I64_LT_U, _) => binary!(self, pop_i64 => push_bool, |a, b| (a as u64) < (b as u64)),
            (op::I64_GT_S, _) => binary!(self, pop_i64 => push_bool, |a, b| a > b),
            (op::I64_GT_U, _) => binary!(self, pop_i64 => push_bool, |a, b| (a as u64) > (b as u64)),
            (op::I64_LE_S, _) => binary!(self, pop_i64 => push_bool, |a, b| a <= b),
            (op::I64_LE_U, _) => binary!(self, pop_i64 => push_bool, |a, b| (a as u64) <= (b as u64)),
            (op::I64_GE_S, _) => binary!(self, pop_i64 => push_bool, |a, b| a >= b),
            (op::I64_GE_U, _) => binary!(self, pop_i64 => push_bool, |a, b| (a as u64) >= (b as u64)),

            (op::F32_EQ, _) => binary!(self, pop_f32 => push_bool, |a, b| a == b),
            (op::F32_NE, _) => binary!(self, pop_f32 => push_bool, |a, b| a != b),
            (op::F32_LT, _) => binary!(self, pop_f32 => push_bool, |a, b| a < b),
            (op::F32_GT, _) => binary!(self, pop_f32 => push_bool, |a, b| a > b),
            (op::F32_LE, _) => binary!(self, pop_f32 => push_bool, |a, b| a <= b),
            (op::F32_GE, _) => binary!(self, pop_f32 => push_bool, |a, b| a >= b),
            (op::F64_EQ, _) => binary!(self, pop_f64 => push_bool, |a, b| a == b),
            (op::F64_NE, _) => binary!(self, pop_f64 => push_bool, |a, b| a != b),
            (op::F64_LT, _) => binary!(self, pop_f64 => push_bool, |a, b| a < b),
            (op::F64_GT, _) => binary!(self, pop_f64 => push_bool, |a, b| a > b),
            (op::F64_LE, _) => binary!(self, pop_f64 => push_bool, |a, b| a <= b),
            (op::F64_GE, _) => binary!(self, pop_f64 => push_bool, |a, b| a >= b),

            (op::I32_CLZ, _) => unary!(self, pop_i32 => push_i32, |a| a.leading_zeros() as i32),
            (op::I32_CTZ, _) => unary!(self, pop_i32 => push_i32, |a| a.trailing_zeros() as i32),
            (op::I32_POPCNT, _) => unary!(self, pop_i32 => push_i32, |a| a.count_ones() as i32),
            (op::I32_ADD, _) => binary!(self, pop_i32 => push_i32, |a, b| a.wrapping_add(b)),
            (op::I32_SUB, _) => binary!(self, pop_i32 => push_i32, |a, b| a.wrapping_sub(b)),
            (op::I32_MUL, _) => binary!(self, pop_i32 => push_i32, |a, b| a.wrapping_mul(b)),
            (op::I32_DIV_S, _) => binary!(self, pop_i32 => push_i32, |a, b| math::i32_div_s(a, b)?),
            (op::I32_DIV_U, _) => {
                binary!(self, pop_i32 => push_i32, |a, b| math::i32_div_u(a as u32, b as u32)? as i32)
            }
            (op::I32_REM_S, _) => binary!(self, pop_i32 => push_i32, |a, b| math::i32_rem_s(a, b)?),
            (op::I32_REM_U, _) => {
                binary!(self, pop_i32 => push_i32, |a, b| math::i32_rem_u(a as u32, b as u32)? as i32)
            }
            (op::I32_AND, _) => binary!(self, pop_i32 => push_i32, |a, b| a & b),
            (op::I32_OR, _) => binary!(self, pop_i32 => push_i32, |a, b| a | b),
            (op::I32_XOR, _) => binary!(self, pop_i32 => push_i32, |a, b| a ^ b),
            (op::I32_SHL, _) => binary!(self, pop_i32 => push_i32, |a, b| math::i32_shl(a, b)),
            (op::I32_SHR_S, _) => binary!(self, pop_i32 => push_i32, |a, b| math::i32_shr_s(a, b)),
            (op::I32_SHR_U, _) => binary!(self, pop_i32 => push_i32, |a, b| math::i32_shr_u(a, b)),
            (op::I32_ROTL, _) => binary!(self, pop_i32 => push_i32, |a, b| math::i32_rotl(a, b)),
            (op::I32_ROTR, _) => binary!(self, pop_i32 => push_i32, |a, b| math::i32_rotr(a, b)),

            (op::I64_CLZ, _) => unary!(self, pop_i64 => push_i64, |a| i64::from(a.leading_zeros())),
            (op::I64_CTZ, _) => unary!(self, pop_i64 => push_i64, |a| i64::from(a.trailing_zeros())),
            (op::I64_POPCNT, _) => unary!(self, pop_i64 => push_i64, |a| i64::from(a.count_ones())),
            (op::I64_ADD, _) => binary!(self, pop_i64 => push_i64, |a, b| a.wrapping_add(b)),
            (op::I64_SUB, _) => binary!(self, pop_i64 => push_i64, |a, b| a.wrapping_sub(b)),
            (op::I64_MUL, _) => binary!(self, pop_i64 => push_i64, |a, b| a.wrapping_mul(b)),
            (op::I64_DIV_S, _) => binary!(self, pop_i64 => push_i64, |a, b| math::i64_div_s(a, b)?),
            (op::I64_DIV_U, _) => {
                binary!(self, pop_i64 => push_i64, |a, b| math::i64_div_u(a as u64, b as u64)? as i64)
            }
            (op::I64_REM_S, _) => binary!(self, pop_i64 => push_i64, |a, b| math::i64_rem_s(a, b)?),
            (op::I64_REM_U, _) => {
                binary!(self, pop_i64 => push_i64, |a, b| math::i64_rem_u(a as u64, b as u64)? as i64)
            }
            (op::I64_AND, _) => binary!(self, pop_i64 => push_i64, |a, b| a & b),
            (op::I64_OR, _) => binary!(self, pop_i64 => push_i64, |a, b| a | b),
            (op::I64_XOR, _) => binary!(self, pop_i64 => push_i64, |a, b| a ^ b),
            (op::I64_SHL, _) => binary!(self, pop_i64 => push_i64, |a, b| math::i64_shl(a, b)),
            (op::I64_SHR_S, _) => binary!(self, pop_i64 => push_i64, |a, b| math::i64_shr_s(a, b)),
            (op::I64_SHR_U, _) => binary!(self, pop_i64 => push_i64, |a, b| math::i64_shr_u(a, b)),
            (op::I64_ROTL, _) => binary!(self, pop_i64 => push_i64, |a, b| math::i64_rotl(a, b)),
            (op::I64_ROTR, _) => binary!(self, pop_i64 => push_i64, |a, b| math::i64_rotr(a, b)),

            (op::F32_ABS, _) => unary!(self, pop_f32_bits => push_f32_bits, |a| math::wasm_f32_abs(a)),
            (op::F32_NEG, _) => unary!(self, pop_f32_bits => push_f32_bits, |a| math::wasm_f32_neg(a)),
            (op::F32_CEIL, _) => unary!(self, pop_f32 => push_f32, |a| math::wasm_f32_ceil(a)),
            (op::F32_FLOOR, _) => unary!(self, pop_f32 => push_f32, |a| math::wasm_f32_floor(a)),
            (op::F32_TRUNC, _) => unary!(self, pop_f32 => push_f32, |a| math::wasm_f32_trunc(a)),
            (op::F32_NEAREST, _) => unary!(self, pop_f32 => push_f32, |a| math::wasm_f32_nearest(a)),
            (op::F32_SQRT, _) => unary!(self, pop_f32 => push_f32, |a| math::wasm_f32_sqrt(a)),
            (op::F32_ADD, _) => binary!(self, pop_f32 => push_f32, |a, b| a + b),
            (op::F32_SUB, _) => binary!(self, pop_f32 => push_f32, |a, b| a - b),
            (op::F32_MUL, _) => binary!(self, pop_f32 => push_f32, |a, b| a * b),
            (op::F32_DIV, _) => binary!(self, pop_f32 => push_f32, |a, b| a / b),
            (op::F32_MIN, _) => binary!(self, pop_f32 => push_f32, |a, b| math::wasm_f32_min(a, b)),
            (op::F32_MAX, _) => binary!(self, pop_f32 => push_f32, |a, b| math::wasm_f32_max(a, b)),
            (op::F32_COPYSIGN, _) => {
                binary!(self, pop_f32_bits => push_f32_bits, |a, b| math::wasm_f32_copysign(a, b))
            }

            (op::F64_ABS, _) => unary!(self, pop_f64_bits => push_f64_bits, |a| math::wasm_f64_abs(a)),
            (op::F64_NEG, _) => unary!(self, pop_f64_bits => push_f64_bits, |a| math::wasm_f64_neg(a)),
            (op::F64_CEIL, _) => unary!(self, pop_f64 => push_f64, |a| math::wasm_f64_ceil(a)),
            (op::F64_FLOOR, _) => unary!(self, pop_f64 => push_f64, |a| math::wasm_f64_floor(a)),
            (op::F64_TRUNC, _) => unary!(self, pop_f64 => push_f64, |a| math::wasm_f64_trunc(a)),
            (op::F64_NEAREST, _) => unary!(self, pop_f64 => push_f64, |a| math::wasm_f64_nearest(a)),
            (op::F64_SQRT, _) => unary!(self, pop_f64 => push_f64, |a| math::wasm_f64_sqrt(a)),
            (op::F64_ADD, _) => binary!(self, pop_f64 => push_f64, |a, b| a + b),
            (op::F64_SUB, _) => binary!(self, pop_f64 => push_f64, |a, b| a - b),
            (op::F64_MUL, _) => binary!(self, pop_f64 => push_f64, |a, b| a * b),
            (op::F64_DIV, _) => binary!(self, pop_f64 => push_f64, |a, b| a / b),
            (op::F64_MIN, _) => binary!(self, pop_f64 => push_f64, |a, b| math::wasm_f64_min(a, b)),
            (op::F64_MAX, _) => binary!(self, pop_f64 => push_f64, |a, b| math::wasm_f64_max(a, b)),
            (op::F64_COPYSIGN, _) => {
                binary!(self, pop_f64_bits => push_f64_bits, |a, b| math::wasm_f64_copysign(a, b))
            }

            (op::I32_WRAP_I64, _) => unary!(self, pop_i64 => push_i32, |a| a as i32),
            (op::I32_TRUNC_F32_S, _) => unary!(self, pop_f32 => push_i32, |a| math::i32_trunc_f32_s(a)?),
            (op::I32_TRUNC_F32_U, _) => {
                unary!(self, pop_f32 => push_i32, |a| math::i32_trunc_f32_u(a)? as i32)
            }
            (op::I32_TRUNC_F64_S, _) => unary!(self, pop_f64 => push_i32, |a| math::i32_trunc_f64_s(a)?),
            (op::I32_TRUNC_F64_U, _) => {
                unary!(self, pop_f64 => push_i32, |a| math::i32_trunc_f64_u(a)? as i32)
            }
            (op::I64_EXTEND_I32_S, _) => unary!(self, pop_i32 => push_i64, |a| i64::from(a)),
            (op::I64_EXTEND_I32_U, _) => unary!(self, pop_i32 => push_i64, |a| i64::from(a as u32)),
            (op::I64_TRUNC_F32_S, _) => unary!(self, pop_f32 => push_i64, |a| math::i64_trunc_f32_s(a)?),
            (op::I64_TRUNC_F32_U, _) => {
                unary!(self, pop_f32 => push_i64, |a| math::i64_trunc_f32_u(a)? as i64)
            }
            (op::I64_TRUNC_F64_S, _) => unary!(self, pop_f64 => push_i64, |a| math::i64_trunc_f64_s(a)?),
            (op::I64_TRUNC_F64_U, _) => {
                unary!(self, pop_f64 => push_i64, |a| math::i64_trunc_f64_u(a)? as i64)
            }
            (op::F32_CONVERT_I32_S, _) => unary!(self, pop_i32 => push_f32, |a| a as f32),
            (op::F32_CONVERT_I32_U, _) => unary!(self, pop_i32 => push_f32, |a| (a as u32) as f32),
            (op::F32_CONVERT_I64_S, _) => unary!(self, pop_i64 => push_f32, |a| a as f32),
            (op::F32_CONVERT_I64_U, _) => unary!(self, pop_i64 => push_f32, |a| (a as u64) as f32),
            (op::F32_DEMOTE_F64, _) => unary!(self, pop_f64 => push_f32, |a| a as f32),
            (op::F64_CONVERT_I32_S, _) => unary!(self, pop_i32 => push_f64, |a| f64::from(a)),
            (op::F64_CONVERT_I32_U, _) => unary!(self, pop_i32 => push_f64, |a| f64::from(a as u32)),
            (op::F64_CONVERT_I64_S, _) => unary!(self, pop_i64 => push_f64, |a| a as f64),
            (op::F64_CONVERT_I64_U, _) => unary!(self, pop_i64 => push_f64, |a| (a as u64) as f64),
            (op::F64_PROMOTE_F32, _) => unary!(self, pop_f32 => push_f64, |a| f64::from(a)),
            // Cells already hold the bit pattern
            (
                op::I32_REINTERPRET_F32
                | op::I64_REINTERPRET_F64
                | op::F32_REINTERPRET_I32
                | op::F64_REINTERPRET_I64,
                _,
            ) => {}

            (op::I32_EXTEND8_S, _) => unary!(self, pop_i32 => push_i32, |a| math::i32_extend8_s(a)),
            (op::I32_EXTEND16_S, _) => unary!(self, pop_i32 => push_i32, |a| math::i32_extend16_s(a)),
            (op::I64_EXTEND8_S, _) => unary!(self, pop_i64 => push_i64, |a| math::i64_extend8_s(a)),
            (op::I64_EXTEND16_S, _) => unary!(self, pop_i64 => push_i64, |a| math::i64_extend16_s(a)),
            (op::I64_EXTEND32_S, _) => unary!(self, pop_i64 => push_i64, |a| math::i64_extend32_s(a)),

            (op::TRUNC_SAT_PREFIX, &Args::Saturating(sub)) => self.execute_saturating(sub)?,

            (opcode, _) => return Err(unknown_opcode(opcode)),
        }
        Ok(())
    }

    fn execute_saturating(&mut self, sub: u8) -> Result<()> {
        match sub {
            op::I32_TRUNC_SAT_F32_S => unary!(self, pop_f32 => push_i32, |a| math::i32_trunc_sat_f32_s(a)),
            op::I32_TRUNC_SAT_F32_U => {
                unary!(self, pop_f32 => push_i32, |a| math::i32_trunc_sat_f32_u(a) as i32)
            }
            op::I32_TRUNC_SAT_F64_S => unary!(self, pop_f64 => push_i32, |a| math::i32_trunc_sat_f64_s(a)),
            op::I32_TRUNC_SAT_F64_U => {
                unary!(self, pop_f64 => push_i32, |a| math::i32_trunc_sat_f64_u(a) as i32)
            }
            op::I64_TRUNC_SAT_F32_S => unary!(self, pop_f32 => push_i64, |a| math::i64_trunc_sat_f32_s(a)),
            op::I64_TRUNC_SAT_F32_U => {
                unary!(self, pop_f32 => push_i64, |a| math::i64_trunc_sat_f32_u(a) as i64)
            }
            op::I64_TRUNC_SAT_F64_S => unary!(self, pop_f64 => push_i64, |a| math::i64_trunc_sat_f64_s(a)),
            op::I64_TRUNC_SAT_F64_U => {
                unary!(self, pop_f64 => push_i64, |a| math::i64_trunc_sat_f64_u(a) as i64)
            }
            _ => return Err(unknown_opcode(sub)),
        }
        Ok(())
    }
}

const MISSING_MEMORY: Error = Error::runtime_trap(codes::MISSING_MEMORY, "No memory defined");

fn unknown_opcode(opcode: u8) -> Error {
    Error::runtime_trap(codes::UNKNOWN_OPCODE, "Opcode not executable with these arguments")
        .with_context(ErrorContext::Byte { field: "opcode", value: opcode })
}
