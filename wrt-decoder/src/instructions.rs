// WRT - wrt-decoder
// Module: Instruction Decoding
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! WebAssembly instruction decoding
//!
//! Expressions are decoded into instruction trees. `block`, `loop` and `if`
//! recurse into the same reader, so the nesting of the binary becomes the
//! nesting of [`Instruction`] payloads. Recursion is bounded by
//! [`MAX_NESTING_DEPTH`].

use alloc::vec::Vec;

use wrt_error::{codes, kinds, Error, Result};
use wrt_format::{
    binary,
    instructions::{Args, BlockArgs, BrTableArgs, Expr, IfArgs, Instruction, MemArg},
    types::BlockType,
};

use crate::reader::Reader;

/// Opcode that closed an instruction sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// `end` (0x0B)
    End,
    /// `else` (0x05)
    Else,
}

/// Deepest nesting of `block`, `loop` and `if` accepted in one expression
pub const MAX_NESTING_DEPTH: usize = 1024;

const INVALID_EXPRESSION_END: Error =
    Error::parse_error(codes::INVALID_EXPRESSION_END, "Expression not terminated by end");

const NESTING_TOO_DEEP: Error =
    Error::parse_error(codes::NESTING_TOO_DEEP, "Control structures nested too deeply");

/// Read instructions until `end` or `else`, returning the sequence and the
/// terminator that closed it.
pub fn read_instructions(reader: &mut Reader<'_>) -> Result<(Expr, Terminator)> {
    read_sequence(reader, 0)
}

/// Read an expression that must be closed by `end`.
///
/// Used for function bodies and for global, element and data initializers.
pub fn read_expr(reader: &mut Reader<'_>) -> Result<Expr> {
    read_nested_expr(reader, 0)
}

fn read_sequence(reader: &mut Reader<'_>, depth: usize) -> Result<(Expr, Terminator)> {
    if depth > MAX_NESTING_DEPTH {
        return Err(NESTING_TOO_DEEP);
    }
    let mut instructions = Vec::new();
    loop {
        let opcode = reader.read_byte()?;
        match opcode {
            binary::END => return Ok((instructions, Terminator::End)),
            binary::ELSE => return Ok((instructions, Terminator::Else)),
            _ => instructions.push(read_instruction(reader, opcode, depth)?),
        }
    }
}

fn read_nested_expr(reader: &mut Reader<'_>, depth: usize) -> Result<Expr> {
    match read_sequence(reader, depth)? {
        (expr, Terminator::End) => Ok(expr),
        (_, Terminator::Else) => Err(INVALID_EXPRESSION_END),
    }
}

fn read_block_type(reader: &mut Reader<'_>) -> Result<BlockType> {
    BlockType::from_value(reader.read_var_s33()?)
}

fn read_mem_arg(reader: &mut Reader<'_>) -> Result<MemArg> {
    let align = reader.read_var_u32()?;
    let offset = reader.read_var_u32()?;
    Ok(MemArg { align, offset })
}

/// Decode the immediates of `opcode`, which has already been consumed.
///
/// `depth` counts the structured instructions enclosing `opcode`.
fn read_instruction(reader: &mut Reader<'_>, opcode: u8, depth: usize) -> Result<Instruction> {
    let args = match opcode {
        binary::BLOCK | binary::LOOP => {
            let block_type = read_block_type(reader)?;
            let body = read_nested_expr(reader, depth + 1)?;
            Args::Block(BlockArgs { block_type, body })
        }
        binary::IF => {
            let block_type = read_block_type(reader)?;
            let (then_body, terminator) = read_sequence(reader, depth + 1)?;
            let else_body = match terminator {
                Terminator::Else => Some(read_nested_expr(reader, depth + 1)?),
                Terminator::End => None,
            };
            Args::If(IfArgs { block_type, then_body, else_body })
        }
        binary::BR
        | binary::BR_IF
        | binary::CALL
        | binary::LOCAL_GET
        | binary::LOCAL_SET
        | binary::LOCAL_TEE
        | binary::GLOBAL_GET
        | binary::GLOBAL_SET => Args::Index(reader.read_var_u32()?),
        binary::BR_TABLE => {
            let labels = reader.read_vec(Reader::read_var_u32)?;
            let default = reader.read_var_u32()?;
            Args::BrTable(BrTableArgs { labels, default })
        }
        binary::CALL_INDIRECT => {
            let type_idx = reader.read_var_u32()?;
            reader.read_zero_byte()?;
            Args::CallIndirect(type_idx)
        }
        binary::I32_LOAD..=binary::I64_STORE32 => Args::Memory(read_mem_arg(reader)?),
        binary::MEMORY_SIZE | binary::MEMORY_GROW => {
            reader.read_zero_byte()?;
            Args::None
        }
        binary::I32_CONST => Args::I32(reader.read_var_i32()?),
        binary::I64_CONST => Args::I64(reader.read_var_i64()?),
        binary::F32_CONST => Args::F32(reader.read_u32_le()?),
        binary::F64_CONST => Args::F64(reader.read_u64_le()?),
        binary::UNREACHABLE
        | binary::NOP
        | binary::RETURN
        | binary::DROP
        | binary::SELECT
        | binary::I32_EQZ..=binary::I64_EXTEND32_S => Args::None,
        binary::TRUNC_SAT_PREFIX => {
            let sub = reader.read_var_u32()?;
            match u8::try_from(sub) {
                Ok(sub @ binary::I32_TRUNC_SAT_F32_S..=binary::I64_TRUNC_SAT_F64_U) => {
                    Args::Saturating(sub)
                }
                _ => return Err(unknown_opcode(opcode)),
            }
        }
        _ => return Err(unknown_opcode(opcode)),
    };
    Ok(Instruction::new(opcode, args))
}

fn unknown_opcode(opcode: u8) -> Error {
    kinds::malformed_byte(codes::UNKNOWN_OPCODE, "Unknown opcode", "opcode", opcode)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use wrt_format::types::ValueType;

    fn decode(bytes: &[u8]) -> Result<Expr> {
        let mut reader = Reader::new(bytes);
        let expr = read_expr(&mut reader)?;
        assert!(reader.is_empty());
        Ok(expr)
    }

    #[test]
    fn test_flat_expression() {
        let expr = decode(&[0x41, 0x2A, 0x0B]).unwrap();
        assert_eq!(expr, vec![Instruction::new(binary::I32_CONST, Args::I32(42))]);
    }

    #[test]
    fn test_nested_block_forms_tree() {
        // block (result i32) loop i32.const 1 br 1 end end
        let expr = decode(&[0x02, 0x7F, 0x03, 0x40, 0x41, 0x01, 0x0C, 0x01, 0x0B, 0x0B, 0x0B]).unwrap();
        let Args::Block(outer) = &expr[0].args else {
            panic!("expected block payload");
        };
        assert_eq!(outer.block_type, BlockType::Value(ValueType::I32));
        assert_eq!(outer.body[0].opcode, binary::LOOP);
        let Args::Block(inner) = &outer.body[0].args else {
            panic!("expected loop payload");
        };
        assert_eq!(inner.block_type, BlockType::Empty);
        assert_eq!(inner.body[1], Instruction::new(binary::BR, Args::Index(1)));
    }

    #[test]
    fn test_if_with_and_without_else() {
        let expr = decode(&[0x04, 0x40, 0x01, 0x05, 0x00, 0x0B, 0x04, 0x40, 0x0B, 0x0B]).unwrap();
        let Args::If(with_else) = &expr[0].args else {
            panic!("expected if payload");
        };
        assert_eq!(with_else.then_body, vec![Instruction::simple(binary::NOP)]);
        assert_eq!(with_else.else_body, Some(vec![Instruction::simple(binary::UNREACHABLE)]));
        let Args::If(without_else) = &expr[1].args else {
            panic!("expected if payload");
        };
        assert_eq!(without_else.else_body, None);
    }

    #[test]
    fn test_unterminated_block_is_error() {
        assert_eq!(decode(&[0x02, 0x40, 0x01]).unwrap_err().code, codes::UNEXPECTED_END);
        // else inside a block
        assert_eq!(
            decode(&[0x02, 0x40, 0x05, 0x0B, 0x0B]).unwrap_err().code,
            codes::INVALID_EXPRESSION_END
        );
        // else twice
        assert_eq!(
            decode(&[0x04, 0x40, 0x05, 0x05, 0x0B, 0x0B]).unwrap_err().code,
            codes::INVALID_EXPRESSION_END
        );
    }

    #[test]
    fn test_reserved_bytes_must_be_zero() {
        assert!(decode(&[0x3F, 0x00, 0x1A, 0x0B]).is_ok());
        assert_eq!(decode(&[0x3F, 0x01, 0x0B]).unwrap_err().code, codes::ZERO_BYTE_EXPECTED);
        assert_eq!(decode(&[0x40, 0x01, 0x0B]).unwrap_err().code, codes::ZERO_BYTE_EXPECTED);
        assert_eq!(decode(&[0x11, 0x00, 0x01, 0x0B]).unwrap_err().code, codes::ZERO_BYTE_EXPECTED);
    }

    #[test]
    fn test_immediates() {
        let expr = decode(&[
            0x0E, 0x02, 0x00, 0x01, 0x02, // br_table [0 1] 2
            0x28, 0x02, 0x10, // i32.load align=2 offset=16
            0x43, 0x00, 0x00, 0x80, 0x3F, // f32.const 1.0
            0xFC, 0x03, // i32.trunc_sat_f64_u
            0x0B,
        ])
        .unwrap();
        assert_eq!(expr[0].args, Args::BrTable(BrTableArgs { labels: vec![0, 1], default: 2 }));
        assert_eq!(expr[1].args, Args::Memory(MemArg { align: 2, offset: 16 }));
        assert_eq!(expr[2].args, Args::F32(1.0f32.to_bits()));
        assert_eq!(expr[3].args, Args::Saturating(3));
    }

    #[test]
    fn test_unknown_opcodes() {
        assert_eq!(decode(&[0x06, 0x0B]).unwrap_err().code, codes::UNKNOWN_OPCODE);
        assert_eq!(decode(&[0xFD, 0x0B]).unwrap_err().code, codes::UNKNOWN_OPCODE);
        assert_eq!(decode(&[0xFC, 0x08, 0x0B]).unwrap_err().code, codes::UNKNOWN_OPCODE);
    }

    fn nested_blocks(depth: usize) -> Vec<u8> {
        let mut bytes = [0x02u8, 0x40].repeat(depth);
        bytes.extend(core::iter::repeat_n(0x0B, depth + 1));
        bytes
    }

    #[test]
    fn test_nesting_depth_limit() {
        let expr = decode(&nested_blocks(MAX_NESTING_DEPTH)).unwrap();
        assert_eq!(expr.len(), 1);
        assert_eq!(
            decode(&nested_blocks(MAX_NESTING_DEPTH + 1)).unwrap_err().code,
            codes::NESTING_TOO_DEEP
        );
        // if/else arms count as one level each
        let mut bytes = [0x02u8, 0x40].repeat(MAX_NESTING_DEPTH);
        bytes.extend_from_slice(&[0x04, 0x40, 0x05, 0x0B]);
        bytes.extend(core::iter::repeat_n(0x0B, MAX_NESTING_DEPTH + 1));
        assert_eq!(decode(&bytes).unwrap_err().code, codes::NESTING_TOO_DEEP);
    }

    #[test]
    fn test_invalid_block_type() {
        assert_eq!(decode(&[0x02, 0x7B, 0x0B, 0x0B]).unwrap_err().code, codes::INVALID_BLOCK_TYPE);
    }
}
