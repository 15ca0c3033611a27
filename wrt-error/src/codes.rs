// WRT - wrt-error
// Module: WRT Error Codes
//
// Copyright (c) 2024 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Error codes for WRT

// Parse error codes (1000-1099)
/// Input ended before a complete item could be read
pub const UNEXPECTED_END: u16 = 1000;
/// Magic number is not `\0asm`
pub const INVALID_MAGIC: u16 = 1001;
/// Binary format version is not 1
pub const INVALID_VERSION: u16 = 1002;
/// Section id is unknown, duplicated or out of order
pub const MALFORMED_SECTION_ID: u16 = 1003;
/// Declared section size differs from the bytes consumed by its reader
pub const SECTION_SIZE_MISMATCH: u16 = 1004;
/// LEB128 integer uses more bytes than its bit width allows
pub const LEB128_TOO_LONG: u16 = 1005;
/// LEB128 integer does not fit the requested bit width
pub const LEB128_OVERFLOW: u16 = 1006;
/// Unknown value type byte
pub const INVALID_VALUE_TYPE: u16 = 1007;
/// Unknown negative block type
pub const INVALID_BLOCK_TYPE: u16 = 1008;
/// Mutability flag other than 0 or 1
pub const INVALID_MUTABILITY: u16 = 1009;
/// Table element type other than `funcref`
pub const INVALID_ELEMENT_TYPE: u16 = 1010;
/// Unknown import descriptor tag
pub const INVALID_IMPORT_DESC: u16 = 1011;
/// Unknown export descriptor tag
pub const INVALID_EXPORT_DESC: u16 = 1012;
/// Malformed limits (bad flag, `min > max`, too many pages)
pub const INVALID_LIMITS: u16 = 1013;
/// Function type does not start with `0x60`
pub const INVALID_FUNC_TYPE: u16 = 1014;
/// Reserved byte that must be zero was not
pub const ZERO_BYTE_EXPECTED: u16 = 1015;
/// Expression terminated by the wrong opcode
pub const INVALID_EXPRESSION_END: u16 = 1016;
/// Opcode outside the supported instruction set
pub const UNKNOWN_OPCODE: u16 = 1017;
/// Function and code sections declare different counts
pub const FUNCTION_CODE_MISMATCH: u16 = 1018;
/// Code body size differs from the bytes its locals and expression consumed
pub const CODE_SIZE_MISMATCH: u16 = 1019;
/// Sum of local declarations does not fit in `u32`
pub const TOO_MANY_LOCALS: u16 = 1020;
/// `block`, `loop` and `if` nested past the decoder's depth limit
pub const NESTING_TOO_DEEP: u16 = 1021;

// Trap codes (2000-2099)
/// `unreachable` executed
pub const UNREACHABLE: u16 = 2000;
/// Linear memory access out of bounds
pub const MEMORY_OUT_OF_BOUNDS: u16 = 2001;
/// Table access out of bounds
pub const TABLE_OUT_OF_BOUNDS: u16 = 2002;
/// Indirect call through an empty table slot
pub const UNINITIALIZED_ELEMENT: u16 = 2003;
/// Indirect call target has a different signature than expected
pub const INDIRECT_CALL_TYPE_MISMATCH: u16 = 2004;
/// Write to an immutable global
pub const IMMUTABLE_GLOBAL: u16 = 2005;
/// Integer division or remainder by zero
pub const DIVISION_BY_ZERO: u16 = 2006;
/// Integer overflow in division or float-to-int truncation
pub const INTEGER_OVERFLOW: u16 = 2007;
/// NaN converted to an integer
pub const INVALID_CONVERSION: u16 = 2008;
/// Too many nested function activations
pub const CALL_STACK_EXHAUSTED: u16 = 2009;
/// Operand stack exceeded its configured capacity
pub const STACK_OVERFLOW: u16 = 2010;
/// Operand or control stack popped while empty
pub const STACK_UNDERFLOW: u16 = 2011;
/// Host function reported a failure
pub const HOST_TRAP: u16 = 2012;
/// Host function returned values that do not match its signature
pub const HOST_RESULT_MISMATCH: u16 = 2013;
/// Local index outside the current activation
pub const INVALID_LOCAL_INDEX: u16 = 2014;
/// Branch label deeper than the enclosing control stack
pub const INVALID_LABEL: u16 = 2015;
/// Instruction requires a memory the instance does not have
pub const MISSING_MEMORY: u16 = 2016;
/// Instruction requires a table the instance does not have
pub const MISSING_TABLE: u16 = 2017;

// Index codes shared by initialization and execution (2050-2059)
/// Function index outside the function index space
pub const INVALID_FUNCTION_INDEX: u16 = 2050;
/// Global index outside the global index space
pub const INVALID_GLOBAL_INDEX: u16 = 2051;
/// Type index outside the type section
pub const INVALID_TYPE_INDEX: u16 = 2052;

// Initialization error codes (3000-3099)
/// No extern was supplied for an import
pub const UNKNOWN_IMPORT: u16 = 3000;
/// Supplied extern is of the wrong kind or type
pub const IMPORT_TYPE_MISMATCH: u16 = 3001;
/// Element or data segment does not fit its table or memory
pub const SEGMENT_OUT_OF_BOUNDS: u16 = 3002;
/// Initializer expression is not a supported constant expression
pub const INVALID_CONST_EXPR: u16 = 3003;
/// More than one memory or table declared
pub const MULTIPLE_MEMORIES_OR_TABLES: u16 = 3004;

// Runtime API error codes (4000-4099)
/// Export is missing or not of the requested kind
pub const EXPORT_NOT_FOUND: u16 = 4000;
/// Arguments do not match the function signature
pub const INVALID_ARGUMENTS: u16 = 4001;
/// Value has the wrong type for its destination
pub const TYPE_MISMATCH: u16 = 4002;
/// Memory or table growth beyond its limits
pub const LIMIT_EXCEEDED: u16 = 4003;
