// WRT - wrt-decoder
// Module: Section Readers
//
// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Readers for the individual WebAssembly sections.
//!
//! Each reader decodes one section payload into the corresponding [`Module`]
//! field. Size accounting for the section as a whole happens in the caller.

use wrt_error::{codes, kinds, Error, ErrorContext, Result};
use wrt_format::{
    binary,
    module::{Code, Data, Element, Export, ExportDesc, Global, Import, ImportDesc, Locals, Module},
    types::{FuncType, GlobalType, Limits, MemoryType, RefType, TableType, ValueType},
};

use crate::{instructions::read_expr, reader::Reader};

const INVALID_LIMITS: Error = Error::parse_error(codes::INVALID_LIMITS, "Invalid limits");

/// Decode the payload of the known section `id` into `module`.
pub fn read_section(reader: &mut Reader<'_>, id: u8, module: &mut Module) -> Result<()> {
    match id {
        binary::TYPE_SECTION_ID => module.types = reader.read_vec(read_func_type)?,
        binary::IMPORT_SECTION_ID => module.imports = reader.read_vec(read_import)?,
        binary::FUNCTION_SECTION_ID => module.functions = reader.read_vec(Reader::read_var_u32)?,
        binary::TABLE_SECTION_ID => module.tables = reader.read_vec(read_table_type)?,
        binary::MEMORY_SECTION_ID => module.memories = reader.read_vec(read_memory_type)?,
        binary::GLOBAL_SECTION_ID => module.globals = reader.read_vec(read_global)?,
        binary::EXPORT_SECTION_ID => module.exports = reader.read_vec(read_export)?,
        binary::START_SECTION_ID => module.start = Some(reader.read_var_u32()?),
        binary::ELEMENT_SECTION_ID => module.elements = reader.read_vec(read_element)?,
        binary::CODE_SECTION_ID => module.code = reader.read_vec(read_code)?,
        binary::DATA_SECTION_ID => module.data = reader.read_vec(read_data)?,
        _ => return Err(kinds::malformed_section_id(id)),
    }
    Ok(())
}

/// Read a value type byte
pub fn read_value_type(reader: &mut Reader<'_>) -> Result<ValueType> {
    ValueType::from_binary(reader.read_byte()?)
}

fn read_func_type(reader: &mut Reader<'_>) -> Result<FuncType> {
    let tag = reader.read_byte()?;
    if tag != binary::FUNC_TYPE_TAG {
        return Err(kinds::malformed_byte(
            codes::INVALID_FUNC_TYPE,
            "Invalid function type",
            "function type",
            tag,
        ));
    }
    let params = reader.read_vec(read_value_type)?;
    let results = reader.read_vec(read_value_type)?;
    Ok(FuncType::new(params, results))
}

fn read_limits(reader: &mut Reader<'_>) -> Result<Limits> {
    let flag = reader.read_byte()?;
    let limits = match flag {
        0x00 => Limits::new(reader.read_var_u32()?, None),
        0x01 => {
            let min = reader.read_var_u32()?;
            let max = reader.read_var_u32()?;
            if min > max {
                return Err(INVALID_LIMITS
                    .with_context(ErrorContext::Value { field: "limits max", value: i64::from(max) }));
            }
            Limits::new(min, Some(max))
        }
        _ => return Err(INVALID_LIMITS.with_context(ErrorContext::Byte { field: "limits", value: flag })),
    };
    Ok(limits)
}

/// Read a table type: element type then limits
pub fn read_table_type(reader: &mut Reader<'_>) -> Result<TableType> {
    let element = RefType::from_binary(reader.read_byte()?)?;
    let limits = read_limits(reader)?;
    Ok(TableType { element, limits })
}

/// Read memory limits, which are bounded by the 32-bit page cap
pub fn read_memory_type(reader: &mut Reader<'_>) -> Result<MemoryType> {
    let limits = read_limits(reader)?;
    let largest = limits.max.unwrap_or(limits.min);
    if largest > binary::MAX_PAGES {
        return Err(INVALID_LIMITS
            .with_context(ErrorContext::Value { field: "memory pages", value: i64::from(largest) }));
    }
    Ok(MemoryType { limits })
}

/// Read a global type: value type then mutability flag
pub fn read_global_type(reader: &mut Reader<'_>) -> Result<GlobalType> {
    let value_type = read_value_type(reader)?;
    let mutable = GlobalType::mutability_from_binary(reader.read_byte()?)?;
    Ok(GlobalType { value_type, mutable })
}

fn read_import(reader: &mut Reader<'_>) -> Result<Import> {
    let module = reader.read_name()?;
    let name = reader.read_name()?;
    let desc = match reader.read_byte()? {
        binary::EXTERNAL_KIND_FUNCTION => ImportDesc::Func(reader.read_var_u32()?),
        binary::EXTERNAL_KIND_TABLE => ImportDesc::Table(read_table_type(reader)?),
        binary::EXTERNAL_KIND_MEMORY => ImportDesc::Memory(read_memory_type(reader)?),
        binary::EXTERNAL_KIND_GLOBAL => ImportDesc::Global(read_global_type(reader)?),
        tag => {
            return Err(kinds::malformed_byte(
                codes::INVALID_IMPORT_DESC,
                "Invalid import descriptor",
                "import descriptor",
                tag,
            ))
        }
    };
    Ok(Import { module, name, desc })
}

fn read_export(reader: &mut Reader<'_>) -> Result<Export> {
    let name = reader.read_name()?;
    let tag = reader.read_byte()?;
    let index = reader.read_var_u32()?;
    let desc = match tag {
        binary::EXTERNAL_KIND_FUNCTION => ExportDesc::Func(index),
        binary::EXTERNAL_KIND_TABLE => ExportDesc::Table(index),
        binary::EXTERNAL_KIND_MEMORY => ExportDesc::Memory(index),
        binary::EXTERNAL_KIND_GLOBAL => ExportDesc::Global(index),
        _ => {
            return Err(kinds::malformed_byte(
                codes::INVALID_EXPORT_DESC,
                "Invalid export descriptor",
                "export descriptor",
                tag,
            ))
        }
    };
    Ok(Export { name, desc })
}

fn read_global(reader: &mut Reader<'_>) -> Result<Global> {
    let ty = read_global_type(reader)?;
    let init = read_expr(reader)?;
    Ok(Global { ty, init })
}

fn read_element(reader: &mut Reader<'_>) -> Result<Element> {
    let table = reader.read_var_u32()?;
    let offset = read_expr(reader)?;
    let init = reader.read_vec(Reader::read_var_u32)?;
    Ok(Element { table, offset, init })
}

fn read_data(reader: &mut Reader<'_>) -> Result<Data> {
    let memory = reader.read_var_u32()?;
    let offset = read_expr(reader)?;
    let init = reader.read_byte_vec()?.to_vec();
    Ok(Data { memory, offset, init })
}

fn read_locals(reader: &mut Reader<'_>) -> Result<Locals> {
    let count = reader.read_var_u32()?;
    let value_type = read_value_type(reader)?;
    Ok(Locals { count, value_type })
}

fn read_code(reader: &mut Reader<'_>) -> Result<Code> {
    let size = reader.read_var_u32()?;
    let start = reader.position();
    let locals = reader.read_vec(read_locals)?;
    let body = read_expr(reader)?;
    let code = Code { locals, body };
    code.local_count()?;

    let consumed = reader.position() - start;
    if consumed != size as usize {
        return Err(Error::parse_error(codes::CODE_SIZE_MISMATCH, "Code size mismatch")
            .with_context(ErrorContext::SectionSize {
                id: binary::CODE_SECTION_ID,
                declared: size,
                consumed,
            }));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn test_limits() {
        assert_eq!(read_limits(&mut Reader::new(&[0x00, 0x01])).unwrap(), Limits::new(1, None));
        assert_eq!(
            read_limits(&mut Reader::new(&[0x01, 0x01, 0x02])).unwrap(),
            Limits::new(1, Some(2))
        );
        assert_eq!(
            read_limits(&mut Reader::new(&[0x01, 0x03, 0x02])).unwrap_err().code,
            codes::INVALID_LIMITS
        );
        assert_eq!(read_limits(&mut Reader::new(&[0x02, 0x00])).unwrap_err().code, codes::INVALID_LIMITS);
    }

    #[test]
    fn test_memory_page_cap() {
        // max = 65537 pages
        let error = read_memory_type(&mut Reader::new(&[0x01, 0x00, 0x81, 0x80, 0x04])).unwrap_err();
        assert_eq!(error.code, codes::INVALID_LIMITS);
        assert!(read_memory_type(&mut Reader::new(&[0x01, 0x00, 0x80, 0x80, 0x04])).is_ok());
    }

    #[test]
    fn test_closed_enumerations() {
        assert_eq!(
            read_table_type(&mut Reader::new(&[0x6F, 0x00, 0x00])).unwrap_err().code,
            codes::INVALID_ELEMENT_TYPE
        );
        assert_eq!(
            read_global_type(&mut Reader::new(&[0x7F, 0x02])).unwrap_err().code,
            codes::INVALID_MUTABILITY
        );
        assert_eq!(
            read_func_type(&mut Reader::new(&[0x61, 0x00, 0x00])).unwrap_err().code,
            codes::INVALID_FUNC_TYPE
        );
        let import = [0x01, b'm', 0x01, b'f', 0x04, 0x00];
        assert_eq!(read_import(&mut Reader::new(&import)).unwrap_err().code, codes::INVALID_IMPORT_DESC);
        let export = [0x01, b'f', 0x04, 0x00];
        assert_eq!(read_export(&mut Reader::new(&export)).unwrap_err().code, codes::INVALID_EXPORT_DESC);
    }

    #[test]
    fn test_code_entry() {
        // size 6: one local group (2 x i32), body i32.const 0 end
        let bytes = [0x06, 0x01, 0x02, 0x7F, 0x41, 0x00, 0x0B];
        let code = read_code(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(code.locals, vec![Locals { count: 2, value_type: ValueType::I32 }]);
        assert_eq!(code.local_count().unwrap(), 2);

        let bytes = [0x07, 0x01, 0x02, 0x7F, 0x41, 0x00, 0x0B, 0x0B];
        assert_eq!(read_code(&mut Reader::new(&bytes)).unwrap_err().code, codes::CODE_SIZE_MISMATCH);
    }

    #[test]
    fn test_import_kinds() {
        let bytes = [0x03, b'e', b'n', b'v', 0x01, b'g', 0x03, 0x7E, 0x01];
        let import = read_import(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(import.module, "env");
        assert_eq!(
            import.desc,
            ImportDesc::Global(GlobalType { value_type: ValueType::I64, mutable: true })
        );
    }
}
