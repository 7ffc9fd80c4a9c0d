//! Bytecode Loader
//!
//! Turns an encoded container into a `Program`.
//! This layer performs structural validation only: counts must match the
//! records present. Operands, jump targets and opcode names are left for the
//! interpreter to check when it uses them.

use std::fs;
use std::io::{self, Cursor, Read};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use tracing::debug;

use crate::bytecode::{Instruction, Mnemonic, OpCode, Program};
use crate::error::{LoadError, LoadResult};

use super::text;

/// Binary container magic: "MPBC"
pub const BYTECODE_MAGIC: [u8; 4] = *b"MPBC";

/// Supported binary container version
pub const VERSION: u8 = 1;

/// Opcode byte announcing a length-prefixed mnemonic that is not in the set
pub const UNKNOWN_OPCODE: u8 = 0xFF;

/// Bytecode loader
pub struct BytecodeLoader;

impl BytecodeLoader {
    /// Load a program from raw bytes, binary if the magic matches, text otherwise
    pub fn load(bytes: &[u8]) -> LoadResult<Program> {
        let program = if bytes.starts_with(&BYTECODE_MAGIC) {
            Self::load_binary(bytes)?
        } else {
            text::parse(bytes)?
        };

        debug!(
            code = program.len(),
            consts = program.consts().len(),
            names = program.names().len(),
            "bytecode loaded"
        );
        Ok(program)
    }

    /// Read and load a bytecode file
    pub fn load_file(path: impl AsRef<Path>) -> LoadResult<Program> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
        Self::load(&bytes)
    }

    /// Decode the binary container
    pub fn load_binary(bytes: &[u8]) -> LoadResult<Program> {
        let mut cursor = Cursor::new(bytes);

        // Header
        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic).map_err(truncated("header"))?;
        if magic != BYTECODE_MAGIC {
            return Err(LoadError::InvalidMagic);
        }

        let version = cursor.read_u8().map_err(truncated("header"))?;
        if version != VERSION {
            return Err(LoadError::UnsupportedVersion(version));
        }

        // Reserved
        let mut reserved = [0u8; 3];
        cursor.read_exact(&mut reserved).map_err(truncated("header"))?;

        // Code
        let code_count = Self::read_count(&mut cursor, "code")?;
        let mut code = Vec::with_capacity(code_count.min(bytes.len()));
        for _ in 0..code_count {
            let byte = cursor.read_u8().map_err(truncated("code"))?;
            let mnemonic = if byte == UNKNOWN_OPCODE {
                Mnemonic::Unknown(Self::read_name(&mut cursor, "code")?)
            } else {
                match OpCode::from_u8(byte) {
                    Some(op) => Mnemonic::Known(op),
                    None => Mnemonic::Unknown(format!("0x{:02X}", byte)),
                }
            };
            let arg = cursor.read_i64::<BigEndian>().map_err(truncated("code"))?;
            code.push(Instruction { mnemonic, arg });
        }

        // Constants
        let const_count = Self::read_count(&mut cursor, "consts")?;
        let mut consts = Vec::with_capacity(const_count.min(bytes.len()));
        for _ in 0..const_count {
            consts.push(cursor.read_i64::<BigEndian>().map_err(truncated("consts"))?);
        }

        // Names
        let name_count = Self::read_count(&mut cursor, "names")?;
        let mut names = Vec::with_capacity(name_count.min(bytes.len()));
        for _ in 0..name_count {
            names.push(Self::read_name(&mut cursor, "names")?);
        }

        if cursor.position() as usize != bytes.len() {
            return Err(LoadError::TrailingData);
        }

        Ok(Program::new(code, consts, names))
    }

    fn read_count(cursor: &mut Cursor<&[u8]>, section: &'static str) -> LoadResult<usize> {
        let count = cursor.read_u32::<BigEndian>().map_err(truncated(section))?;
        Ok(count as usize)
    }

    fn read_name(cursor: &mut Cursor<&[u8]>, section: &'static str) -> LoadResult<String> {
        let len = cursor.read_u16::<BigEndian>().map_err(truncated(section))? as usize;
        let mut buf = vec![0u8; len];
        cursor.read_exact(&mut buf).map_err(truncated(section))?;
        String::from_utf8(buf).map_err(|_| LoadError::InvalidUtf8)
    }
}

fn truncated(section: &'static str) -> impl Fn(io::Error) -> LoadError {
    move |_| LoadError::Truncated { section }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::BytecodeWriter;

    fn header() -> Vec<u8> {
        let mut buf = Vec::<u8>::new();
        buf.extend(&BYTECODE_MAGIC);
        buf.push(VERSION);
        buf.extend([0u8; 3]);
        buf
    }

    #[test]
    fn binary_roundtrip_preserves_unknown_opcodes() {
        let program = Program::new(
            vec![
                Instruction::with_operand(OpCode::LoadConst, 0),
                Instruction::unknown("FROB", 9),
                Instruction::new(OpCode::Halt),
            ],
            vec![-3],
            vec!["counter".to_string()],
        );
        let mut bytes = Vec::<u8>::new();
        BytecodeWriter::write_binary(&program, &mut bytes).unwrap();

        assert_eq!(BytecodeLoader::load(&bytes), Ok(program));
    }

    #[test]
    fn binary_rejects_bad_version() {
        let mut buf = header();
        buf[4] = 9;
        assert_eq!(BytecodeLoader::load_binary(&buf), Err(LoadError::UnsupportedVersion(9)));
    }

    #[test]
    fn binary_rejects_foreign_magic() {
        let mut buf = header();
        buf[3] = b'X';
        assert_eq!(BytecodeLoader::load_binary(&buf), Err(LoadError::InvalidMagic));
    }

    #[test]
    fn names_must_be_utf8() {
        let mut buf = header();
        buf.extend(0u32.to_be_bytes());
        buf.extend(0u32.to_be_bytes());
        buf.extend(1u32.to_be_bytes());
        buf.extend(2u16.to_be_bytes());
        buf.extend([0xFF, 0xFE]);
        assert_eq!(BytecodeLoader::load_binary(&buf), Err(LoadError::InvalidUtf8));

        assert_eq!(BytecodeLoader::load(b"1\nHALT\n0\n1\n\xFF\n"), Err(LoadError::InvalidUtf8));
    }

    #[test]
    fn binary_rejects_count_larger_than_records() {
        let mut buf = header();
        buf.extend(2u32.to_be_bytes());
        buf.push(OpCode::Halt.as_u8());
        buf.extend(0i64.to_be_bytes());

        assert_eq!(
            BytecodeLoader::load_binary(&buf),
            Err(LoadError::Truncated { section: "code" })
        );
    }

    #[test]
    fn binary_rejects_trailing_bytes() {
        let mut buf = header();
        buf.extend(0u32.to_be_bytes());
        buf.extend(0u32.to_be_bytes());
        buf.extend(0u32.to_be_bytes());
        assert!(BytecodeLoader::load_binary(&buf).is_ok());

        buf.push(0);
        assert_eq!(BytecodeLoader::load_binary(&buf), Err(LoadError::TrailingData));
    }

    #[test]
    fn unassigned_opcode_byte_loads_as_unknown() {
        let mut buf = header();
        buf.extend(1u32.to_be_bytes());
        buf.push(0x7E);
        buf.extend(0i64.to_be_bytes());
        buf.extend(0u32.to_be_bytes());
        buf.extend(0u32.to_be_bytes());

        let program = BytecodeLoader::load_binary(&buf).unwrap();
        assert_eq!(program.code()[0].mnemonic, Mnemonic::Unknown("0x7E".into()));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = BytecodeLoader::load_file("/nonexistent/program.mpbc").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
