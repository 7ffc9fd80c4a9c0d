//! Bytecode Writer
//!
//! Encodes a `Program` in either container format. Output loads back to an
//! equal program through `BytecodeLoader`.

use std::io::{self, Write};

use byteorder::{BigEndian, WriteBytesExt};

use crate::bytecode::{Mnemonic, Program};

use super::loader::{BYTECODE_MAGIC, UNKNOWN_OPCODE, VERSION};

/// Bytecode writer
pub struct BytecodeWriter;

impl BytecodeWriter {
    /// Write the line-oriented text format
    pub fn write_text<W: Write + ?Sized>(program: &Program, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", program.len())?;
        for instr in program.code() {
            if instr.has_operand() {
                writeln!(out, "{} {}", instr.mnemonic.as_str(), instr.arg)?;
            } else {
                writeln!(out, "{}", instr.mnemonic.as_str())?;
            }
        }

        writeln!(out, "{}", program.consts().len())?;
        for value in program.consts() {
            writeln!(out, "{}", value)?;
        }

        writeln!(out, "{}", program.names().len())?;
        for name in program.names() {
            if name.contains(|c: char| c == '\n' || c == '\r') {
                return Err(invalid_input("name contains a line break"));
            }
            writeln!(out, "{}", name)?;
        }
        Ok(())
    }

    /// Write the big-endian binary format
    pub fn write_binary<W: Write + ?Sized>(program: &Program, out: &mut W) -> io::Result<()> {
        out.write_all(&BYTECODE_MAGIC)?;
        out.write_u8(VERSION)?;
        out.write_all(&[0u8; 3])?;

        write_count(out, program.len())?;
        for instr in program.code() {
            match &instr.mnemonic {
                Mnemonic::Known(op) => out.write_u8(op.as_u8())?,
                Mnemonic::Unknown(name) => {
                    out.write_u8(UNKNOWN_OPCODE)?;
                    write_name(out, name)?;
                }
            }
            out.write_i64::<BigEndian>(instr.arg)?;
        }

        write_count(out, program.consts().len())?;
        for value in program.consts() {
            out.write_i64::<BigEndian>(*value)?;
        }

        write_count(out, program.names().len())?;
        for name in program.names() {
            write_name(out, name)?;
        }
        Ok(())
    }
}

fn write_count<W: Write + ?Sized>(out: &mut W, count: usize) -> io::Result<()> {
    let count = u32::try_from(count).map_err(|_| invalid_input("section too large"))?;
    out.write_u32::<BigEndian>(count)
}

fn write_name<W: Write + ?Sized>(out: &mut W, name: &str) -> io::Result<()> {
    let len = u16::try_from(name.len()).map_err(|_| invalid_input("name too long"))?;
    out.write_u16::<BigEndian>(len)?;
    out.write_all(name.as_bytes())
}

fn invalid_input(msg: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}
