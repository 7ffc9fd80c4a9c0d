//! Program Container
//!
//! The immutable, already-parsed unit the interpreter runs: an instruction
//! sequence, a constant pool and a name table. Operands are not checked here;
//! the accessors below validate an operand at the point of use.

use std::fmt;

use crate::error::{VmError, VmResult};
use crate::vm::value::Value;
use super::instruction::Instruction;

/// Loaded program
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    code: Vec<Instruction>,
    consts: Vec<Value>,
    names: Vec<String>,
}

impl Program {
    pub fn new(code: Vec<Instruction>, consts: Vec<Value>, names: Vec<String>) -> Self {
        Program { code, consts, names }
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    pub fn consts(&self) -> &[Value] {
        &self.consts
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of instructions
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn instruction(&self, ip: usize) -> Option<&Instruction> {
        self.code.get(ip)
    }

    /// Constant pool lookup for `LOAD_CONST`
    pub fn constant(&self, arg: i64) -> VmResult<Value> {
        usize::try_from(arg)
            .ok()
            .and_then(|idx| self.consts.get(idx))
            .copied()
            .ok_or(VmError::InvalidConstantIndex(arg))
    }

    /// Name table lookup for `LOAD_NAME` / `STORE_NAME`
    pub fn name(&self, arg: i64) -> VmResult<&str> {
        usize::try_from(arg)
            .ok()
            .and_then(|idx| self.names.get(idx))
            .map(String::as_str)
            .ok_or(VmError::InvalidNameIndex(arg))
    }

    /// Validate a jump operand against the instruction range
    pub fn jump_target(&self, arg: i64) -> VmResult<usize> {
        usize::try_from(arg)
            .ok()
            .filter(|&target| target < self.code.len())
            .ok_or(VmError::InvalidJumpTarget(arg))
    }

    /// Human-readable listing of all three sections
    pub fn disassemble(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "code ({}):", self.code.len())?;
        for (i, instr) in self.code.iter().enumerate() {
            writeln!(f, "{:4}: {}", i, instr)?;
        }
        writeln!(f, "consts ({}):", self.consts.len())?;
        for (i, value) in self.consts.iter().enumerate() {
            writeln!(f, "{:4}: {}", i, value)?;
        }
        writeln!(f, "names ({}):", self.names.len())?;
        for (i, name) in self.names.iter().enumerate() {
            writeln!(f, "{:4}: {}", i, name)?;
        }
        Ok(())
    }
}
