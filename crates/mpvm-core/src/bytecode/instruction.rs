//! Bytecode Instruction Representation
//!
//! An instruction slot as stored in a program container. The opcode name is
//! resolved once at load time, but unknown names are kept verbatim so the
//! interpreter can reject them when it reaches them.

use std::fmt;

use crate::error::{VmError, VmResult};
use super::opcode::OpCode;

/// The opcode half of an instruction, as read from the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mnemonic {
    Known(OpCode),
    Unknown(String),
}

impl Mnemonic {
    pub fn parse(name: &str) -> Self {
        match OpCode::from_name(name) {
            Some(op) => Mnemonic::Known(op),
            None => Mnemonic::Unknown(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Mnemonic::Known(op) => op.name(),
            Mnemonic::Unknown(name) => name,
        }
    }
}

/// Bytecode instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    /// Operand; 0 when the opcode takes none
    pub arg: i64,
}

impl Instruction {
    /// Create an instruction with no operand
    pub fn new(opcode: OpCode) -> Self {
        Instruction {
            mnemonic: Mnemonic::Known(opcode),
            arg: 0,
        }
    }

    /// Create an instruction with a single operand
    pub fn with_operand(opcode: OpCode, arg: i64) -> Self {
        Instruction {
            mnemonic: Mnemonic::Known(opcode),
            arg,
        }
    }

    /// Create a slot holding a name outside the instruction set
    pub fn unknown(name: impl Into<String>, arg: i64) -> Self {
        Instruction {
            mnemonic: Mnemonic::Unknown(name.into()),
            arg,
        }
    }

    pub fn decode(&self) -> VmResult<OpCode> {
        match &self.mnemonic {
            Mnemonic::Known(op) => Ok(*op),
            Mnemonic::Unknown(name) => Err(VmError::UnknownOpcode(name.clone())),
        }
    }

    /// Whether the operand should be written out when encoding.
    /// A nonzero operand is always kept, even on an opcode that ignores it.
    pub fn has_operand(&self) -> bool {
        match &self.mnemonic {
            Mnemonic::Known(op) => op.takes_operand() || self.arg != 0,
            Mnemonic::Unknown(_) => self.arg != 0,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_operand() {
            write!(f, "{:20} {}", self.mnemonic.as_str(), self.arg)
        } else {
            f.write_str(self.mnemonic.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mnemonic_fails_to_decode() {
        let instr = Instruction::unknown("NOP", 0);
        assert_eq!(instr.decode(), Err(VmError::UnknownOpcode("NOP".into())));
        assert_eq!(Instruction::new(OpCode::Add).decode(), Ok(OpCode::Add));
    }

    #[test]
    fn display_pads_mnemonic_before_operand() {
        let instr = Instruction::with_operand(OpCode::LoadConst, 3);
        assert_eq!(instr.to_string(), format!("{:20} 3", "LOAD_CONST"));
        assert_eq!(Instruction::new(OpCode::Halt).to_string(), "HALT");
    }
}
