//! Bytecode Opcode Definitions
//!
//! Defines the closed opcode set of the MiniPy VM.
//! This file contains no execution semantics.
//! Opcode byte values are part of the binary container format.

use std::fmt;

/// Bytecode opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // Constants and names
    LoadConst = 0x01,
    LoadName  = 0x02,
    StoreName = 0x03,

    // Arithmetic
    Add = 0x10,
    Sub = 0x11,
    Mul = 0x12,
    Div = 0x13,

    // Comparison
    CmpLt  = 0x20,
    CmpGt  = 0x21,
    CmpLe  = 0x22,
    CmpGe  = 0x23,
    CmpEq  = 0x24,
    CmpNeq = 0x25,

    // Control flow
    Jump        = 0x30,
    JumpIfFalse = 0x31,
    JumpIfTrue  = 0x32,

    // Stack and output
    Pop   = 0x40,
    Print = 0x41,

    // System
    Halt = 0xF0,
}

/// Every opcode, in byte order
pub const ALL_OPCODES: [OpCode; 19] = [
    OpCode::LoadConst,
    OpCode::LoadName,
    OpCode::StoreName,
    OpCode::Add,
    OpCode::Sub,
    OpCode::Mul,
    OpCode::Div,
    OpCode::CmpLt,
    OpCode::CmpGt,
    OpCode::CmpLe,
    OpCode::CmpGe,
    OpCode::CmpEq,
    OpCode::CmpNeq,
    OpCode::Jump,
    OpCode::JumpIfFalse,
    OpCode::JumpIfTrue,
    OpCode::Pop,
    OpCode::Print,
    OpCode::Halt,
];

impl OpCode {
    /// Convert raw byte to opcode
    pub fn from_u8(byte: u8) -> Option<Self> {
        ALL_OPCODES.iter().copied().find(|op| op.as_u8() == byte)
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Resolve a textual mnemonic such as `JUMP_IF_FALSE`
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_OPCODES.iter().copied().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            OpCode::LoadConst => "LOAD_CONST",
            OpCode::LoadName => "LOAD_NAME",
            OpCode::StoreName => "STORE_NAME",
            OpCode::Add => "ADD",
            OpCode::Sub => "SUB",
            OpCode::Mul => "MUL",
            OpCode::Div => "DIV",
            OpCode::CmpLt => "CMP_LT",
            OpCode::CmpGt => "CMP_GT",
            OpCode::CmpLe => "CMP_LE",
            OpCode::CmpGe => "CMP_GE",
            OpCode::CmpEq => "CMP_EQ",
            OpCode::CmpNeq => "CMP_NEQ",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfFalse => "JUMP_IF_FALSE",
            OpCode::JumpIfTrue => "JUMP_IF_TRUE",
            OpCode::Pop => "POP",
            OpCode::Print => "PRINT",
            OpCode::Halt => "HALT",
        }
    }

    /// Whether the operand is meaningful (an index or a jump target)
    pub fn takes_operand(self) -> bool {
        matches!(
            self,
            OpCode::LoadConst
                | OpCode::LoadName
                | OpCode::StoreName
                | OpCode::Jump
                | OpCode::JumpIfFalse
                | OpCode::JumpIfTrue
        )
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
