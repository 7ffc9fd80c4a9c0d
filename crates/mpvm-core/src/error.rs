//! MPVM Error Types
//!
//! Defines every failure the loader and the interpreter can produce.
//! All errors are fatal: a run that hits one ends in the faulted state.

use std::io;

use thiserror::Error;

/// Structural problems found while decoding a bytecode container.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(String),

    #[error("bytecode is truncated in the {section} section")]
    Truncated { section: &'static str },

    #[error("line {line}: invalid record count {text:?}")]
    InvalidCount { line: usize, text: String },

    #[error("line {line}: invalid integer {text:?}")]
    InvalidInteger { line: usize, text: String },

    #[error("line {line}: malformed instruction {text:?}")]
    InvalidInstruction { line: usize, text: String },

    #[error("unexpected data after the name table")]
    TrailingData,

    #[error("invalid bytecode magic number")]
    InvalidMagic,

    #[error("unsupported bytecode version: {0}")]
    UnsupportedVersion(u8),

    #[error("name is not valid utf-8")]
    InvalidUtf8,
}

impl From<io::Error> for LoadError {
    fn from(err: io::Error) -> Self {
        LoadError::Io(err.to_string())
    }
}

/// Runtime faults, plus load failures surfaced through the same channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("failed to load bytecode: {0}")]
    Load(#[from] LoadError),

    #[error("stack overflow (limit {limit})")]
    StackOverflow { limit: usize },

    #[error("stack underflow")]
    StackUnderflow,

    #[error("undefined variable: {0}")]
    UnboundName(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid jump target: {0}")]
    InvalidJumpTarget(i64),

    #[error("unknown opcode: {0}")]
    UnknownOpcode(String),

    #[error("invalid constant index: {0}")]
    InvalidConstantIndex(i64),

    #[error("invalid name index: {0}")]
    InvalidNameIndex(i64),

    #[error("integer overflow in {op}")]
    ArithmeticOverflow { op: &'static str },

    #[error("io error: {0}")]
    Io(String),
}

impl VmError {
    /// True if the error came from decoding the container rather than running it.
    pub fn is_load_error(&self) -> bool {
        matches!(self, VmError::Load(_))
    }
}

impl From<io::Error> for VmError {
    fn from(err: io::Error) -> Self {
        VmError::Io(err.to_string())
    }
}

pub type VmResult<T> = Result<T, VmError>;
pub type LoadResult<T> = Result<T, LoadError>;
