//! MiniPy Virtual Machine - Core Library
//!
//! Public API surface for the MPVM core: program container, loader and
//! writer, and the stack-based interpreter.

pub mod error;
pub mod config;
pub mod bytecode;
pub mod vm;
pub mod loader;

// Re-export commonly used types
pub use error::{LoadError, LoadResult, VmError, VmResult};
pub use config::{OverflowPolicy, VmConfig};
pub use bytecode::{Instruction, OpCode, Program};
pub use vm::{load_and_run, run_program, RunState, Value, VirtualMachine};
pub use loader::{BytecodeLoader, BytecodeWriter};
