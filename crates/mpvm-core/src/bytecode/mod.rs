pub mod instruction;
pub mod opcode;
pub mod program;

pub use instruction::{Instruction, Mnemonic};
pub use opcode::OpCode;
pub use program::Program;
