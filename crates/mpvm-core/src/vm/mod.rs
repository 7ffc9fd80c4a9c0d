pub mod memory;
pub mod stack;
pub mod value;
pub mod vm;

pub use memory::Globals;
pub use stack::Stack;
pub use value::Value;
pub use vm::{load_and_run, run_program, RunState, VirtualMachine};
