pub mod loader;
mod text;
pub mod writer;

pub use loader::BytecodeLoader;
pub use writer::BytecodeWriter;
