//! MPVM Configuration
//!
//! Defines runtime limits and arithmetic policy for the interpreter.
//! Configuration specifies constraints only; enforcement is handled by the VM.

/// Default operand stack depth limit
pub const DEFAULT_MAX_STACK_SIZE: usize = 10_000;

/// What `ADD`, `SUB`, `MUL` and `DIV` do when the result does not fit in an `i64`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Abort the run with `ArithmeticOverflow`
    #[default]
    Fault,

    /// Two's complement wrap-around
    Wrap,
}

/// VM Configuration
#[derive(Debug, Clone)]
pub struct VmConfig {
    /// Maximum operand stack depth
    pub max_stack_size: usize,

    /// Overflow behaviour for integer arithmetic
    pub overflow: OverflowPolicy,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            max_stack_size: DEFAULT_MAX_STACK_SIZE,
            overflow: OverflowPolicy::Fault,
        }
    }
}

impl VmConfig {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_stack_size(mut self, max_stack_size: usize) -> Self {
        self.max_stack_size = max_stack_size;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}
