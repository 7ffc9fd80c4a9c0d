//! Virtual Machine Core
//!
//! Defines the MiniPy Virtual Machine structure and its fetch/decode/execute
//! loop. The VM borrows a program for the duration of one run and owns all
//! mutable state: instruction pointer, operand stack and globals.

use std::io::{self, Write};

use tracing::{debug, trace, warn};

use crate::bytecode::{OpCode, Program};
use crate::config::{OverflowPolicy, VmConfig};
use crate::error::{VmError, VmResult};
use crate::loader::BytecodeLoader;

use super::memory::Globals;
use super::stack::Stack;
use super::value::{from_bool, is_truthy, Value};

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Explicit `HALT` or instruction pointer past the end
    Halted,
    /// A fatal error ended the run
    Faulted,
}

/// MiniPy Virtual Machine
#[derive(Debug)]
pub struct VirtualMachine<'p> {
    config: VmConfig,
    program: &'p Program,
    stack: Stack,
    globals: Globals,

    ip: usize,
    state: RunState,
    fault: Option<VmError>,
    executed: u64,
}

impl<'p> VirtualMachine<'p> {
    /// Create a new VM instance with fresh execution state
    pub fn new(config: VmConfig, program: &'p Program) -> Self {
        VirtualMachine {
            stack: Stack::new(config.max_stack_size),
            globals: Globals::new(),
            program,
            ip: 0,
            state: RunState::Running,
            fault: None,
            executed: 0,
            config,
        }
    }

    /// Execute until halt or error, printing to stdout
    pub fn execute(&mut self) -> VmResult<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run(&mut out)
    }

    /// Execute until halt or error, printing to `out`
    pub fn run<W: Write + ?Sized>(&mut self, out: &mut W) -> VmResult<()> {
        while self.step(out)? == RunState::Running {}
        out.flush()?;

        debug!(
            executed = self.executed,
            stack_depth = self.stack.len(),
            globals = self.globals.len(),
            "run halted"
        );
        Ok(())
    }

    /// Execute a single instruction. A VM that already stopped stays put:
    /// a halted VM keeps returning `Halted`, a faulted one keeps returning its fault.
    pub fn step<W: Write + ?Sized>(&mut self, out: &mut W) -> VmResult<RunState> {
        if let Some(err) = &self.fault {
            return Err(err.clone());
        }
        if self.state != RunState::Running {
            return Ok(self.state);
        }

        match self.dispatch(out) {
            Ok(()) => Ok(self.state),
            Err(err) => {
                self.state = RunState::Faulted;
                self.fault = Some(err.clone());
                warn!(ip = self.ip, error = %err, "run faulted");
                Err(err)
            }
        }
    }

    fn dispatch<W: Write + ?Sized>(&mut self, out: &mut W) -> VmResult<()> {
        let program = self.program;

        // Running off the end is an implicit HALT
        let Some(instr) = program.instruction(self.ip) else {
            self.state = RunState::Halted;
            return Ok(());
        };

        let opcode = instr.decode()?;
        let arg = instr.arg;
        trace!(ip = self.ip, %opcode, arg, "dispatch");
        self.executed += 1;

        let mut next = self.ip + 1;

        match opcode {
            OpCode::LoadConst => {
                let value = program.constant(arg)?;
                self.stack.push(value)?;
            }
            OpCode::LoadName => {
                let name = program.name(arg)?;
                let value = self.globals.load(name)?;
                self.stack.push(value)?;
            }
            OpCode::StoreName => {
                let value = self.stack.pop()?;
                let name = program.name(arg)?;
                self.globals.store(name, value);
            }

            OpCode::Add => self.arithmetic("ADD", i64::checked_add, i64::wrapping_add)?,
            OpCode::Sub => self.arithmetic("SUB", i64::checked_sub, i64::wrapping_sub)?,
            OpCode::Mul => self.arithmetic("MUL", i64::checked_mul, i64::wrapping_mul)?,
            OpCode::Div => self.divide()?,

            OpCode::CmpLt => self.compare(|a, b| a < b)?,
            OpCode::CmpGt => self.compare(|a, b| a > b)?,
            OpCode::CmpLe => self.compare(|a, b| a <= b)?,
            OpCode::CmpGe => self.compare(|a, b| a >= b)?,
            OpCode::CmpEq => self.compare(|a, b| a == b)?,
            OpCode::CmpNeq => self.compare(|a, b| a != b)?,

            OpCode::Jump => next = program.jump_target(arg)?,
            OpCode::JumpIfFalse => {
                if !is_truthy(self.stack.pop()?) {
                    next = program.jump_target(arg)?;
                }
            }
            OpCode::JumpIfTrue => {
                if is_truthy(self.stack.pop()?) {
                    next = program.jump_target(arg)?;
                }
            }

            OpCode::Pop => {
                self.stack.pop()?;
            }
            OpCode::Print => {
                let value = self.stack.pop()?;
                writeln!(out, "{}", value)?;
            }
            OpCode::Halt => {
                self.state = RunState::Halted;
                return Ok(());
            }
        }

        self.ip = next;
        Ok(())
    }

    /// Pop `b`, then `a`; both operands must be present before anything is computed
    fn pop_operands(&mut self) -> VmResult<(Value, Value)> {
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        Ok((a, b))
    }

    fn arithmetic(
        &mut self,
        op: &'static str,
        checked: fn(i64, i64) -> Option<i64>,
        wrapping: fn(i64, i64) -> i64,
    ) -> VmResult<()> {
        let (a, b) = self.pop_operands()?;
        let result = self.apply_overflow_policy(op, checked(a, b), wrapping(a, b))?;
        self.stack.push(result)
    }

    /// Integer division truncating toward zero
    fn divide(&mut self) -> VmResult<()> {
        let (a, b) = self.pop_operands()?;
        if b == 0 {
            return Err(VmError::DivisionByZero);
        }
        let result = self.apply_overflow_policy("DIV", a.checked_div(b), a.wrapping_div(b))?;
        self.stack.push(result)
    }

    fn compare(&mut self, relation: fn(Value, Value) -> bool) -> VmResult<()> {
        let (a, b) = self.pop_operands()?;
        self.stack.push(from_bool(relation(a, b)))
    }

    fn apply_overflow_policy(
        &self,
        op: &'static str,
        checked: Option<i64>,
        wrapped: i64,
    ) -> VmResult<i64> {
        match (checked, self.config.overflow) {
            (Some(value), _) => Ok(value),
            (None, OverflowPolicy::Wrap) => Ok(wrapped),
            (None, OverflowPolicy::Fault) => Err(VmError::ArithmeticOverflow { op }),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Index of the next instruction (or the one that faulted / halted)
    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn stack(&self) -> &[Value] {
        self.stack.as_slice()
    }

    pub fn peek_top(&self) -> VmResult<Value> {
        self.stack.peek()
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn into_globals(self) -> Globals {
        self.globals
    }

    pub fn instructions_executed(&self) -> u64 {
        self.executed
    }
}

/// Run `program` to completion with fresh state and return the final globals
pub fn run_program<W: Write + ?Sized>(
    program: &Program,
    config: VmConfig,
    out: &mut W,
) -> VmResult<Globals> {
    let mut vm = VirtualMachine::new(config, program);
    vm.run(out)?;
    Ok(vm.into_globals())
}

/// Decode `bytes` (text or binary container) and run the result.
/// Load failures come back as `VmError::Load`.
pub fn load_and_run<W: Write + ?Sized>(
    bytes: &[u8],
    config: VmConfig,
    out: &mut W,
) -> VmResult<Globals> {
    let program = BytecodeLoader::load(bytes)?;
    run_program(&program, config, out)
}
