use std::path::PathBuf;

use clap::Parser;
use mpvm_core::{OverflowPolicy, VmConfig};
use mpvm_core::config::DEFAULT_MAX_STACK_SIZE;

/// Run a MiniPy bytecode file
#[derive(Parser, Debug, Clone)]
#[command(name = "mpvm", version, about, long_about = None)]
pub struct Config {
    /// Bytecode file (text or binary container)
    pub file: PathBuf,

    /// Print a listing of the loaded program instead of running it
    #[clap(short, long)]
    pub disassemble: bool,

    /// Re-encode the loaded program in the binary format and exit
    #[clap(long, value_name = "OUT", conflicts_with = "disassemble")]
    pub emit_binary: Option<PathBuf>,

    /// Operand stack depth limit
    #[clap(long, default_value_t = DEFAULT_MAX_STACK_SIZE)]
    pub max_stack: usize,

    /// Wrap on integer overflow instead of faulting
    #[clap(short, long)]
    pub wrapping: bool,

    /// Log loader and interpreter activity to stderr
    #[clap(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn vm_config(&self) -> VmConfig {
        let overflow = if self.wrapping {
            OverflowPolicy::Wrap
        } else {
            OverflowPolicy::Fault
        };
        VmConfig::new()
            .with_max_stack_size(self.max_stack)
            .with_overflow(overflow)
    }
}

impl TryFrom<Vec<&str>> for Config {
    type Error = String;
    fn try_from(args: Vec<&str>) -> Result<Self, Self::Error> {
        Config::try_parse_from(args).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_core_config() {
        let config = Config::try_from(vec!["mpvm", "prog.mpbc"]).unwrap();
        let vm = config.vm_config();
        assert_eq!(vm.max_stack_size, 10_000);
        assert_eq!(vm.overflow, OverflowPolicy::Fault);
        assert!(!config.disassemble);
    }

    #[test]
    fn flags_override_limits() {
        let config = Config::try_from(vec!["mpvm", "--max-stack", "8", "--wrapping", "p"]).unwrap();
        let vm = config.vm_config();
        assert_eq!(vm.max_stack_size, 8);
        assert_eq!(vm.overflow, OverflowPolicy::Wrap);
    }

    #[test]
    fn file_argument_is_required() {
        assert!(Config::try_from(vec!["mpvm"]).is_err());
    }
}
