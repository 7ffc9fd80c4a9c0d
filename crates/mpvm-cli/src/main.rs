//! MiniPy Virtual Machine - CLI
//!
//! Minimal command-line interface to execute MiniPy bytecode.

mod config;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use mpvm_core::{BytecodeLoader, BytecodeWriter, Program, VirtualMachine};

use config::Config;

fn main() {
    let config = Config::parse();
    init_logging(config.verbose);

    // Load bytecode
    debug!(path = %config.file.display(), "loading bytecode");
    let program = match BytecodeLoader::load_file(&config.file) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error: failed to load bytecode: {}", e);
            process::exit(1);
        }
    };

    if config.disassemble {
        print!("{}", program.disassemble());
        return;
    }

    if let Some(out_path) = &config.emit_binary {
        if let Err(e) = emit_binary(&program, out_path) {
            eprintln!("Error: failed to write {}: {}", out_path.display(), e);
            process::exit(1);
        }
        return;
    }

    // Execute
    let mut vm = VirtualMachine::new(config.vm_config(), &program);
    let result = vm.execute();
    debug!(state = ?vm.state(), executed = vm.instructions_executed(), "run finished");
    if let Err(e) = result {
        eprintln!("Runtime error at instruction {}: {}", vm.ip(), e);
        process::exit(1);
    }
}

fn emit_binary(program: &Program, path: &std::path::Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    BytecodeWriter::write_binary(program, &mut out)?;
    out.flush()
}

/// Logs go to stderr so program output on stdout stays clean.
/// `MPVM_LOG` overrides the level picked from `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_env("MPVM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
