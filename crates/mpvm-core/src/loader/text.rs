//! Text container format
//!
//! Line-oriented encoding emitted by the MiniPy compiler:
//!
//! ```text
//! <code count>
//! <MNEMONIC> [<arg>]
//! <const count>
//! <integer>
//! <name count>
//! <name>
//! ```

use std::iter::Enumerate;
use std::str::Lines;

use crate::bytecode::{Instruction, Mnemonic, Program};
use crate::error::{LoadError, LoadResult};

struct Records<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> Records<'a> {
    fn new(source: &'a str) -> Self {
        Records {
            lines: source.lines().enumerate(),
        }
    }

    /// Next line with its 1-based number
    fn next(&mut self, section: &'static str) -> LoadResult<(usize, &'a str)> {
        self.lines
            .next()
            .map(|(idx, line)| (idx + 1, line))
            .ok_or(LoadError::Truncated { section })
    }

    fn count(&mut self, section: &'static str) -> LoadResult<usize> {
        let (line, text) = self.next(section)?;
        text.trim().parse().map_err(|_| LoadError::InvalidCount {
            line,
            text: text.to_string(),
        })
    }

    /// Only blank lines may follow the name table
    fn finish(mut self) -> LoadResult<()> {
        match self.lines.find(|(_, line)| !line.trim().is_empty()) {
            Some(_) => Err(LoadError::TrailingData),
            None => Ok(()),
        }
    }
}

pub(crate) fn parse(bytes: &[u8]) -> LoadResult<Program> {
    let source = std::str::from_utf8(bytes).map_err(|_| LoadError::InvalidUtf8)?;
    let mut records = Records::new(source);

    let code_count = records.count("code")?;
    let mut code = Vec::new();
    for _ in 0..code_count {
        let (line, text) = records.next("code")?;
        code.push(parse_instruction(line, text)?);
    }

    let const_count = records.count("consts")?;
    let mut consts = Vec::new();
    for _ in 0..const_count {
        let (line, text) = records.next("consts")?;
        consts.push(parse_integer(line, text.trim())?);
    }

    let name_count = records.count("names")?;
    let mut names = Vec::new();
    for _ in 0..name_count {
        let (_, text) = records.next("names")?;
        names.push(text.to_string());
    }

    records.finish()?;
    Ok(Program::new(code, consts, names))
}

fn parse_instruction(line: usize, text: &str) -> LoadResult<Instruction> {
    let malformed = || LoadError::InvalidInstruction {
        line,
        text: text.to_string(),
    };

    let mut tokens = text.split_whitespace();
    let name = tokens.next().ok_or_else(malformed)?;
    let arg = match tokens.next() {
        Some(token) => parse_integer(line, token)?,
        None => 0,
    };
    if tokens.next().is_some() {
        return Err(malformed());
    }

    Ok(Instruction {
        mnemonic: Mnemonic::parse(name),
        arg,
    })
}

fn parse_integer(line: usize, text: &str) -> LoadResult<i64> {
    text.parse().map_err(|_| LoadError::InvalidInteger {
        line,
        text: text.to_string(),
    })
}
