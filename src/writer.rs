//! Serialization of resolved variables as shell `export` lines.
//!
//! ```text
//! export DATABASE_URL=postgres://localhost/app
//! export GREETING="hello world"
//! export DEBUG=true
//! export PORT=5432
//! export RATIO=0.75
//! ```

use crate::{MoldError, Result};
use envmold_core::{Number, Value, Variable};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// A destination for resolved variables.
pub trait Writer {
    fn write(&mut self, variables: &[&Variable]) -> Result<()>;
}

/// Characters that never need quoting on the right-hand side of an assignment.
const SHELL_SAFE: &[char] = &['_', '-', '.', '/', ':', '@', '%', '+', ',', '=', '^'];

/// Quotes `s` so a POSIX shell reads it back verbatim.
///
/// Plain words stay bare and whitespace-only specials get double quotes.
/// Anything else is single-quoted, with embedded `'` written as `'\''`.
pub(crate) fn shell_quote(s: &str) -> String {
    let plain = |c: char| c.is_alphanumeric() || SHELL_SAFE.contains(&c);
    if s.chars().all(plain) {
        s.to_string()
    } else if s.chars().all(|c| plain(c) || c.is_whitespace()) {
        format!("\"{}\"", s)
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Formats one variable as `export NAME=value`.
///
/// Names are upper-cased and strings are quoted with `shell_quote`. Floats
/// are written with two decimals and absent values leave the right hand
/// side empty.
pub fn export_line(variable: &Variable) -> String {
    let value = match &variable.value {
        Value::Absent => String::new(),
        Value::String(s) => shell_quote(s),
        Value::Boolean(b) => b.to_string(),
        Value::Number(Number::Integer(n)) => n.to_string(),
        Value::Number(Number::Float(n)) => format!("{:.2}", n),
    };
    format!("export {}={}", variable.name.to_uppercase(), value)
}

/// Formats all variables, one line each, with a trailing newline.
pub fn render(variables: &[&Variable]) -> String {
    variables
        .iter()
        .map(|variable| export_line(variable) + "\n")
        .collect()
}

/// Writes the export lines to standard output.
#[derive(Debug, Default)]
pub struct StdoutWriter;

impl Writer for StdoutWriter {
    fn write(&mut self, variables: &[&Variable]) -> Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(render(variables).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

/// Writes the export lines to a file, replacing its contents.
#[derive(Debug, Clone)]
pub struct FileWriter {
    path: PathBuf,
}

impl FileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Writer for FileWriter {
    fn write(&mut self, variables: &[&Variable]) -> Result<()> {
        debug!(path = %self.path.display(), count = variables.len(), "Writing environment file");
        fs::write(&self.path, render(variables))?;
        Ok(())
    }
}

/// Where the environment goes: `stdout` or a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn writer(&self) -> Box<dyn Writer> {
        match self {
            Output::Stdout => Box::new(StdoutWriter),
            Output::File(path) => Box::new(FileWriter::new(path.clone())),
        }
    }
}

impl FromStr for Output {
    type Err = MoldError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(MoldError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Output must be 'stdout' or a file path",
            ))),
            "stdout" => Ok(Output::Stdout),
            path => Ok(Output::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => f.write_str("stdout"),
            Output::File(path) => write!(f, "{}", path.display()),
        }
    }
}
