//! Line-oriented prompting used while resolving required variables.

use colored::Colorize;
use std::io::{self, BufRead, Write};

/// A channel for asking a human for values.
///
/// The resolver only needs to show a prompt and read back one line, so tests
/// can drive resolution with in-memory input.
pub trait Prompt {
    /// Shows `text` without a trailing newline and flushes it.
    fn write_prompt(&mut self, text: &str) -> io::Result<()>;

    /// Reads one line without its line terminator.
    ///
    /// Returns `Ok(None)` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Shows an informational line such as `Skipping...`.
    fn notice(&mut self, text: &str) -> io::Result<()> {
        self.write_prompt(&format!("{}\n", text))
    }
}

/// A [`Prompt`] over any buffered reader and writer.
pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
    styled: bool,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            styled: false,
        }
    }

    /// Consumes the prompt, returning the reader and writer.
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompts on the terminal: questions go to stderr, answers come from stdin.
    ///
    /// Stdout is left to the exported environment.
    pub fn stdio() -> Self {
        Self {
            reader: io::stdin().lock(),
            writer: io::stderr(),
            styled: true,
        }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn write_prompt(&mut self, text: &str) -> io::Result<()> {
        if self.styled {
            write!(self.writer, "{}", text.bold())?;
        } else {
            self.writer.write_all(text.as_bytes())?;
        }
        self.writer.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn notice(&mut self, text: &str) -> io::Result<()> {
        if self.styled {
            writeln!(self.writer, "{}", text.yellow())?;
        } else {
            writeln!(self.writer, "{}", text)?;
        }
        self.writer.flush()
    }
}
