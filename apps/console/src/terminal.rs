//! # Terminal
//!
//! Line-oriented input and output for the panels.
//!
//! Panels never touch stdin/stdout directly; they talk to a [`Terminal`] so a
//! whole session can be scripted in tests.

use async_trait::async_trait;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};

use crate::error::ConsoleResult;

#[async_trait]
pub trait Terminal: Send {
    /// Prints `prompt` and reads one line without its newline.
    ///
    /// `None` means end of input.
    async fn read_line(&mut self, prompt: &str) -> ConsoleResult<Option<String>>;

    /// Reads a password.
    async fn read_secret(&mut self, prompt: &str) -> ConsoleResult<Option<String>> {
        self.read_line(prompt).await
    }

    /// Writes `text` followed by a newline.
    async fn print(&mut self, text: &str) -> ConsoleResult<()>;
}

/// Process stdin/stdout.
pub struct StdTerminal {
    input: Lines<BufReader<Stdin>>,
    output: Stdout,
}

impl StdTerminal {
    pub fn new() -> Self {
        StdTerminal {
            input: BufReader::new(io::stdin()).lines(),
            output: io::stdout(),
        }
    }
}

impl Default for StdTerminal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Terminal for StdTerminal {
    async fn read_line(&mut self, prompt: &str) -> ConsoleResult<Option<String>> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;
        Ok(self.input.next_line().await?)
    }

    async fn print(&mut self, text: &str) -> ConsoleResult<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}

// =============================================================================
// Scripted Terminal (tests)
// =============================================================================

#[cfg(test)]
pub(crate) use scripted::ScriptedTerminal;

#[cfg(test)]
mod scripted {
    use super::*;
    use std::collections::VecDeque;

    /// Feeds canned lines and records everything printed.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedTerminal {
        input: VecDeque<String>,
        pub(crate) output: String,
    }

    impl ScriptedTerminal {
        pub(crate) fn new(lines: &[&str]) -> Self {
            ScriptedTerminal {
                input: lines.iter().map(|l| l.to_string()).collect(),
                output: String::new(),
            }
        }

        pub(crate) fn remaining(&self) -> usize {
            self.input.len()
        }
    }

    #[async_trait]
    impl Terminal for ScriptedTerminal {
        async fn read_line(&mut self, prompt: &str) -> ConsoleResult<Option<String>> {
            self.output.push_str(prompt);
            let line = self.input.pop_front();
            if let Some(line) = &line {
                self.output.push_str(line);
            }
            self.output.push('\n');
            Ok(line)
        }

        async fn read_secret(&mut self, prompt: &str) -> ConsoleResult<Option<String>> {
            self.output.push_str(prompt);
            self.output.push('\n');
            Ok(self.input.pop_front())
        }

        async fn print(&mut self, text: &str) -> ConsoleResult<()> {
            self.output.push_str(text);
            self.output.push('\n');
            Ok(())
        }
    }
}
