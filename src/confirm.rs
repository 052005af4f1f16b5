//! Operator confirmation for destructive commands.
//!
//! Force-release can destroy another process's lock, so the command asks
//! for an exact confirmation word first. The check is a trait so commands can
//! be exercised without a terminal.

use crate::error::{Error, Result};
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

/// Word the operator must type to confirm a force-release.
pub const CONFIRMATION_WORD: &str = "yes";

/// Source of an explicit go-ahead for a destructive action.
pub trait Confirm {
    /// Ask `question`; return `true` only on explicit confirmation.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Non-interactive override (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Prompt on a writer and read one line of answer from a reader.
///
/// Only the exact confirmation word (surrounding whitespace ignored) counts;
/// anything else, including end of input, declines.
#[derive(Debug)]
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptConfirm<BufReader<Stdin>, Stdout> {
    /// Prompt on stdout and read the answer from stdin.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(
            self.output,
            "{} (type '{}' to confirm): ",
            question, CONFIRMATION_WORD
        )
        .and_then(|_| self.output.flush())
        .map_err(|e| Error::Prompt(e.to_string()))?;

        let mut answer = String::new();
        self.input
            .read_line(&mut answer)
            .map_err(|e| Error::Prompt(e.to_string()))?;

        Ok(answer.trim() == CONFIRMATION_WORD)
    }
}
