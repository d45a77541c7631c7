//! Continue/abort decision taken after a row fails in interactive mode.

use std::io::{self, BufRead, Stderr, StdinLock, Write};

use crate::models::RowFailure;

/// Outcome of a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Write the row with an empty result and go on.
    Continue,
    /// Stop the run; rows already written are kept.
    Abort,
}

/// Synchronous decision point consulted once per failing row.
pub trait Checkpoint {
    fn confirm_continue(&mut self, failure: &RowFailure) -> Decision;
}

impl<C: Checkpoint + ?Sized> Checkpoint for &mut C {
    fn confirm_continue(&mut self, failure: &RowFailure) -> Decision {
        (**self).confirm_continue(failure)
    }
}

impl<C: Checkpoint + ?Sized> Checkpoint for Box<C> {
    fn confirm_continue(&mut self, failure: &RowFailure) -> Decision {
        (**self).confirm_continue(failure)
    }
}

/// Never stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysContinue;

impl Checkpoint for AlwaysContinue {
    fn confirm_continue(&mut self, _failure: &RowFailure) -> Decision {
        Decision::Continue
    }
}

/// Stops at the first failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysAbort;

impl Checkpoint for AlwaysAbort {
    fn confirm_continue(&mut self, _failure: &RowFailure) -> Decision {
        Decision::Abort
    }
}

/// Asks the operator with a `[y/N]` prompt.
///
/// Reads exactly one line per question. End of input or a read error
/// counts as "no".
pub struct ConsolePrompt<R, W> {
    input: R,
    prompt: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, prompt: W) -> Self {
        Self { input, prompt }
    }
}

impl ConsolePrompt<StdinLock<'static>, Stderr> {
    /// Prompt on stderr, answer on stdin.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Checkpoint for ConsolePrompt<R, W> {
    fn confirm_continue(&mut self, failure: &RowFailure) -> Decision {
        // a prompt that cannot be shown still gets an answer read
        let _ = write!(
            self.prompt,
            "line {}: continue with an empty transliteration? [y/N] ",
            failure.line
        );
        let _ = self.prompt.flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => Decision::Abort,
            Ok(_) if is_affirmative(&answer) => Decision::Continue,
            Ok(_) => Decision::Abort,
        }
    }
}

/// `y` or `yes`, any case, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
