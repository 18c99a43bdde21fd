//! Confirmation gate for apply/destroy.

use crate::error::Result;
use crate::report::Reporter;
use std::io::BufRead;

/// Source of operator answers.
pub trait Confirm {
    /// Show `question` and return true only for an affirmative answer.
    fn confirm(&mut self, reporter: &Reporter, question: &str) -> Result<bool>;
}

/// Only the literal word `yes`, in any case, counts as consent. The line
/// terminator is the only thing stripped.
pub fn is_affirmative(answer: &str) -> bool {
    let line = answer.strip_suffix('\n').unwrap_or(answer);
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.eq_ignore_ascii_case("yes")
}

/// Reads one line per question from any buffered reader (stdin in the CLI).
pub struct LineConfirm<R> {
    input: R,
}

impl<R: BufRead> LineConfirm<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl LineConfirm<std::io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(std::io::stdin().lock())
    }
}

impl<R: BufRead> Confirm for LineConfirm<R> {
    fn confirm(&mut self, reporter: &Reporter, question: &str) -> Result<bool> {
        reporter.prompt(&format!("\n{question} (yes/no): "));
        let mut answer = String::new();
        let read = self.input.read_line(&mut answer)?;
        if read == 0 {
            // EOF: nobody is there to say yes.
            reporter.line("");
            return Ok(false);
        }
        Ok(is_affirmative(&answer))
    }
}
