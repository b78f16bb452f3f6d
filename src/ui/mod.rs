//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Confirmation prompts behind the [`Prompter`] trait

use std::io::{self, BufRead, Write};

use crate::error::Result;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_partial_releases, display_release_summary, display_status,
    display_success, display_tool_output, display_warning,
};

/// Asks the operator yes/no questions.
pub trait Prompter {
    /// Asks `question`; an empty answer takes `default`.
    fn confirm(&self, question: &str, default: bool) -> Result<bool>;
}

/// Interprets a typed answer.
///
/// Empty input takes the default; "y" or "yes" (any case) is affirmative and
/// anything else declines.
pub fn parse_answer(input: &str, default: bool) -> bool {
    let response = input.trim().to_lowercase();
    if response.is_empty() {
        return default;
    }
    response == "y" || response == "yes"
}

/// The `(Y/n)` / `(y/N)` hint shown after a question.
pub fn answer_hint(default: bool) -> &'static str {
    if default {
        "(Y/n)"
    } else {
        "(y/N)"
    }
}

/// Prompts on stdout and reads answers from stdin.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        print!("\n{} {} ", question, answer_hint(default));
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(parse_answer(&input, default))
    }
}

/// Answers yes to every question without prompting.
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, question: &str, _default: bool) -> Result<bool> {
        tracing::debug!(question, "assuming yes");
        Ok(true)
    }
}
