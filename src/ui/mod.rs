//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - `markdown` - Terminal rendering of changelog markdown
//! - This module - Interactive prompts and user input handling

use std::cell::RefCell;
use std::collections::VecDeque;

use console::Term;

use crate::error::{DeployError, Result};

pub mod formatter;
pub mod markdown;

// Re-export formatter functions for convenience
pub use formatter::{
    display_boundary_warning, display_changelog,
    display_manual_release_instruction, display_proposed_tag, display_status, display_success,
};
pub use markdown::TerminalMarkdown;

/// Yes/no confirmation capability
pub trait Confirm {
    /// Ask `prompt`; an empty answer selects `default`
    fn ask(&self, prompt: &str, default: bool) -> Result<bool>;
}

impl<T: Confirm + ?Sized> Confirm for &T {
    fn ask(&self, prompt: &str, default: bool) -> Result<bool> {
        (**self).ask(prompt, default)
    }
}

/// Interpret a typed answer.
///
/// Accepts "y"/"yes" and "n"/"no" (case-insensitive); empty input yields the
/// default and anything else is `None` so the caller can ask again.
pub fn parse_answer(input: &str, default: bool) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompts on stderr so piping stdout (`deploy | tee`) keeps the prompt usable
pub struct TerminalConfirm {
    term: Term,
}

impl TerminalConfirm {
    pub fn new() -> Self {
        TerminalConfirm {
            term: Term::stderr(),
        }
    }
}

impl Default for TerminalConfirm {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirm for TerminalConfirm {
    fn ask(&self, prompt: &str, default: bool) -> Result<bool> {
        if !self.term.is_term() {
            return Err(DeployError::prompt(
                "Confirmation requires an interactive terminal",
            ));
        }

        let hint = if default { "(Y/n)" } else { "(y/N)" };
        loop {
            self.term.write_str(&format!("\n{} {}: ", prompt, hint))?;
            let input = self.term.read_line()?;
            match parse_answer(&input, default) {
                Some(answer) => return Ok(answer),
                None => self.term.write_line("Please answer 'y' or 'n'.")?,
            }
        }
    }
}

/// Replays canned answers and remembers every prompt, for tests
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: RefCell<VecDeque<bool>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        ScriptedConfirm {
            answers: RefCell::new(answers.into_iter().collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn ask(&self, prompt: &str, _default: bool) -> Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| DeployError::prompt(format!("No scripted answer for '{}'", prompt)))
    }
}
