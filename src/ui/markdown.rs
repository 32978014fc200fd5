//! Minimal markdown-to-terminal rendering for changelogs.
//!
//! Handles the subset changelogs use: `#` headings, `-`/`*` bullets and
//! `[text](url)` links. Bullet and paragraph text is wrapped to the
//! configured width with a hanging indent.

use console::{measure_text_width, style};
use regex::{Captures, Regex};

use crate::error::{DeployError, Result};

const BULLET_PREFIX: &str = "  • ";
const BULLET_INDENT: &str = "    ";

/// Renders markdown for display in a terminal of a fixed width
#[derive(Debug, Clone)]
pub struct TerminalMarkdown {
    width: usize,
    link: Regex,
}

impl TerminalMarkdown {
    pub fn new(width: usize) -> Result<Self> {
        let link = Regex::new(r"\[([^\]]*)\]\(([^)]*)\)")
            .map_err(|e| DeployError::config(format!("Invalid link pattern: {}", e)))?;
        Ok(TerminalMarkdown { width, link })
    }

    pub fn render(&self, markdown: &str) -> String {
        let mut lines = Vec::new();

        for line in markdown.lines() {
            let trimmed = line.trim_end();

            if trimmed.is_empty() {
                lines.push(String::new());
            } else if let Some(heading) = heading_text(trimmed) {
                let text = self.inline(heading);
                lines.push(style(text).bold().cyan().to_string());
            } else if let Some(item) = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
            {
                let words = self.words(item);
                lines.extend(wrap(&words, BULLET_PREFIX, BULLET_INDENT, self.width));
            } else {
                let words = self.words(trimmed);
                lines.extend(wrap(&words, "", "", self.width));
            }
        }

        lines.join("\n")
    }

    fn inline(&self, text: &str) -> String {
        self.link
            .replace_all(text, |caps: &Captures| {
                style(&caps[1]).yellow().underlined().to_string()
            })
            .into_owned()
    }

    fn words(&self, text: &str) -> Vec<String> {
        self.inline(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

/// Text of an ATX heading (`# x` .. `###### x`)
fn heading_text(line: &str) -> Option<&str> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    line[hashes..].strip_prefix(' ').map(str::trim)
}

/// Greedy word wrap; a word wider than the line is put on its own line.
fn wrap(words: &[String], first_prefix: &str, rest_prefix: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = first_prefix.to_string();
    let mut current_width = measure_text_width(first_prefix);
    let mut has_word = false;

    for word in words {
        let word_width = measure_text_width(word);
        if has_word && current_width + 1 + word_width > width {
            lines.push(std::mem::replace(&mut current, rest_prefix.to_string()));
            current_width = measure_text_width(rest_prefix);
            has_word = false;
        }
        if has_word {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
        has_word = true;
    }

    lines.push(current);
    lines
}
