//! Changelog assembly and rendering.
//!
//! The generator computes the commit range for a release and renders a
//! [ChangelogDocument] through an explicit [ChangelogTemplate]. The default
//! layout is:
//!
//! ```text
//! ## v1.3.0 16.10.2026
//! - [1a2b3c4](../../commit/1a2b3c4d...) fix: login (Ana Lima, 15.10.2026)
//! ```

use crate::domain::{CommitRecord, SemverTag};
use crate::error::{DeployError, Result};
use crate::git::Repository;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset};
use regex::{Captures, Regex};
use std::fmt::Write;
use tracing::debug;

const HEADING_FIELDS: &[&str] = &["tag", "date"];
const ENTRY_FIELDS: &[&str] = &[
    "short_hash",
    "long_hash",
    "subject",
    "author",
    "author_date",
];

/// Immutable layout for changelog documents.
///
/// `heading` may use `{tag}` and `{date}`; `entry` may use `{short_hash}`,
/// `{long_hash}`, `{subject}`, `{author}` and `{author_date}`. Dates are
/// formatted with a chrono strftime string.
#[derive(Debug, Clone)]
pub struct ChangelogTemplate {
    heading: String,
    entry: String,
    date_format: String,
    placeholder: Regex,
}

impl ChangelogTemplate {
    pub const DEFAULT_HEADING: &'static str = "## {tag} {date}";
    pub const DEFAULT_ENTRY: &'static str =
        "- [{short_hash}](../../commit/{long_hash}) {subject} ({author}, {author_date})";
    pub const DEFAULT_DATE_FORMAT: &'static str = "%d.%m.%Y";

    /// Build a template, rejecting unknown placeholders and bad date formats
    pub fn new(heading: &str, entry: &str, date_format: &str) -> Result<Self> {
        let placeholder = Regex::new(r"\{([a-z_]+)\}")
            .map_err(|e| DeployError::config(format!("Invalid placeholder pattern: {}", e)))?;

        check_placeholders(&placeholder, heading, HEADING_FIELDS, "changelog.heading")?;
        check_placeholders(&placeholder, entry, ENTRY_FIELDS, "changelog.entry")?;

        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            return Err(DeployError::config(format!(
                "Invalid changelog.date_format '{}'",
                date_format
            )));
        }

        Ok(ChangelogTemplate {
            heading: heading.to_string(),
            entry: entry.to_string(),
            date_format: date_format.to_string(),
            placeholder,
        })
    }

    /// The built-in `## tag date` layout
    pub fn standard() -> Result<Self> {
        Self::new(
            Self::DEFAULT_HEADING,
            Self::DEFAULT_ENTRY,
            Self::DEFAULT_DATE_FORMAT,
        )
    }

    fn format_date(&self, date: &DateTime<FixedOffset>) -> String {
        let mut out = String::new();
        // the format string was validated in `new`
        let _ = write!(out, "{}", date.format(&self.date_format));
        out
    }

    fn fill(&self, template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
        self.placeholder
            .replace_all(template, |caps: &Captures| {
                lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn check_placeholders(placeholder: &Regex, text: &str, known: &[&str], key: &str) -> Result<()> {
    for caps in placeholder.captures_iter(text) {
        let name = &caps[1];
        if !known.contains(&name) {
            return Err(DeployError::config(format!(
                "Unknown placeholder {{{}}} in {}",
                name, key
            )));
        }
    }
    Ok(())
}

/// Everything a release's notes are rendered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogDocument {
    pub release_tag: SemverTag,
    pub generated_at: DateTime<FixedOffset>,
    /// Newest first
    pub commits: Vec<CommitRecord>,
}

/// Builds changelog documents for a release
#[derive(Debug, Clone)]
pub struct ChangelogGenerator {
    template: ChangelogTemplate,
}

impl ChangelogGenerator {
    pub fn new(template: ChangelogTemplate) -> Self {
        ChangelogGenerator { template }
    }

    /// Commits that `to` adds on top of `from`, newest first.
    ///
    /// Without `from` the full history reachable from `to` is returned.
    pub fn commits_in_range<R: Repository + ?Sized>(
        &self,
        repo: &R,
        from: Option<&SemverTag>,
        to: &str,
    ) -> Result<Vec<CommitRecord>> {
        let from_name = from.map(|tag| tag.to_string());
        debug!(from = ?from_name, to, "collecting commits");
        repo.commits_between(from_name.as_deref(), to)
    }

    pub fn build(
        &self,
        release_tag: SemverTag,
        generated_at: DateTime<FixedOffset>,
        commits: Vec<CommitRecord>,
    ) -> ChangelogDocument {
        ChangelogDocument {
            release_tag,
            generated_at,
            commits,
        }
    }

    /// Render a document to markdown; output depends only on `document`
    pub fn render(&self, document: &ChangelogDocument) -> String {
        let template = &self.template;
        let tag = document.release_tag.to_string();
        let date = template.format_date(&document.generated_at);

        let mut out = template.fill(&template.heading, |field| match field {
            "tag" => Some(tag.clone()),
            "date" => Some(date.clone()),
            _ => None,
        });
        out.push('\n');

        for commit in &document.commits {
            let line = template.fill(&template.entry, |field| match field {
                "short_hash" => Some(commit.short_hash.clone()),
                "long_hash" => Some(commit.long_hash.clone()),
                "subject" => Some(commit.subject.clone()),
                "author" => Some(commit.author_name.clone()),
                "author_date" => Some(template.format_date(&commit.author_date)),
                _ => None,
            });
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}
