use chrono::{DateTime, FixedOffset};

/// One commit as it appears in a changelog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub short_hash: String,
    pub long_hash: String,
    /// First line of the commit message
    pub subject: String,
    pub author_name: String,
    pub author_date: DateTime<FixedOffset>,
}

impl CommitRecord {
    pub fn new(
        short_hash: impl Into<String>,
        long_hash: impl Into<String>,
        message: &str,
        author_name: impl Into<String>,
        author_date: DateTime<FixedOffset>,
    ) -> Self {
        CommitRecord {
            short_hash: short_hash.into(),
            long_hash: long_hash.into(),
            subject: subject_line(message).to_string(),
            author_name: author_name.into(),
            author_date,
        }
    }
}

/// First line of a commit message, without trailing whitespace
pub fn subject_line(message: &str) -> &str {
    message.lines().next().unwrap_or("").trim_end()
}
