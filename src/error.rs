use thiserror::Error;

/// Unified error type for git-deploy operations
#[derive(Error, Debug)]
pub enum DeployError {
    /// A release precondition does not hold (dirty tree, wrong branch)
    #[error("{0}")]
    Precondition(String),

    #[error("Version has to be oneOf: patch, minor or major")]
    InvalidBump(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    /// An external command ran but exited unsuccessfully
    #[error("Command `{program} {args}` failed with exit code {code}: {stderr}")]
    Command {
        program: String,
        args: String,
        code: i32,
        stderr: String,
    },

    #[error("Release publishing failed: {0}")]
    Publish(String),

    /// The tag reached the remote but the release record was not created
    #[error("Tag '{tag}' was pushed but publishing the release failed: {source}")]
    PartialRelease {
        tag: String,
        #[source]
        source: Box<DeployError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-deploy
pub type Result<T> = std::result::Result<T, DeployError>;

impl DeployError {
    /// Create a precondition error with context
    pub fn precondition(msg: impl Into<String>) -> Self {
        DeployError::Precondition(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        DeployError::Version(msg.into())
    }

    /// Create a publish error with context
    pub fn publish(msg: impl Into<String>) -> Self {
        DeployError::Publish(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        DeployError::Config(msg.into())
    }

    /// Create a prompt error with context
    pub fn prompt(msg: impl Into<String>) -> Self {
        DeployError::Prompt(msg.into())
    }

    /// True for errors raised before any repository state was touched.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DeployError::Precondition(_) | DeployError::InvalidBump(_)
        )
    }
}
