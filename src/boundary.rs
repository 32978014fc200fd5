use std::fmt;

/// Non-fatal conditions met while preparing a release.
/// These are reported to the user but never abort the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// No tag exists yet, the release starts from the 0.0.0 baseline
    FirstRelease { next_tag: String },
    /// The namespace has no release yet, the latest generic tag is used instead
    NamespaceFallback {
        namespace: String,
        fallback_tag: String,
    },
    /// Nothing was committed since the latest tag
    NoNewCommits { latest_tag: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::FirstRelease { next_tag } => {
                write!(
                    f,
                    "No release tags found, {} will be the first release",
                    next_tag
                )
            }
            BoundaryWarning::NamespaceFallback {
                namespace,
                fallback_tag,
            } => {
                write!(
                    f,
                    "No release found for '{}', continuing from '{}'",
                    namespace, fallback_tag
                )
            }
            BoundaryWarning::NoNewCommits { latest_tag } => {
                write!(f, "No new commits since tag '{}'", latest_tag)
            }
        }
    }
}
