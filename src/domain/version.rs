use crate::error::{DeployError, Result};
use semver::{BuildMetadata, Prerelease};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A release tag: semantic version plus optional service namespace.
///
/// The namespace travels as semver build metadata, so `v1.4.0+billing` is
/// version `1.4.0` of the `billing` family. Tags of different families are
/// never compared against each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemverTag {
    pub prefix: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Option<Prerelease>,
    pub namespace: Option<String>,
}

impl SemverTag {
    pub fn new(prefix: impl Into<String>, major: u64, minor: u64, patch: u64) -> Self {
        SemverTag {
            prefix: prefix.into(),
            major,
            minor,
            patch,
            pre: None,
            namespace: None,
        }
    }

    /// The `0.0.0` baseline used before a repository's first release
    pub fn zero(prefix: impl Into<String>) -> Self {
        SemverTag::new(prefix, 0, 0, 0)
    }

    /// Attach a namespace as build metadata
    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.map(str::to_string);
        self
    }

    /// Parse a tag name such as `v1.2.3`, `v1.2.3-rc.1` or `v1.2.3+svc`.
    ///
    /// The name must start with `prefix`; the remainder must be strict semver.
    pub fn parse(name: &str, prefix: &str) -> Result<Self> {
        let rest = name.strip_prefix(prefix).ok_or_else(|| {
            DeployError::version(format!(
                "Tag '{}' does not start with prefix '{}'",
                name, prefix
            ))
        })?;

        let version = semver::Version::parse(rest).map_err(|e| {
            DeployError::version(format!("Invalid version in tag '{}': {}", name, e))
        })?;

        Ok(SemverTag {
            prefix: prefix.to_string(),
            major: version.major,
            minor: version.minor,
            patch: version.patch,
            pre: (!version.pre.is_empty()).then_some(version.pre),
            namespace: (!version.build.is_empty()).then(|| version.build.to_string()),
        })
    }

    /// True when both tags belong to the same namespace family
    pub fn same_family(&self, namespace: Option<&str>) -> bool {
        self.namespace.as_deref() == namespace
    }

    /// Semver precedence, ignoring the namespace
    pub fn cmp_precedence(&self, other: &SemverTag) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }

    /// Apply a bump; lower components reset to zero and the pre-release is dropped.
    ///
    /// A pre-release that already sits at the bumped position is finalized
    /// instead: patch on `1.2.3-rc.1` gives `1.2.3`, major on `2.0.0-rc.1`
    /// gives `2.0.0`.
    pub fn bump(&self, kind: BumpKind) -> Self {
        let pre = self.pre.is_some();
        let (major, minor, patch) = match kind {
            BumpKind::Major if pre && self.minor == 0 && self.patch == 0 => (self.major, 0, 0),
            BumpKind::Major => (self.major + 1, 0, 0),
            BumpKind::Minor if pre && self.patch == 0 => (self.major, self.minor, 0),
            BumpKind::Minor => (self.major, self.minor + 1, 0),
            BumpKind::Patch if pre => (self.major, self.minor, self.patch),
            BumpKind::Patch => (self.major, self.minor, self.patch + 1),
        };

        SemverTag {
            prefix: self.prefix.clone(),
            major,
            minor,
            patch,
            pre: None,
            namespace: self.namespace.clone(),
        }
    }
}

impl fmt::Display for SemverTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}.{}.{}",
            self.prefix, self.major, self.minor, self.patch
        )?;
        if let Some(pre) = &self.pre {
            write!(f, "-{}", pre)?;
        }
        if let Some(namespace) = &self.namespace {
            write!(f, "+{}", namespace)?;
        }
        Ok(())
    }
}

/// Checks that a namespace can be carried as semver build metadata.
pub fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(DeployError::version("Namespace must not be empty"));
    }
    BuildMetadata::new(namespace).map(|_| ()).map_err(|e| {
        DeployError::version(format!("Invalid namespace '{}': {}", namespace, e))
    })
}

/// Which semver component a release increments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
}

impl FromStr for BumpKind {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "patch" => Ok(BumpKind::Patch),
            "minor" => Ok(BumpKind::Minor),
            "major" => Ok(BumpKind::Major),
            other => Err(DeployError::InvalidBump(other.to_string())),
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BumpKind::Patch => "patch",
            BumpKind::Minor => "minor",
            BumpKind::Major => "major",
        };
        f.write_str(name)
    }
}
