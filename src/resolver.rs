//! Latest/next tag resolution with namespace fallback.

use std::cmp::Ordering;

use tracing::debug;

use crate::domain::{BumpKind, SemverTag};
use crate::error::Result;
use crate::git::Repository;

/// How the latest tag was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatestSource {
    /// An existing tag of the requested family
    Found,
    /// The namespace had no release; this is the latest unnamespaced tag
    Fallback { namespace: String },
    /// No usable tag at all; the `0.0.0` baseline
    Baseline,
}

/// Result of [VersionResolver::resolve_latest]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestTag {
    pub tag: SemverTag,
    pub source: LatestSource,
}

impl LatestTag {
    /// Lower bound for the changelog range; `None` when no tag exists yet
    pub fn range_start(&self) -> Option<&SemverTag> {
        match self.source {
            LatestSource::Baseline => None,
            _ => Some(&self.tag),
        }
    }
}

/// Finds the current release of a tag family and computes the next one
pub struct VersionResolver<'a, R: Repository + ?Sized> {
    repo: &'a R,
    prefix: &'a str,
}

impl<'a, R: Repository + ?Sized> VersionResolver<'a, R> {
    pub fn new(repo: &'a R, prefix: &'a str) -> Self {
        VersionResolver { repo, prefix }
    }

    /// All tags that parse as release tags; others are skipped
    fn release_tags(&self) -> Result<Vec<SemverTag>> {
        let names = self.repo.list_tags()?;
        Ok(names
            .iter()
            .filter_map(|name| match SemverTag::parse(name, self.prefix) {
                Ok(tag) => Some(tag),
                Err(e) => {
                    debug!(tag = %name, error = %e, "skipping non-release tag");
                    None
                }
            })
            .collect())
    }

    /// Latest tag of the given family.
    ///
    /// With a namespace, the newest namespaced tag is confirmed by a point
    /// lookup. When the namespace has no release the latest unnamespaced tag
    /// is used instead, and with no tags at all the `0.0.0` baseline.
    pub fn resolve_latest(&self, namespace: Option<&str>) -> Result<LatestTag> {
        let tags = self.release_tags()?;

        if let Some(namespace) = namespace {
            if let Some(candidate) = latest_in_family(&tags, Some(namespace)) {
                let name = candidate.to_string();
                if self.repo.resolve_ref(&name)?.is_some() {
                    debug!(tag = %name, "latest namespaced tag");
                    return Ok(LatestTag {
                        tag: candidate.clone(),
                        source: LatestSource::Found,
                    });
                }
                debug!(tag = %name, "namespaced tag does not resolve");
            }
        }

        let latest = match latest_in_family(&tags, None) {
            Some(tag) => LatestTag {
                tag: tag.clone(),
                source: match namespace {
                    Some(namespace) => LatestSource::Fallback {
                        namespace: namespace.to_string(),
                    },
                    None => LatestSource::Found,
                },
            },
            None => LatestTag {
                tag: SemverTag::zero(self.prefix),
                source: LatestSource::Baseline,
            },
        };

        if let LatestSource::Fallback { namespace } = &latest.source {
            debug!(namespace = %namespace, fallback = %latest.tag, "namespace has no release yet");
        }
        Ok(latest)
    }

    /// Next tag after `latest`, carrying `namespace` as build metadata
    pub fn compute_next(
        &self,
        latest: &SemverTag,
        bump: BumpKind,
        namespace: Option<&str>,
    ) -> SemverTag {
        latest.bump(bump).with_namespace(namespace)
    }
}

fn latest_in_family<'t>(tags: &'t [SemverTag], namespace: Option<&str>) -> Option<&'t SemverTag> {
    tags.iter()
        .filter(|tag| tag.same_family(namespace))
        .max_by(|a, b| match a.cmp_precedence(b) {
            Ordering::Equal => a.to_string().cmp(&b.to_string()),
            other => other,
        })
}
