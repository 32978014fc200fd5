//! Domain logic - pure release rules independent of git operations

pub mod commit;
pub mod version;

pub use commit::CommitRecord;
pub use version::{validate_namespace, BumpKind, SemverTag};
