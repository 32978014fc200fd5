pub mod boundary;
pub mod changelog;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod preflight;
pub mod process;
pub mod publish;
pub mod release;
pub mod resolver;
pub mod ui;

pub use error::{DeployError, Result};
