pub mod changelog;
pub mod changeset;
pub mod config;
pub mod dev_release;
pub mod error;
pub mod forge;
pub mod git;
pub mod payload;
pub mod process;
pub mod remote;
pub mod tags;
pub mod ui;
pub mod workflow;
pub mod workspace;

pub use error::{ReleaseError, Result};
