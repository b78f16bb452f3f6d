//! Changelog parsing and per-version section extraction

pub mod document;
pub mod entry;

pub use document::{render, Block, ChangelogDocument};
pub use entry::{extract, BumpLevel, ChangelogEntry};
