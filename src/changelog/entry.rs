use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::document::{render, Block, ChangelogDocument};

static BUMP_KEYWORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("major|minor|patch").expect("valid regex"));

/// Severity of a version change, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum BumpLevel {
    /// Only dependency updates, or no level mentioned
    #[default]
    Dependency,
    Patch,
    Minor,
    Major,
}

impl BumpLevel {
    /// The first bump keyword mentioned in `text`, case-insensitively.
    pub fn mentioned_in(text: &str) -> Option<BumpLevel> {
        let lowered = text.to_lowercase();
        BUMP_KEYWORD
            .find(&lowered)
            .map(|m| match m.as_str() {
                "major" => BumpLevel::Major,
                "minor" => BumpLevel::Minor,
                _ => BumpLevel::Patch,
            })
    }
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BumpLevel::Dependency => "dependency",
            BumpLevel::Patch => "patch",
            BumpLevel::Minor => "minor",
            BumpLevel::Major => "major",
        };
        f.write_str(name)
    }
}

/// The section of a changelog describing one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub body: Vec<Block>,
    /// Highest level mentioned by any heading of the whole document
    pub highest_level: BumpLevel,
    /// Whether a section for the version was identified
    pub section_found: bool,
}

impl ChangelogEntry {
    /// The body rendered back to markdown
    pub fn content(&self) -> String {
        render(&self.body)
    }
}

/// Extracts the section for `version` from a changelog.
///
/// The section starts after the first heading whose text equals `version`
/// and runs until the next heading of the same depth; deeper headings belong
/// to the section. Every heading of the document contributes to
/// [`ChangelogEntry::highest_level`], inside the section or not.
///
/// A document without any heading is treated as a single section and
/// returned whole.
pub fn extract(document: &ChangelogDocument, version: &str) -> ChangelogEntry {
    let blocks = &document.blocks;
    let mut highest_level = BumpLevel::Dependency;
    let mut start: Option<(usize, u8)> = None;
    let mut end: Option<usize> = None;

    for (index, block) in blocks.iter().enumerate() {
        let Block::Heading { depth, text, .. } = block else {
            continue;
        };

        if let Some(level) = BumpLevel::mentioned_in(text) {
            highest_level = highest_level.max(level);
        }

        match start {
            None if text == version => start = Some((index, *depth)),
            Some((_, start_depth)) if end.is_none() && start_depth == *depth => end = Some(index),
            _ => {}
        }
    }

    let (body, section_found) = match start {
        Some((index, _)) => {
            let stop = end.unwrap_or(blocks.len());
            (blocks[index + 1..stop].to_vec(), true)
        }
        None if !document.has_headings() => (blocks.clone(), true),
        None => (Vec::new(), false),
    };

    ChangelogEntry {
        body,
        highest_level,
        section_found,
    }
}
