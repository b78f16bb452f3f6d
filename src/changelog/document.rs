use markdown::mdast::Node;
use markdown::ParseOptions;

use crate::error::{ReleaseError, Result};

/// A top-level block of a changelog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        depth: u8,
        /// Inline text of the heading, without markup
        text: String,
        /// Source text of the heading
        raw: String,
    },
    Other {
        raw: String,
    },
}

impl Block {
    /// Build a heading block, rendering it as an ATX heading.
    pub fn heading(depth: u8, text: impl Into<String>) -> Self {
        let text = text.into();
        Block::Heading {
            depth,
            raw: format!("{} {}", "#".repeat(depth as usize), text),
            text,
        }
    }

    pub fn other(raw: impl Into<String>) -> Self {
        Block::Other { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        match self {
            Block::Heading { raw, .. } | Block::Other { raw } => raw,
        }
    }
}

/// A changelog as an ordered list of top-level blocks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangelogDocument {
    pub blocks: Vec<Block>,
}

impl ChangelogDocument {
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        ChangelogDocument { blocks }
    }

    /// Parses changelog markdown (GFM) into top-level blocks.
    ///
    /// Each block keeps its exact source text so rendering a slice of the
    /// document reproduces the author's formatting.
    pub fn parse(source: &str) -> Result<Self> {
        let root = markdown::to_mdast(source, &ParseOptions::gfm())
            .map_err(|e| ReleaseError::changelog(e.to_string()))?;

        let Some(children) = root.children() else {
            return Ok(ChangelogDocument::default());
        };

        let mut blocks = Vec::with_capacity(children.len());
        for node in children {
            let Some(position) = node.position() else {
                continue;
            };
            let raw = source
                .get(position.start.offset..position.end.offset)
                .unwrap_or_default()
                .trim_end()
                .to_string();

            blocks.push(match node {
                Node::Heading(heading) => {
                    let mut text = String::new();
                    for child in &heading.children {
                        inline_text(child, &mut text);
                    }
                    Block::Heading {
                        depth: heading.depth,
                        text,
                        raw,
                    }
                }
                _ => Block::Other { raw },
            });
        }

        Ok(ChangelogDocument { blocks })
    }

    pub fn has_headings(&self) -> bool {
        self.blocks
            .iter()
            .any(|b| matches!(b, Block::Heading { .. }))
    }
}

/// Renders blocks back to markdown, separated by blank lines.
pub fn render(blocks: &[Block]) -> String {
    let mut out = blocks
        .iter()
        .map(Block::raw)
        .collect::<Vec<_>>()
        .join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn inline_text(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&text.value),
        Node::InlineCode(code) => out.push_str(&code.value),
        Node::InlineMath(math) => out.push_str(&math.value),
        _ => {
            if let Some(children) = node.children() {
                for child in children {
                    inline_text(child, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headings_and_blocks() {
        let source = "# pkg\n\n## 1.2.0\n\n### Minor Changes\n\n- abc123: add `thing`\n- def456: more\n\nSome prose.\n";
        let doc = ChangelogDocument::parse(source).unwrap();

        assert_eq!(doc.blocks.len(), 5);
        assert_eq!(doc.blocks[0], Block::heading(1, "pkg"));
        assert_eq!(doc.blocks[1], Block::heading(2, "1.2.0"));
        assert!(matches!(&doc.blocks[2], Block::Heading { depth: 3, text, .. } if text == "Minor Changes"));
        assert_eq!(
            doc.blocks[3].raw(),
            "- abc123: add `thing`\n- def456: more"
        );
        assert_eq!(doc.blocks[4], Block::other("Some prose."));
    }

    #[test]
    fn test_heading_text_drops_inline_markup() {
        let doc = ChangelogDocument::parse("## [1.0.0](https://example.com) *`beta`*\n").unwrap();
        match &doc.blocks[0] {
            Block::Heading { text, raw, .. } => {
                assert_eq!(text, "1.0.0 beta");
                assert_eq!(raw, "## [1.0.0](https://example.com) *`beta`*");
            }
            other => panic!("expected heading, got {:?}", other),
        }
    }

    #[test]
    fn test_hash_inside_code_block_is_not_a_heading() {
        let doc = ChangelogDocument::parse("```sh\n# not a heading\n```\n").unwrap();
        assert!(!doc.has_headings());
        assert_eq!(doc.blocks.len(), 1);
    }

    #[test]
    fn test_setext_heading() {
        let doc = ChangelogDocument::parse("1.0.0\n=====\n\nbody\n").unwrap();
        assert!(matches!(&doc.blocks[0], Block::Heading { depth: 1, text, .. } if text == "1.0.0"));
    }

    #[test]
    fn test_render_joins_with_blank_lines() {
        let blocks = vec![Block::other("- a"), Block::heading(3, "Patch Changes")];
        assert_eq!(render(&blocks), "- a\n\n### Patch Changes\n");
        assert_eq!(render(&[]), "");
    }
}
