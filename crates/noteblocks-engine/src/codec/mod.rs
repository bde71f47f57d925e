//! # Markdown Codec
//!
//! Converts plain/markdown text into an ordered block sequence and back.
//!
//! Parsing runs in two phases, like a line-oriented markdown block parser:
//!
//! - **`classify`**: each physical line is classified on local facts alone
//!   (fence, blank, divider, heading, checklist, bullet, numbered, callout,
//!   plain text).
//! - **`builder`**: a small state machine folds classified lines into
//!   blocks. Fenced code suppresses every other rule until its closing
//!   fence; contiguous plain lines merge into one whitespace-normalized
//!   paragraph.
//!
//! The round trip is lossy by design: checklist metadata other than the
//! checkbox, heading collapse state and blank-line layout are not carried in
//! text.

pub mod builder;
pub mod classify;

use crate::models::{Block, BlockKind, HeadingLevel};

pub use builder::BlockBuilder;

/// Parse markdown-ish text into blocks. Empty input yields no blocks.
pub fn text_to_blocks(input: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::new();
    for line in input.split('\n') {
        builder.push(line.strip_suffix('\r').unwrap_or(line));
    }
    builder.finish()
}

/// Render blocks as markdown, separated by blank lines.
pub fn blocks_to_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(block_to_text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render one block's markdown form. Numbered items always render as `1.`;
/// numbering is a presentation concern.
pub fn block_to_text(block: &Block) -> String {
    let text = block.text.as_str();
    match &block.kind {
        BlockKind::Paragraph => text.to_string(),
        BlockKind::Heading { level, .. } => {
            let hashes = match level {
                HeadingLevel::H1 => "#",
                HeadingLevel::H2 => "##",
                HeadingLevel::H3 => "###",
            };
            format!("{hashes} {text}")
        }
        BlockKind::Bullet => format!("- {text}"),
        BlockKind::Numbered => format!("1. {text}"),
        BlockKind::Checklist(meta) => {
            let mark = if meta.checked { 'x' } else { ' ' };
            format!("- [{mark}] {text}")
        }
        BlockKind::Callout => format!("> {text}"),
        BlockKind::Code { language } => {
            format!("```{}\n{text}\n```", language.as_deref().unwrap_or(""))
        }
        BlockKind::Divider => "---".to_string(),
    }
}
