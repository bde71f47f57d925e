use crate::models::{Block, BlockKind, ChecklistMeta};

use super::classify::{LineClass, classify, closes_fence};

#[derive(Debug)]
enum LeafState {
    None,
    Paragraph { words: Vec<String> },
    Fence { language: Option<String>, lines: Vec<String> },
}

/// Accumulates classified lines into blocks.
///
/// Paragraph lines and code fence bodies span several lines; every other
/// line class produces exactly one block.
pub struct BlockBuilder {
    leaf: LeafState,
    out: Vec<Block>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self {
            leaf: LeafState::None,
            out: vec![],
        }
    }

    pub fn push(&mut self, line: &str) {
        if self.in_fence() {
            self.consume_fence_line(line);
            return;
        }

        match classify(line) {
            LineClass::Blank => self.flush_paragraph(),
            LineClass::Text { text } => self.extend_paragraph(&text),
            LineClass::Fence { language } => {
                self.flush_paragraph();
                self.leaf = LeafState::Fence {
                    language,
                    lines: vec![],
                };
            }
            other => {
                self.flush_paragraph();
                self.out.push(leaf_block(other));
            }
        }
    }

    pub fn finish(mut self) -> Vec<Block> {
        // EOF flush
        self.flush_paragraph();
        self.flush_fence();
        self.out
    }

    fn in_fence(&self) -> bool {
        matches!(self.leaf, LeafState::Fence { .. })
    }

    fn consume_fence_line(&mut self, line: &str) {
        if closes_fence(line) {
            self.flush_fence();
            return;
        }
        if let LeafState::Fence { lines, .. } = &mut self.leaf {
            lines.push(line.to_string());
        }
    }

    fn extend_paragraph(&mut self, text: &str) {
        let words = text.split_whitespace().map(str::to_string);
        match &mut self.leaf {
            LeafState::Paragraph { words: buffer } => buffer.extend(words),
            _ => {
                self.leaf = LeafState::Paragraph {
                    words: words.collect(),
                }
            }
        }
    }

    fn flush_paragraph(&mut self) {
        if !matches!(self.leaf, LeafState::Paragraph { .. }) {
            return;
        }
        if let LeafState::Paragraph { words } = std::mem::replace(&mut self.leaf, LeafState::None)
            && !words.is_empty()
        {
            self.out.push(Block::paragraph(words.join(" ")));
        }
    }

    fn flush_fence(&mut self) {
        if !self.in_fence() {
            return;
        }
        if let LeafState::Fence { language, lines } =
            std::mem::replace(&mut self.leaf, LeafState::None)
        {
            self.out.push(Block::code(language, lines.join("\n")));
        }
    }
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn leaf_block(class: LineClass) -> Block {
    match class {
        LineClass::Divider => Block::divider(),
        LineClass::Heading { level, text } => Block::heading(level, text),
        LineClass::Checklist { checked, text } => {
            Block::new(BlockKind::Checklist(ChecklistMeta::new(checked)), text)
        }
        LineClass::Bullet { text } => Block::new(BlockKind::Bullet, text),
        LineClass::Numbered { text } => Block::new(BlockKind::Numbered, text),
        LineClass::Callout { text } => Block::new(BlockKind::Callout, text),
        LineClass::Text { text } => Block::paragraph(text),
        LineClass::Blank | LineClass::Fence { .. } => Block::paragraph(""),
    }
}
