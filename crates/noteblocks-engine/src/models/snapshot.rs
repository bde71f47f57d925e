use serde::{Deserialize, Serialize};

use super::block::{Block, BlockId};

/// One undoable state of a document: its title and ordered blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Snapshot {
    /// Build a snapshot, replacing an empty block list with one empty paragraph.
    pub fn new(title: impl Into<String>, mut blocks: Vec<Block>) -> Self {
        ensure_non_empty(&mut blocks);
        Self {
            title: title.into(),
            blocks,
        }
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        index_of(&self.blocks, id)
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| &block.id == id)
    }
}

/// A document is never empty; an empty list gains a single empty paragraph.
/// Returns whether a block had to be added.
pub fn ensure_non_empty(blocks: &mut Vec<Block>) -> bool {
    if blocks.is_empty() {
        blocks.push(Block::paragraph(""));
        true
    } else {
        false
    }
}

pub fn index_of(blocks: &[Block], id: &BlockId) -> Option<usize> {
    blocks.iter().position(|block| &block.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BlockType;

    #[test]
    fn new_snapshot_is_never_empty() {
        let snapshot = Snapshot::new("Untitled", Vec::new());
        assert_eq!(snapshot.blocks.len(), 1);
        assert_eq!(snapshot.blocks[0].block_type(), BlockType::Paragraph);
        assert_eq!(snapshot.blocks[0].text, "");
    }

    #[test]
    fn clones_do_not_alias() {
        let original = Snapshot::new("T", vec![Block::paragraph("a").with_id("a")]);
        let mut copy = original.clone();
        copy.blocks[0].text.push('!');
        assert_eq!(original.blocks[0].text, "a");
        assert_eq!(copy.index_of(&BlockId::from("a")), Some(0));
    }
}
