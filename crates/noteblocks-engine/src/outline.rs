//! Layout hints derived from the block list: which blocks are hidden under
//! collapsed headings, which headings own content, and list numbering.
//!
//! Everything here is recomputed from the live `collapsed` flags on every
//! call; nothing is cached between edits.

use std::collections::{HashMap, HashSet};

use crate::models::{Block, BlockId, BlockKind, BlockType};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visibility {
    pub hidden: HashSet<BlockId>,
    pub heading_has_children: HashMap<BlockId, bool>,
}

impl Visibility {
    pub fn is_hidden(&self, id: &BlockId) -> bool {
        self.hidden.contains(id)
    }

    pub fn has_children(&self, id: &BlockId) -> bool {
        self.heading_has_children.get(id).copied().unwrap_or(false)
    }
}

struct OpenHeading<'a> {
    id: &'a BlockId,
    level: u8,
    collapsed: bool,
}

/// Walks the blocks with a stack of open headings.
///
/// A heading closes every open heading of the same or a deeper level. A
/// block is hidden when any open heading is collapsed, and every open
/// heading owns the block being visited.
pub fn compute_visibility(blocks: &[Block]) -> Visibility {
    let mut visibility = Visibility::default();
    let mut stack: Vec<OpenHeading<'_>> = Vec::new();

    for block in blocks {
        let heading = match &block.kind {
            BlockKind::Heading { level, collapsed } => Some((level.depth(), *collapsed)),
            _ => None,
        };

        if let Some((level, _)) = heading {
            while stack.last().is_some_and(|open| open.level >= level) {
                stack.pop();
            }
        }

        if stack.iter().any(|open| open.collapsed) {
            visibility.hidden.insert(block.id.clone());
        }
        for open in &stack {
            visibility.heading_has_children.insert(open.id.clone(), true);
        }

        if let Some((level, collapsed)) = heading {
            visibility
                .heading_has_children
                .entry(block.id.clone())
                .or_insert(false);
            stack.push(OpenHeading {
                id: &block.id,
                level,
                collapsed,
            });
        }
    }

    visibility
}

/// Ordinals for `numbered` blocks: consecutive runs count from 1, and any
/// other visible block restarts the count. Hidden blocks are skipped.
pub fn list_numbering(blocks: &[Block], hidden: &HashSet<BlockId>) -> HashMap<BlockId, usize> {
    let mut numbering = HashMap::new();
    let mut counter = 0;
    for block in blocks.iter().filter(|block| !hidden.contains(&block.id)) {
        if block.block_type() == BlockType::Numbered {
            counter += 1;
            numbering.insert(block.id.clone(), counter);
        } else {
            counter = 0;
        }
    }
    numbering
}

/// Everything a presentation layer needs to lay the document out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub visibility: Visibility,
    pub numbering: HashMap<BlockId, usize>,
}

pub fn layout(blocks: &[Block]) -> Layout {
    let visibility = compute_visibility(blocks);
    let numbering = list_numbering(blocks, &visibility.hidden);
    Layout {
        visibility,
        numbering,
    }
}

/// Index of the nearest visible block before `index`.
pub fn previous_visible(blocks: &[Block], hidden: &HashSet<BlockId>, index: usize) -> Option<usize> {
    (0..index.min(blocks.len()))
        .rev()
        .find(|&ix| !hidden.contains(&blocks[ix].id))
}

/// Index of the nearest visible block after `index`.
pub fn next_visible(blocks: &[Block], hidden: &HashSet<BlockId>, index: usize) -> Option<usize> {
    (index + 1..blocks.len()).find(|&ix| !hidden.contains(&blocks[ix].id))
}
