use crate::models::{Block, BlockId, index_of};

/// Modifier keys held during a block click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    pub shift: bool,
    /// Ctrl on most platforms, Cmd on macOS.
    pub toggle: bool,
}

/// Multi-block selection: a set of block ids kept in document order, plus
/// the anchor that shift-clicks and range drags extend from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockSelection {
    ids: Vec<BlockId>,
    anchor: Option<BlockId>,
    range_active: bool,
}

impl BlockSelection {
    pub fn ids(&self) -> &[BlockId] {
        &self.ids
    }

    pub fn anchor(&self) -> Option<&BlockId> {
        self.anchor.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.ids.contains(id)
    }

    pub fn is_range_active(&self) -> bool {
        self.range_active
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.anchor = None;
        self.range_active = false;
    }

    pub fn select_one(&mut self, id: BlockId) {
        self.ids = vec![id.clone()];
        self.anchor = Some(id);
    }

    pub fn select_all(&mut self, blocks: &[Block]) {
        self.ids = blocks.iter().map(|block| block.id.clone()).collect();
        self.anchor = blocks.first().map(|block| block.id.clone());
    }

    pub fn click(&mut self, blocks: &[Block], id: BlockId, modifiers: ClickModifiers) {
        if modifiers.shift && self.anchor.is_some() {
            self.select_to(blocks, &id);
        } else if modifiers.toggle {
            self.toggle(blocks, id);
        } else {
            self.select_one(id);
        }
    }

    /// Flip membership of `id`, keeping the set in document order, and move
    /// the anchor to it.
    pub fn toggle(&mut self, blocks: &[Block], id: BlockId) {
        if let Some(pos) = self.ids.iter().position(|selected| selected == &id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id.clone());
            self.sort_by_document(blocks);
        }
        self.anchor = Some(id);
    }

    /// Select the contiguous run between the anchor and `to`.
    pub fn select_to(&mut self, blocks: &[Block], to: &BlockId) {
        let Some(anchor) = self.anchor.clone() else {
            self.select_one(to.clone());
            return;
        };
        let (Some(a), Some(b)) = (index_of(blocks, &anchor), index_of(blocks, to)) else {
            return;
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.ids = blocks[lo..=hi].iter().map(|block| block.id.clone()).collect();
    }

    pub fn begin_range(&mut self, id: BlockId) {
        self.select_one(id);
        self.range_active = true;
    }

    pub fn extend_range(&mut self, blocks: &[Block], hover: &BlockId) {
        if self.range_active {
            self.select_to(blocks, hover);
        }
    }

    pub fn end_range(&mut self) {
        self.range_active = false;
    }

    /// Drop ids that no longer exist in `blocks`.
    pub fn prune(&mut self, blocks: &[Block]) {
        self.ids.retain(|id| index_of(blocks, id).is_some());
        if let Some(anchor) = &self.anchor
            && index_of(blocks, anchor).is_none()
        {
            self.anchor = None;
        }
        self.sort_by_document(blocks);
    }

    fn sort_by_document(&mut self, blocks: &[Block]) {
        self.ids
            .sort_by_key(|id| index_of(blocks, id).unwrap_or(usize::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blocks() -> Vec<Block> {
        ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(|id| Block::paragraph(id).with_id(id))
            .collect()
    }

    fn ids(selection: &BlockSelection) -> Vec<&str> {
        selection.ids().iter().map(BlockId::as_str).collect()
    }

    const SHIFT: ClickModifiers = ClickModifiers {
        shift: true,
        toggle: false,
    };
    const TOGGLE: ClickModifiers = ClickModifiers {
        shift: false,
        toggle: true,
    };

    #[test]
    fn shift_click_selects_contiguous_range_both_directions() {
        let blocks = blocks();
        let mut selection = BlockSelection::default();
        selection.click(&blocks, "c".into(), ClickModifiers::default());
        selection.click(&blocks, "e".into(), SHIFT);
        assert_eq!(ids(&selection), vec!["c", "d", "e"]);

        selection.click(&blocks, "a".into(), SHIFT);
        assert_eq!(ids(&selection), vec!["a", "b", "c"]);
        assert_eq!(selection.anchor().map(BlockId::as_str), Some("c"));
    }

    #[test]
    fn toggle_keeps_document_order_and_moves_anchor() {
        let blocks = blocks();
        let mut selection = BlockSelection::default();
        selection.click(&blocks, "d".into(), TOGGLE);
        selection.click(&blocks, "b".into(), TOGGLE);
        assert_eq!(ids(&selection), vec!["b", "d"]);
        assert_eq!(selection.anchor().map(BlockId::as_str), Some("b"));

        selection.click(&blocks, "d".into(), TOGGLE);
        assert_eq!(ids(&selection), vec!["b"]);
    }

    #[test]
    fn range_gesture_recomputes_from_anchor() {
        let blocks = blocks();
        let mut selection = BlockSelection::default();
        selection.begin_range("b".into());
        selection.extend_range(&blocks, &"d".into());
        assert_eq!(ids(&selection), vec!["b", "c", "d"]);
        selection.extend_range(&blocks, &"c".into());
        assert_eq!(ids(&selection), vec!["b", "c"]);
        selection.end_range();
        selection.extend_range(&blocks, &"e".into());
        assert_eq!(ids(&selection), vec!["b", "c"]);
    }

    #[test]
    fn prune_drops_missing_blocks() {
        let mut blocks = blocks();
        let mut selection = BlockSelection::default();
        selection.select_all(&blocks);
        blocks.retain(|block| block.id.as_str() != "a" && block.id.as_str() != "c");
        selection.prune(&blocks);
        assert_eq!(ids(&selection), vec!["b", "d", "e"]);
        assert_eq!(selection.anchor(), None);
    }
}
