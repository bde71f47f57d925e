use crate::codec::text_to_blocks;
use crate::links::clamp_offset;
use crate::models::{Block, BlockId, BlockType, FocusTarget};

use super::controller::EditController;
use super::events::KeyOutcome;

impl EditController {
    /// Paste multi-line markdown into a block, splitting it at the caret.
    ///
    /// Text before the caret stays in the original block; the parsed blocks
    /// follow with fresh ids, then the text after the caret as a block of
    /// the original type. At caret 0 the first parsed block takes over the
    /// original block's id instead. Anything that parses to a single block
    /// is left to the default paste.
    pub fn handle_paste(&mut self, block_id: &BlockId, pasted: &str, caret: usize) -> KeyOutcome {
        let Some(index) = self.doc.index_of(block_id) else {
            return KeyOutcome::Default;
        };
        let original = &self.doc.blocks[index];
        if !original.is_textual() || original.block_type() == BlockType::Code {
            return KeyOutcome::Default;
        }
        if !pasted.contains('\n') {
            return KeyOutcome::Default;
        }
        let mut parsed = text_to_blocks(pasted);
        if parsed.len() <= 1 {
            return KeyOutcome::Default;
        }

        let caret = clamp_offset(&original.text, caret);
        let before = original.text[..caret].to_string();
        let after = original.text[caret..].to_string();
        let original_type = original.block_type();

        let trailing = (!after.is_empty()).then(|| Block::of_type(original_type, after));
        let trailing_id = trailing.as_ref().map(|block| block.id.clone());

        let splice_at = if caret == 0 {
            parsed[0].id = block_id.clone();
            self.doc.blocks.remove(index);
            index
        } else {
            self.doc.blocks[index].text = before;
            index + 1
        };
        let last_inserted = parsed.last().map(|block| block.id.clone());

        let mut tail = self.doc.blocks.split_off(splice_at);
        self.doc.blocks.extend(parsed);
        self.doc.blocks.extend(trailing);
        self.doc.blocks.append(&mut tail);
        self.close_popover();
        self.commit_structural();

        let focus = match (trailing_id, last_inserted) {
            (Some(id), _) => FocusTarget::start(id),
            (None, Some(id)) => FocusTarget::end(id),
            (None, None) => FocusTarget::end(block_id.clone()),
        };
        self.focus(focus);
        KeyOutcome::Handled
    }
}
