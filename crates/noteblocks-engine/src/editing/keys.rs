use chrono::Utc;

use crate::links::clamp_offset;
use crate::models::{Block, BlockId, BlockKind, BlockType, ChecklistMeta, FocusTarget};
use crate::outline::{compute_visibility, next_visible, previous_visible};

use super::controller::EditController;
use super::events::{Key, KeyOutcome};
use super::interaction::{Interaction, cycle};

impl EditController {
    /// Route a key press in `block_id` with the caret at byte `caret`.
    ///
    /// Open popovers take navigation keys first, then a non-empty block
    /// selection takes the deleting keys, then the per-key block rules run.
    pub fn handle_key(&mut self, block_id: &BlockId, key: Key, caret: usize) -> KeyOutcome {
        if let Some(outcome) = self.popover_key(key) {
            return outcome;
        }

        if matches!(key, Key::Escape | Key::Backspace | Key::Delete) && self.delete_selected() {
            return KeyOutcome::Handled;
        }

        let Some(index) = self.doc.index_of(block_id) else {
            return KeyOutcome::Default;
        };
        let caret = clamp_offset(&self.doc.blocks[index].text, caret);

        match key {
            Key::Enter => self.enter(index, caret),
            Key::Backspace => self.backspace(index, caret),
            Key::ArrowUp => self.arrow(index, caret, true),
            Key::ArrowDown => self.arrow(index, caret, false),
            Key::Delete | Key::Escape => KeyOutcome::Default,
        }
    }

    fn popover_key(&mut self, key: Key) -> Option<KeyOutcome> {
        match &mut self.interaction {
            Interaction::SlashMenu(menu) => {
                let len = super::slash::filter_commands(&menu.query).len();
                match key {
                    Key::ArrowUp => menu.highlighted = cycle(menu.highlighted, len, -1),
                    Key::ArrowDown => menu.highlighted = cycle(menu.highlighted, len, 1),
                    Key::Escape => self.interaction = Interaction::Idle,
                    Key::Enter => {
                        let command = super::slash::filter_commands(&menu.query)
                            .get(menu.highlighted)
                            .copied();
                        match command {
                            Some(command) => {
                                self.apply_slash_command(command.block_type);
                            }
                            None => self.interaction = Interaction::Idle,
                        }
                    }
                    Key::Backspace | Key::Delete => return None,
                }
                Some(KeyOutcome::Handled)
            }
            Interaction::LinkAutocomplete(auto) => {
                let len = auto.row_count();
                match key {
                    Key::ArrowUp => auto.highlighted = cycle(auto.highlighted, len, -1),
                    Key::ArrowDown => auto.highlighted = cycle(auto.highlighted, len, 1),
                    Key::Escape => self.interaction = Interaction::Idle,
                    Key::Enter => return Some(self.confirm_link_autocomplete()),
                    Key::Backspace | Key::Delete => return None,
                }
                Some(KeyOutcome::Handled)
            }
            Interaction::Idle | Interaction::Dragging(_) => None,
        }
    }

    /// Enter splits the block at the caret into a new sibling.
    fn enter(&mut self, index: usize, caret: usize) -> KeyOutcome {
        let block = &mut self.doc.blocks[index];
        let kind = match block.block_type() {
            BlockType::Code => return KeyOutcome::Default,
            BlockType::Bullet => BlockKind::Bullet,
            BlockType::Numbered => BlockKind::Numbered,
            BlockType::Checklist => BlockKind::Checklist(ChecklistMeta {
                created_at: Some(Utc::now()),
                ..ChecklistMeta::default()
            }),
            _ => BlockKind::Paragraph,
        };
        let tail = block.text.split_off(caret);
        let sibling = Block::new(kind, tail);
        let sibling_id = sibling.id.clone();

        self.insert_after(index, sibling);
        self.commit_structural();
        self.focus(FocusTarget::start(sibling_id));
        KeyOutcome::Handled
    }

    fn backspace(&mut self, index: usize, caret: usize) -> KeyOutcome {
        if caret != 0 {
            return KeyOutcome::Default;
        }
        let block = &self.doc.blocks[index];

        if block.text.is_empty() && index > 0 {
            self.doc.blocks.remove(index);
            let previous = self.doc.blocks[index - 1].id.clone();
            self.commit_structural();
            self.focus(FocusTarget::end(previous));
            return KeyOutcome::Handled;
        }
        if block.text.is_empty() {
            return KeyOutcome::Default;
        }

        if block.block_type() != BlockType::Paragraph {
            let id = block.id.clone();
            self.doc.blocks[index].retype(BlockType::Paragraph);
            self.commit_structural();
            self.focus(FocusTarget::start(id));
            return KeyOutcome::Handled;
        }

        if index > 0 && self.doc.blocks[index - 1].is_textual() {
            let removed = self.doc.blocks.remove(index);
            let previous = &mut self.doc.blocks[index - 1];
            let join = previous.text.len();
            previous.text.push_str(&removed.text);
            let previous_id = previous.id.clone();
            self.commit_structural();
            self.focus(FocusTarget::caret(previous_id, join, join));
            return KeyOutcome::Handled;
        }

        KeyOutcome::Default
    }

    /// Up on the first line or Down on the last line moves to the nearest
    /// visible neighbour.
    fn arrow(&mut self, index: usize, caret: usize, up: bool) -> KeyOutcome {
        let text = &self.doc.blocks[index].text;
        let at_boundary = if up {
            !text[..caret].contains('\n')
        } else {
            !text[caret..].contains('\n')
        };
        if !at_boundary {
            return KeyOutcome::Default;
        }

        let hidden = compute_visibility(&self.doc.blocks).hidden;
        let neighbour = if up {
            previous_visible(&self.doc.blocks, &hidden, index)
        } else {
            next_visible(&self.doc.blocks, &hidden, index)
        };
        let Some(neighbour) = neighbour else {
            return KeyOutcome::Default;
        };
        let id = self.doc.blocks[neighbour].id.clone();
        let target = if up {
            FocusTarget::end(id)
        } else {
            FocusTarget::start(id)
        };
        self.focus(target);
        KeyOutcome::Handled
    }
}
