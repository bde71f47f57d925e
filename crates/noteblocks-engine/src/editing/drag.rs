use log::debug;

use crate::models::{BlockId, FocusTarget};

use super::controller::EditController;
use super::interaction::{DragState, DropPosition, DropTarget, Interaction};

impl EditController {
    pub fn drag_start(&mut self, source: &BlockId) -> bool {
        if self.doc.index_of(source).is_none() {
            return false;
        }
        self.interaction = Interaction::Dragging(DragState {
            source: source.clone(),
            over: None,
        });
        true
    }

    /// Track the block under the pointer. The drop lands above it when the
    /// pointer is in its upper half, below it otherwise.
    pub fn drag_over(&mut self, over: &BlockId, pointer_y: f32, top: f32, height: f32) {
        let Interaction::Dragging(drag) = &mut self.interaction else {
            return;
        };
        let position = if pointer_y < top + height / 2.0 {
            DropPosition::Above
        } else {
            DropPosition::Below
        };
        drag.over = Some(DropTarget {
            block_id: over.clone(),
            position,
        });
    }

    /// Move the dragged block to the drop target. Commits only when the
    /// order actually changed.
    pub fn drop_block(&mut self) -> bool {
        let Interaction::Dragging(drag) = std::mem::take(&mut self.interaction) else {
            return false;
        };
        let Some(target) = drag.over else {
            return false;
        };
        let (Some(from), Some(over)) = (
            self.doc.index_of(&drag.source),
            self.doc.index_of(&target.block_id),
        ) else {
            return false;
        };

        let mut to = match target.position {
            DropPosition::Above => over,
            DropPosition::Below => over + 1,
        };
        if from < to {
            to -= 1;
        }
        if from == to {
            return false;
        }

        let block = self.doc.blocks.remove(from);
        self.doc.blocks.insert(to, block);
        debug!("moved block {} from {from} to {to}", drag.source);
        self.commit_structural();
        self.focus(FocusTarget::end(drag.source));
        true
    }

    /// Abandon the gesture without moving anything.
    pub fn drag_end(&mut self) {
        if self.interaction.dragging().is_some() {
            self.interaction = Interaction::Idle;
        }
    }
}
