//! Behavioral tests for the edit controller, grouped by interaction.

mod invariants;
mod keys;
mod text;

use std::time::Instant;

use crate::editing::{EditController, EditorEvent, EditorOptions};
use crate::models::{Block, BlockId, BlockType, Snapshot};

/// An editor over `blocks` with default options.
fn editor(blocks: Vec<Block>) -> EditController {
    EditController::new(Snapshot::new("Test", blocks), EditorOptions::default())
}

fn para(id: &str, text: &str) -> Block {
    Block::paragraph(text).with_id(id)
}

fn typed(id: &str, block_type: BlockType, text: &str) -> Block {
    Block::of_type(block_type, text).with_id(id)
}

fn id(s: &str) -> BlockId {
    BlockId::from(s)
}

fn ids(editor: &EditController) -> Vec<String> {
    editor
        .blocks()
        .iter()
        .map(|block| block.id.to_string())
        .collect()
}

fn texts(editor: &EditController) -> Vec<String> {
    editor.blocks().iter().map(|block| block.text.clone()).collect()
}

fn types(editor: &EditController) -> Vec<BlockType> {
    editor.blocks().iter().map(Block::block_type).collect()
}

fn structural_count(events: &[EditorEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, EditorEvent::StructuralChange(_)))
        .count()
}

fn now() -> Instant {
    Instant::now()
}
