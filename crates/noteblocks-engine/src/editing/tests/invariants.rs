use std::collections::HashSet;

use crate::editing::EditController;
use crate::models::BlockType;

/// Validates controller state invariants.
///
/// Asserts that:
/// - The document is never empty
/// - Block ids are unique
/// - Dividers carry no text
/// - Every selected id exists, in document order
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check(editor: &EditController) {
    let blocks = editor.blocks();
    assert!(!blocks.is_empty(), "document must never be empty");

    let mut seen = HashSet::new();
    for block in blocks {
        assert!(seen.insert(&block.id), "duplicate block id {}", block.id);
        if block.block_type() == BlockType::Divider {
            assert!(block.text.is_empty(), "divider {} has text", block.id);
        }
    }

    let positions: Vec<usize> = editor
        .selected_block_ids()
        .iter()
        .map(|id| {
            editor
                .snapshot()
                .index_of(id)
                .unwrap_or_else(|| panic!("selected id {id} is not in the document"))
        })
        .collect();
    assert!(
        positions.windows(2).all(|pair| pair[0] < pair[1]),
        "selection out of document order: {positions:?}"
    );
}
