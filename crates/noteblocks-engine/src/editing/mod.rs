/*!
 * # Editing
 *
 * The edit controller: the state machine between a presentation layer and
 * the block list of one open document.
 *
 * ## Flow
 *
 * - The presentation layer reports text changes, key presses, pastes,
 *   clicks and drag gestures to [`EditController`].
 * - The controller mutates its blocks, records history, and queues
 *   [`EditorEvent`]s (`TypingChange`, `StructuralChange`, ...) that the host
 *   drains and persists.
 * - Caret moves come back as a one-shot [`FocusTarget`](crate::models::FocusTarget)
 *   taken with `take_focus_target`.
 * - Host lookups (link search, note creation, title resolution) are split
 *   into `begin_*`/`finish_*` pairs carrying a generation, so the
 *   controller is never borrowed across an await.
 *
 * ## Typing vs structural
 *
 * A change that only touches one block's text (or the title) is typing and
 * coalesces in history within the debounce window. Everything else
 * (insert, delete, retype, reorder, collapse, check toggles) is structural
 * and gets its own undo step.
 *
 * ## Usage Pattern
 *
 * ```rust
 * use std::time::Instant;
 * use noteblocks_engine::codec::text_to_blocks;
 * use noteblocks_engine::editing::{EditController, EditorEvent, EditorOptions, Key};
 * use noteblocks_engine::models::Snapshot;
 *
 * let blocks = text_to_blocks("# Groceries\n\n- milk");
 * let mut editor = EditController::new(Snapshot::new("Groceries", blocks), EditorOptions::default());
 *
 * let item = editor.blocks()[1].id.clone();
 * editor.handle_key(&item, Key::Enter, 4);
 * assert_eq!(editor.blocks().len(), 3);
 *
 * let events = editor.drain_events();
 * assert!(matches!(events[0], EditorEvent::StructuralChange(_)));
 *
 * let new_item = editor.take_focus_target().unwrap().block_id;
 * editor.handle_text_change(&new_item, "eggs", 4, Instant::now());
 * assert_eq!(editor.blocks()[2].text, "eggs");
 * ```
 */

mod autocomplete;
mod clipboard;
pub mod controller;
mod drag;
pub mod events;
pub mod interaction;
mod keys;
pub mod selection;
pub mod shortcuts;
pub mod slash;

#[cfg(test)]
mod tests;

pub use controller::{EditController, EditorOptions, MoveDirection};
pub use events::{
    EditorEvent, Key, KeyOutcome, LinkSearchRequest, Notice, NoteCreationRequest,
};
pub use interaction::{
    DragState, DropPosition, DropTarget, Interaction, LinkAutocomplete, SlashMenu,
};
pub use selection::{BlockSelection, ClickModifiers};
pub use shortcuts::{Shortcut, detect_shortcut};
pub use slash::{SLASH_COMMANDS, SlashCommand, filter_commands};
