use crate::models::{Block, BlockId};

/// A user-facing message, e.g. a failed host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outbound notifications for the host, drained with
/// `EditController::drain_events`.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Only one block's text (or the title) changed; coalesced in history.
    TypingChange(Vec<Block>),
    /// Anything else: insert, delete, retype, reorder, property changes.
    StructuralChange(Vec<Block>),
    FocusBlock(BlockId),
    /// A paragraph became a checklist through a typed shortcut.
    PromoteChecklist { block_id: BlockId, text: String },
    /// A checklist block bound to a task was (un)checked.
    ChecklistToggleTask { task_id: String, checked: bool },
    Notice(Notice),
}

/// What a key or paste handler did with the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    /// Let the presentation layer apply its default behavior.
    Default,
    /// The user chose "create note" in link autocomplete; the host creates
    /// it and reports back through `finish_note_creation`.
    CreateNote(NoteCreationRequest),
}

impl KeyOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, KeyOutcome::Default)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Delete,
    Escape,
    ArrowUp,
    ArrowDown,
}

/// A prefix search the host should run for link autocomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSearchRequest {
    pub generation: u64,
    pub query: String,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCreationRequest {
    pub generation: u64,
    pub title: String,
}
