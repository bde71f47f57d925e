pub mod codec;
pub mod editing;
pub mod history;
pub mod host;
pub mod io;
pub mod links;
pub mod models;
pub mod outline;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use codec::{blocks_to_text, text_to_blocks};
pub use editing::{EditController, EditorEvent, EditorOptions, Key, KeyOutcome};
pub use history::History;
pub use host::{HostError, MemoryDirectory, NewNote, NoteDirectory, NoteSummary, Resolution};
pub use io::*;
pub use models::{Block, BlockId, BlockType, NoteFile, Snapshot};
