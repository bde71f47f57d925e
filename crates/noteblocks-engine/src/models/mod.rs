pub mod block;
pub mod focus;
pub mod note_file;
pub mod snapshot;

pub use block::{Block, BlockId, BlockKind, BlockType, ChecklistMeta, HeadingLevel, UnknownBlockType};
pub use focus::{FocusPlacement, FocusPosition, FocusRequest, FocusTarget};
pub use note_file::NoteFile;
pub use snapshot::{Snapshot, ensure_non_empty, index_of};
