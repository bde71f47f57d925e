use crate::codec::{blocks_to_text, text_to_blocks};
use crate::host::{HostError, NewNote, NoteDirectory, NoteSummary, Resolution};
use crate::models::{NoteFile, Snapshot};
use log::{debug, info};
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
}

/// Read a markdown file and return its content
pub fn read_file(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write content to a markdown file, creating parent folders as needed
pub fn write_file(
    relative_path: &RelativePath,
    notes_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// Parse a note into a snapshot titled after its file name.
pub fn load_note(note: &NoteFile, notes_root: &Path) -> Result<Snapshot, IoError> {
    let content = read_file(note.relative_path(), notes_root)?;
    let snapshot = Snapshot::new(note.title(), text_to_blocks(&content));
    debug!("loaded {} ({} blocks)", note.id(), snapshot.blocks.len());
    Ok(snapshot)
}

/// Serialize a snapshot's blocks back to the note's file.
pub fn save_note(note: &NoteFile, notes_root: &Path, snapshot: &Snapshot) -> Result<(), IoError> {
    let mut content = blocks_to_text(&snapshot.blocks);
    content.push('\n');
    write_file(note.relative_path(), notes_root, &content)?;
    info!("saved {}", note.id());
    Ok(())
}

/// Scan for markdown files in the notes directory, sorted by path
pub fn scan_markdown_files(notes_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !notes_root.exists() {
        return Err(IoError::InvalidNotesDir(
            "notes directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(notes_root, &mut files)?;
    files.sort();
    Ok(files)
}

/// Every note under the root, addressed by relative path.
pub fn list_notes(notes_root: &Path) -> Result<Vec<NoteFile>, IoError> {
    let notes = scan_markdown_files(notes_root)?
        .into_iter()
        .filter_map(|path| {
            let relative = path.strip_prefix(notes_root).ok()?;
            RelativePathBuf::from_path(relative).ok()
        })
        .map(NoteFile::new)
        .collect();
    Ok(notes)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "md"
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidNotesDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

/// A notes folder on disk as a [`NoteDirectory`]. Note ids are paths
/// relative to the root and titles are file stems.
#[derive(Debug, Clone)]
pub struct NotesDir {
    root: PathBuf,
}

impl NotesDir {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, IoError> {
        let root = root.into();
        validate_notes_dir(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn notes(&self) -> Result<Vec<NoteFile>, HostError> {
        list_notes(&self.root).map_err(|err| HostError::Unavailable(err.to_string()))
    }
}

fn summary(note: &NoteFile) -> NoteSummary {
    NoteSummary {
        id: note.id().to_string(),
        title: note.title().to_string(),
    }
}

impl NoteDirectory for NotesDir {
    async fn resolve_title_to_id(&self, title: &str) -> Result<Resolution, HostError> {
        let mut ids: Vec<String> = self
            .notes()?
            .iter()
            .filter(|note| note.title().eq_ignore_ascii_case(title.trim()))
            .map(|note| note.id().to_string())
            .collect();
        Ok(match ids.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Ok(ids.remove(0)),
            _ => Resolution::Ambiguous(ids),
        })
    }

    async fn search_by_title_prefix(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<NoteSummary>, HostError> {
        let query = query.trim().to_lowercase();
        Ok(self
            .notes()?
            .iter()
            .filter(|note| note.title().to_lowercase().starts_with(&query))
            .take(limit)
            .map(summary)
            .collect())
    }

    async fn create_note(&self, note: NewNote) -> Result<NoteSummary, HostError> {
        if note.title.trim().is_empty() {
            return Err(HostError::Rejected("title is empty".to_string()));
        }
        let file = match &note.parent_id {
            Some(parent) => {
                let folder = RelativePath::new(parent).parent().unwrap_or(RelativePath::new(""));
                let name = NoteFile::for_title(&note.title);
                NoteFile::new(folder.join(name.relative_path()))
            }
            None => NoteFile::for_title(&note.title),
        };
        if file.relative_path().to_path(&self.root).exists() {
            return Err(HostError::Rejected(format!("{} already exists", file.id())));
        }
        write_file(file.relative_path(), &self.root, "").map_err(|err| match err {
            IoError::Io(err) => HostError::Io(err),
            other => HostError::Unavailable(other.to_string()),
        })?;
        info!("created note {}", file.id());
        Ok(summary(&file))
    }
}
