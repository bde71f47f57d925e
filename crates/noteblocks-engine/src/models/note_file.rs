use relative_path::{RelativePath, RelativePathBuf};

/// A markdown note on disk, addressed relative to the notes root.
///
/// The relative path doubles as the note id used in `[[id:...]]` links.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteFile {
    relative_path: RelativePathBuf,
    title: String,
}

impl NoteFile {
    pub fn new(relative_path: RelativePathBuf) -> Self {
        let title = Self::extract_title(&relative_path);
        Self {
            relative_path,
            title,
        }
    }

    pub fn from_relative_str(path: &str) -> Self {
        Self::new(RelativePathBuf::from(path))
    }

    /// Relative path for a new note with the given title (`Title.md`).
    ///
    /// Path separators and wikilink delimiters become `-` so the id and
    /// title both survive inside `[[id:<id>|<title>]]`.
    pub fn for_title(title: &str) -> Self {
        let stem: String = title
            .trim()
            .chars()
            .map(|ch| if matches!(ch, '/' | '\\' | ':' | '|' | '[' | ']') { '-' } else { ch })
            .collect();
        let stem = if stem.is_empty() { "Untitled" } else { &stem };
        Self::new(RelativePathBuf::from(format!("{stem}.md")))
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// Note id as it appears in canonical wikilinks.
    pub fn id(&self) -> &str {
        self.relative_path.as_str()
    }

    /// Display title: the file name without its `.md` extension.
    pub fn title(&self) -> &str {
        &self.title
    }

    fn extract_title(path: &RelativePath) -> String {
        path.file_name()
            .map(|name| name.strip_suffix(".md").unwrap_or(name))
            .unwrap_or("Untitled")
            .to_string()
    }
}

impl From<&str> for NoteFile {
    fn from(path: &str) -> Self {
        Self::from_relative_str(path)
    }
}
