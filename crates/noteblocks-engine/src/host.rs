//! Contracts the engine consumes from its host.
//!
//! The host owns persistence: it answers title lookups, prefix searches and
//! note creation. The engine never awaits these while the controller is
//! borrowed; it hands out generation-tagged requests and takes the results
//! back (see `EditController::begin_link_search`).

use std::collections::BTreeMap;
use std::future::Future;

use thiserror::Error;

/// Outcome of looking up a note by its exact title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Ok(String),
    Ambiguous(Vec<String>),
    NotFound,
}

/// A note as listed by the host's search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("note directory unavailable: {0}")]
    Unavailable(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The host's note store, as seen by the link protocol.
pub trait NoteDirectory {
    /// Look up the note whose title matches exactly (case-insensitive).
    fn resolve_title_to_id(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<Resolution, HostError>>;

    /// Notes whose title starts with `query`, at most `limit` of them.
    fn search_by_title_prefix(
        &self,
        query: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<NoteSummary>, HostError>>;

    fn create_note(&self, note: NewNote) -> impl Future<Output = Result<NoteSummary, HostError>>;
}

/// In-memory directory keyed by note id.
///
/// Used by tests and as a reference for hosts; creation mints ids from a
/// counter so results are deterministic.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    notes: std::cell::RefCell<BTreeMap<String, String>>,
    next_id: std::cell::Cell<u64>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notes<'a>(notes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let dir = Self::new();
        for (id, title) in notes {
            dir.insert(id, title);
        }
        dir
    }

    pub fn insert(&self, id: &str, title: &str) {
        self.notes
            .borrow_mut()
            .insert(id.to_string(), title.to_string());
    }

    pub fn len(&self) -> usize {
        self.notes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.borrow().is_empty()
    }

    fn lookup(&self, title: &str) -> Resolution {
        let ids: Vec<String> = self
            .notes
            .borrow()
            .iter()
            .filter(|(_, t)| t.eq_ignore_ascii_case(title))
            .map(|(id, _)| id.clone())
            .collect();
        match ids.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Ok(ids[0].clone()),
            _ => Resolution::Ambiguous(ids),
        }
    }

    fn prefix_search(&self, query: &str, limit: usize) -> Vec<NoteSummary> {
        let query = query.to_lowercase();
        self.notes
            .borrow()
            .iter()
            .filter(|(_, title)| title.to_lowercase().starts_with(&query))
            .take(limit)
            .map(|(id, title)| NoteSummary {
                id: id.clone(),
                title: title.clone(),
            })
            .collect()
    }
}

impl NoteDirectory for MemoryDirectory {
    async fn resolve_title_to_id(&self, title: &str) -> Result<Resolution, HostError> {
        Ok(self.lookup(title))
    }

    async fn search_by_title_prefix(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<NoteSummary>, HostError> {
        Ok(self.prefix_search(query, limit))
    }

    async fn create_note(&self, note: NewNote) -> Result<NoteSummary, HostError> {
        let title = note.title.trim();
        if title.is_empty() {
            return Err(HostError::Rejected("title is empty".to_string()));
        }
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let id = format!("note-{n}");
        self.insert(&id, title);
        Ok(NoteSummary {
            id,
            title: title.to_string(),
        })
    }
}
