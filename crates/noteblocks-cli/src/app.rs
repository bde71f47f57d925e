use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{debug, info};
use noteblocks_engine::editing::{
    ClickModifiers, EditorEvent, Key, KeyOutcome, MoveDirection, NoteCreationRequest,
};
use noteblocks_engine::host::{NewNote, NoteDirectory};
use noteblocks_engine::links::{clamp_offset, resolve_titles};
use noteblocks_engine::models::{BlockId, FocusPosition, FocusTarget, NoteFile, Snapshot};
use noteblocks_engine::outline::{compute_visibility, next_visible, previous_visible};
use noteblocks_engine::{EditController, EditorOptions, NotesDir, io};
use ratatui::widgets::ListState;
use tokio::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Files,
    Editor,
}

/// Where typed characters go: a block and a byte offset into its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caret {
    pub block_id: BlockId,
    pub offset: usize,
}

pub struct App {
    pub directory: NotesDir,
    pub notes: Vec<NoteFile>,
    pub file_list_state: ListState,
    pub open_note: Option<NoteFile>,
    pub editor: EditController,
    pub caret: Option<Caret>,
    pub pane: Pane,
    pub dirty: bool,
    pub status: String,
    last_search: Option<u64>,
    runtime: Runtime,
}

impl App {
    pub fn new(notes_path: PathBuf, options: EditorOptions) -> Result<Self> {
        let directory = NotesDir::open(notes_path)?;
        let notes = io::list_notes(directory.root())?;
        let runtime = tokio::runtime::Builder::new_current_thread().build()?;

        let mut app = Self {
            directory,
            notes,
            file_list_state: ListState::default(),
            open_note: None,
            editor: EditController::new(Snapshot::new("", vec![]), options),
            caret: None,
            pane: Pane::Files,
            dirty: false,
            status: String::new(),
            last_search: None,
            runtime,
        };

        if !app.notes.is_empty() {
            app.file_list_state.select(Some(0));
        }

        Ok(app)
    }

    // ----- files pane ----------------------------------------------------

    pub fn next_file(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(i) => (i + 1) % self.notes.len(),
            None => 0,
        };
        self.file_list_state.select(Some(i));
    }

    pub fn previous_file(&mut self) {
        if self.notes.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(0) | None => self.notes.len() - 1,
            Some(i) => i - 1,
        };
        self.file_list_state.select(Some(i));
    }

    pub fn open_selected(&mut self) -> Result<()> {
        let Some(note) = self
            .file_list_state
            .selected()
            .and_then(|i| self.notes.get(i))
            .cloned()
        else {
            return Ok(());
        };
        self.save_if_dirty()?;

        let snapshot = io::load_note(&note, self.directory.root())?;
        self.editor.load_document(snapshot);
        self.caret = self.editor.blocks().first().map(|block| Caret {
            block_id: block.id.clone(),
            offset: 0,
        });
        self.open_note = Some(note);
        self.dirty = false;
        self.last_search = None;
        self.status.clear();
        self.pane = Pane::Editor;

        self.resolve_links();
        self.drain_events();
        Ok(())
    }

    /// Upgrade `[[Title]]` links whose titles name exactly one note.
    fn resolve_links(&mut self) {
        let Some(pass) = self.editor.begin_link_resolution() else {
            return;
        };
        let results = self
            .runtime
            .block_on(resolve_titles(&self.directory, &pass.titles));
        if self.editor.finish_link_resolution(&pass, results) {
            info!("upgraded legacy links in {:?}", self.editor.title());
        }
        let ambiguous = self.editor.ambiguous_titles();
        if !ambiguous.is_empty() {
            self.status = format!("Ambiguous links: {}", ambiguous.join(", "));
        }
    }

    pub fn save_if_dirty(&mut self) -> Result<()> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    /// Leave the editor: commit pending typing and upgrade any legacy
    /// links typed since the note was opened.
    fn commit_edits(&mut self) {
        self.editor.blur();
        self.resolve_links();
        self.drain_events();
    }

    pub fn save(&mut self) -> Result<()> {
        if self.open_note.is_none() {
            return Ok(());
        }
        self.commit_edits();
        let Some(note) = &self.open_note else {
            return Ok(());
        };
        io::save_note(note, self.directory.root(), self.editor.snapshot())?;
        self.dirty = false;
        self.status = format!("Saved {}", note.id());
        Ok(())
    }

    pub fn tick(&mut self) {
        if self.editor.tick(Instant::now()) {
            debug!("typing burst committed");
        }
    }

    // ----- editor pane ---------------------------------------------------

    pub fn handle_editor_key(&mut self, key: KeyEvent) -> Result<()> {
        let Some(Caret { block_id, offset }) = self.caret.clone() else {
            return Ok(());
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Char('z') if ctrl => {
                self.editor.undo();
            }
            KeyCode::Char('y') if ctrl => {
                self.editor.redo();
            }
            KeyCode::Char('s') if ctrl => self.save()?,
            KeyCode::Char('a') if ctrl => self.editor.select_all(),
            KeyCode::Char('d') if ctrl => {
                self.editor.duplicate_block(&block_id);
            }
            KeyCode::Char('e') if ctrl => self.editor.toggle_raw_edit(&block_id),
            KeyCode::Char('x') if ctrl => {
                self.editor.toggle_checked(&block_id);
            }
            KeyCode::Up if alt => {
                self.editor.move_block(&block_id, MoveDirection::Up);
            }
            KeyCode::Down if alt => {
                self.editor.move_block(&block_id, MoveDirection::Down);
            }
            KeyCode::Up if shift => self.extend_selection(&block_id, true),
            KeyCode::Down if shift => self.extend_selection(&block_id, false),
            KeyCode::Tab => {
                self.editor.toggle_collapse(&block_id);
            }
            KeyCode::Enter => match self.editor.handle_key(&block_id, Key::Enter, offset) {
                KeyOutcome::Default => self.insert_text(&block_id, offset, "\n"),
                KeyOutcome::CreateNote(request) => self.create_note(request),
                KeyOutcome::Handled => {}
            },
            KeyCode::Esc => {
                if !self.editor.handle_key(&block_id, Key::Escape, offset).is_handled() {
                    self.commit_edits();
                    self.pane = Pane::Files;
                }
            }
            KeyCode::Backspace => {
                if !self
                    .editor
                    .handle_key(&block_id, Key::Backspace, offset)
                    .is_handled()
                    && let Some(start) = self.previous_boundary(&block_id, offset)
                {
                    self.delete_range(&block_id, start, offset);
                }
            }
            KeyCode::Delete => {
                if !self
                    .editor
                    .handle_key(&block_id, Key::Delete, offset)
                    .is_handled()
                    && let Some(end) = self.next_boundary(&block_id, offset)
                {
                    self.delete_range(&block_id, offset, end);
                }
            }
            KeyCode::Up => {
                if !self.editor.handle_key(&block_id, Key::ArrowUp, offset).is_handled() {
                    self.set_offset(0);
                }
            }
            KeyCode::Down => {
                if !self.editor.handle_key(&block_id, Key::ArrowDown, offset).is_handled() {
                    self.set_offset(usize::MAX);
                }
            }
            KeyCode::Left => {
                if let Some(start) = self.previous_boundary(&block_id, offset) {
                    self.set_offset(start);
                }
            }
            KeyCode::Right => {
                if let Some(end) = self.next_boundary(&block_id, offset) {
                    self.set_offset(end);
                }
            }
            KeyCode::Home => self.set_offset(0),
            KeyCode::End => self.set_offset(usize::MAX),
            KeyCode::Char(ch) if !ctrl && !alt => {
                self.editor.clear_selection();
                self.insert_text(&block_id, offset, ch.encode_utf8(&mut [0; 4]));
            }
            _ => {}
        }

        self.after_edit();
        Ok(())
    }

    fn insert_text(&mut self, block_id: &BlockId, offset: usize, inserted: &str) {
        let Some(block) = self.editor.block(block_id) else {
            return;
        };
        let mut text = block.text.clone();
        let offset = clamp_offset(&text, offset);
        text.insert_str(offset, inserted);
        let caret = offset + inserted.len();
        self.editor
            .handle_text_change(block_id, &text, caret, Instant::now());
        self.set_offset(caret);
    }

    fn delete_range(&mut self, block_id: &BlockId, start: usize, end: usize) {
        let Some(block) = self.editor.block(block_id) else {
            return;
        };
        let mut text = block.text.clone();
        text.replace_range(start..end, "");
        self.editor
            .handle_text_change(block_id, &text, start, Instant::now());
        self.set_offset(start);
    }

    fn previous_boundary(&self, block_id: &BlockId, offset: usize) -> Option<usize> {
        let text = &self.editor.block(block_id)?.text;
        let offset = clamp_offset(text, offset);
        text[..offset].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self, block_id: &BlockId, offset: usize) -> Option<usize> {
        let text = &self.editor.block(block_id)?.text;
        let offset = clamp_offset(text, offset);
        text[offset..].chars().next().map(|ch| offset + ch.len_utf8())
    }

    fn set_offset(&mut self, offset: usize) {
        if let Some(caret) = &mut self.caret {
            caret.offset = offset;
        }
    }

    /// Shift+arrow grows the block selection towards the visible neighbour.
    fn extend_selection(&mut self, block_id: &BlockId, up: bool) {
        let blocks = self.editor.blocks();
        let Some(index) = blocks.iter().position(|block| &block.id == block_id) else {
            return;
        };
        let hidden = compute_visibility(blocks).hidden;
        let neighbour = if up {
            previous_visible(blocks, &hidden, index)
        } else {
            next_visible(blocks, &hidden, index)
        };
        let Some(neighbour) = neighbour.map(|i| blocks[i].id.clone()) else {
            return;
        };
        if self.editor.selected_block_ids().is_empty() {
            self.editor
                .click_block(block_id, ClickModifiers::default());
        }
        let shift = ClickModifiers {
            shift: true,
            toggle: false,
        };
        self.editor.click_block(&neighbour, shift);
        self.caret = Some(Caret {
            block_id: neighbour,
            offset: 0,
        });
    }

    fn create_note(&mut self, request: NoteCreationRequest) {
        let parent_id = self.open_note.as_ref().map(|note| note.id().to_string());
        let result = self.runtime.block_on(self.directory.create_note(NewNote {
            title: request.title.clone(),
            parent_id,
        }));
        if let Ok(created) = &result {
            info!("created note {}", created.id);
            if let Ok(notes) = io::list_notes(self.directory.root()) {
                self.notes = notes;
            }
        }
        self.editor.finish_note_creation(&request, result);
    }

    /// Follow the controller's focus, run any pending link search and
    /// collect its events.
    fn after_edit(&mut self) {
        if let Some(target) = self.editor.take_focus_target() {
            self.caret = Some(self.caret_for(target));
        }
        self.ensure_caret();
        self.run_link_search();
        self.drain_events();
    }

    fn caret_for(&self, target: FocusTarget) -> Caret {
        let len = self
            .editor
            .block(&target.block_id)
            .map_or(0, |block| block.text.len());
        let offset = match target.position {
            Some(FocusPosition::Start) => 0,
            Some(FocusPosition::End) => len,
            None => target.selection_end.unwrap_or(len),
        };
        Caret {
            block_id: target.block_id,
            offset,
        }
    }

    /// Keep the caret on an existing block and a char boundary.
    fn ensure_caret(&mut self) {
        let current = self
            .caret
            .as_ref()
            .and_then(|caret| Some((caret, self.editor.block(&caret.block_id)?)));
        self.caret = match current {
            Some((caret, block)) => Some(Caret {
                block_id: caret.block_id.clone(),
                offset: clamp_offset(&block.text, caret.offset),
            }),
            None => self.editor.blocks().first().map(|block| Caret {
                block_id: block.id.clone(),
                offset: 0,
            }),
        };
    }

    fn run_link_search(&mut self) {
        let Some(request) = self.editor.begin_link_search() else {
            return;
        };
        if self.last_search == Some(request.generation) {
            return;
        }
        self.last_search = Some(request.generation);
        let result = self.runtime.block_on(
            self.directory
                .search_by_title_prefix(&request.query, request.limit),
        );
        self.editor.finish_link_search(&request, result);
    }

    fn drain_events(&mut self) {
        for event in self.editor.drain_events() {
            match event {
                EditorEvent::TypingChange(_) | EditorEvent::StructuralChange(_) => {
                    self.dirty = true;
                }
                EditorEvent::Notice(notice) => self.status = notice.message,
                EditorEvent::PromoteChecklist { block_id, text } => {
                    debug!("block {block_id} became a checklist item: {text:?}");
                }
                EditorEvent::ChecklistToggleTask { task_id, checked } => {
                    debug!("task {task_id} checked={checked}");
                }
                EditorEvent::FocusBlock(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn type_str(app: &mut App, s: &str) {
        for ch in s.chars() {
            app.handle_editor_key(press(KeyCode::Char(ch))).unwrap();
        }
    }

    fn app_with(files: &[(&str, &str)]) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let app = App::new(dir.path().to_path_buf(), EditorOptions::default()).unwrap();
        (dir, app)
    }

    #[test]
    fn typing_shortcut_then_saving() {
        let (dir, mut app) = app_with(&[("Inbox.md", "")]);
        app.open_selected().unwrap();

        type_str(&mut app, "- milk");
        app.handle_editor_key(press(KeyCode::Enter)).unwrap();
        type_str(&mut app, "eggs");
        app.save().unwrap();

        let saved = std::fs::read_to_string(dir.path().join("Inbox.md")).unwrap();
        assert_eq!(saved, "- milk\n\n- eggs\n");
        assert!(!app.dirty);
    }

    #[test]
    fn opening_resolves_legacy_links() {
        let (_dir, mut app) = app_with(&[
            ("Home.md", "See [[Project X]]"),
            ("Project X.md", "# X"),
        ]);
        app.open_selected().unwrap();

        assert_eq!(app.editor.blocks()[0].text, "See [[id:Project X.md|Project X]]");
        assert!(app.dirty);
    }

    #[test]
    fn link_autocomplete_inserts_selected_note() {
        let (_dir, mut app) = app_with(&[("Inbox.md", ""), ("Project X.md", "")]);
        app.open_selected().unwrap();

        type_str(&mut app, "[[Proj");
        assert_eq!(
            app.editor
                .interaction()
                .link_autocomplete()
                .map(|auto| auto.results.len()),
            Some(1)
        );
        app.handle_editor_key(press(KeyCode::Enter)).unwrap();

        let expected = "[[id:Project X.md|Project X]] ";
        assert_eq!(app.editor.blocks()[0].text, expected);
        assert_eq!(app.caret.as_ref().map(|c| c.offset), Some(expected.len()));
    }

    #[test]
    fn saving_upgrades_links_typed_in_session() {
        let (dir, mut app) = app_with(&[("Home.md", ""), ("Inbox.md", "")]);
        app.open_selected().unwrap();

        type_str(&mut app, "see [[Inbox]]");
        assert_eq!(app.editor.blocks()[0].text, "see [[Inbox]]");
        app.handle_editor_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
            .unwrap();

        let saved = std::fs::read_to_string(dir.path().join("Home.md")).unwrap();
        assert_eq!(saved, "see [[id:Inbox.md|Inbox]]\n");
        assert!(!app.dirty);
    }

    #[test]
    fn leaving_the_editor_upgrades_links() {
        let (_dir, mut app) = app_with(&[("Home.md", ""), ("Inbox.md", "")]);
        app.open_selected().unwrap();

        type_str(&mut app, "[[Inbox]]");
        app.handle_editor_key(press(KeyCode::Esc)).unwrap();

        assert_eq!(app.editor.blocks()[0].text, "[[id:Inbox.md|Inbox]]");
        assert!(app.dirty);
    }

    #[test]
    fn escape_returns_to_files_pane() {
        let (_dir, mut app) = app_with(&[("Inbox.md", "text")]);
        app.open_selected().unwrap();
        app.handle_editor_key(press(KeyCode::Esc)).unwrap();
        assert_eq!(app.pane, Pane::Files);
    }
}
