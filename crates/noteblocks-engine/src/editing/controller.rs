use std::time::{Duration, Instant};

use chrono::Utc;
use log::debug;

use crate::codec::blocks_to_text;
use crate::history::{DEFAULT_HISTORY_LIMIT, DEFAULT_TYPING_DEBOUNCE, History};
use crate::links::{clamp_offset, unterminated_link_query};
use crate::models::{
    Block, BlockId, BlockKind, BlockType, FocusPlacement, FocusRequest, FocusTarget, Snapshot,
    ensure_non_empty,
};
use crate::outline::{self, Layout};

use super::events::EditorEvent;
use super::interaction::{Interaction, LinkAutocomplete, SlashMenu};
use super::selection::{BlockSelection, ClickModifiers};
use super::shortcuts::detect_shortcut;
use super::slash::{SlashCommand, filter_commands, slash_query};

/// Tunables supplied by the host, usually from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub typing_debounce: Duration,
    pub history_limit: usize,
    pub link_search_limit: usize,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            typing_debounce: DEFAULT_TYPING_DEBOUNCE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            link_search_limit: 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// The editing state machine for one open document.
///
/// The controller owns the live blocks. Every mutation is committed either
/// as typing or as a structural change; both record history and queue an
/// [`EditorEvent`] for the host.
#[derive(Debug)]
pub struct EditController {
    pub(super) doc: Snapshot,
    pub(super) history: History,
    pub(super) options: EditorOptions,
    pub(super) focus_target: Option<FocusTarget>,
    pub(super) interaction: Interaction,
    pub(super) selection: BlockSelection,
    pub(super) raw_edit_block_id: Option<BlockId>,
    pub(super) events: Vec<EditorEvent>,
    /// Bumped on every document switch; stale async results are dropped.
    pub(super) doc_generation: u64,
    pub(super) next_link_generation: u64,
    pub(super) last_focus_nonce: Option<u64>,
    pub(super) ambiguous_titles: Vec<String>,
}

impl EditController {
    pub fn new(snapshot: Snapshot, options: EditorOptions) -> Self {
        let doc = Snapshot::new(snapshot.title, snapshot.blocks);
        let history =
            History::with_limits(doc.clone(), options.history_limit, options.typing_debounce);
        Self {
            doc,
            history,
            options,
            focus_target: None,
            interaction: Interaction::Idle,
            selection: BlockSelection::default(),
            raw_edit_block_id: None,
            events: Vec::new(),
            doc_generation: 0,
            next_link_generation: 0,
            last_focus_nonce: None,
            ambiguous_titles: Vec::new(),
        }
    }

    /// Switch to another document, dropping all transient state.
    pub fn load_document(&mut self, snapshot: Snapshot) {
        self.doc = Snapshot::new(snapshot.title, snapshot.blocks);
        self.history.reset(self.doc.clone());
        self.doc_generation += 1;
        self.focus_target = None;
        self.interaction = Interaction::Idle;
        self.selection.clear();
        self.raw_edit_block_id = None;
        self.ambiguous_titles.clear();
        debug!(
            "loaded document {:?} with {} blocks (generation {})",
            self.doc.title,
            self.doc.blocks.len(),
            self.doc_generation
        );
    }

    // ----- read access -------------------------------------------------

    pub fn snapshot(&self) -> &Snapshot {
        &self.doc
    }

    pub fn blocks(&self) -> &[Block] {
        &self.doc.blocks
    }

    pub fn title(&self) -> &str {
        &self.doc.title
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.doc.block(id)
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selected_block_ids(&self) -> &[BlockId] {
        self.selection.ids()
    }

    pub fn selection(&self) -> &BlockSelection {
        &self.selection
    }

    pub fn raw_edit_block_id(&self) -> Option<&BlockId> {
        self.raw_edit_block_id.as_ref()
    }

    pub fn ambiguous_titles(&self) -> &[String] {
        &self.ambiguous_titles
    }

    pub fn document_generation(&self) -> u64 {
        self.doc_generation
    }

    pub fn focus_target(&self) -> Option<&FocusTarget> {
        self.focus_target.as_ref()
    }

    /// Hand the pending focus instruction to the presentation layer.
    pub fn take_focus_target(&mut self) -> Option<FocusTarget> {
        self.focus_target.take()
    }

    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn layout(&self) -> Layout {
        outline::layout(&self.doc.blocks)
    }

    /// Commands offered by the open slash menu, or all of them when closed.
    pub fn slash_commands(&self) -> Vec<SlashCommand> {
        let query = self
            .interaction
            .slash_menu()
            .map(|menu| menu.query.as_str())
            .unwrap_or("");
        filter_commands(query)
    }

    // ----- commits -----------------------------------------------------

    pub(super) fn commit_typing(&mut self, now: Instant) {
        self.history.record_typing(self.doc.clone(), now);
        self.events
            .push(EditorEvent::TypingChange(self.doc.blocks.clone()));
    }

    pub(super) fn commit_structural(&mut self) {
        ensure_non_empty(&mut self.doc.blocks);
        self.selection.prune(&self.doc.blocks);
        if let Some(raw) = &self.raw_edit_block_id
            && self.doc.index_of(raw).is_none()
        {
            self.raw_edit_block_id = None;
        }
        self.history.record_structural(self.doc.clone());
        self.events
            .push(EditorEvent::StructuralChange(self.doc.blocks.clone()));
    }

    pub(super) fn focus(&mut self, target: FocusTarget) {
        self.events
            .push(EditorEvent::FocusBlock(target.block_id.clone()));
        self.focus_target = Some(target);
    }

    pub(super) fn close_popover(&mut self) {
        if self.interaction.is_popover() {
            self.interaction = Interaction::Idle;
        }
    }

    pub(super) fn next_generation(&mut self) -> u64 {
        self.next_link_generation += 1;
        self.next_link_generation
    }

    /// Inserts `block` after `index` (or appends), returning its index.
    pub(super) fn insert_after(&mut self, index: usize, block: Block) -> usize {
        let at = (index + 1).min(self.doc.blocks.len());
        self.doc.blocks.insert(at, block);
        at
    }

    // ----- text --------------------------------------------------------

    /// Apply the presentation layer's new text for a block.
    ///
    /// Paragraph shortcuts promote the block in place; otherwise the edit
    /// is a typing mutation and the slash and link popovers are re-derived
    /// from the text and caret.
    pub fn handle_text_change(
        &mut self,
        block_id: &BlockId,
        text: &str,
        caret: usize,
        now: Instant,
    ) {
        let Some(index) = self.doc.index_of(block_id) else {
            return;
        };
        let block = &self.doc.blocks[index];
        if !block.is_textual() {
            return;
        }

        if block.block_type() == BlockType::Paragraph
            && let Some(shortcut) = detect_shortcut(text)
        {
            self.close_popover();
            self.apply_shortcut(index, shortcut);
            return;
        }

        if block.text != text {
            self.doc.blocks[index].set_text(text);
            self.commit_typing(now);
        }
        self.refresh_popovers(index, caret);
    }

    fn apply_shortcut(&mut self, index: usize, shortcut: super::shortcuts::Shortcut) {
        let block = &mut self.doc.blocks[index];
        block.retype(shortcut.block_type);
        block.set_text(shortcut.text.clone());
        if let Some(meta) = block.checklist_meta_mut() {
            meta.checked = shortcut.checked;
            meta.created_at = Some(Utc::now());
        }
        let block_id = block.id.clone();
        debug!("promoted block {block_id} to {}", shortcut.block_type);

        let focus = if shortcut.block_type == BlockType::Divider {
            let next = self.ensure_successor(index);
            FocusTarget::start(self.doc.blocks[next].id.clone())
        } else {
            FocusTarget::end(block_id.clone())
        };
        self.commit_structural();
        if shortcut.block_type == BlockType::Checklist {
            self.events.push(EditorEvent::PromoteChecklist {
                block_id,
                text: shortcut.text,
            });
        }
        self.focus(focus);
    }

    /// Index of the block after `index`, appending an empty paragraph if
    /// `index` is last.
    pub(super) fn ensure_successor(&mut self, index: usize) -> usize {
        if index + 1 >= self.doc.blocks.len() {
            self.doc.blocks.push(Block::paragraph(""));
        }
        index + 1
    }

    fn refresh_popovers(&mut self, index: usize, caret: usize) {
        let block = &self.doc.blocks[index];
        if block.block_type() == BlockType::Code {
            self.close_popover();
            return;
        }
        let block_id = block.id.clone();
        let caret = clamp_offset(&block.text, caret);

        if let Some(query) = slash_query(&block.text) {
            let highlighted = match &self.interaction {
                Interaction::SlashMenu(menu) if menu.block_id == block_id && menu.query == query => {
                    menu.highlighted
                }
                _ => 0,
            };
            self.interaction = Interaction::SlashMenu(SlashMenu {
                block_id,
                query: query.to_string(),
                highlighted,
            });
            return;
        }

        if let Some(link) = unterminated_link_query(&block.text, caret) {
            if let Interaction::LinkAutocomplete(open) = &self.interaction
                && open.block_id == block_id
                && open.start == link.start
                && open.query == link.query
            {
                return;
            }
            let generation = self.next_generation();
            self.interaction = Interaction::LinkAutocomplete(LinkAutocomplete {
                block_id,
                start: link.start,
                query: link.query,
                results: Vec::new(),
                highlighted: 0,
                generation,
            });
            return;
        }

        self.close_popover();
    }

    pub fn set_title(&mut self, title: &str, now: Instant) {
        if self.doc.title == title {
            return;
        }
        self.doc.title = title.to_string();
        self.commit_typing(now);
    }

    // ----- slash menu --------------------------------------------------

    /// Retype the slash menu's block, clearing the `/query` text.
    pub fn apply_slash_command(&mut self, block_type: BlockType) -> bool {
        let Some(menu) = self.interaction.slash_menu().cloned() else {
            return false;
        };
        self.interaction = Interaction::Idle;
        let Some(index) = self.doc.index_of(&menu.block_id) else {
            return false;
        };

        let block = &mut self.doc.blocks[index];
        block.retype(block_type);
        block.text.clear();
        if let Some(meta) = block.checklist_meta_mut() {
            meta.checked = false;
            meta.created_at = Some(Utc::now());
        }

        let focus = if block_type == BlockType::Divider {
            let next = self.ensure_successor(index);
            FocusTarget::start(self.doc.blocks[next].id.clone())
        } else {
            FocusTarget::end(menu.block_id)
        };
        self.commit_structural();
        self.focus(focus);
        true
    }

    // ----- block operations ----------------------------------------------

    pub fn set_block_type(&mut self, block_id: &BlockId, block_type: BlockType) -> bool {
        let Some(index) = self.doc.index_of(block_id) else {
            return false;
        };
        if !self.doc.blocks[index].retype(block_type) {
            return false;
        }
        if block_type == BlockType::Divider {
            self.ensure_successor(index);
        }
        self.commit_structural();
        true
    }

    pub fn set_code_language(&mut self, block_id: &BlockId, language: Option<String>) -> bool {
        let language = language
            .map(|language| language.trim().to_string())
            .filter(|language| !language.is_empty());
        let Some(block) = self.doc.blocks.iter_mut().find(|b| &b.id == block_id) else {
            return false;
        };
        let BlockKind::Code { language: current } = &mut block.kind else {
            return false;
        };
        if *current == language {
            return false;
        }
        *current = language;
        self.commit_structural();
        true
    }

    /// Flip a heading's `collapsed` flag; any other block is left alone.
    pub fn toggle_collapse(&mut self, block_id: &BlockId) -> bool {
        let Some(block) = self.doc.blocks.iter_mut().find(|b| &b.id == block_id) else {
            return false;
        };
        let BlockKind::Heading { collapsed, .. } = &mut block.kind else {
            return false;
        };
        *collapsed = !*collapsed;
        self.commit_structural();
        true
    }

    pub fn toggle_checked(&mut self, block_id: &BlockId) -> bool {
        let Some(block) = self.doc.blocks.iter_mut().find(|b| &b.id == block_id) else {
            return false;
        };
        let Some(meta) = block.checklist_meta_mut() else {
            return false;
        };
        let checked = !meta.checked;
        meta.set_checked(checked, Utc::now());
        let task_id = meta.task_id.clone();
        self.commit_structural();
        if let Some(task_id) = task_id {
            self.events
                .push(EditorEvent::ChecklistToggleTask { task_id, checked });
        }
        true
    }

    pub fn move_block(&mut self, block_id: &BlockId, direction: MoveDirection) -> bool {
        let Some(index) = self.doc.index_of(block_id) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.doc.blocks.len() => index + 1,
            _ => return false,
        };
        self.doc.blocks.swap(index, target);
        self.commit_structural();
        self.focus(FocusTarget::end(block_id.clone()));
        true
    }

    /// Insert a copy of the block right after it, under a fresh id.
    pub fn duplicate_block(&mut self, block_id: &BlockId) -> Option<BlockId> {
        let index = self.doc.index_of(block_id)?;
        let mut copy = self.doc.blocks[index].clone();
        copy.id = BlockId::new();
        let id = copy.id.clone();
        self.insert_after(index, copy);
        self.commit_structural();
        self.focus(FocusTarget::end(id.clone()));
        Some(id)
    }

    /// Switch a block between masked links and raw markup editing.
    pub fn toggle_raw_edit(&mut self, block_id: &BlockId) {
        if self.raw_edit_block_id.as_ref() == Some(block_id) {
            self.raw_edit_block_id = None;
        } else if self.doc.index_of(block_id).is_some() {
            self.raw_edit_block_id = Some(block_id.clone());
        }
    }

    // ----- selection -----------------------------------------------------

    pub fn click_block(&mut self, block_id: &BlockId, modifiers: ClickModifiers) {
        if self.doc.index_of(block_id).is_none() {
            return;
        }
        self.selection
            .click(&self.doc.blocks, block_id.clone(), modifiers);
    }

    pub fn begin_range_select(&mut self, block_id: &BlockId) {
        if self.doc.index_of(block_id).is_some() {
            self.selection.begin_range(block_id.clone());
        }
    }

    pub fn extend_range_select(&mut self, hover: &BlockId) {
        self.selection.extend_range(&self.doc.blocks, hover);
    }

    pub fn end_range_select(&mut self) {
        self.selection.end_range();
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.doc.blocks);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// The selected blocks rendered as markdown, in document order.
    pub fn selection_markdown(&self) -> String {
        let selected: Vec<Block> = self
            .doc
            .blocks
            .iter()
            .filter(|block| self.selection.contains(&block.id))
            .cloned()
            .collect();
        blocks_to_text(&selected)
    }

    /// Remove every selected block in one step. An emptied document keeps
    /// a single empty paragraph.
    pub fn delete_selected(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let first = self
            .doc
            .blocks
            .iter()
            .position(|block| self.selection.contains(&block.id))
            .unwrap_or(0);
        self.doc
            .blocks
            .retain(|block| !self.selection.contains(&block.id));
        self.selection.clear();
        self.close_popover();
        self.commit_structural();

        let focus_index = first.saturating_sub(1).min(self.doc.blocks.len() - 1);
        let target = if first == 0 {
            FocusTarget::start(self.doc.blocks[0].id.clone())
        } else {
            FocusTarget::end(self.doc.blocks[focus_index].id.clone())
        };
        self.focus(target);
        true
    }

    // ----- focus & lifecycle ---------------------------------------------

    /// Host-driven caret placement. A nonce seen last time is ignored.
    pub fn apply_focus_request(&mut self, request: FocusRequest) -> bool {
        if self.last_focus_nonce == Some(request.nonce) {
            return false;
        }
        self.last_focus_nonce = Some(request.nonce);
        let Some(block) = self.doc.block(&request.block_id) else {
            return false;
        };
        let target = match request.placement {
            FocusPlacement::Position(position) => FocusTarget::at(block.id.clone(), position),
            FocusPlacement::Selection { start, end } => {
                let start = clamp_offset(&block.text, start);
                let end = clamp_offset(&block.text, end).max(start);
                FocusTarget::caret(block.id.clone(), start, end)
            }
        };
        self.focus_target = Some(target);
        true
    }

    /// Drive the typing debounce from the host's event loop.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.history.tick(now)
    }

    /// Focus left the editor: commit pending typing and close popovers.
    pub fn blur(&mut self) {
        self.history.flush();
        self.close_popover();
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.doc = snapshot;
        self.interaction = Interaction::Idle;
        self.selection.prune(&self.doc.blocks);
        self.events
            .push(EditorEvent::StructuralChange(self.doc.blocks.clone()));
    }
}
