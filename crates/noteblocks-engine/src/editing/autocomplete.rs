//! Wikilink autocomplete and the legacy-link upgrade pass.
//!
//! Host lookups are asynchronous, so each round trip is split in two: a
//! `begin_*` call hands out a request tagged with a generation, and the
//! matching `finish_*` call applies the result only if that generation is
//! still current.

use std::time::Instant;

use log::{debug, warn};

use crate::host::{HostError, NoteSummary, Resolution};
use crate::links::{
    LinkResolutionPass, canonical_link, legacy_titles, partition_results, replace_range,
    upgrade_legacy_links,
};
use crate::models::FocusTarget;

use super::controller::EditController;
use super::events::{EditorEvent, KeyOutcome, LinkSearchRequest, Notice, NoteCreationRequest};
use super::interaction::Interaction;

impl EditController {
    /// The search the host should run for the open autocomplete popover.
    pub fn begin_link_search(&self) -> Option<LinkSearchRequest> {
        let auto = self.interaction.link_autocomplete()?;
        Some(LinkSearchRequest {
            generation: auto.generation,
            query: auto.query.clone(),
            limit: self.options.link_search_limit,
        })
    }

    /// Store search results if the popover still shows the same query.
    /// A failed search clears the results and leaves the popover open.
    pub fn finish_link_search(
        &mut self,
        request: &LinkSearchRequest,
        result: Result<Vec<NoteSummary>, HostError>,
    ) -> bool {
        let Interaction::LinkAutocomplete(auto) = &mut self.interaction else {
            return false;
        };
        if auto.generation != request.generation {
            debug!("dropping stale link search for {:?}", request.query);
            return false;
        }
        auto.highlighted = 0;
        match result {
            Ok(mut results) => {
                results.truncate(request.limit);
                auto.results = results;
            }
            Err(err) => {
                auto.results.clear();
                warn!("link search for {:?} failed: {err}", request.query);
                self.events.push(EditorEvent::Notice(Notice::new(format!(
                    "Could not search notes: {err}"
                ))));
            }
        }
        true
    }

    /// Enter in the popover: link the highlighted note, or ask the host to
    /// create one named after the query.
    pub(super) fn confirm_link_autocomplete(&mut self) -> KeyOutcome {
        let Some(auto) = self.interaction.link_autocomplete() else {
            return KeyOutcome::Default;
        };
        if let Some(note) = auto.highlighted_result().cloned() {
            self.insert_link(&note);
            return KeyOutcome::Handled;
        }
        if auto.offers_create() {
            return KeyOutcome::CreateNote(NoteCreationRequest {
                generation: auto.generation,
                title: auto.query.trim().to_string(),
            });
        }
        self.interaction = Interaction::Idle;
        KeyOutcome::Default
    }

    /// Choose a specific search result, e.g. from a mouse click.
    pub fn select_link_result(&mut self, index: usize) -> bool {
        let Some(note) = self
            .interaction
            .link_autocomplete()
            .and_then(|auto| auto.results.get(index))
            .cloned()
        else {
            return false;
        };
        self.insert_link(&note)
    }

    /// Link the note the host just created. On failure the popover resets.
    pub fn finish_note_creation(
        &mut self,
        request: &NoteCreationRequest,
        result: Result<NoteSummary, HostError>,
    ) -> bool {
        let current = self
            .interaction
            .link_autocomplete()
            .is_some_and(|auto| auto.generation == request.generation);
        if !current {
            debug!("dropping stale note creation for {:?}", request.title);
            return false;
        }
        match result {
            Ok(note) => self.insert_link(&note),
            Err(err) => {
                warn!("creating note {:?} failed: {err}", request.title);
                self.interaction = Interaction::Idle;
                self.events.push(EditorEvent::Notice(Notice::new(format!(
                    "Could not create note \"{}\": {err}",
                    request.title
                ))));
                false
            }
        }
    }

    pub fn dismiss_link_autocomplete(&mut self) {
        if self.interaction.link_autocomplete().is_some() {
            self.interaction = Interaction::Idle;
        }
    }

    /// Replace the `[[query` span with a canonical link plus a trailing
    /// space, and put the caret after it.
    fn insert_link(&mut self, note: &NoteSummary) -> bool {
        let Interaction::LinkAutocomplete(auto) = std::mem::take(&mut self.interaction) else {
            return false;
        };
        let Some(index) = self.doc.index_of(&auto.block_id) else {
            return false;
        };

        let link = format!("{} ", canonical_link(&note.id, &note.title));
        let block = &mut self.doc.blocks[index];
        let updated = replace_range(&block.text, auto.start, auto.query_end(), &link);
        if updated == block.text {
            return false;
        }
        block.text = updated;
        let caret = auto.start + link.len();
        // one undo step together with the burst that typed the query
        self.commit_typing(Instant::now());
        self.history.flush();
        self.focus(FocusTarget::caret(auto.block_id, caret, caret));
        true
    }

    // ----- legacy link upgrade -------------------------------------------

    /// Collect the distinct legacy titles for the host to resolve. `None`
    /// when the document has no legacy links.
    pub fn begin_link_resolution(&mut self) -> Option<LinkResolutionPass> {
        let titles = legacy_titles(&self.doc.blocks);
        if titles.is_empty() {
            return None;
        }
        debug!("resolving {} legacy link titles", titles.len());
        Some(LinkResolutionPass {
            generation: self.doc_generation,
            titles,
        })
    }

    /// Rewrite legacy links whose titles resolved to a single note, as one
    /// structural change. Results for another document are discarded.
    pub fn finish_link_resolution(
        &mut self,
        pass: &LinkResolutionPass,
        results: Vec<(String, Resolution)>,
    ) -> bool {
        if pass.generation != self.doc_generation {
            debug!("dropping link resolution for generation {}", pass.generation);
            return false;
        }
        let (resolved, ambiguous) = partition_results(results);
        self.ambiguous_titles = ambiguous;
        if resolved.is_empty() {
            return false;
        }

        let changed = upgrade_legacy_links(&mut self.doc.blocks, &resolved);
        if changed.is_empty() {
            return false;
        }
        debug!("upgraded legacy links in {} blocks", changed.len());
        self.commit_structural();
        true
    }
}
