use crate::host::NoteSummary;
use crate::links::kinds::WikiLink;
use crate::models::BlockId;

/// The one transient gesture or popover that may be active at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    SlashMenu(SlashMenu),
    LinkAutocomplete(LinkAutocomplete),
    Dragging(DragState),
}

impl Interaction {
    pub fn is_popover(&self) -> bool {
        matches!(
            self,
            Interaction::SlashMenu(_) | Interaction::LinkAutocomplete(_)
        )
    }

    /// Block the open popover belongs to, if any.
    pub fn popover_block(&self) -> Option<&BlockId> {
        match self {
            Interaction::SlashMenu(menu) => Some(&menu.block_id),
            Interaction::LinkAutocomplete(auto) => Some(&auto.block_id),
            _ => None,
        }
    }

    pub fn slash_menu(&self) -> Option<&SlashMenu> {
        match self {
            Interaction::SlashMenu(menu) => Some(menu),
            _ => None,
        }
    }

    pub fn link_autocomplete(&self) -> Option<&LinkAutocomplete> {
        match self {
            Interaction::LinkAutocomplete(auto) => Some(auto),
            _ => None,
        }
    }

    pub fn dragging(&self) -> Option<&DragState> {
        match self {
            Interaction::Dragging(drag) => Some(drag),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashMenu {
    pub block_id: BlockId,
    pub query: String,
    pub highlighted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAutocomplete {
    pub block_id: BlockId,
    /// Byte offset of the `[[` that opened the query.
    pub start: usize,
    pub query: String,
    pub results: Vec<NoteSummary>,
    pub highlighted: usize,
    /// Bumped whenever the query changes; stale search results are dropped.
    pub generation: u64,
}

impl LinkAutocomplete {
    /// Byte offset just past the typed query.
    pub fn query_end(&self) -> usize {
        self.start + WikiLink::OPEN.len() + self.query.len()
    }

    /// With no results, a non-empty query offers a synthesized
    /// "create note" row.
    pub fn offers_create(&self) -> bool {
        self.results.is_empty() && !self.query.trim().is_empty()
    }

    pub fn row_count(&self) -> usize {
        if self.offers_create() {
            1
        } else {
            self.results.len()
        }
    }

    pub fn highlighted_result(&self) -> Option<&NoteSummary> {
        self.results.get(self.highlighted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub block_id: BlockId,
    pub position: DropPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub source: BlockId,
    pub over: Option<DropTarget>,
}

/// Moves a highlight by `delta` rows, wrapping within `len`.
pub fn cycle(current: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as isize;
    ((current as isize + delta).rem_euclid(len)) as usize
}
