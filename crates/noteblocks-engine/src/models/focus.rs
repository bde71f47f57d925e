use super::block::BlockId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPosition {
    Start,
    End,
}

/// One-shot instruction for the presentation layer to move input focus.
///
/// Taken (and thereby consumed) with `EditController::take_focus_target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTarget {
    pub block_id: BlockId,
    pub position: Option<FocusPosition>,
    pub selection_start: Option<usize>,
    pub selection_end: Option<usize>,
}

impl FocusTarget {
    pub fn start(block_id: BlockId) -> Self {
        Self::at(block_id, FocusPosition::Start)
    }

    pub fn end(block_id: BlockId) -> Self {
        Self::at(block_id, FocusPosition::End)
    }

    pub fn at(block_id: BlockId, position: FocusPosition) -> Self {
        Self {
            block_id,
            position: Some(position),
            selection_start: None,
            selection_end: None,
        }
    }

    /// Caret (or selection) at explicit byte offsets.
    pub fn caret(block_id: BlockId, start: usize, end: usize) -> Self {
        Self {
            block_id,
            position: None,
            selection_start: Some(start),
            selection_end: Some(end),
        }
    }
}

/// Where a host-driven focus request should put the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPlacement {
    Position(FocusPosition),
    Selection { start: usize, end: usize },
}

/// Host-driven caret placement. A changed `nonce` marks a new request even
/// when the block id repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusRequest {
    pub block_id: BlockId,
    pub placement: FocusPlacement,
    pub nonce: u64,
}
