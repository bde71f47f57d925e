use super::kinds::WikiLink;

/// An open `[[query` span that has not been closed before the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkQuery {
    /// Byte offset of the opening `[[`.
    pub start: usize,
    /// Text between the brackets and the caret.
    pub query: String,
}

impl LinkQuery {
    /// Byte offset just past the query text, i.e. the caret it was taken at.
    pub fn end(&self) -> usize {
        self.start + WikiLink::OPEN.len() + self.query.len()
    }
}

/// Clamps `offset` into `text` and down to the previous char boundary.
pub fn clamp_offset(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Detects an unterminated `[[` at or before the caret.
///
/// The last `[[` before the caret opens a query when no `]` or newline
/// sits between it and the caret.
pub fn unterminated_link_query(text: &str, caret: usize) -> Option<LinkQuery> {
    let caret = clamp_offset(text, caret);
    let before = &text[..caret];
    let open = std::str::from_utf8(WikiLink::OPEN).ok()?;
    let start = before.rfind(open)?;
    let query = &before[start + open.len()..];
    if query.bytes().any(|b| b == b']' || b == b'\n') {
        return None;
    }
    Some(LinkQuery {
        start,
        query: query.to_string(),
    })
}
