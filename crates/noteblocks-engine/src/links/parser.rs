use super::{cursor::Cursor, kinds::WikiLink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WikilinkKind {
    /// Canonical `[[id:<id>|<display>]]` link.
    Id,
    /// Legacy `[[<Title>]]` link.
    Title,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikilinkTarget {
    Id { id: String, display: Option<String> },
    Title { title: String },
}

/// A positioned wikilink token. Never stored; recomputed from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedWikilink {
    /// Byte offset of the opening `[[`.
    pub start: usize,
    /// Byte offset just past the closing `]]`.
    pub end: usize,
    /// The full token text including brackets.
    pub raw: String,
    pub target: WikilinkTarget,
}

impl ParsedWikilink {
    pub fn kind(&self) -> WikilinkKind {
        match self.target {
            WikilinkTarget::Id { .. } => WikilinkKind::Id,
            WikilinkTarget::Title { .. } => WikilinkKind::Title,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match &self.target {
            WikilinkTarget::Id { id, .. } => Some(id),
            WikilinkTarget::Title { .. } => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match &self.target {
            WikilinkTarget::Title { title } => Some(title),
            WikilinkTarget::Id { .. } => None,
        }
    }

    pub fn display(&self) -> Option<&str> {
        match &self.target {
            WikilinkTarget::Id { display, .. } => display.as_deref(),
            WikilinkTarget::Title { .. } => None,
        }
    }

    /// The text shown in place of the token when links are masked.
    pub fn label(&self) -> &str {
        match &self.target {
            WikilinkTarget::Id { id, display } => display.as_deref().unwrap_or(id),
            WikilinkTarget::Title { title } => title,
        }
    }

    /// Canonical serialization of this token.
    pub fn to_markup(&self) -> String {
        match &self.target {
            WikilinkTarget::Id { id, display } => match display {
                Some(display) => canonical_link(id, display),
                None => format!("[[{}{id}]]", WikiLink::ID_PREFIX),
            },
            WikilinkTarget::Title { title } => format!("[[{title}]]"),
        }
    }
}

/// Scans `text` for `[[payload]]` tokens, where the payload is non-empty
/// and contains no bracket or newline.
///
/// Malformed or empty tokens are skipped, never reported as errors.
pub fn parse_wikilinks(text: &str) -> Vec<ParsedWikilink> {
    let mut cur = Cursor::new(text);
    let mut out = vec![];

    while !cur.eof() {
        if let Some(link) = try_parse_wikilink(&mut cur) {
            out.push(link);
            continue;
        }
        cur.bump();
    }
    out
}

/// Attempts to parse a wikilink at the current position.
///
/// On failure the cursor is restored so the caller can advance by one byte.
fn try_parse_wikilink(cur: &mut Cursor<'_>) -> Option<ParsedWikilink> {
    if !cur.starts_with(WikiLink::OPEN) {
        return None;
    }

    let saved = cur.clone();
    let start = cur.pos();
    cur.bump_n(WikiLink::OPEN.len());
    let payload_start = cur.pos();

    while let Some(b) = cur.peek() {
        if WikiLink::is_payload_stop(b) {
            break;
        }
        cur.bump();
    }
    let payload_end = cur.pos();

    if payload_end == payload_start || !cur.starts_with(WikiLink::CLOSE) {
        *cur = saved;
        return None;
    }
    cur.bump_n(WikiLink::CLOSE.len());
    let end = cur.pos();

    // Blank payloads hold no `[[`, so rescanning from the next byte is safe.
    let Some(target) = parse_payload(cur.slice(payload_start, payload_end)) else {
        *cur = saved;
        return None;
    };

    Some(ParsedWikilink {
        start,
        end,
        raw: cur.slice(start, end).to_string(),
        target,
    })
}

fn parse_payload(payload: &str) -> Option<WikilinkTarget> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return None;
    }

    let prefix_len = WikiLink::ID_PREFIX.len();
    let has_id_prefix = trimmed
        .get(..prefix_len)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(WikiLink::ID_PREFIX));
    if !has_id_prefix {
        return Some(WikilinkTarget::Title {
            title: trimmed.to_string(),
        });
    }

    let rest = &trimmed[prefix_len..];
    let (id, display) = match rest.split_once(WikiLink::DISPLAY) {
        Some((id, display)) => (id, Some(display)),
        None => (rest, None),
    };
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    Some(WikilinkTarget::Id {
        id: id.to_string(),
        display: display
            .map(str::trim)
            .filter(|display| !display.is_empty())
            .map(str::to_string),
    })
}

/// Formats the canonical link token for a note.
pub fn canonical_link(id: &str, display: &str) -> String {
    format!("[[{}{id}{}{display}]]", WikiLink::ID_PREFIX, WikiLink::DISPLAY)
}

/// Splices `replacement` into `text` over `start..end`.
///
/// Out-of-bounds, inverted or non-char-boundary ranges return the text
/// unchanged.
pub fn replace_range(text: &str, start: usize, end: usize, replacement: &str) -> String {
    if start > end
        || end > text.len()
        || !text.is_char_boundary(start)
        || !text.is_char_boundary(end)
    {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() - (end - start) + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    out
}

/// Renders every link as its label: the display text of canonical links
/// (falling back to the id) and the title of legacy links.
pub fn mask_wikilinks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for link in parse_wikilinks(text) {
        out.push_str(&text[last..link.start]);
        out.push_str(link.label());
        last = link.end;
    }
    out.push_str(&text[last..]);
    out
}
