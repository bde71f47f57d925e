//! Markdown-style prefixes typed into a paragraph that turn it into another
//! block type.

use crate::models::BlockType;

/// A recognized shortcut: the type to promote to and the text left once the
/// shortcut syntax is stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub block_type: BlockType,
    pub text: String,
    pub checked: bool,
}

impl Shortcut {
    fn new(block_type: BlockType, text: &str) -> Self {
        Self {
            block_type,
            text: text.to_string(),
            checked: false,
        }
    }
}

const DIVIDERS: [&str; 3] = ["---", "***", "___"];

/// `(marker, checked)`; each marker may be followed by whitespace.
const CHECKLIST_MARKERS: [(&str, bool); 4] =
    [("@[ ]", false), ("@x", true), ("- [ ]", false), ("[ ]", false)];

const PREFIXES: [(&str, BlockType); 6] = [
    ("# ", BlockType::H1),
    ("## ", BlockType::H2),
    ("### ", BlockType::H3),
    ("- ", BlockType::Bullet),
    ("1. ", BlockType::Numbered),
    ("> ", BlockType::Callout),
];

/// Matches the paragraph text against the shortcut table, first match wins.
pub fn detect_shortcut(text: &str) -> Option<Shortcut> {
    if DIVIDERS.contains(&text) {
        return Some(Shortcut::new(BlockType::Divider, ""));
    }

    if let Some(rest) = text.strip_prefix('!') {
        return Some(Shortcut::new(BlockType::Code, rest));
    }

    for (marker, checked) in CHECKLIST_MARKERS {
        let Some(rest) = text.strip_prefix(marker) else {
            continue;
        };
        // `@x` must stand alone so words like "@xavier" stay text
        if checked && rest.starts_with(|c: char| !c.is_whitespace()) {
            continue;
        }
        return Some(Shortcut {
            checked,
            ..Shortcut::new(BlockType::Checklist, rest.trim_start())
        });
    }

    PREFIXES.iter().find_map(|(prefix, block_type)| {
        text.strip_prefix(prefix)
            .map(|rest| Shortcut::new(*block_type, rest))
    })
}
