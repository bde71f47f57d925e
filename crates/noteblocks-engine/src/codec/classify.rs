use std::sync::LazyLock;

use regex::Regex;

use crate::models::HeadingLevel;

static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^```\s*(\S*)").unwrap());
static DIVIDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:---|\*\*\*|___)$").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").unwrap());
static CHECKLIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s+\[([ xX])\](?:\s+(.*))?$").unwrap());
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-*]\s+(.*)$").unwrap());
static NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\s+(.*)$").unwrap());
static CALLOUT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>\s*(.*)$").unwrap());

/// Classification of a single physical line, from local facts only.
///
/// Fence lines are recognised everywhere; every other class only applies
/// outside a code fence, which the builder decides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Fence { language: Option<String> },
    Blank,
    Divider,
    Heading { level: HeadingLevel, text: String },
    Checklist { checked: bool, text: String },
    Bullet { text: String },
    Numbered { text: String },
    Callout { text: String },
    Text { text: String },
}

/// Classifies one line (without its terminator). First match wins.
pub fn classify(line: &str) -> LineClass {
    let trimmed = line.trim_start();

    if let Some(caps) = FENCE.captures(trimmed) {
        let language = caps
            .get(1)
            .map(|m| m.as_str().trim())
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);
        return LineClass::Fence { language };
    }
    if trimmed.trim().is_empty() {
        return LineClass::Blank;
    }
    if DIVIDER.is_match(trimmed.trim_end()) {
        return LineClass::Divider;
    }
    if let Some(caps) = HEADING.captures(trimmed) {
        return LineClass::Heading {
            level: HeadingLevel::from_hashes(caps[1].len()),
            text: capture_text(caps.get(2)),
        };
    }
    if let Some(caps) = CHECKLIST.captures(trimmed) {
        return LineClass::Checklist {
            checked: caps[1].eq_ignore_ascii_case("x"),
            text: capture_text(caps.get(2)),
        };
    }
    if let Some(caps) = BULLET.captures(trimmed) {
        return LineClass::Bullet {
            text: capture_text(caps.get(1)),
        };
    }
    if let Some(caps) = NUMBERED.captures(trimmed) {
        return LineClass::Numbered {
            text: capture_text(caps.get(1)),
        };
    }
    if let Some(caps) = CALLOUT.captures(trimmed) {
        return LineClass::Callout {
            text: capture_text(caps.get(1)),
        };
    }
    LineClass::Text {
        text: trimmed.trim_end().to_string(),
    }
}

/// Whether a line closes an open code fence.
pub fn closes_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

fn capture_text(m: Option<regex::Match<'_>>) -> String {
    m.map(|m| m.as_str().trim().to_string()).unwrap_or_default()
}
