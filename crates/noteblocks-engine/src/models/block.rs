use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Opaque block identifier, stable for the lifetime of a block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Mint a fresh identifier (UUID v4).
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BlockId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The field-less discriminant of [`BlockKind`], used by menus and commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    Paragraph,
    H1,
    H2,
    H3,
    Bullet,
    Numbered,
    Checklist,
    Callout,
    Code,
    Divider,
}

impl BlockType {
    pub const ALL: [BlockType; 10] = [
        BlockType::Paragraph,
        BlockType::H1,
        BlockType::H2,
        BlockType::H3,
        BlockType::Bullet,
        BlockType::Numbered,
        BlockType::Checklist,
        BlockType::Callout,
        BlockType::Code,
        BlockType::Divider,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::H1 => "h1",
            BlockType::H2 => "h2",
            BlockType::H3 => "h3",
            BlockType::Bullet => "bullet",
            BlockType::Numbered => "numbered",
            BlockType::Checklist => "checklist",
            BlockType::Callout => "callout",
            BlockType::Code => "code",
            BlockType::Divider => "divider",
        }
    }

    pub fn heading_level(self) -> Option<HeadingLevel> {
        match self {
            BlockType::H1 => Some(HeadingLevel::H1),
            BlockType::H2 => Some(HeadingLevel::H2),
            BlockType::H3 => Some(HeadingLevel::H3),
            _ => None,
        }
    }

    pub fn is_heading(self) -> bool {
        self.heading_level().is_some()
    }

    /// Types where Enter continues with a sibling of the same type.
    pub fn is_list_like(self) -> bool {
        matches!(
            self,
            BlockType::Bullet | BlockType::Numbered | BlockType::Checklist
        )
    }

    /// Every type except the divider carries editable text.
    pub fn is_textual(self) -> bool {
        !matches!(self, BlockType::Divider)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown block type: {0}")]
pub struct UnknownBlockType(pub String);

impl FromStr for BlockType {
    type Err = UnknownBlockType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| UnknownBlockType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a markdown `#` count to a level; 3 and deeper collapse to `H3`.
    pub fn from_hashes(count: usize) -> Self {
        match count {
            0 | 1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    pub fn block_type(self) -> BlockType {
        match self {
            HeadingLevel::H1 => BlockType::H1,
            HeadingLevel::H2 => BlockType::H2,
            HeadingLevel::H3 => BlockType::H3,
        }
    }
}

/// Task metadata carried only by checklist blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChecklistMeta {
    pub checked: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub done_at: Option<DateTime<Utc>>,
    pub due: Option<String>,
    pub snoozed_until: Option<String>,
    pub priority: Option<String>,
    pub tags: Vec<String>,
    pub task_id: Option<String>,
    pub recurrence: Option<String>,
}

impl ChecklistMeta {
    pub fn new(checked: bool) -> Self {
        Self {
            checked,
            ..Self::default()
        }
    }

    /// Flip the checkbox, stamping `done_at` when it becomes checked.
    pub fn set_checked(&mut self, checked: bool, now: DateTime<Utc>) {
        self.checked = checked;
        self.done_at = checked.then_some(now);
    }
}

/// Block variant with only the fields legal for that type.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Paragraph,
    Heading {
        level: HeadingLevel,
        collapsed: bool,
    },
    Bullet,
    Numbered,
    Checklist(ChecklistMeta),
    Callout,
    Code {
        language: Option<String>,
    },
    Divider,
}

impl BlockKind {
    /// Fresh variant for `ty` with every type-specific field at its default.
    pub fn for_type(ty: BlockType) -> Self {
        match ty {
            BlockType::Paragraph => BlockKind::Paragraph,
            BlockType::H1 | BlockType::H2 | BlockType::H3 => BlockKind::Heading {
                level: ty.heading_level().unwrap_or(HeadingLevel::H1),
                collapsed: false,
            },
            BlockType::Bullet => BlockKind::Bullet,
            BlockType::Numbered => BlockKind::Numbered,
            BlockType::Checklist => BlockKind::Checklist(ChecklistMeta::default()),
            BlockType::Callout => BlockKind::Callout,
            BlockType::Code => BlockKind::Code { language: None },
            BlockType::Divider => BlockKind::Divider,
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Paragraph => BlockType::Paragraph,
            BlockKind::Heading { level, .. } => level.block_type(),
            BlockKind::Bullet => BlockType::Bullet,
            BlockKind::Numbered => BlockType::Numbered,
            BlockKind::Checklist(_) => BlockType::Checklist,
            BlockKind::Callout => BlockType::Callout,
            BlockKind::Code { .. } => BlockType::Code,
            BlockKind::Divider => BlockType::Divider,
        }
    }
}

/// One typed unit of document content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub id: BlockId,
    pub text: String,
    pub kind: BlockKind,
}

impl Block {
    /// Create a block with a freshly minted id.
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        let mut block = Self {
            id: BlockId::new(),
            text: text.into(),
            kind,
        };
        if matches!(block.kind, BlockKind::Divider) {
            block.text.clear();
        }
        block
    }

    pub fn of_type(ty: BlockType, text: impl Into<String>) -> Self {
        Self::new(BlockKind::for_type(ty), text)
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    pub fn heading(level: HeadingLevel, text: impl Into<String>) -> Self {
        Self::new(
            BlockKind::Heading {
                level,
                collapsed: false,
            },
            text,
        )
    }

    pub fn checklist(text: impl Into<String>, checked: bool) -> Self {
        Self::new(BlockKind::Checklist(ChecklistMeta::new(checked)), text)
    }

    pub fn code(language: Option<String>, text: impl Into<String>) -> Self {
        Self::new(BlockKind::Code { language }, text)
    }

    pub fn divider() -> Self {
        Self::new(BlockKind::Divider, "")
    }

    pub fn with_id(mut self, id: impl Into<BlockId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    pub fn is_textual(&self) -> bool {
        self.block_type().is_textual()
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(
            self.kind,
            BlockKind::Heading {
                collapsed: true,
                ..
            }
        )
    }

    pub fn checklist_meta(&self) -> Option<&ChecklistMeta> {
        match &self.kind {
            BlockKind::Checklist(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn checklist_meta_mut(&mut self) -> Option<&mut ChecklistMeta> {
        match &mut self.kind {
            BlockKind::Checklist(meta) => Some(meta),
            _ => None,
        }
    }

    /// Replace the text, keeping dividers empty.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if self.is_textual() {
            self.text = text.into();
        }
    }

    /// Convert to another type in place. Every field foreign to the new
    /// type is dropped; converting to the current type is a no-op.
    /// Returns whether anything changed.
    pub fn retype(&mut self, ty: BlockType) -> bool {
        if self.block_type() == ty {
            return false;
        }
        self.kind = BlockKind::for_type(ty);
        if !ty.is_textual() {
            self.text.clear();
        }
        true
    }
}

/// Flat persisted form. Deserialization is lenient: unknown types become
/// paragraphs and malformed fields fall back to their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    block_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    checked: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    done_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    due: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    snoozed_until: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    priority: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    task_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    meta: Option<RawMeta>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    collapsed: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawMeta {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    recurrence: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(serde::de::IgnoredAny),
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Valid(value) => Some(value),
        Lenient::Invalid(_) => None,
    })
}

impl From<RawBlock> for Block {
    fn from(raw: RawBlock) -> Self {
        let ty = raw
            .block_type
            .as_deref()
            .and_then(|ty| ty.parse::<BlockType>().ok())
            .unwrap_or(BlockType::Paragraph);

        let kind = match ty {
            BlockType::Checklist => BlockKind::Checklist(ChecklistMeta {
                checked: raw.checked.unwrap_or(false),
                created_at: raw.created_at,
                done_at: raw.done_at,
                due: raw.due,
                snoozed_until: raw.snoozed_until,
                priority: raw.priority,
                tags: raw.tags.unwrap_or_default(),
                task_id: raw.task_id,
                recurrence: raw.meta.and_then(|meta| meta.recurrence),
            }),
            BlockType::Code => BlockKind::Code {
                language: raw.language.filter(|lang| !lang.trim().is_empty()),
            },
            BlockType::H1 | BlockType::H2 | BlockType::H3 => BlockKind::Heading {
                level: ty.heading_level().unwrap_or(HeadingLevel::H1),
                collapsed: raw.collapsed.unwrap_or(false),
            },
            other => BlockKind::for_type(other),
        };

        let mut block = Block::new(kind, raw.text.unwrap_or_default());
        if let Some(id) = raw.id.filter(|id| !id.is_empty()) {
            block.id = BlockId::from(id);
        }
        block
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        let mut raw = RawBlock {
            id: Some(block.id.0),
            block_type: Some(block.kind.block_type().as_str().to_string()),
            text: Some(block.text),
            ..RawBlock::default()
        };
        match block.kind {
            BlockKind::Heading { collapsed, .. } => raw.collapsed = Some(collapsed),
            BlockKind::Checklist(meta) => {
                raw.checked = Some(meta.checked);
                raw.created_at = meta.created_at;
                raw.done_at = meta.done_at;
                raw.due = meta.due;
                raw.snoozed_until = meta.snoozed_until;
                raw.priority = meta.priority;
                raw.tags = (!meta.tags.is_empty()).then_some(meta.tags);
                raw.task_id = meta.task_id;
                raw.meta = meta.recurrence.map(|recurrence| RawMeta {
                    recurrence: Some(recurrence),
                });
            }
            BlockKind::Code { language } => raw.language = language,
            _ => {}
        }
        raw
    }
}
