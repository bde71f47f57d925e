use crate::models::BlockType;

/// One row of the `/` command menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlashCommand {
    pub id: &'static str,
    pub label: &'static str,
    pub block_type: BlockType,
}

pub const SLASH_COMMANDS: [SlashCommand; 10] = [
    SlashCommand { id: "text", label: "Text", block_type: BlockType::Paragraph },
    SlashCommand { id: "h1", label: "Heading 1", block_type: BlockType::H1 },
    SlashCommand { id: "h2", label: "Heading 2", block_type: BlockType::H2 },
    SlashCommand { id: "h3", label: "Heading 3", block_type: BlockType::H3 },
    SlashCommand { id: "bullet", label: "Bulleted list", block_type: BlockType::Bullet },
    SlashCommand { id: "numbered", label: "Numbered list", block_type: BlockType::Numbered },
    SlashCommand { id: "todo", label: "To-do list", block_type: BlockType::Checklist },
    SlashCommand { id: "callout", label: "Callout", block_type: BlockType::Callout },
    SlashCommand { id: "code", label: "Code", block_type: BlockType::Code },
    SlashCommand { id: "divider", label: "Divider", block_type: BlockType::Divider },
];

/// Commands whose id or label contains `query`, case-insensitively.
/// Prefix matches sort ahead of other substring matches.
pub fn filter_commands(query: &str) -> Vec<SlashCommand> {
    let query = query.to_lowercase();
    let hit = |command: &SlashCommand, test: fn(&str, &str) -> bool| {
        test(command.id, &query) || test(&command.label.to_lowercase(), &query)
    };

    let (mut prefixed, substring): (Vec<SlashCommand>, Vec<SlashCommand>) = SLASH_COMMANDS
        .into_iter()
        .filter(|command| hit(command, |s, q| s.contains(q)))
        .partition(|command| hit(command, |s, q| s.starts_with(q)));
    prefixed.extend(substring);
    prefixed
}

/// The slash query typed so far: text after a leading `/` up to the first
/// whitespace. `None` when the text does not start with `/`.
pub fn slash_query(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('/')?;
    Some(rest.split(char::is_whitespace).next().unwrap_or(""))
}
