use noteblocks_engine::editing::Interaction;
use noteblocks_engine::links::{clamp_offset, mask_wikilinks};
use noteblocks_engine::models::{Block, BlockKind, BlockType};
use noteblocks_engine::outline::Layout as Outline;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block as Panel, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, Pane};

const CARET: char = '▏';

pub fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)])
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(rows[0]);

    render_files(f, app, chunks[0]);
    render_editor(f, app, chunks[1]);
    render_status(f, app, rows[1]);
}

fn focused_border(app: &App, pane: Pane) -> Style {
    if app.pane == pane {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn render_files(f: &mut Frame, app: &mut App, area: ratatui::layout::Rect) {
    let items: Vec<ListItem> = app
        .notes
        .iter()
        .map(|note| {
            let depth = note.id().matches('/').count();
            ListItem::new(format!("{}{}", "  ".repeat(depth), note.title()))
        })
        .collect();

    let files_list = List::new(items)
        .block(
            Panel::default()
                .borders(Borders::ALL)
                .border_style(focused_border(app, Pane::Files))
                .title("Notes"),
        )
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(files_list, area, &mut app.file_list_state);
}

fn render_editor(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let popover = popover_items(app);
    let constraints = match &popover {
        Some((items, _)) => vec![Constraint::Min(0), Constraint::Length(items.len() as u16 + 2)],
        None => vec![Constraint::Min(0)],
    };
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let title = match &app.open_note {
        Some(_) if app.dirty => format!("{} *", app.editor.title()),
        Some(_) => app.editor.title().to_string(),
        None => "No note open".to_string(),
    };
    let lines = if app.open_note.is_some() {
        document_lines(app)
    } else {
        vec![Line::from("Select a note and press Enter")]
    };
    let document = Paragraph::new(lines)
        .block(
            Panel::default()
                .borders(Borders::ALL)
                .border_style(focused_border(app, Pane::Editor))
                .title(title),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(document, parts[0]);

    if let Some((items, highlighted)) = popover {
        let mut state = ListState::default();
        state.select(Some(highlighted));
        let list = List::new(items)
            .block(Panel::default().borders(Borders::ALL))
            .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));
        f.render_stateful_widget(list, parts[1], &mut state);
    }
}

fn popover_items(app: &App) -> Option<(Vec<ListItem<'static>>, usize)> {
    match app.editor.interaction() {
        Interaction::SlashMenu(menu) => {
            let items = app
                .editor
                .slash_commands()
                .into_iter()
                .map(|command| ListItem::new(format!("{:<14} /{}", command.label, command.id)))
                .collect::<Vec<_>>();
            (!items.is_empty()).then_some((items, menu.highlighted))
        }
        Interaction::LinkAutocomplete(auto) => {
            let items = if auto.offers_create() {
                vec![ListItem::new(format!("+ Create note \"{}\"", auto.query.trim()))]
            } else {
                auto.results
                    .iter()
                    .map(|note| ListItem::new(format!("{}  ({})", note.title, note.id)))
                    .collect()
            };
            (!items.is_empty()).then_some((items, auto.highlighted))
        }
        Interaction::Idle | Interaction::Dragging(_) => None,
    }
}

fn document_lines(app: &App) -> Vec<Line<'static>> {
    let outline = app.editor.layout();
    let mut lines = Vec::new();

    for block in app.editor.blocks() {
        if outline.visibility.is_hidden(&block.id) {
            continue;
        }
        let caret = app
            .caret
            .as_ref()
            .filter(|caret| caret.block_id == block.id && app.pane == Pane::Editor)
            .map(|caret| caret.offset);
        let raw = caret.is_some() || app.editor.raw_edit_block_id() == Some(&block.id);

        let mut text = if raw {
            block.text.clone()
        } else {
            mask_wikilinks(&block.text)
        };
        if let Some(offset) = caret {
            text.insert(clamp_offset(&text, offset), CARET);
        }

        let prefix = block_prefix(block, &outline);
        let indent = " ".repeat(prefix.chars().count());
        let mut style = block_style(block);
        if app.editor.selection().contains(&block.id) {
            style = style.bg(Color::DarkGray);
        }

        for (i, line) in text.split('\n').enumerate() {
            let lead = if i == 0 { prefix.clone() } else { indent.clone() };
            lines.push(Line::from(vec![
                Span::styled(lead, Style::default().fg(Color::DarkGray)),
                Span::styled(line.to_string(), style),
            ]));
        }
    }

    lines
}

fn block_prefix(block: &Block, outline: &Outline) -> String {
    match &block.kind {
        BlockKind::Heading { collapsed, .. } => {
            let marker = match (outline.visibility.has_children(&block.id), collapsed) {
                (false, _) => "  ",
                (true, true) => "▸ ",
                (true, false) => "▾ ",
            };
            let hashes = "#".repeat(block.block_type().heading_level().map_or(1, |l| l.depth()) as usize);
            format!("{marker}{hashes} ")
        }
        BlockKind::Bullet => "  • ".to_string(),
        BlockKind::Numbered => {
            let n = outline.numbering.get(&block.id).copied().unwrap_or(1);
            format!("  {n}. ")
        }
        BlockKind::Checklist(meta) if meta.checked => "  [x] ".to_string(),
        BlockKind::Checklist(_) => "  [ ] ".to_string(),
        BlockKind::Callout => "  │ ".to_string(),
        BlockKind::Code { language } => format!("  {} ", language.as_deref().unwrap_or("code")),
        BlockKind::Divider => "  ──────────".to_string(),
        BlockKind::Paragraph => "  ".to_string(),
    }
}

fn block_style(block: &Block) -> Style {
    match block.block_type() {
        BlockType::H1 | BlockType::H2 | BlockType::H3 => {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        }
        BlockType::Checklist if block.checklist_meta().is_some_and(|m| m.checked) => {
            Style::default().add_modifier(Modifier::CROSSED_OUT)
        }
        BlockType::Code => Style::default().fg(Color::Green),
        BlockType::Callout => Style::default().add_modifier(Modifier::ITALIC),
        _ => Style::default(),
    }
}

fn render_status(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let help = match app.pane {
        Pane::Files => "q: Quit | ↑/k ↓/j: Select | Enter: Open | Tab: Editor",
        Pane::Editor => {
            "Esc: Notes | Ctrl+S: Save | Ctrl+Z/Y: Undo/Redo | Tab: Collapse | Ctrl+X: Check | Alt+↑↓: Move | /: Commands"
        }
    };
    let mut lines = vec![Line::from(Span::raw(help))];
    if !app.status.is_empty() {
        lines.push(Line::from(Span::styled(
            app.status.clone(),
            Style::default().fg(Color::Yellow),
        )));
    }
    f.render_widget(Paragraph::new(lines), area);
}
