use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;

use super::{editor, id, invariants, now, para, structural_count, texts, typed, types};
use crate::editing::{EditorEvent, Interaction, Key, KeyOutcome, MoveDirection};
use crate::models::{
    BlockKind, BlockType, FocusPlacement, FocusPosition, FocusRequest, FocusTarget, HeadingLevel,
};

#[test]
fn text_change_is_a_typing_mutation() {
    let mut ed = editor(vec![para("a", "")]);
    ed.handle_text_change(&id("a"), "hello", 5, now());

    assert_eq!(texts(&ed), vec!["hello"]);
    let events = ed.drain_events();
    assert!(matches!(&events[..], [EditorEvent::TypingChange(blocks)] if blocks[0].text == "hello"));
    assert!(ed.history().has_pending_typing());
}

#[test]
fn divider_text_stays_empty() {
    let mut ed = editor(vec![typed("d", BlockType::Divider, "")]);
    ed.handle_text_change(&id("d"), "oops", 4, now());
    assert_eq!(texts(&ed), vec![""]);
    assert!(ed.drain_events().is_empty());
}

#[test]
fn slash_query_opens_menu_and_applies_checklist() {
    let mut ed = editor(vec![para("a", "")]);
    ed.handle_text_change(&id("a"), "/tod", 4, now());

    let menu = ed.interaction().slash_menu().expect("slash menu open");
    assert_eq!(menu.query, "tod");
    assert_eq!(ed.slash_commands()[0].block_type, BlockType::Checklist);

    assert_eq!(ed.handle_key(&id("a"), Key::Enter, 4), KeyOutcome::Handled);

    let block = &ed.blocks()[0];
    assert_eq!(block.block_type(), BlockType::Checklist);
    assert_eq!(block.text, "");
    assert_eq!(block.checklist_meta().map(|m| m.checked), Some(false));
    assert_eq!(ed.interaction(), &Interaction::Idle);
    assert_eq!(ed.take_focus_target(), Some(FocusTarget::end(id("a"))));
}

#[test]
fn slash_menu_cycles_and_escape_closes() {
    let mut ed = editor(vec![para("a", "")]);
    ed.handle_text_change(&id("a"), "/h", 2, now());
    let count = ed.slash_commands().len();
    assert!(count >= 3);

    ed.handle_key(&id("a"), Key::ArrowUp, 2);
    assert_eq!(ed.interaction().slash_menu().unwrap().highlighted, count - 1);
    ed.handle_key(&id("a"), Key::ArrowDown, 2);
    assert_eq!(ed.interaction().slash_menu().unwrap().highlighted, 0);

    assert_eq!(ed.handle_key(&id("a"), Key::Escape, 2), KeyOutcome::Handled);
    assert_eq!(ed.interaction(), &Interaction::Idle);
}

#[test]
fn slash_menu_closes_when_slash_is_removed() {
    let mut ed = editor(vec![para("a", "")]);
    ed.handle_text_change(&id("a"), "/", 1, now());
    assert!(ed.interaction().slash_menu().is_some());
    ed.handle_text_change(&id("a"), "", 0, now());
    assert_eq!(ed.interaction(), &Interaction::Idle);
}

#[test]
fn slash_divider_creates_following_block() {
    let mut ed = editor(vec![para("a", "")]);
    ed.handle_text_change(&id("a"), "/div", 4, now());
    assert!(ed.apply_slash_command(BlockType::Divider));

    assert_eq!(types(&ed), vec![BlockType::Divider, BlockType::Paragraph]);
    let focus = ed.take_focus_target().unwrap();
    assert_eq!(focus.block_id, ed.blocks()[1].id);
    assert_eq!(focus.position, Some(FocusPosition::Start));
    invariants::check(&ed);
}

#[rstest]
#[case("# Title", BlockType::H1, "Title")]
#[case("- item", BlockType::Bullet, "item")]
#[case("1. first", BlockType::Numbered, "first")]
#[case("> note", BlockType::Callout, "note")]
#[case("!code", BlockType::Code, "code")]
fn shortcut_promotes_in_place(#[case] typed_text: &str, #[case] ty: BlockType, #[case] rest: &str) {
    let mut ed = editor(vec![para("a", "")]);
    ed.handle_text_change(&id("a"), typed_text, typed_text.len(), now());

    assert_eq!(types(&ed), vec![ty]);
    assert_eq!(texts(&ed), vec![rest]);
    assert_eq!(ed.blocks()[0].id, id("a"));
    assert_eq!(ed.take_focus_target(), Some(FocusTarget::end(id("a"))));
    assert_eq!(structural_count(&ed.drain_events()), 1);
}

#[test]
fn checklist_shortcut_emits_promotion() {
    let mut ed = editor(vec![para("a", "")]);
    ed.handle_text_change(&id("a"), "@x done", 7, now());

    let meta = ed.blocks()[0].checklist_meta().expect("checklist");
    assert!(meta.checked);
    assert!(meta.created_at.is_some());
    let events = ed.drain_events();
    assert!(events.contains(&EditorEvent::PromoteChecklist {
        block_id: id("a"),
        text: "done".to_string(),
    }));
}

#[test]
fn divider_shortcut_focuses_existing_successor() {
    let mut ed = editor(vec![para("a", ""), para("b", "next")]);
    ed.handle_text_change(&id("a"), "---", 3, now());

    assert_eq!(types(&ed), vec![BlockType::Divider, BlockType::Paragraph]);
    assert_eq!(ed.take_focus_target(), Some(FocusTarget::start(id("b"))));
}

#[test]
fn shortcuts_only_apply_to_paragraphs() {
    let mut ed = editor(vec![typed("a", BlockType::Bullet, "")]);
    ed.handle_text_change(&id("a"), "# not a heading", 15, now());
    assert_eq!(types(&ed), vec![BlockType::Bullet]);
    assert_eq!(texts(&ed), vec!["# not a heading"]);
}

#[test]
fn typing_burst_then_structural_adds_two_undo_steps() {
    let mut ed = editor(vec![para("a", "")]);
    let t0 = now();
    for (i, text) in ["h", "he", "hel", "hell", "hello"].into_iter().enumerate() {
        ed.handle_text_change(&id("a"), text, text.len(), t0 + Duration::from_millis(i as u64 * 50));
    }
    assert_eq!(ed.history().past_len(), 0);

    ed.handle_key(&id("a"), Key::Enter, 5);
    assert_eq!(ed.history().past_len(), 2);

    assert!(ed.undo());
    assert_eq!(texts(&ed), vec!["hello"]);
    assert!(ed.undo());
    assert_eq!(texts(&ed), vec![""]);
    assert!(!ed.undo());
}

#[test]
fn undo_and_redo_restore_exact_states() {
    let mut ed = editor(vec![para("a", "one"), para("b", "two")]);
    ed.move_block(&id("b"), MoveDirection::Up);
    let moved = ed.snapshot().clone();

    assert!(ed.undo());
    let original = ed.snapshot().clone();
    assert!(ed.redo());
    assert_eq!(ed.snapshot(), &moved);
    assert!(ed.undo());
    assert_eq!(ed.snapshot(), &original);
    assert!(matches!(
        ed.drain_events().last(),
        Some(EditorEvent::StructuralChange(_))
    ));
}

#[test]
fn tick_commits_typing_after_debounce() {
    let mut ed = editor(vec![para("a", "")]);
    let t0 = now();
    ed.handle_text_change(&id("a"), "x", 1, t0);
    assert!(!ed.tick(t0 + Duration::from_millis(100)));
    assert!(ed.tick(t0 + Duration::from_millis(800)));
    assert_eq!(ed.history().past_len(), 1);
}

#[test]
fn collapse_toggle_only_affects_headings() {
    let mut ed = editor(vec![
        typed("h", BlockType::H1, "Title"),
        para("p", "body"),
    ]);
    assert!(ed.toggle_collapse(&id("h")));
    assert!(ed.blocks()[0].is_collapsed());
    assert!(ed.layout().visibility.is_hidden(&id("p")));
    assert!(!ed.toggle_collapse(&id("p")));

    assert!(ed.toggle_collapse(&id("h")));
    assert!(ed.layout().visibility.hidden.is_empty());
}

#[test]
fn toggle_checked_stamps_done_and_notifies_task() {
    let mut block = typed("c", BlockType::Checklist, "task");
    if let BlockKind::Checklist(meta) = &mut block.kind {
        meta.task_id = Some("t-1".to_string());
    }
    let mut ed = editor(vec![block]);

    assert!(ed.toggle_checked(&id("c")));
    let meta = ed.blocks()[0].checklist_meta().unwrap();
    assert!(meta.checked);
    assert!(meta.done_at.is_some());
    assert!(ed.drain_events().contains(&EditorEvent::ChecklistToggleTask {
        task_id: "t-1".to_string(),
        checked: true,
    }));

    assert!(ed.toggle_checked(&id("c")));
    assert_eq!(ed.blocks()[0].checklist_meta().unwrap().done_at, None);
}

#[test]
fn set_block_type_resets_foreign_fields() {
    let mut ed = editor(vec![typed("c", BlockType::Checklist, "task")]);
    ed.toggle_checked(&id("c"));
    assert!(ed.set_block_type(&id("c"), BlockType::H2));
    assert_eq!(
        ed.blocks()[0].kind,
        BlockKind::Heading {
            level: HeadingLevel::H2,
            collapsed: false
        }
    );
    assert!(ed.set_block_type(&id("c"), BlockType::Checklist));
    assert!(!ed.blocks()[0].checklist_meta().unwrap().checked);
    assert!(!ed.set_block_type(&id("c"), BlockType::Checklist));
}

#[test]
fn code_language_is_trimmed_and_optional() {
    let mut ed = editor(vec![typed("k", BlockType::Code, "fn main() {}")]);
    assert!(ed.set_code_language(&id("k"), Some(" rust ".to_string())));
    assert_eq!(
        ed.blocks()[0].kind,
        BlockKind::Code {
            language: Some("rust".to_string())
        }
    );
    assert!(!ed.set_code_language(&id("k"), Some("rust".to_string())));
    assert!(ed.set_code_language(&id("k"), Some("  ".to_string())));
    assert_eq!(ed.blocks()[0].kind, BlockKind::Code { language: None });
}

#[test]
fn duplicate_mints_a_new_id_after_the_original() {
    let mut ed = editor(vec![para("a", "copy me"), para("b", "")]);
    let copy = ed.duplicate_block(&id("a")).unwrap();
    assert_eq!(ed.blocks()[1].id, copy);
    assert_eq!(texts(&ed), vec!["copy me", "copy me", ""]);
    invariants::check(&ed);
}

#[test]
fn move_block_stops_at_edges() {
    let mut ed = editor(vec![para("a", ""), para("b", "")]);
    assert!(!ed.move_block(&id("a"), MoveDirection::Up));
    assert!(ed.move_block(&id("a"), MoveDirection::Down));
    assert_eq!(ed.blocks()[1].id, id("a"));
    assert!(!ed.move_block(&id("a"), MoveDirection::Down));
}

#[test]
fn focus_requests_are_nonce_guarded() {
    let mut ed = editor(vec![para("a", "héllo")]);
    let request = FocusRequest {
        block_id: id("a"),
        placement: FocusPlacement::Selection { start: 2, end: 99 },
        nonce: 7,
    };

    assert!(ed.apply_focus_request(request.clone()));
    assert_eq!(ed.take_focus_target(), Some(FocusTarget::caret(id("a"), 1, 6)));

    assert!(!ed.apply_focus_request(request));
    assert_eq!(ed.take_focus_target(), None);

    assert!(ed.apply_focus_request(FocusRequest {
        block_id: id("a"),
        placement: FocusPlacement::Position(FocusPosition::End),
        nonce: 8,
    }));
    assert_eq!(ed.take_focus_target(), Some(FocusTarget::end(id("a"))));
}

#[test]
fn raw_edit_toggles_per_block() {
    let mut ed = editor(vec![para("a", ""), para("b", "")]);
    ed.toggle_raw_edit(&id("a"));
    assert_eq!(ed.raw_edit_block_id(), Some(&id("a")));
    ed.toggle_raw_edit(&id("b"));
    assert_eq!(ed.raw_edit_block_id(), Some(&id("b")));
    ed.toggle_raw_edit(&id("b"));
    assert_eq!(ed.raw_edit_block_id(), None);
}

#[test]
fn title_edits_are_typing() {
    let mut ed = editor(vec![para("a", "")]);
    ed.set_title("Renamed", now());
    assert_eq!(ed.title(), "Renamed");
    assert!(ed.history().has_pending_typing());
    ed.blur();
    assert_eq!(ed.history().past_len(), 1);
}

#[test]
fn load_document_resets_transient_state() {
    let mut ed = editor(vec![para("a", "")]);
    ed.handle_text_change(&id("a"), "/x", 2, now());
    ed.select_all();
    let generation = ed.document_generation();

    ed.load_document(crate::models::Snapshot::new("Other", vec![]));

    assert_eq!(ed.interaction(), &Interaction::Idle);
    assert!(ed.selected_block_ids().is_empty());
    assert!(!ed.history().can_undo());
    assert_eq!(ed.document_generation(), generation + 1);
    assert_eq!(texts(&ed), vec![""]);
}
