use pretty_assertions::assert_eq;
use rstest::rstest;

use super::{editor, id, ids, invariants, para, texts, typed, types};
use crate::editing::{Key, KeyOutcome};
use crate::models::{Block, BlockType, FocusTarget};

#[rstest]
#[case(BlockType::Bullet, BlockType::Bullet)]
#[case(BlockType::Numbered, BlockType::Numbered)]
#[case(BlockType::Checklist, BlockType::Checklist)]
#[case(BlockType::Paragraph, BlockType::Paragraph)]
#[case(BlockType::H2, BlockType::Paragraph)]
#[case(BlockType::Callout, BlockType::Paragraph)]
fn enter_inserts_sibling_of_list_type(#[case] current: BlockType, #[case] expected: BlockType) {
    let mut ed = editor(vec![typed("a", current, "item")]);

    assert_eq!(ed.handle_key(&id("a"), Key::Enter, 4), KeyOutcome::Handled);

    assert_eq!(types(&ed), vec![current, expected]);
    assert_eq!(texts(&ed), vec!["item", ""]);
    let new_id = ed.blocks()[1].id.clone();
    assert_eq!(ed.take_focus_target(), Some(FocusTarget::start(new_id)));
    invariants::check(&ed);
}

#[test]
fn enter_on_checked_item_starts_unchecked() {
    let mut ed = editor(vec![Block::checklist("done", true).with_id("a")]);
    ed.handle_key(&id("a"), Key::Enter, 4);
    let meta = ed.blocks()[1].checklist_meta().unwrap();
    assert!(!meta.checked);
    assert!(meta.created_at.is_some());
}

#[test]
fn enter_moves_text_after_caret() {
    let mut ed = editor(vec![para("a", "hello world")]);
    ed.handle_key(&id("a"), Key::Enter, 5);
    assert_eq!(texts(&ed), vec!["hello", " world"]);
    assert_eq!(ed.blocks()[0].id, id("a"));
}

#[test]
fn enter_in_code_is_a_newline() {
    let mut ed = editor(vec![typed("k", BlockType::Code, "let x")]);
    assert_eq!(ed.handle_key(&id("k"), Key::Enter, 5), KeyOutcome::Default);
    assert_eq!(ed.blocks().len(), 1);
}

#[test]
fn backspace_deletes_empty_block_and_focuses_previous_end() {
    let mut ed = editor(vec![para("a", "keep"), typed("b", BlockType::Bullet, "")]);
    assert_eq!(ed.handle_key(&id("b"), Key::Backspace, 0), KeyOutcome::Handled);
    assert_eq!(ids(&ed), vec!["a"]);
    assert_eq!(ed.take_focus_target(), Some(FocusTarget::end(id("a"))));
}

#[test]
fn backspace_keeps_the_first_empty_block() {
    let mut ed = editor(vec![para("a", ""), para("b", "x")]);
    assert_eq!(ed.handle_key(&id("a"), Key::Backspace, 0), KeyOutcome::Default);
    assert_eq!(ids(&ed), vec!["a", "b"]);
}

#[test]
fn backspace_at_start_demotes_to_paragraph() {
    let mut ed = editor(vec![typed("h", BlockType::H1, "Title")]);
    assert_eq!(ed.handle_key(&id("h"), Key::Backspace, 0), KeyOutcome::Handled);
    assert_eq!(types(&ed), vec![BlockType::Paragraph]);
    assert_eq!(texts(&ed), vec!["Title"]);
}

#[test]
fn backspace_at_start_merges_paragraph_into_previous() {
    let mut ed = editor(vec![typed("a", BlockType::Bullet, "one"), para("b", "two")]);
    assert_eq!(ed.handle_key(&id("b"), Key::Backspace, 0), KeyOutcome::Handled);
    assert_eq!(ids(&ed), vec!["a"]);
    assert_eq!(texts(&ed), vec!["onetwo"]);
    assert_eq!(ed.take_focus_target(), Some(FocusTarget::caret(id("a"), 3, 3)));
}

#[test]
fn backspace_elsewhere_is_default() {
    let mut ed = editor(vec![
        typed("d", BlockType::Divider, ""),
        para("b", "text"),
    ]);
    assert_eq!(ed.handle_key(&id("b"), Key::Backspace, 2), KeyOutcome::Default);
    assert_eq!(ed.handle_key(&id("b"), Key::Backspace, 0), KeyOutcome::Default);
    assert_eq!(ed.blocks().len(), 2);
}

#[test]
fn arrows_move_between_visible_blocks() {
    let mut ed = editor(vec![
        para("a", "first"),
        typed("h", BlockType::H1, "Heading"),
        para("hidden", "inside"),
        typed("h2", BlockType::H1, "Next"),
    ]);
    ed.toggle_collapse(&id("h"));
    ed.take_focus_target();

    assert_eq!(ed.handle_key(&id("h"), Key::ArrowDown, 0), KeyOutcome::Handled);
    assert_eq!(ed.take_focus_target(), Some(FocusTarget::start(id("h2"))));

    assert_eq!(ed.handle_key(&id("h2"), Key::ArrowUp, 0), KeyOutcome::Handled);
    assert_eq!(ed.take_focus_target(), Some(FocusTarget::end(id("h"))));

    assert_eq!(ed.handle_key(&id("a"), Key::ArrowUp, 0), KeyOutcome::Default);
}

#[test]
fn arrows_inside_multiline_text_are_default() {
    let mut ed = editor(vec![para("a", "x"), para("b", "one\ntwo"), para("c", "y")]);
    assert_eq!(ed.handle_key(&id("b"), Key::ArrowUp, 5), KeyOutcome::Default);
    assert_eq!(ed.handle_key(&id("b"), Key::ArrowDown, 1), KeyOutcome::Default);
    assert_eq!(ed.handle_key(&id("b"), Key::ArrowDown, 5), KeyOutcome::Handled);
}

#[rstest]
#[case(Key::Escape)]
#[case(Key::Backspace)]
#[case(Key::Delete)]
fn selection_keys_delete_selected_blocks(#[case] key: Key) {
    let mut ed = editor(vec![para("a", "1"), para("b", "2"), para("c", "3")]);
    ed.begin_range_select(&id("b"));
    ed.extend_range_select(&id("c"));
    ed.end_range_select();

    assert_eq!(ed.handle_key(&id("a"), key, 0), KeyOutcome::Handled);

    assert_eq!(ids(&ed), vec!["a"]);
    assert!(ed.selected_block_ids().is_empty());
    assert_eq!(ed.history().past_len(), 1);
    invariants::check(&ed);
}

#[test]
fn deleting_every_block_leaves_one_empty_paragraph() {
    let mut ed = editor(vec![para("a", "1"), typed("b", BlockType::H1, "2")]);
    ed.select_all();
    assert!(ed.delete_selected());

    assert_eq!(ed.blocks().len(), 1);
    assert_eq!(types(&ed), vec![BlockType::Paragraph]);
    assert_eq!(texts(&ed), vec![""]);
    invariants::check(&ed);
}
