use std::rc::Rc;

use inline_format_core::{
    Change, Document, InlineFormat, Outcome, RecordingApi, SkipReason, ToolRegistry, ToolsConfig,
};
use similar_asserts::assert_eq;

fn setup(html: &str) -> (Document, ToolRegistry) {
    setup_with(html, ToolsConfig::default())
}

fn setup_with(html: &str, config: ToolsConfig) -> (Document, ToolRegistry) {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = Document::from_html_with(html, config.blocks.clone()).unwrap();
    let tools = ToolRegistry::standard(&config, Rc::new(RecordingApi::new())).unwrap();
    (doc, tools)
}

fn surround(tools: &mut ToolRegistry, id: &str, doc: &mut Document) -> Outcome {
    let range = doc.selection();
    tools.surround(id, doc, range).unwrap()
}

#[test]
fn bold_wraps_only_the_selected_characters() {
    let (mut doc, mut tools) = setup("<p>foo bar baz</p>");
    assert!(doc.select_text("bar"));

    let outcome = surround(&mut tools, "bold", &mut doc);

    assert_eq!(
        outcome,
        Outcome::Applied(Change::Wrapped {
            format: InlineFormat::Bold,
            nodes: 1
        })
    );
    assert_eq!(doc.to_html(), "<p>foo <b>bar</b> baz</p>");
    assert_eq!(doc.selected_text(), "bar");
    assert_eq!(doc.marker_count(), 0);
}

#[test]
fn toggling_twice_restores_the_original_tree() {
    let (mut doc, mut tools) = setup("<p>foo bar baz</p>");
    assert!(doc.select_text("bar"));

    surround(&mut tools, "bold", &mut doc);
    let outcome = surround(&mut tools, "bold", &mut doc);

    assert_eq!(
        outcome,
        Outcome::Applied(Change::Unwrapped {
            format: InlineFormat::Bold,
            nodes: 1
        })
    );
    assert_eq!(doc.to_html(), "<p>foo bar baz</p>");
    assert_eq!(doc.selected_text(), "bar");

    surround(&mut tools, "bold", &mut doc);
    assert_eq!(doc.to_html(), "<p>foo <b>bar</b> baz</p>");
}

#[test]
fn mixed_selection_converges_to_fully_tagged_then_untagged() {
    let (mut doc, mut tools) = setup("<p>foo <b>bar</b> baz</p>");
    assert!(doc.select_text("foo bar baz"));

    let outcome = surround(&mut tools, "bold", &mut doc);
    assert_eq!(
        outcome,
        Outcome::Applied(Change::Wrapped {
            format: InlineFormat::Bold,
            nodes: 2
        })
    );
    assert_eq!(doc.to_html(), "<p><b>foo bar baz</b></p>");

    surround(&mut tools, "bold", &mut doc);
    assert_eq!(doc.to_html(), "<p>foo bar baz</p>");
}

#[test]
fn strong_counts_as_bold() {
    let (mut doc, mut tools) = setup("<p>foo <strong>bar</strong></p>");
    assert!(doc.select_text("bar"));

    surround(&mut tools, "bold", &mut doc);

    assert_eq!(doc.to_html(), "<p>foo bar</p>");
}

#[test]
fn untoggling_part_of_a_run_keeps_the_rest_formatted() {
    let (mut doc, mut tools) = setup("<p><b>foo bar baz</b></p>");
    assert!(doc.select_text("bar"));

    surround(&mut tools, "bold", &mut doc);

    assert_eq!(doc.to_html(), "<p><b>foo </b>bar<b> baz</b></p>");
    assert_eq!(doc.selected_text(), "bar");
}

#[test]
fn italic_recognises_em() {
    let (mut doc, mut tools) = setup("<p><em>foo</em> bar</p>");
    assert!(doc.select_text("foo bar"));

    surround(&mut tools, "italic", &mut doc);
    assert_eq!(doc.to_html(), "<p><em>foo</em><i> bar</i></p>");

    surround(&mut tools, "italic", &mut doc);
    assert_eq!(doc.to_html(), "<p>foo bar</p>");
}

#[test]
fn marker_uses_the_configured_class() {
    let (mut doc, mut tools) = setup("<p>foo bar</p>");
    assert!(doc.select_text("bar"));
    surround(&mut tools, "marker", &mut doc);
    assert_eq!(doc.to_html(), r#"<p>foo <mark class="cdx-marker">bar</mark></p>"#);

    let config = ToolsConfig {
        marker_class: "hl".to_string(),
        ..ToolsConfig::default()
    };
    let (mut doc, mut tools) = setup_with("<p>foo bar</p>", config);
    assert!(doc.select_text("foo"));
    surround(&mut tools, "marker", &mut doc);
    assert_eq!(doc.to_html(), r#"<p><mark class="hl">foo</mark> bar</p>"#);
}

#[test]
fn selection_across_blocks_formats_each_block() {
    let (mut doc, mut tools) = setup("<p>one two</p><p>three four</p>");
    assert!(doc.select_text("twothree"));

    surround(&mut tools, "bold", &mut doc);

    assert_eq!(doc.to_html(), "<p>one <b>two</b></p><p><b>three</b> four</p>");
}

#[test]
fn whitespace_between_runs_is_not_swallowed() {
    let (mut doc, mut tools) = setup("<p><b>foo</b> <b>bar</b></p>");
    assert!(doc.select_text("foo"));

    surround(&mut tools, "italic", &mut doc);

    assert_eq!(doc.to_html(), "<p><b><i>foo</i></b> <b>bar</b></p>");
}

#[test]
fn collapsed_range_without_saved_selection_is_a_no_op() {
    let (mut doc, mut tools) = setup("<p>foo</p>");

    let outcome = tools.surround("bold", &mut doc, None).unwrap();

    assert_eq!(outcome, Outcome::skipped(SkipReason::NoSelection));
    assert_eq!(doc.to_html(), "<p>foo</p>");
}

#[test]
fn check_state_saves_the_selection_for_a_later_click() {
    let (mut doc, mut tools) = setup("<p>foo <b>bar</b></p>");
    assert!(doc.select_text("bar"));

    assert!(tools.check_state("bold", &mut doc).unwrap());
    assert!(!tools.check_state("italic", &mut doc).unwrap());
    assert!(tools.store().borrow().has_saved());
    assert_eq!(doc.marker_count(), 2);

    // focus moved to the toolbar; the click arrives without a range
    doc.blur();
    let outcome = tools.surround("bold", &mut doc, None).unwrap();

    assert!(outcome.is_applied());
    assert_eq!(doc.to_html(), "<p>foo bar</p>");
    assert_eq!(doc.marker_count(), 0);
    assert!(!tools.store().borrow().has_saved());
}

#[test]
fn clear_keeps_the_store_while_text_is_selected() {
    let (mut doc, mut tools) = setup("<p>foo bar</p>");
    assert!(doc.select_text("bar"));
    tools.check_state("bold", &mut doc).unwrap();

    tools.clear("bold", &mut doc).unwrap();
    assert!(tools.store().borrow().has_saved());

    doc.blur();
    tools.clear("bold", &mut doc).unwrap();
    assert!(!tools.store().borrow().has_saved());
    assert_eq!(doc.marker_count(), 0);
    assert_eq!(doc.to_html(), "<p>foo bar</p>");
}
