use std::rc::Rc;

use inline_format_core::{
    Change, Document, Outcome, RecordingApi, SkipReason, ToolRegistry, ToolsConfig,
};
use similar_asserts::assert_eq;

fn clear_format(html: &str, selected: &str) -> (Outcome, String) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = Document::from_html(html).unwrap();
    let mut tools =
        ToolRegistry::standard(&ToolsConfig::default(), Rc::new(RecordingApi::new())).unwrap();
    assert!(doc.select_text(selected));
    let range = doc.selection();
    let outcome = tools.surround("clear_format", &mut doc, range).unwrap();
    assert_eq!(doc.marker_count(), 0);
    (outcome, doc.to_html())
}

#[test]
fn clearing_keeps_links() {
    let (outcome, html) = clear_format(r#"<p><a href="x"><b>hello</b></a></p>"#, "hello");

    assert_eq!(outcome, Outcome::Applied(Change::Cleared { elements: 1 }));
    assert_eq!(html, r#"<p><a href="x">hello</a></p>"#);
}

#[test]
fn every_inline_tag_up_to_the_block_is_removed() {
    let (outcome, html) = clear_format(
        "<p><b><i>foo</i></b> <u>bar</u> <code>baz</code></p>",
        "foo bar baz",
    );

    assert_eq!(outcome, Outcome::Applied(Change::Cleared { elements: 4 }));
    assert_eq!(html, "<p>foo bar baz</p>");
}

#[test]
fn text_outside_the_selection_keeps_its_formatting() {
    let (_, html) = clear_format("<p><s>one two</s> <sup>three</sup></p>", "two thr");

    assert_eq!(html, "<p><s>one </s>two thr<sup>ee</sup></p>");
}

#[test]
fn block_wrappers_are_left_alone() {
    let (_, html) = clear_format(
        r#"<div class="ce-paragraph"><mark class="cdx-marker">note</mark></div>"#,
        "note",
    );

    assert_eq!(html, r#"<div class="ce-paragraph">note</div>"#);
}

#[test]
fn plain_text_selection_reports_nothing_cleared() {
    let (outcome, html) = clear_format("<p>plain</p>", "plain");

    assert_eq!(outcome, Outcome::Applied(Change::Cleared { elements: 0 }));
    assert_eq!(html, "<p>plain</p>");
}

#[test]
fn no_range_and_nothing_saved_is_skipped() {
    let mut doc = Document::from_html("<p><b>x</b></p>").unwrap();
    let mut tools =
        ToolRegistry::standard(&ToolsConfig::default(), Rc::new(RecordingApi::new())).unwrap();

    let outcome = tools.surround("clear_format", &mut doc, None).unwrap();

    assert_eq!(outcome, Outcome::skipped(SkipReason::NoSelection));
    assert_eq!(doc.to_html(), "<p><b>x</b></p>");
}
