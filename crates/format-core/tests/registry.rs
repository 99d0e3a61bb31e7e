use std::rc::Rc;

use inline_format_core::{
    BoldTool, Document, MarkerTool, RecordingApi, SavePolicy, SelectionStore, TagRule, ToolError,
    ToolRegistry, ToolsConfig,
};
use similar_asserts::assert_eq;

fn standard() -> ToolRegistry {
    let _ = env_logger::builder().is_test(true).try_init();
    ToolRegistry::standard(&ToolsConfig::default(), Rc::new(RecordingApi::new())).unwrap()
}

#[test]
fn standard_tools_in_toolbar_order() {
    let tools = standard();
    assert_eq!(
        tools.ids(),
        vec!["bold", "italic", "marker", "link", "clear_format"]
    );
    assert_eq!(tools.tool("marker").map(|t| t.title()), Some("Marker"));
    assert!(tools.tool("underline").is_none());
}

#[test]
fn ids_are_unique() {
    let mut tools = standard();
    let store = tools.store().clone();

    let err = tools.register(Box::new(BoldTool::new(store))).unwrap_err();

    assert_eq!(err, ToolError::DuplicateTool("bold".to_string()));
    assert_eq!(tools.ids().len(), 5);
}

#[test]
fn unknown_tool_is_an_error() {
    let mut tools = standard();
    let mut doc = Document::from_html("<p>x</p>").unwrap();

    let err = tools.surround("underline", &mut doc, None).unwrap_err();

    assert_eq!(err, ToolError::UnknownTool("underline".to_string()));
}

#[test]
fn shortcuts_match_loosely() {
    let tools = standard();
    assert_eq!(tools.tool_for_shortcut("CMD+B"), Some("bold"));
    assert_eq!(tools.tool_for_shortcut("cmd+i"), Some("italic"));
    assert_eq!(tools.tool_for_shortcut("Cmd + Shift + M"), Some("marker"));
    assert_eq!(tools.tool_for_shortcut("cmd+k"), Some("link"));
    assert_eq!(tools.tool_for_shortcut("CMD + \\"), Some("clear_format"));
    assert_eq!(tools.tool_for_shortcut("CMD+U"), None);
}

#[test]
fn states_and_buttons_follow_the_selection() {
    let mut tools = standard();
    let mut doc = Document::from_html("<p><b>foo</b> bar</p>").unwrap();
    assert!(doc.select_text("foo"));

    let states = tools.check_states(&mut doc).unwrap();

    assert_eq!(
        states,
        vec![
            ("bold", true),
            ("italic", false),
            ("marker", false),
            ("link", false),
            ("clear_format", false),
        ]
    );
    let buttons = tools.buttons();
    assert_eq!(buttons.len(), 5);
    assert!(buttons[0].active);
    assert!(!buttons[1].active);
    assert_eq!(buttons[3].icon, "link");
    assert!(!buttons[3].unlink);
    assert!(tools.store().borrow().has_saved());

    // A live selection keeps the store; closing the toolbar after blur drops it.
    tools.clear_all(&mut doc).unwrap();
    assert!(doc.marker_count() > 0);
    doc.blur();
    tools.clear_all(&mut doc).unwrap();
    assert_eq!(doc.marker_count(), 0);
    assert_eq!(doc.to_html(), "<p><b>foo</b> bar</p>");
}

#[test]
fn merged_sanitize_rules() {
    let tools = standard();

    let sanitize = tools.sanitize();

    // The link tool keeps bold inside anchors with its attributes.
    assert_eq!(sanitize.tags.get("b"), Some(&TagRule::Allow(true)));
    assert_eq!(sanitize.tags.get("mark"), Some(&TagRule::Allow(true)));
    assert!(sanitize.allows("sup"));
    assert!(!sanitize.allows("script"));
    assert_eq!(
        serde_json::to_string(&sanitize.tags["a"]).unwrap(),
        r#"{"href":true,"rel":"nofollow","target":"_blank"}"#
    );
}

#[test]
fn hand_built_registry() {
    let store = SelectionStore::shared(SavePolicy::KeepExisting);
    let mut tools = ToolRegistry::new(store.clone());
    tools
        .register(Box::new(MarkerTool::new(store, "hl")))
        .unwrap();
    let mut doc = Document::from_html("<p>one two</p>").unwrap();
    assert!(doc.select_text("two"));

    let range = doc.selection();
    assert!(tools.surround("marker", &mut doc, range).unwrap().is_applied());

    assert_eq!(tools.ids(), vec!["marker"]);
    assert_eq!(tools.store().borrow().policy(), SavePolicy::KeepExisting);
    assert_eq!(doc.to_html(), r#"<p>one <mark class="hl">two</mark></p>"#);
}
