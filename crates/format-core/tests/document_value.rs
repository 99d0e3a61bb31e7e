use inline_format_core::{BlockRules, Document, DocumentValue, NodeValue, Tag};
use similar_asserts::assert_eq;

#[test]
fn html_survives_a_trip_through_the_value() {
    let html = r#"<p>see <a href="/docs" target="_blank"><b>the</b> docs</a></p><p><mark class="cdx-marker">x</mark></p>"#;
    let doc = Document::from_html(html).unwrap();

    let json = DocumentValue::from_document(&doc).to_json_pretty().unwrap();
    let value = DocumentValue::from_json_str(&json).unwrap();
    let rebuilt = value.to_document(BlockRules::default()).unwrap();

    assert_eq!(rebuilt.to_html(), html);
    assert!(rebuilt.selection().is_none());
}

#[test]
fn value_json_shape() {
    let doc = Document::from_html("<p>a<i>b</i></p>").unwrap();

    let value = DocumentValue::from_document(&doc);

    assert_eq!(
        serde_json::to_value(&value).unwrap(),
        serde_json::json!({
            "schema": "inline-format",
            "version": 1,
            "children": [{
                "type": "element",
                "tag": "p",
                "children": [
                    { "type": "text", "text": "a" },
                    { "type": "element", "tag": "i", "children": [{ "type": "text", "text": "b" }] }
                ]
            }]
        })
    );
}

#[test]
fn missing_header_fields_take_defaults() {
    let value = DocumentValue::from_json_str(
        r#"{ "children": [{ "type": "element", "tag": "STRONG", "children": [{ "type": "text", "text": "hi" }] }] }"#,
    )
    .unwrap();

    assert_eq!(value.schema, "inline-format");
    assert_eq!(value.version, 1);
    assert_eq!(
        value.children,
        vec![NodeValue::element(Tag::from("strong"), vec![NodeValue::text("hi")])]
    );
    let doc = value.to_document(BlockRules::default()).unwrap();
    assert_eq!(doc.to_html(), "<strong>hi</strong>");
}
