/// Tests for XmlNode
///
/// These tests validate parsing, attribute access, error reporting on
/// malformed input, and writing documents back out.

use super::*;

// ============================================================================
// Tests: Parsing
// ============================================================================

#[test]
fn test_parse_nested_document() {
    let doc = XmlNode::parse(
        r#"<?xml version="1.0"?>
        <materials>
            <m name="Red" restitution="0.1"/>
            <m name="Blue"><note>shiny</note></m>
        </materials>"#,
    )
    .unwrap();

    assert_eq!(doc.tag(), "materials");
    assert_eq!(doc.children().len(), 2);
    assert_eq!(doc.children()[0].attribute("name"), Some("Red"));
    assert_eq!(doc.children()[1].child("note").unwrap().text(), "shiny");
}

#[test]
fn test_parse_unescapes_attributes() {
    let doc = XmlNode::parse(r#"<m name="A &amp; B"/>"#).unwrap();
    assert_eq!(doc.attribute("name"), Some("A & B"));
}

#[test]
fn test_parse_skips_comments() {
    let doc = XmlNode::parse("<root><!-- ignored --><child/></root>").unwrap();
    assert_eq!(doc.children().len(), 1);
}

#[test]
fn test_parse_empty_document_fails() {
    let result = XmlNode::parse("   ");
    assert!(matches!(result, Err(Error::MalformedDocument(_))));
}

#[test]
fn test_parse_two_roots_fails() {
    let result = XmlNode::parse("<a/><b/>");
    assert!(matches!(result, Err(Error::MalformedDocument(_))));
}

#[test]
fn test_parse_unclosed_element_fails() {
    let result = XmlNode::parse("<a><b></b>");
    assert!(matches!(result, Err(Error::MalformedDocument(_))));
}

#[test]
fn test_parse_mismatched_end_fails() {
    let result = XmlNode::parse("<a><b></a></b>");
    assert!(result.is_err());
}

// ============================================================================
// Tests: Attributes
// ============================================================================

#[test]
fn test_set_attribute_replaces_value() {
    let mut node = XmlNode::new("m").with_attribute("name", "Red");
    node.set_attribute("name", "Green");
    assert_eq!(node.attribute("name"), Some("Green"));
    assert_eq!(node.attributes().count(), 1);
}

#[test]
fn test_required_attribute_missing() {
    let node = XmlNode::new("m");
    assert!(matches!(node.required_attribute("name"), Err(Error::MalformedDocument(_))));
}

#[test]
fn test_parse_attribute_typed() {
    let node = XmlNode::new("m").with_attribute("count", " 12 ").with_attribute("bad", "x");
    assert_eq!(node.parse_attribute::<u32>("count").unwrap(), Some(12));
    assert_eq!(node.parse_attribute::<u32>("missing").unwrap(), None);
    assert!(node.parse_attribute::<u32>("bad").is_err());
}

#[test]
fn test_children_named_filters() {
    let mut node = XmlNode::new("root");
    node.push_child(XmlNode::new("m"));
    node.push_child(XmlNode::new("t"));
    node.push_child(XmlNode::new("m"));
    assert_eq!(node.children_named("m").count(), 2);
}

#[test]
fn test_walk_visits_all_nodes_in_order() {
    let doc = XmlNode::parse("<a><b><c/></b><d/></a>").unwrap();
    let mut tags = Vec::new();
    doc.walk(&mut |n| tags.push(n.tag().to_string()));
    assert_eq!(tags, vec!["a", "b", "c", "d"]);
}

// ============================================================================
// Tests: Writing
// ============================================================================

#[test]
fn test_write_then_parse_preserves_tree() {
    let mut root = XmlNode::new("materials");
    root.push_child(XmlNode::new("m").with_attribute("name", "<quoted> \"x\""));
    let mut with_text = XmlNode::new("note");
    with_text.set_text("a & b");
    root.push_child(with_text);

    let text = root.to_xml_string().unwrap();
    assert!(text.starts_with("<?xml"));

    let parsed = XmlNode::parse(&text).unwrap();
    assert_eq!(parsed, root);
}

#[test]
fn test_child_or_insert_reuses_existing() {
    let mut root = XmlNode::new("scene");
    root.child_or_insert("materials").push_child(XmlNode::new("m"));
    root.child_or_insert("materials").push_child(XmlNode::new("m"));
    root.child_or_insert("textures");

    assert_eq!(root.children().len(), 2);
    assert_eq!(root.child("materials").unwrap().children().len(), 2);
}
