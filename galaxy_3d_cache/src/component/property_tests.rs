/// Tests for reflected properties
///
/// These tests validate value parsing, attribute writing/reading and
/// prototype copies using a small reflected type.

use super::*;
use crate::error::Error;

// ============================================================================
// Helpers
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct Gauge {
    weight: f32,
    offset: Vec3,
    count: i64,
    visible: bool,
    label: String,
}

impl Reflect for Gauge {
    const ROOT_TAG: &'static str = "gauge";

    fn properties(&self) -> Vec<(&'static str, PropertyValue)> {
        vec![
            ("weight", PropertyValue::Float(self.weight)),
            ("offset", PropertyValue::Vec3(self.offset)),
            ("count", PropertyValue::Int(self.count)),
            ("visible", PropertyValue::Bool(self.visible)),
            ("label", PropertyValue::String(self.label.clone())),
        ]
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match (name, &value) {
            ("weight", PropertyValue::Float(v)) => self.weight = *v,
            ("offset", PropertyValue::Vec3(v)) => self.offset = *v,
            ("count", PropertyValue::Int(v)) => self.count = *v,
            ("visible", PropertyValue::Bool(v)) => self.visible = *v,
            ("label", PropertyValue::String(v)) => self.label = v.clone(),
            _ => return unknown_property("Gauge", name, &value),
        }
        Ok(())
    }
}

fn sample() -> Gauge {
    Gauge {
        weight: 0.25,
        offset: Vec3::new(1.0, -2.0, 0.5),
        count: 3,
        visible: true,
        label: "front".to_string(),
    }
}

// ============================================================================
// Tests: PropertyValue
// ============================================================================

#[test]
fn test_parse_like_each_variant() {
    assert_eq!(PropertyValue::Float(0.0).parse_like(" 0.9 ").unwrap(), PropertyValue::Float(0.9));
    assert_eq!(PropertyValue::Int(0).parse_like("-4").unwrap(), PropertyValue::Int(-4));
    assert_eq!(PropertyValue::Bool(false).parse_like("1").unwrap(), PropertyValue::Bool(true));
    assert_eq!(
        PropertyValue::Vec3(Vec3::ZERO).parse_like("1 2 3").unwrap(),
        PropertyValue::Vec3(Vec3::new(1.0, 2.0, 3.0))
    );
    assert_eq!(
        PropertyValue::String(String::new()).parse_like("abc").unwrap(),
        PropertyValue::String("abc".to_string())
    );
}

#[test]
fn test_parse_like_rejects_bad_text() {
    assert!(matches!(
        PropertyValue::Float(0.0).parse_like("heavy"),
        Err(Error::MalformedDocument(_))
    ));
    assert!(PropertyValue::Vec3(Vec3::ZERO).parse_like("1 2").is_err());
    assert!(PropertyValue::Vec3(Vec3::ZERO).parse_like("1 2 x").is_err());
    assert!(PropertyValue::Bool(false).parse_like("maybe").is_err());
}

#[test]
fn test_vec3_text_format() {
    assert_eq!(PropertyValue::Vec3(Vec3::new(1.0, 2.5, -3.0)).to_text(), "1 2.5 -3");
}

// ============================================================================
// Tests: Documents
// ============================================================================

#[test]
fn test_write_then_read_properties() {
    let source = sample();
    let node = to_document(&source, "p");
    assert_eq!(node.tag(), "gauge");
    assert_eq!(node.attribute("name"), Some("p"));

    let mut target = Gauge::default();
    let assigned = read_properties(&mut target, &node).unwrap();
    assert_eq!(assigned, 5);
    assert_eq!(target, source);
}

#[test]
fn test_string_whitespace_survives_text_round_trip() {
    let mut source = sample();
    source.label = "  padded label ".to_string();
    let text = to_document(&source, "p").to_xml_string().unwrap();

    let mut target = Gauge::default();
    from_document(&mut target, &XmlNode::parse(&text).unwrap()).unwrap();
    assert_eq!(target.label, "  padded label ");
    assert_eq!(
        PropertyValue::String(String::new()).parse_like(" a ").unwrap(),
        PropertyValue::String(" a ".to_string())
    );
}

#[test]
fn test_missing_attributes_keep_values() {
    let node = XmlNode::new("gauge").with_attribute("count", 9);
    let mut target = sample();
    assert_eq!(read_properties(&mut target, &node).unwrap(), 1);
    assert_eq!(target.count, 9);
    assert_eq!(target.label, "front");
}

#[test]
fn test_unnamed_document_has_no_name_attribute() {
    let node = to_document(&sample(), "");
    assert!(node.attribute("name").is_none());
}

#[test]
fn test_copy_properties() {
    let mut target = Gauge::default();
    copy_properties(&sample(), &mut target).unwrap();
    assert_eq!(target, sample());
}

#[test]
fn test_unknown_property_fails() {
    let mut gauge = Gauge::default();
    let result = gauge.set_property("color", PropertyValue::Int(1));
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
}

#[test]
fn test_from_document_checks_root_tag() {
    let mut gauge = Gauge::default();
    let wrong = XmlNode::new("material");
    assert!(matches!(from_document(&mut gauge, &wrong), Err(Error::MalformedDocument(_))));

    let right = to_document(&sample(), "p");
    assert_eq!(from_document(&mut gauge, &right).unwrap(), "p");
    assert_eq!(gauge, sample());
}
