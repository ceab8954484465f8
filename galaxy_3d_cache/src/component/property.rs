/// Reflected properties.
///
/// Resource types expose their editable fields as a flat list of named,
/// typed values. Generic code uses that list to write XML attributes, read
/// them back, and copy one instance onto another (prototype creation).

use glam::Vec3;
use crate::error::Result;
use crate::xml::XmlNode;
use crate::engine_bail;

// ===== PROPERTY VALUES =====

/// A typed property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Float(f32),
    Vec3(Vec3),
    Int(i64),
    Bool(bool),
    String(String),
}

impl PropertyValue {
    /// Attribute text for this value. Vectors are written as "x y z".
    pub fn to_text(&self) -> String {
        match self {
            PropertyValue::Float(v) => v.to_string(),
            PropertyValue::Vec3(v) => format!("{} {} {}", v.x, v.y, v.z),
            PropertyValue::Int(v) => v.to_string(),
            PropertyValue::Bool(v) => v.to_string(),
            PropertyValue::String(v) => v.clone(),
        }
    }

    /// Parse `text` as a value of the same variant as `self`
    ///
    /// Surrounding whitespace is ignored except for strings, which are kept
    /// verbatim.
    pub fn parse_like(&self, text: &str) -> Result<PropertyValue> {
        if let PropertyValue::String(_) = self {
            return Ok(PropertyValue::String(text.to_string()));
        }
        let text = text.trim();
        let parsed = match self {
            PropertyValue::Float(_) => text.parse().ok().map(PropertyValue::Float),
            PropertyValue::Int(_) => text.parse().ok().map(PropertyValue::Int),
            PropertyValue::Bool(_) => match text {
                "true" | "1" => Some(PropertyValue::Bool(true)),
                "false" | "0" => Some(PropertyValue::Bool(false)),
                _ => None,
            },
            PropertyValue::Vec3(_) => {
                let parts: Vec<f32> = text
                    .split_whitespace()
                    .filter_map(|p| p.parse().ok())
                    .collect();
                match parts.as_slice() {
                    [x, y, z] if text.split_whitespace().count() == 3 => {
                        Some(PropertyValue::Vec3(Vec3::new(*x, *y, *z)))
                    }
                    _ => None,
                }
            }
            PropertyValue::String(_) => None,
        };

        match parsed {
            Some(value) => Ok(value),
            None => engine_bail!(MalformedDocument => "galaxy3d::Property",
                "Cannot read '{}' as {}", text, self.type_name()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Float(_) => "float",
            PropertyValue::Vec3(_) => "vec3",
            PropertyValue::Int(_) => "int",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::String(_) => "string",
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            PropertyValue::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(v) => Some(v),
            _ => None,
        }
    }
}

// ===== REFLECT TRAIT =====

/// Resource types with reflected properties
pub trait Reflect {
    /// Root element of a single-resource document ("material", "mesh"...)
    const ROOT_TAG: &'static str;

    /// Current values, in a stable order
    fn properties(&self) -> Vec<(&'static str, PropertyValue)>;

    /// Assign one property. Unknown names and mismatched variants fail
    /// with `InvalidParameter`.
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()>;

    /// Write nested elements (sub-objects that are not flat properties)
    fn write_children(&self, _node: &mut XmlNode) {}

    /// Read nested elements written by `write_children`
    fn read_children(&mut self, _node: &XmlNode) -> Result<()> {
        Ok(())
    }
}

/// Write every property of `source` as an attribute of `node`
pub fn write_properties<R: Reflect>(source: &R, node: &mut XmlNode) {
    for (name, value) in source.properties() {
        node.set_attribute(name, value.to_text());
    }
}

/// Assign every property of `target` found as an attribute of `node`
///
/// Missing attributes keep their current value. Returns the number of
/// assigned properties.
pub fn read_properties<R: Reflect>(target: &mut R, node: &XmlNode) -> Result<usize> {
    let mut assigned = 0;
    for (name, current) in target.properties() {
        if let Some(text) = node.attribute(name) {
            let value = current.parse_like(text)?;
            target.set_property(name, value)?;
            assigned += 1;
        }
    }
    Ok(assigned)
}

/// Copy every property of `source` onto `target`, nested elements included
pub fn copy_properties<R: Reflect>(source: &R, target: &mut R) -> Result<()> {
    for (name, value) in source.properties() {
        target.set_property(name, value)?;
    }
    let mut children = XmlNode::new(R::ROOT_TAG);
    source.write_children(&mut children);
    if !children.children().is_empty() {
        target.read_children(&children)?;
    }
    Ok(())
}

/// Build a single-resource document: `<ROOT_TAG name="..." .../>`
pub fn to_document<R: Reflect>(source: &R, name: &str) -> XmlNode {
    let mut node = XmlNode::new(R::ROOT_TAG);
    if !name.is_empty() {
        node.set_attribute("name", name);
    }
    write_properties(source, &mut node);
    source.write_children(&mut node);
    node
}

/// Read a single-resource document into `target`
///
/// The root element must be `ROOT_TAG`. Returns the `name` attribute,
/// empty when absent.
pub fn from_document<R: Reflect>(target: &mut R, node: &XmlNode) -> Result<String> {
    if node.tag() != R::ROOT_TAG {
        engine_bail!(MalformedDocument => "galaxy3d::Property",
            "Expected <{}>, found <{}>", R::ROOT_TAG, node.tag());
    }
    read_properties(target, node)?;
    target.read_children(node)?;
    Ok(node.attribute("name").unwrap_or_default().to_string())
}

/// Reject a property assignment with a consistent error
pub fn unknown_property<T>(kind: &str, name: &str, value: &PropertyValue) -> Result<T> {
    engine_bail!(InvalidParameter => "galaxy3d::Property",
        "{} has no {} property '{}'", kind, value.type_name(), name)
}

#[cfg(test)]
#[path = "property_tests.rs"]
mod tests;
