use serde::Serialize;

use super::registry::TagTemplate;

/// Decoded value of a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagValue {
    Number(f64),
    Text(String),
    Hex(String),
}

impl TagValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TagValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Text(value) | TagValue::Hex(value) => Some(value),
            TagValue::Number(_) => None,
        }
    }
}

/// Template fields of a tag together with its current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagDescriptor {
    pub id: u8,
    pub name: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub value: Option<TagValue>,
}

impl TagDescriptor {
    pub fn new(template: &TagTemplate, value: Option<TagValue>) -> Self {
        Self {
            id: template.id,
            name: template.name.clone(),
            unit: template.unit.clone(),
            min: template.min,
            max: template.max,
            value,
        }
    }
}
