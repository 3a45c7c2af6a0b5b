//! Component Model
//!
//! Typed view of the component documents the CMS CLI writes to disk.
//! Field descriptors are loosely shaped JSON keyed by their `type` tag;
//! they are parsed once into [`FieldKind`] so every later stage matches
//! exhaustively instead of probing JSON.

pub mod loader;

pub use loader::{load_components, LoadedComponents};

use serde::Deserialize;
use serde_json::Value;

/// A named content type with its ordered fields
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Kebab-case identifier, unique within a space
    pub name: String,
    pub fields: Vec<Field>,
}

/// One component attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub descriptor: FieldDescriptor,
}

/// Typed description of one component attribute
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    /// Only an explicit `true` makes a field required
    pub required: bool,
    /// Editor position, when the CMS recorded one
    pub pos: Option<i64>,
}

/// Field type, one variant per recognized tag
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Textarea,
    Markdown,
    Number,
    Boolean,
    Datetime,
    /// `option`: a single choice
    SingleOption,
    /// `options`: several choices
    MultiOption,
    Asset,
    Multilink,
    Richtext,
    /// Nested components; an empty whitelist allows any component
    Bloks { whitelist: Vec<String> },
    /// Editor-only grouping, never part of the content
    Tab,
    Section,
    /// Descriptor without a `type` tag
    Missing,
    /// Tag outside the known vocabulary
    Unknown(String),
    /// Descriptor whose shape could not be read
    Invalid(String),
}

/// Metadata carried by `bloks` descriptors
#[derive(Debug, Default, Deserialize)]
struct BloksMeta {
    #[serde(default)]
    component_whitelist: Option<Vec<String>>,
    #[serde(default)]
    restrict_components: Option<bool>,
}

impl FieldKind {
    /// Whether the field is dropped from the emitted object
    pub fn is_layout_only(&self) -> bool {
        matches!(self, FieldKind::Tab | FieldKind::Section)
    }

    /// Names of nested components this field may hold
    pub fn whitelist(&self) -> &[String] {
        match self {
            FieldKind::Bloks { whitelist } => whitelist,
            _ => &[],
        }
    }
}

impl FieldDescriptor {
    /// Parse a raw descriptor. Never fails: bad shapes become [`FieldKind::Invalid`].
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self {
                kind: FieldKind::Invalid("descriptor is not an object".to_string()),
                required: false,
                pos: None,
            };
        };

        let required = obj.get("required").and_then(Value::as_bool) == Some(true);
        let pos = obj.get("pos").and_then(Value::as_i64);

        let kind = match obj.get("type") {
            None | Some(Value::Null) => FieldKind::Missing,
            Some(Value::String(tag)) => Self::kind_for_tag(tag, value),
            Some(other) => FieldKind::Invalid(format!("type tag is not a string: {}", other)),
        };

        Self { kind, required, pos }
    }

    fn kind_for_tag(tag: &str, value: &Value) -> FieldKind {
        match tag {
            "text" => FieldKind::Text,
            "textarea" => FieldKind::Textarea,
            "markdown" => FieldKind::Markdown,
            "number" => FieldKind::Number,
            "boolean" => FieldKind::Boolean,
            "datetime" => FieldKind::Datetime,
            "option" => FieldKind::SingleOption,
            "options" => FieldKind::MultiOption,
            "asset" => FieldKind::Asset,
            "multilink" => FieldKind::Multilink,
            "richtext" => FieldKind::Richtext,
            "tab" => FieldKind::Tab,
            "section" => FieldKind::Section,
            "bloks" => match BloksMeta::deserialize(value) {
                Ok(meta) if meta.restrict_components == Some(false) => {
                    FieldKind::Bloks { whitelist: Vec::new() }
                }
                Ok(meta) => FieldKind::Bloks {
                    whitelist: meta.component_whitelist.unwrap_or_default(),
                },
                Err(e) => FieldKind::Invalid(format!("bloks metadata: {}", e)),
            },
            other => FieldKind::Unknown(other.to_string()),
        }
    }
}

impl Component {
    /// Build a component from one object of a component document.
    ///
    /// Fails when `name` or the `schema` map is missing.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| "missing component name".to_string())?;

        let schema = value
            .get("schema")
            .and_then(Value::as_object)
            .ok_or_else(|| format!("component '{}' has no schema section", name))?;

        let mut fields: Vec<Field> = schema
            .iter()
            .map(|(field_name, raw)| Field {
                name: field_name.clone(),
                descriptor: FieldDescriptor::from_value(raw),
            })
            .collect();

        // Stable: unpositioned fields keep document order after positioned ones
        fields.sort_by_key(|f| (f.descriptor.pos.is_none(), f.descriptor.pos.unwrap_or(0)));

        Ok(Self {
            name: name.to_string(),
            fields,
        })
    }

    /// Component names referenced through `bloks` whitelists, in field order
    pub fn referenced_components(&self) -> impl Iterator<Item = &String> {
        self.fields.iter().flat_map(|f| f.descriptor.kind.whitelist())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_tags() {
        let d = FieldDescriptor::from_value(&json!({"type": "text", "required": true}));
        assert_eq!(d.kind, FieldKind::Text);
        assert!(d.required);

        let d = FieldDescriptor::from_value(&json!({"type": "options"}));
        assert_eq!(d.kind, FieldKind::MultiOption);
        assert!(!d.required);
    }

    #[test]
    fn test_required_must_be_literal_true() {
        let d = FieldDescriptor::from_value(&json!({"type": "text", "required": "true"}));
        assert!(!d.required);
    }

    #[test]
    fn test_missing_and_unknown_tags() {
        assert_eq!(FieldDescriptor::from_value(&json!({})).kind, FieldKind::Missing);
        assert_eq!(
            FieldDescriptor::from_value(&json!({"type": "plugin"})).kind,
            FieldKind::Unknown("plugin".to_string())
        );
        assert!(matches!(
            FieldDescriptor::from_value(&json!("text")).kind,
            FieldKind::Invalid(_)
        ));
    }

    #[test]
    fn test_bloks_whitelist() {
        let d = FieldDescriptor::from_value(&json!({
            "type": "bloks",
            "restrict_components": true,
            "component_whitelist": ["card", "button"]
        }));
        assert_eq!(d.kind.whitelist(), ["card".to_string(), "button".to_string()]);

        let unrestricted = FieldDescriptor::from_value(&json!({
            "type": "bloks",
            "restrict_components": false,
            "component_whitelist": ["card"]
        }));
        assert!(unrestricted.kind.whitelist().is_empty());

        let bad = FieldDescriptor::from_value(&json!({"type": "bloks", "component_whitelist": "card"}));
        assert!(matches!(bad.kind, FieldKind::Invalid(_)));
    }

    #[test]
    fn test_component_field_order_follows_pos() {
        let component = Component::from_value(&json!({
            "name": "teaser",
            "schema": {
                "headline": {"type": "text", "pos": 1},
                "note": {"type": "textarea"},
                "image": {"type": "asset", "pos": 0}
            }
        }))
        .unwrap();

        let names: Vec<_> = component.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["image", "headline", "note"]);
    }

    #[test]
    fn test_component_requires_schema() {
        assert!(Component::from_value(&json!({"name": "x"})).is_err());
        assert!(Component::from_value(&json!({"schema": {}})).is_err());
    }
}
