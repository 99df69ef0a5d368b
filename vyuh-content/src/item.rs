use crate::error::{ContentError, ContentResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One content block as delivered by the CMS.
///
/// The schema type is read from `_type` (also accepted as `schemaType`).
/// [`ContentItem::from_value`] accepts a payload carrying both keys when
/// they agree.
/// Everything other than the schema type and the optional `layout` object
/// lands in `fields`. Items are immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "_type", alias = "schemaType")]
    schema_type: String,
    #[serde(
        default,
        deserialize_with = "lenient_layout",
        skip_serializing_if = "Option::is_none"
    )]
    layout: Option<LayoutConfiguration>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// The authored `layout` sub-object of a content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfiguration {
    #[serde(rename = "_type", alias = "schemaType")]
    schema_type: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// A malformed layout object is treated as absent so the item still renders
/// with its default layout.
fn lenient_layout<'de, D>(deserializer: D) -> Result<Option<LayoutConfiguration>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

impl ContentItem {
    pub fn new(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: schema_type.into(),
            layout: None,
            fields: Map::new(),
        }
    }

    /// Returns a copy with `name` set to `value`.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns a copy with the authored layout set.
    pub fn with_layout(mut self, layout: LayoutConfiguration) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Decodes an item from a JSON payload.
    pub fn from_value(value: Value) -> ContentResult<Self> {
        let mut object = match value {
            Value::Object(object) => object,
            other => {
                return Err(ContentError::InvalidItem(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                )));
            }
        };
        if let Some(alias) = object.remove("schemaType") {
            match object.get("_type") {
                Some(primary) if *primary != alias => {
                    return Err(ContentError::InvalidItem(format!(
                        "conflicting schema types: _type {primary}, schemaType {alias}"
                    )));
                }
                Some(_) => {}
                None => {
                    object.insert("_type".to_string(), alias);
                }
            }
        }
        let item: Self = serde_json::from_value(Value::Object(object))?;
        if item.schema_type.trim().is_empty() {
            return Err(ContentError::InvalidItem("empty schema type".into()));
        }
        Ok(item)
    }

    pub fn schema_type(&self) -> &str {
        &self.schema_type
    }

    pub fn layout(&self) -> Option<&LayoutConfiguration> {
        self.layout.as_ref()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Looks up a value by JSON pointer (e.g. `"/image/asset/url"`).
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        let rest = pointer.strip_prefix('/')?;
        let (head, tail) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, ""),
        };
        let head = head.replace("~1", "/").replace("~0", "~");
        let value = self.fields.get(head.as_str())?;
        if tail.is_empty() {
            Some(value)
        } else {
            value.pointer(tail)
        }
    }

    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.get(pointer).and_then(Value::as_str)
    }

    pub fn get_bool(&self, pointer: &str) -> Option<bool> {
        self.get(pointer).and_then(Value::as_bool)
    }

    pub fn get_number(&self, pointer: &str) -> Option<f64> {
        self.get(pointer).and_then(Value::as_f64)
    }

    /// Decodes the nested item stored under `name`, if it is one.
    pub fn child(&self, name: &str) -> Option<ContentItem> {
        self.fields
            .get(name)
            .and_then(|value| ContentItem::from_value(value.clone()).ok())
    }

    /// Decodes the nested items stored in the array under `name`.
    /// Entries that are not content items are skipped.
    pub fn children(&self, name: &str) -> Vec<ContentItem> {
        self.fields
            .get(name)
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(|value| ContentItem::from_value(value.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Decodes the item's fields into a typed view.
    pub fn decode<T: DeserializeOwned>(&self) -> ContentResult<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

impl LayoutConfiguration {
    pub fn new(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: schema_type.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn schema_type(&self) -> &str {
        &self.schema_type
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.field(name).and_then(Value::as_bool)
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(Value::as_f64)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentItem, LayoutConfiguration};
    use serde_json::json;

    #[test]
    fn decodes_type_layout_and_fields() {
        let item = ContentItem::from_value(json!({
            "_type": "vyuh.card",
            "_key": "abc",
            "title": "Chakra",
            "layout": { "_type": "vyuh.card.layout.list_item", "dense": true },
        }))
        .unwrap();

        assert_eq!(item.schema_type(), "vyuh.card");
        assert_eq!(item.get_str("/title"), Some("Chakra"));
        assert_eq!(item.get_str("/_key"), Some("abc"));
        let layout = item.layout().unwrap();
        assert_eq!(layout.schema_type(), "vyuh.card.layout.list_item");
        assert_eq!(layout.get_bool("dense"), Some(true));
        assert!(item.field("layout").is_none());
    }

    #[test]
    fn accepts_schema_type_alias() {
        let item = ContentItem::from_value(json!({ "schemaType": "vyuh.divider" })).unwrap();
        assert_eq!(item.schema_type(), "vyuh.divider");
    }

    #[test]
    fn both_type_keys_must_agree() {
        let item =
            ContentItem::from_value(json!({ "_type": "vyuh.card", "schemaType": "vyuh.card" }))
                .unwrap();
        assert_eq!(item.schema_type(), "vyuh.card");
        assert!(item.field("schemaType").is_none());

        let err = ContentItem::from_value(json!({ "_type": "vyuh.card", "schemaType": "vyuh.divider" }))
            .unwrap_err();
        assert!(err.to_string().contains("conflicting schema types"));
    }

    #[test]
    fn rejects_missing_or_empty_type() {
        assert!(ContentItem::from_value(json!({ "title": "x" })).is_err());
        assert!(ContentItem::from_value(json!({ "_type": " " })).is_err());
        assert!(ContentItem::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn malformed_layout_is_dropped() {
        let item = ContentItem::from_value(json!({
            "_type": "vyuh.card",
            "layout": { "dense": true },
        }))
        .unwrap();
        assert!(item.layout().is_none());
    }

    #[test]
    fn pointer_lookup_into_nested_values() {
        let item = ContentItem::new("vyuh.card")
            .with_field("image", json!({ "asset": { "url": "https://cdn/x.png" } }));
        assert_eq!(item.get_str("/image/asset/url"), Some("https://cdn/x.png"));
        assert!(item.get("image").is_none());
        assert!(item.get("/missing").is_none());
    }

    #[test]
    fn children_skip_non_items() {
        let item = ContentItem::new("vyuh.group").with_field(
            "items",
            json!([{ "_type": "vyuh.divider" }, 42, { "title": "no type" }, { "_type": "vyuh.card" }]),
        );
        let children = item.children("items");
        assert_eq!(children.len(), 2);
        assert_eq!(children[1].schema_type(), "vyuh.card");
        assert!(item.children("missing").is_empty());
    }

    #[test]
    fn serializes_back_to_wire_shape() {
        let item = ContentItem::new("vyuh.divider")
            .with_field("thickness", 2)
            .with_layout(LayoutConfiguration::new("vyuh.divider.layout.dashed"));
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["_type"], "vyuh.divider");
        assert_eq!(value["thickness"], 2);
        assert_eq!(value["layout"]["_type"], "vyuh.divider.layout.dashed");
    }
}
