//! Untyped items as the backing stores hand them out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kind::Origin;

/// Untyped field mapping of a document or local item.
pub type Fields = Map<String, Value>;

/// A document of a remote collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// An item observed by a source adapter, stamped with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
    pub id: String,
    pub origin: Origin,
    pub fields: Fields,
}

impl RawItem {
    pub fn remote(document: Document) -> Self {
        Self {
            id: document.id,
            origin: Origin::Remote,
            fields: document.fields,
        }
    }

    /// Builds a local item from a stored JSON value.
    ///
    /// Returns `None` for values that are not objects or carry no usable
    /// `id`: such items cannot be addressed by a mutation.
    pub fn local(value: Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        let id = fields.get("id").and_then(id_string)?;
        Some(Self {
            id,
            origin: Origin::Local,
            fields,
        })
    }
}

/// String form of an `id` value; local ids are usually epoch-millis numbers.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn local_items_need_an_id() {
        let item = RawItem::local(json!({ "id": 1700000000000u64, "title": "x" })).unwrap();
        assert_eq!(item.id, "1700000000000");
        assert_eq!(item.origin, Origin::Local);

        assert!(RawItem::local(json!({ "title": "no id" })).is_none());
        assert!(RawItem::local(json!({ "id": "" })).is_none());
        assert!(RawItem::local(json!(["not", "an", "object"])).is_none());
    }
}
