//! Merged vendor list document
//!
//! The primary document is the base list; the localized document is an
//! optional translation overlay. The schema is otherwise treated as opaque:
//! only the top-level shape and `id`-keyed array entries are inspected.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Primary vendor list plus optional localized overlay
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorList {
    primary: Value,
    localized: Option<Value>,
    version: Option<u64>,
}

impl VendorList {
    /// Build a primary-only vendor list
    ///
    /// # Errors
    ///
    /// Returns [`Error::MergeConstruction`] if the primary document is not a
    /// JSON object.
    pub fn new(primary: Value) -> Result<Self> {
        let version = match &primary {
            Value::Object(map) => map.get("vendorListVersion").and_then(Value::as_u64),
            other => {
                return Err(Error::merge_construction(format!(
                    "primary vendor list must be a JSON object, got {}",
                    kind(other)
                )))
            }
        };

        Ok(Self {
            primary,
            localized: None,
            version,
        })
    }

    /// Attach a localized overlay
    ///
    /// An overlay that is not a JSON object cannot be merged and is dropped,
    /// leaving the list primary-only.
    pub fn with_localized(mut self, localized: Value) -> Self {
        if localized.is_object() {
            self.localized = Some(localized);
        } else {
            tracing::warn!(
                kind = kind(&localized),
                "Ignoring localized vendor list that is not a JSON object"
            );
        }
        self
    }

    /// The primary document as fetched
    pub fn primary(&self) -> &Value {
        &self.primary
    }

    /// The localized overlay as fetched, if one was merged
    pub fn localized(&self) -> Option<&Value> {
        self.localized.as_ref()
    }

    /// `vendorListVersion` reported by the primary document
    pub fn version(&self) -> Option<u64> {
        self.version
    }

    /// Whether a localized overlay is present
    pub fn is_localized(&self) -> bool {
        self.localized.is_some()
    }

    /// Primary document with localized fields applied
    ///
    /// For every top-level array present in both documents, entries whose
    /// `id` matches receive the overlay's fields. Returns a new value; the
    /// stored documents are left untouched.
    pub fn merged(&self) -> Value {
        let mut merged = self.primary.clone();
        let Some(Value::Object(overlay)) = &self.localized else {
            return merged;
        };
        let Value::Object(target) = &mut merged else {
            return self.primary.clone();
        };

        for (key, localized_items) in overlay {
            let (Some(Value::Array(items)), Value::Array(localized_items)) =
                (target.get_mut(key), localized_items)
            else {
                continue;
            };
            for item in items.iter_mut().filter_map(Value::as_object_mut) {
                let Some(id) = item.get("id").cloned() else {
                    continue;
                };
                if let Some(translation) = find_by_id(localized_items, &id) {
                    for (field, text) in translation {
                        if field != "id" {
                            item.insert(field.clone(), text.clone());
                        }
                    }
                }
            }
        }

        merged
    }
}

fn find_by_id<'a>(items: &'a [Value], id: &Value) -> Option<&'a Map<String, Value>> {
    items
        .iter()
        .filter_map(Value::as_object)
        .find(|entry| entry.get("id") == Some(id))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn primary() -> Value {
        json!({
            "vendorListVersion": 42,
            "purposes": [
                { "id": 1, "name": "Storage", "description": "Store info" },
                { "id": 2, "name": "Personalisation", "description": "Tailor content" }
            ],
            "features": [{ "id": 1, "name": "Offline data" }],
            "vendors": [{ "id": 8, "name": "Vendor A", "purposeIds": [1] }]
        })
    }

    #[test]
    fn test_primary_only() {
        let list = VendorList::new(primary()).unwrap();
        assert_eq!(list.version(), Some(42));
        assert!(!list.is_localized());
        assert_eq!(list.merged(), primary());
    }

    #[test]
    fn test_rejects_non_object_primary() {
        let err = VendorList::new(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, Error::MergeConstruction(_)));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_overlay_translates_matching_entries() {
        let localized = json!({
            "purposes": [{ "id": 2, "name": "Personnalisation", "description": "Adapter" }],
            "features": [{ "id": 1, "name": "Données hors ligne" }]
        });
        let list = VendorList::new(primary()).unwrap().with_localized(localized);
        let merged = list.merged();

        assert_eq!(merged["purposes"][0]["name"], "Storage");
        assert_eq!(merged["purposes"][1]["name"], "Personnalisation");
        assert_eq!(merged["purposes"][1]["description"], "Adapter");
        assert_eq!(merged["features"][0]["name"], "Données hors ligne");
        assert_eq!(merged["vendors"][0]["name"], "Vendor A");
    }

    #[test]
    fn test_merge_leaves_inputs_untouched() {
        let localized = json!({ "purposes": [{ "id": 1, "name": "Stockage" }] });
        let list = VendorList::new(primary())
            .unwrap()
            .with_localized(localized.clone());
        let _ = list.merged();

        assert_eq!(list.primary(), &primary());
        assert_eq!(list.localized(), Some(&localized));
    }

    #[test]
    fn test_non_object_overlay_is_dropped() {
        let list = VendorList::new(primary())
            .unwrap()
            .with_localized(json!("not a document"));
        assert!(!list.is_localized());
        assert_eq!(list.merged(), primary());
    }
}
