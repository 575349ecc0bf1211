//! JSON <-> Product conversions for the wire and for stored documents.
//!
//! Stored documents are JSON objects that never contain the `_id` key; the store
//! keeps the id next to the document.

use super::{Product, ProductId, ProductPatch};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

/// Decodes a request body holding exactly one JSON object.
pub fn from_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, serde_json::Error> {
    let value: JsonValue = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(serde::de::Error::custom("expected a JSON object"));
    }
    serde_json::from_value(value)
}

impl Product {
    /// The stored form: every set field except the id.
    pub fn to_document(&self) -> Map<String, JsonValue> {
        let mut doc = match serde_json::to_value(self) {
            Ok(JsonValue::Object(map)) => map,
            _ => Map::new(),
        };
        doc.remove("_id");
        doc
    }

    pub fn from_document(
        id: ProductId,
        mut doc: Map<String, JsonValue>,
    ) -> Result<Self, serde_json::Error> {
        doc.remove("_id");
        let mut product: Product = serde_json::from_value(JsonValue::Object(doc))?;
        product.id = Some(id);
        Ok(product)
    }
}

/// A sparse update in stored form: keys to overwrite and keys to remove.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentUpdate {
    pub set: Map<String, JsonValue>,
    pub unset: Vec<String>,
}

impl DocumentUpdate {
    /// Applies the update to `doc`, returning whether anything changed.
    pub fn apply(&self, doc: &mut Map<String, JsonValue>) -> bool {
        let mut changed = false;
        for (key, value) in &self.set {
            if doc.get(key) != Some(value) {
                doc.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        for key in &self.unset {
            changed |= doc.remove(key).is_some();
        }
        changed
    }
}

fn put<T: serde::Serialize>(update: &mut DocumentUpdate, key: &str, field: Option<Option<T>>) {
    match field {
        None => {}
        Some(None) => update.unset.push(key.to_string()),
        Some(Some(v)) => {
            if let Ok(value) = serde_json::to_value(v) {
                update.set.insert(key.to_string(), value);
            }
        }
    }
}

impl From<ProductPatch> for DocumentUpdate {
    fn from(patch: ProductPatch) -> Self {
        let mut update = DocumentUpdate::default();
        put(&mut update, "name", patch.name);
        put(&mut update, "description", patch.description);
        put(&mut update, "quantity", patch.quantity);
        put(&mut update, "price", patch.price);
        put(&mut update, "rating", patch.rating);
        update
    }
}
