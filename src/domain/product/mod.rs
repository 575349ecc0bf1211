//! The Product resource.
//!
//! `Product` is both the create payload and the read model. Updates go through
//! `ProductPatch`, which keeps "field not sent" apart from "field sent as null".

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

pub mod codec;
pub mod id;

pub use codec::{from_json, DocumentUpdate};
pub use id::{IdError, ProductId};

/// Name of the collection products are stored in.
pub const COLLECTION: &str = "products";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Assigned by the store. Must be absent (or empty) when creating.
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, example = "5f1b2c3d4e5f60718293a4b5")]
    pub id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// Sparse update payload.
///
/// Per field: absent leaves the stored value alone, `null` removes it, a value overwrites it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct ProductPatch {
    /// May repeat the id from the path; any other id is rejected.
    #[serde(rename = "_id", default, deserialize_with = "optional_id")]
    #[schema(value_type = Option<String>)]
    pub id: Option<ProductId>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<i64>)]
    pub quantity: Option<Option<i64>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<f64>)]
    pub rating: Option<Option<f64>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
            && self.price.is_none()
            && self.rating.is_none()
    }
}

// A key that is present deserializes to `Some(inner)`, so `null` becomes `Some(None)`.
// Absent keys fall back to `Default`, i.e. `None`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// `null` and `""` both mean "no id".
fn optional_id<'de, D>(deserializer: D) -> Result<Option<ProductId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => ProductId::parse(&s).map(Some).map_err(serde::de::Error::custom),
    }
}
