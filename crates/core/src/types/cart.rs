//! Cart line type and its persisted form.
//!
//! Persisted carts are JSON arrays of `{"variant_id": "5", "quantity": 2}`.
//! Older carts were written straight from form inputs, so both fields are
//! accepted either as strings or as numbers and normalized on read.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::id::VariantId;

/// One cart entry: a variant and how many units of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(
        serialize_with = "serialize_variant_id",
        deserialize_with = "deserialize_variant_id"
    )]
    pub variant_id: VariantId,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub quantity: u32,
}

impl CartLine {
    /// Create a new cart line.
    #[must_use]
    pub const fn new(variant_id: VariantId, quantity: u32) -> Self {
        Self {
            variant_id,
            quantity,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Number(i64),
    Text(String),
}

impl TextOrNumber {
    fn into_i64(self) -> Result<i64, String> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("expected an integer, got {s:?}")),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's serialize_with signature
fn serialize_variant_id<S: Serializer>(id: &VariantId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&id.to_string())
}

fn deserialize_variant_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<VariantId, D::Error> {
    let raw = TextOrNumber::deserialize(deserializer)?
        .into_i64()
        .map_err(serde::de::Error::custom)?;
    i32::try_from(raw)
        .map(VariantId::new)
        .map_err(|_| serde::de::Error::custom(format!("variant id out of range: {raw}")))
}

fn deserialize_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = TextOrNumber::deserialize(deserializer)?
        .into_i64()
        .map_err(serde::de::Error::custom)?;
    match u32::try_from(raw) {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(serde::de::Error::custom(format!(
            "quantity must be a positive integer, got {raw}"
        ))),
    }
}
