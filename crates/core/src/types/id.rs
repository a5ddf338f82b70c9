//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types (a variant id is not a
//! shoe id, even though the inventory API sends both as bare integers).

use thiserror::Error;

/// Error returned when an ID cannot be parsed from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id: {value:?}")]
pub struct ParseIdError {
    /// Name of the ID type that failed to parse.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `i32` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Ord`
/// - Conversion methods: `new()`, `as_i32()`
/// - `From<i32>` and `Into<i32>` implementations
/// - `FromStr` that trims surrounding whitespace before parsing
///
/// # Example
///
/// ```rust
/// # use shoe_pos_core::define_id;
/// define_id!(ShoeId);
/// define_id!(VariantId);
///
/// let shoe_id = ShoeId::new(1);
/// let variant_id: VariantId = " 7 ".parse().unwrap();
/// assert_eq!(variant_id.as_i32(), 7);
///
/// // These are different types, so this won't compile:
/// // let _: ShoeId = variant_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::id::ParseIdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim()
                    .parse::<i32>()
                    .map(Self)
                    .map_err(|_| $crate::types::id::ParseIdError {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Inventory entities
define_id!(BrandId);
define_id!(CategoryId);
define_id!(DemographicId);
define_id!(ShoeId);
define_id!(SizeId);
define_id!(VariantId);

// Sales
define_id!(UserId);
define_id!(SaleId);

/// Join IDs into the comma-separated form used by the inventory API query
/// string (`brand_ids=1,4,9`).
#[must_use]
pub fn join_ids<I, T>(ids: I) -> String
where
    I: IntoIterator<Item = T>,
    T: core::fmt::Display,
{
    ids.into_iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id: VariantId = "  42\n".parse().unwrap();
        assert_eq!(id, VariantId::new(42));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = "4a".parse::<VariantId>().unwrap_err();
        assert_eq!(err.kind, "VariantId");
        assert_eq!(err.to_string(), "invalid VariantId id: \"4a\"");
    }

    #[test]
    fn test_display_matches_inner_value() {
        assert_eq!(ShoeId::new(17).to_string(), "17");
    }

    #[test]
    fn test_join_ids() {
        let ids = [BrandId::new(1), BrandId::new(4), BrandId::new(9)];
        assert_eq!(join_ids(ids), "1,4,9");
        assert_eq!(join_ids(Vec::<BrandId>::new()), "");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&CategoryId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: CategoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CategoryId::new(3));
    }
}
