//! Typed identifiers.
//!
//! Every record is keyed by a UUID newtype so product and order identifiers
//! cannot be mixed up or compared across kinds. Equality is exact; there are
//! no loose numeric/string coercions anywhere in the crate.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a catalog product (including synthetic package products).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

/// Identifier of an order in the order history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

macro_rules! uuid_id {
    ($name:ident) => {
        impl $name {
            /// Generate a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            #[must_use]
            pub const fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::from_str(s)?))
            }
        }
    };
}

uuid_id!(ProductId);
uuid_id!(OrderId);

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn fresh_ids_are_unique() {
        assert_ne!(ProductId::new(), ProductId::new());
        assert_ne!(OrderId::new(), OrderId::new());
    }

    #[test]
    fn round_trips_through_display_and_from_str() -> TestResult {
        let id = ProductId::new();
        let parsed: ProductId = id.to_string().parse()?;

        assert_eq!(parsed, id);

        Ok(())
    }

    #[test]
    fn serializes_as_bare_uuid_string() -> TestResult {
        let id = OrderId::new();
        let json = serde_json::to_string(&id)?;

        assert_eq!(json, format!("\"{id}\""));

        Ok(())
    }
}
