//! Product models.
//!
//! A [`Product`] is one catalog record. Synthetic package products carry the
//! optional `original_price`/`discount`/`package_items` trio; ordinary
//! produce leaves them unset. Records are serialized in camelCase, matching
//! the persisted catalog blob format.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{ids::ProductId, prices::Price};

/// Product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique, stable identifier.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Name of the owning farmer or farm.
    pub farmer: String,

    /// Unit price.
    pub price: Price,

    /// Available stock, in `unit`s.
    pub quantity: u32,

    /// Unit label (kg, bundle, package, ...).
    pub unit: String,

    /// Free-form description.
    pub description: String,

    /// Category label (vegetables, fruits, packages, ...).
    pub category: String,

    /// Quality grade label.
    pub quality: String,

    /// Whether the product is certified organic.
    #[serde(default)]
    pub organic: bool,

    /// Whether this record is a package bundle.
    pub is_package: bool,

    /// Whether the product is listed. Paused products stay in the catalog
    /// but are filtered from active views.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Pre-discount price; packages only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,

    /// Discount in whole percent points; packages only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u64>,

    /// Human-readable content summaries; packages only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_items: Option<Vec<String>>,

    /// When the record was created.
    #[serde(default = "unix_epoch")]
    pub created_at: Timestamp,

    /// When the record was last edited, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

fn default_active() -> bool {
    true
}

fn unix_epoch() -> Timestamp {
    Timestamp::UNIX_EPOCH
}

impl Product {
    /// Whether the product matches a lowercase search query against name,
    /// farmer and description.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }

        let query = query.to_lowercase();

        self.name.to_lowercase().contains(&query)
            || self.farmer.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// Payload for creating a catalog record. The catalog assigns the identifier
/// and creation timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Display name.
    pub name: String,

    /// Owning farmer or farm.
    pub farmer: String,

    /// Unit price.
    pub price: Price,

    /// Available stock.
    pub quantity: u32,

    /// Unit label.
    pub unit: String,

    /// Free-form description.
    pub description: String,

    /// Category label.
    pub category: String,

    /// Quality grade label.
    pub quality: String,

    /// Organic certification flag.
    pub organic: bool,

    /// Whether this is a package bundle.
    pub is_package: bool,

    /// Pre-discount price; packages only.
    pub original_price: Option<Price>,

    /// Discount in whole percent points; packages only.
    pub discount: Option<u64>,

    /// Content summaries; packages only.
    pub package_items: Option<Vec<String>>,
}

impl NewProduct {
    /// Finalize into a catalog record with a fresh identifier, stamped now
    /// and listed as active.
    #[must_use]
    pub fn into_product(self, now: Timestamp) -> Product {
        Product {
            id: ProductId::new(),
            name: self.name,
            farmer: self.farmer,
            price: self.price,
            quantity: self.quantity,
            unit: self.unit,
            description: self.description,
            category: self.category,
            quality: self.quality,
            organic: self.organic,
            is_package: self.is_package,
            active: true,
            original_price: self.original_price,
            discount: self.discount,
            package_items: self.package_items,
            created_at: now,
            updated_at: None,
        }
    }
}

/// Farmer-editable fields of a product. Applied wholesale by
/// [`Catalog::update`](crate::catalog::Catalog::update).
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    /// New display name.
    pub name: String,

    /// New category label.
    pub category: String,

    /// New description.
    pub description: String,

    /// New unit price.
    pub price: Price,

    /// New available stock.
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn tomatoes() -> NewProduct {
        NewProduct {
            name: "Organic Tomatoes".to_owned(),
            farmer: "John Smith Farm".to_owned(),
            price: Price::from_minor(2_000),
            quantity: 100,
            unit: "kg".to_owned(),
            description: "Fresh organic tomatoes grown without pesticides".to_owned(),
            category: "vegetables".to_owned(),
            quality: "A+".to_owned(),
            organic: true,
            is_package: false,
            original_price: None,
            discount: None,
            package_items: None,
        }
    }

    #[test]
    fn into_product_stamps_id_and_activity() {
        let product = tomatoes().into_product(Timestamp::UNIX_EPOCH);

        assert!(product.active, "new products start active");
        assert_eq!(product.updated_at, None, "never edited");
        assert_eq!(product.created_at, Timestamp::UNIX_EPOCH, "stamped");
    }

    #[test]
    fn serializes_in_camel_case_without_empty_package_fields() -> TestResult {
        let product = tomatoes().into_product(Timestamp::UNIX_EPOCH);
        let json = serde_json::to_value(&product)?;

        assert_eq!(json["isPackage"], serde_json::json!(false));
        assert!(
            json.get("originalPrice").is_none(),
            "package fields omitted for produce"
        );

        Ok(())
    }

    #[test]
    fn missing_active_flag_deserializes_as_active() -> TestResult {
        let mut json = serde_json::to_value(tomatoes().into_product(Timestamp::UNIX_EPOCH))?;

        if let Some(object) = json.as_object_mut() {
            object.remove("active");
        }

        let product: Product = serde_json::from_value(json)?;

        assert!(product.active, "absent active flag means listed");

        Ok(())
    }

    #[test]
    fn query_matching_is_case_insensitive_across_fields() {
        let product = tomatoes().into_product(Timestamp::UNIX_EPOCH);

        assert!(product.matches_query("TOMATO"), "name match");
        assert!(product.matches_query("john smith"), "farmer match");
        assert!(product.matches_query("pesticides"), "description match");
        assert!(!product.matches_query("strawberry"), "no match");
        assert!(product.matches_query(""), "empty query matches all");
    }
}
