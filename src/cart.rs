//! Cart.
//!
//! The buyer's pending selections, persisted across sessions and independent
//! of the catalog's live state. A cart line referencing a product that does
//! not exist in the catalog carries its own embedded synthetic product (an
//! ad-hoc package committed straight into the cart).
//!
//! Stock checks are centralized here: `add` and `set_quantity` verify the
//! requested quantity against the catalog's available stock for real
//! products, so the invariant "a line never exceeds available stock at time
//! of check" holds on every path into the cart.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    ids::ProductId,
    products::Product,
    storage::{self, CART_KEY, Storage, StorageError},
};

/// Cart operation errors.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product exists neither in the catalog nor as an embedded payload.
    #[error("product not found")]
    ProductNotFound,

    /// No cart line for the given product.
    #[error("cart line not found")]
    LineNotFound,

    /// A zero quantity where a positive one is required.
    #[error("quantity must be positive")]
    InvalidQuantity,

    /// The requested quantity exceeds the product's available stock.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        /// Total quantity the line would reach.
        requested: u32,
        /// Stock the catalog currently offers.
        available: u32,
    },

    /// Underlying persistence failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<CatalogError> for CartError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound => Self::ProductNotFound,
            CatalogError::Storage(storage) => Self::Storage(storage),
        }
    }
}

/// One pending selection, keyed by product identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product this line refers to.
    pub product_id: ProductId,

    /// Chosen quantity, always positive.
    pub quantity: u32,

    /// Embedded synthetic product for lines whose identifier is not in the
    /// catalog (ad-hoc packages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_product: Option<Product>,

    /// When the line was first added.
    #[serde(default = "unix_epoch")]
    pub added_at: Timestamp,
}

fn unix_epoch() -> Timestamp {
    Timestamp::UNIX_EPOCH
}

/// View over the persisted cart.
#[derive(Debug, Clone, Copy)]
pub struct Cart<'a, S> {
    storage: &'a S,
}

impl<'a, S: Storage> Cart<'a, S> {
    /// Create a cart view over `storage`.
    #[must_use]
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    fn read(&self) -> Result<Vec<CartLine>, CartError> {
        Ok(storage::load_collection(self.storage, CART_KEY)?)
    }

    fn write(&self, lines: &[CartLine]) -> Result<(), CartError> {
        Ok(storage::save_collection(self.storage, CART_KEY, lines)?)
    }

    /// Add `quantity` units of a product, merging into an existing line. An
    /// embedded `payload` lets a line reference a product the catalog does
    /// not list (an ad-hoc package); such lines skip the stock check. When
    /// the identifier does resolve in the catalog, the catalog stays
    /// authoritative — stock is checked against it and checkout prices from
    /// it — and the payload is carried but never consulted.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity,
    /// [`CartError::ProductNotFound`] when the identifier resolves nowhere,
    /// [`CartError::InsufficientStock`] when the line would exceed catalog
    /// stock, or [`CartError::Storage`] on persistence failure.
    pub fn add(
        &self,
        id: ProductId,
        quantity: u32,
        payload: Option<Product>,
    ) -> Result<CartLine, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let mut lines = self.read()?;
        let catalog_product = Catalog::new(self.storage).find(id)?;

        let existing_quantity = lines
            .iter()
            .find(|line| line.product_id == id)
            .map_or(0, |line| line.quantity);

        match &catalog_product {
            Some(product) => {
                let requested = existing_quantity.saturating_add(quantity);

                if requested > product.quantity {
                    return Err(CartError::InsufficientStock {
                        requested,
                        available: product.quantity,
                    });
                }
            }
            None => {
                let has_payload = payload.is_some()
                    || lines
                        .iter()
                        .any(|line| line.product_id == id && line.custom_product.is_some());

                if !has_payload {
                    return Err(CartError::ProductNotFound);
                }
            }
        }

        let line = if let Some(line) = lines.iter_mut().find(|line| line.product_id == id) {
            line.quantity = line.quantity.saturating_add(quantity);

            if payload.is_some() {
                line.custom_product = payload;
            }

            line.clone()
        } else {
            let line = CartLine {
                product_id: id,
                quantity,
                custom_product: payload,
                added_at: Timestamp::now(),
            };

            lines.push(line.clone());
            line
        };

        tracing::debug!(%id, quantity = line.quantity, "cart line updated");
        self.write(&lines)?;

        Ok(line)
    }

    /// Set a line's quantity. Zero removes the line (no error if it was
    /// already gone); positive values are stock-checked against the catalog
    /// whenever the identifier resolves there, payload or not.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] when setting a positive quantity
    /// on a missing line, [`CartError::ProductNotFound`] when a payload-less
    /// line no longer resolves in the catalog,
    /// [`CartError::InsufficientStock`] when stock is exceeded, or
    /// [`CartError::Storage`] on persistence failure.
    pub fn set_quantity(&self, id: ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove(id);
        }

        let mut lines = self.read()?;

        let line = lines
            .iter_mut()
            .find(|line| line.product_id == id)
            .ok_or(CartError::LineNotFound)?;

        match Catalog::new(self.storage).find(id)? {
            Some(product) => {
                if quantity > product.quantity {
                    return Err(CartError::InsufficientStock {
                        requested: quantity,
                        available: product.quantity,
                    });
                }
            }
            None => {
                if line.custom_product.is_none() {
                    return Err(CartError::ProductNotFound);
                }
            }
        }

        line.quantity = quantity;
        self.write(&lines)
    }

    /// Drop a line. No-op when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] on persistence failure.
    pub fn remove(&self, id: ProductId) -> Result<(), CartError> {
        let mut lines = self.read()?;
        lines.retain(|line| line.product_id != id);

        self.write(&lines)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] on persistence failure.
    pub fn clear(&self) -> Result<(), CartError> {
        self.write(&[])
    }

    /// The current lines, in insertion order. Read-only.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] on persistence failure.
    pub fn snapshot(&self) -> Result<Vec<CartLine>, CartError> {
        self.read()
    }

    /// Total units across all lines; what a cart badge displays.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] on persistence failure.
    pub fn total_units(&self) -> Result<u32, CartError> {
        Ok(self
            .read()?
            .iter()
            .fold(0u32, |sum, line| sum.saturating_add(line.quantity)))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        prices::Price,
        products::NewProduct,
        storage::MemoryStorage,
    };

    use super::*;

    fn produce(name: &str, price: u64, stock: u32) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            farmer: "John Smith Farm".to_owned(),
            price: Price::from_minor(price),
            quantity: stock,
            unit: "kg".to_owned(),
            description: format!("Fresh {name}"),
            category: "vegetables".to_owned(),
            quality: "A+".to_owned(),
            organic: false,
            is_package: false,
            original_price: None,
            discount: None,
            package_items: None,
        }
    }

    #[test]
    fn adding_twice_merges_into_one_line() -> TestResult {
        let storage = MemoryStorage::new();
        let catalog = Catalog::new(&storage);
        let cart = Cart::new(&storage);

        let tomatoes = catalog.insert(produce("Tomatoes", 2_000, 100))?;

        cart.add(tomatoes.id, 2, None)?;
        cart.add(tomatoes.id, 3, None)?;

        let lines = cart.snapshot()?;

        assert_eq!(lines.len(), 1, "one line per product");
        assert_eq!(lines.first().map(|l| l.quantity), Some(5), "2 + 3 = 5");

        Ok(())
    }

    #[test]
    fn zero_quantity_add_is_rejected() -> TestResult {
        let storage = MemoryStorage::new();
        let catalog = Catalog::new(&storage);
        let cart = Cart::new(&storage);

        let tomatoes = catalog.insert(produce("Tomatoes", 2_000, 100))?;

        assert!(matches!(
            cart.add(tomatoes.id, 0, None),
            Err(CartError::InvalidQuantity)
        ));

        Ok(())
    }

    #[test]
    fn unknown_product_without_payload_is_rejected() -> TestResult {
        let storage = MemoryStorage::new();
        let cart = Cart::new(&storage);

        assert!(matches!(
            cart.add(ProductId::new(), 1, None),
            Err(CartError::ProductNotFound)
        ));

        Ok(())
    }

    #[test]
    fn stock_is_enforced_across_merges() -> TestResult {
        let storage = MemoryStorage::new();
        let catalog = Catalog::new(&storage);
        let cart = Cart::new(&storage);

        let scarce = catalog.insert(produce("Saffron", 90_000, 3))?;

        cart.add(scarce.id, 2, None)?;

        assert!(
            matches!(
                cart.add(scarce.id, 2, None),
                Err(CartError::InsufficientStock {
                    requested: 4,
                    available: 3
                })
            ),
            "merged total exceeds stock"
        );
        assert_eq!(
            cart.snapshot()?.first().map(|l| l.quantity),
            Some(2),
            "failed add leaves the line unchanged"
        );

        Ok(())
    }

    #[test]
    fn synthetic_payload_lines_skip_the_stock_check() -> TestResult {
        let storage = MemoryStorage::new();
        let cart = Cart::new(&storage);

        let package = produce("Custom Package (2 items)", 9_000, 1)
            .into_product(Timestamp::UNIX_EPOCH);

        cart.add(package.id, 1, Some(package.clone()))?;

        let lines = cart.snapshot()?;

        assert_eq!(lines.len(), 1);
        assert_eq!(
            lines.first().and_then(|l| l.custom_product.as_ref()),
            Some(&package),
            "payload is embedded in the line"
        );

        Ok(())
    }

    #[test]
    fn set_quantity_zero_removes_the_line() -> TestResult {
        let storage = MemoryStorage::new();
        let catalog = Catalog::new(&storage);
        let cart = Cart::new(&storage);

        let tomatoes = catalog.insert(produce("Tomatoes", 2_000, 100))?;

        cart.add(tomatoes.id, 2, None)?;
        cart.set_quantity(tomatoes.id, 0)?;

        assert!(
            !cart
                .snapshot()?
                .iter()
                .any(|line| line.product_id == tomatoes.id),
            "line removed at zero"
        );

        Ok(())
    }

    #[test]
    fn set_quantity_is_stock_checked() -> TestResult {
        let storage = MemoryStorage::new();
        let catalog = Catalog::new(&storage);
        let cart = Cart::new(&storage);

        let scarce = catalog.insert(produce("Saffron", 90_000, 3))?;

        cart.add(scarce.id, 1, None)?;

        assert!(matches!(
            cart.set_quantity(scarce.id, 10),
            Err(CartError::InsufficientStock {
                requested: 10,
                available: 3
            })
        ));

        cart.set_quantity(scarce.id, 3)?;

        assert_eq!(cart.snapshot()?.first().map(|l| l.quantity), Some(3));

        Ok(())
    }

    #[test]
    fn catalog_stock_binds_payload_lines_for_listed_products() -> TestResult {
        let storage = MemoryStorage::new();
        let catalog = Catalog::new(&storage);
        let cart = Cart::new(&storage);

        let scarce = catalog.insert(produce("Saffron", 90_000, 3))?;

        let mut forged = scarce.clone();
        forged.quantity = 50;

        cart.add(scarce.id, 2, Some(forged))?;

        assert!(
            matches!(
                cart.set_quantity(scarce.id, 10),
                Err(CartError::InsufficientStock {
                    requested: 10,
                    available: 3
                })
            ),
            "payload stock never overrides the catalog"
        );
        assert!(matches!(
            cart.add(scarce.id, 5, None),
            Err(CartError::InsufficientStock {
                requested: 7,
                available: 3
            })
        ));

        Ok(())
    }

    #[test]
    fn set_quantity_on_a_missing_line_errors() -> TestResult {
        let storage = MemoryStorage::new();
        let cart = Cart::new(&storage);

        assert!(matches!(
            cart.set_quantity(ProductId::new(), 2),
            Err(CartError::LineNotFound)
        ));

        Ok(())
    }

    #[test]
    fn clear_and_badge_count() -> TestResult {
        let storage = MemoryStorage::new();
        let catalog = Catalog::new(&storage);
        let cart = Cart::new(&storage);

        let tomatoes = catalog.insert(produce("Tomatoes", 2_000, 100))?;
        let carrots = catalog.insert(produce("Carrots", 1_500, 40))?;

        cart.add(tomatoes.id, 2, None)?;
        cart.add(carrots.id, 3, None)?;

        assert_eq!(cart.total_units()?, 5, "badge counts units, not lines");

        cart.clear()?;

        assert!(cart.snapshot()?.is_empty(), "cleared");
        assert_eq!(cart.total_units()?, 0);

        Ok(())
    }
}
