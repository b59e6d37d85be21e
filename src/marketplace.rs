//! Marketplace facade.
//!
//! Owns the storage backend and hands out per-concern views. A
//! [`Marketplace`] is one buyer session: construct it over a backend, call
//! [`init`](Marketplace::init) once, then work through the views. Views
//! borrow the backend, so they are created on demand and thrown away.

use crate::{
    cart::{Cart, CartLine},
    catalog::{Catalog, CatalogError},
    fixtures,
    orders::{Order, Orders},
    storage::{self, CART_KEY, ORDERS_KEY, Storage},
    wishlist::Wishlist,
};

/// A marketplace session over a storage backend.
#[derive(Debug)]
pub struct Marketplace<S> {
    storage: S,
}

impl<S: Storage> Marketplace<S> {
    /// Wrap a storage backend.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Prepare the store for use: seed the catalog on first run and make
    /// sure the cart and order collections exist. Returns how many products
    /// were seeded (zero on every run but the first).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] on persistence failure.
    pub fn init(&self) -> Result<usize, CatalogError> {
        let seeded = self.catalog().seed(fixtures::sample_products())?;

        if self.storage.load(CART_KEY)?.is_none() {
            storage::save_collection::<CartLine, _>(&self.storage, CART_KEY, &[])?;
        }

        if self.storage.load(ORDERS_KEY)?.is_none() {
            storage::save_collection::<Order, _>(&self.storage, ORDERS_KEY, &[])?;
        }

        tracing::debug!(seeded, "marketplace initialized");

        Ok(seeded)
    }

    /// The product catalog.
    #[must_use]
    pub fn catalog(&self) -> Catalog<'_, S> {
        Catalog::new(&self.storage)
    }

    /// The buyer's cart.
    #[must_use]
    pub fn cart(&self) -> Cart<'_, S> {
        Cart::new(&self.storage)
    }

    /// The order history.
    #[must_use]
    pub fn orders(&self) -> Orders<'_, S> {
        Orders::new(&self.storage)
    }

    /// The wishlist and favorite farmers.
    #[must_use]
    pub fn wishlist(&self) -> Wishlist<'_, S> {
        Wishlist::new(&self.storage)
    }

    /// Direct access to the backend.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Unwrap the backend, ending the session.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }
}
