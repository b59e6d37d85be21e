//! Catalog store.
//!
//! The persisted collection of [`Product`] records, sourced from seed data
//! and farmer-created entries. Every mutation is a whole-collection
//! read-modify-write against the backing [`Storage`].

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    ids::ProductId,
    products::{NewProduct, Product, ProductUpdate},
    storage::{self, PRODUCTS_KEY, Storage, StorageError},
};

/// Catalog operation errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product with the given identifier.
    #[error("product not found")]
    NotFound,

    /// Underlying persistence failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// View over the persisted product catalog.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a, S> {
    storage: &'a S,
}

impl<'a, S: Storage> Catalog<'a, S> {
    /// Create a catalog view over `storage`.
    #[must_use]
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    fn read(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(storage::load_collection(self.storage, PRODUCTS_KEY)?)
    }

    fn write(&self, products: &[Product]) -> Result<(), CatalogError> {
        Ok(storage::save_collection(
            self.storage,
            PRODUCTS_KEY,
            products,
        )?)
    }

    /// All products, newest first, paused ones included.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] on persistence failure.
    pub fn list(&self) -> Result<Vec<Product>, CatalogError> {
        self.read()
    }

    /// Products currently listed for sale.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] on persistence failure.
    pub fn active(&self) -> Result<Vec<Product>, CatalogError> {
        let mut products = self.read()?;
        products.retain(|product| product.active);

        Ok(products)
    }

    /// Look up a product, `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] on persistence failure.
    pub fn find(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self
            .read()?
            .into_iter()
            .find(|product| product.id == id))
    }

    /// Look up a product that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when absent, or
    /// [`CatalogError::Storage`] on persistence failure.
    pub fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.find(id)?.ok_or(CatalogError::NotFound)
    }

    /// Add a new record to the front of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] on persistence failure.
    pub fn insert(&self, new: NewProduct) -> Result<Product, CatalogError> {
        let product = new.into_product(Timestamp::now());
        let mut products = self.read()?;

        tracing::debug!(id = %product.id, name = %product.name, "inserting product");

        products.insert(0, product.clone());
        self.write(&products)?;

        Ok(product)
    }

    /// Overwrite the farmer-editable fields of a product and stamp it
    /// updated.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when absent, or
    /// [`CatalogError::Storage`] on persistence failure.
    pub fn update(&self, id: ProductId, update: ProductUpdate) -> Result<Product, CatalogError> {
        let mut products = self.read()?;

        let product = products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or(CatalogError::NotFound)?;

        product.name = update.name;
        product.category = update.category;
        product.description = update.description;
        product.price = update.price;
        product.quantity = update.quantity;
        product.updated_at = Some(Timestamp::now());

        let updated = product.clone();
        self.write(&products)?;

        Ok(updated)
    }

    /// Remove a product from the catalog entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when absent, or
    /// [`CatalogError::Storage`] on persistence failure.
    pub fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        let mut products = self.read()?;
        let before = products.len();

        products.retain(|product| product.id != id);

        if products.len() == before {
            return Err(CatalogError::NotFound);
        }

        tracing::debug!(%id, "deleting product");
        self.write(&products)
    }

    /// Pause or resume a listing.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when absent, or
    /// [`CatalogError::Storage`] on persistence failure.
    pub fn set_active(&self, id: ProductId, active: bool) -> Result<Product, CatalogError> {
        let mut products = self.read()?;

        let product = products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or(CatalogError::NotFound)?;

        product.active = active;

        let updated = product.clone();
        self.write(&products)?;

        Ok(updated)
    }

    /// Flip a listing between paused and active.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when absent, or
    /// [`CatalogError::Storage`] on persistence failure.
    pub fn toggle_active(&self, id: ProductId) -> Result<Product, CatalogError> {
        let current = self.get(id)?;

        self.set_active(id, !current.active)
    }

    /// All products owned by `farmer`, paused ones included.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] on persistence failure.
    pub fn by_farmer(&self, farmer: &str) -> Result<Vec<Product>, CatalogError> {
        let mut products = self.read()?;
        products.retain(|product| product.farmer == farmer);

        Ok(products)
    }

    /// Active products matching a free-text query and optional category.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] on persistence failure.
    pub fn search(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Result<Vec<Product>, CatalogError> {
        let mut products = self.active()?;

        products.retain(|product| {
            let in_category = category.is_none_or(|category| product.category == category);

            in_category && product.matches_query(query)
        });

        Ok(products)
    }

    /// Populate the catalog with seed products, but only when the catalog
    /// key has never been written. An explicitly emptied catalog stays
    /// empty. Returns how many records were seeded.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Storage`] on persistence failure.
    pub fn seed<I>(&self, products: I) -> Result<usize, CatalogError>
    where
        I: IntoIterator<Item = NewProduct>,
    {
        if self.storage.load(PRODUCTS_KEY)?.is_some() {
            return Ok(0);
        }

        let now = Timestamp::now();
        let seeded: Vec<Product> = products
            .into_iter()
            .map(|new| new.into_product(now))
            .collect();

        tracing::debug!(count = seeded.len(), "seeding catalog");
        self.write(&seeded)?;

        Ok(seeded.len())
    }
}
