//! Wishlist and favorite farmers.
//!
//! Two small toggle collections: products the buyer wants to come back to,
//! and farmers they follow. Entries are plain references stamped with when
//! they were added; they keep insertion order and survive products being
//! deleted from the catalog. A dangling wishlist entry is harmless and simply
//! resolves to nothing when displayed.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ids::ProductId,
    storage::{self, FAVORITE_FARMERS_KEY, WISHLIST_KEY, Storage, StorageError},
};

/// Wishlist operation errors.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// Underlying persistence failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A wishlisted product reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    /// Product the buyer wants to come back to.
    pub product_id: ProductId,

    /// When it was wishlisted.
    #[serde(default = "unix_epoch")]
    pub added_at: Timestamp,
}

/// A followed farmer, referenced by display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteFarmer {
    /// Farmer or farm name as it appears on listings.
    pub name: String,

    /// When the farmer was followed.
    #[serde(default = "unix_epoch")]
    pub added_at: Timestamp,
}

fn unix_epoch() -> Timestamp {
    Timestamp::UNIX_EPOCH
}

/// View over the persisted wishlist and favorite-farmer collections.
#[derive(Debug, Clone, Copy)]
pub struct Wishlist<'a, S> {
    storage: &'a S,
}

impl<'a, S: Storage> Wishlist<'a, S> {
    /// Create a wishlist view over `storage`.
    #[must_use]
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Add the product if absent, remove it if present. Returns whether the
    /// product is on the wishlist afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Storage`] on persistence failure.
    pub fn toggle(&self, id: ProductId) -> Result<bool, WishlistError> {
        let mut entries: Vec<WishlistEntry> =
            storage::load_collection(self.storage, WISHLIST_KEY)?;

        let wished = if entries.iter().any(|entry| entry.product_id == id) {
            entries.retain(|entry| entry.product_id != id);
            false
        } else {
            entries.push(WishlistEntry {
                product_id: id,
                added_at: Timestamp::now(),
            });
            true
        };

        tracing::debug!(%id, wished, "wishlist toggled");
        storage::save_collection(self.storage, WISHLIST_KEY, &entries)?;

        Ok(wished)
    }

    /// Whether the product is on the wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Storage`] on persistence failure.
    pub fn contains(&self, id: ProductId) -> Result<bool, WishlistError> {
        Ok(self
            .entries()?
            .iter()
            .any(|entry| entry.product_id == id))
    }

    /// Wishlist entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Storage`] on persistence failure.
    pub fn entries(&self) -> Result<Vec<WishlistEntry>, WishlistError> {
        Ok(storage::load_collection(self.storage, WISHLIST_KEY)?)
    }

    /// Follow the farmer if not followed, unfollow otherwise. Returns whether
    /// the farmer is followed afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Storage`] on persistence failure.
    pub fn toggle_farmer(&self, farmer: &str) -> Result<bool, WishlistError> {
        let mut farmers: Vec<FavoriteFarmer> =
            storage::load_collection(self.storage, FAVORITE_FARMERS_KEY)?;

        let followed = if farmers.iter().any(|entry| entry.name == farmer) {
            farmers.retain(|entry| entry.name != farmer);
            false
        } else {
            farmers.push(FavoriteFarmer {
                name: farmer.to_owned(),
                added_at: Timestamp::now(),
            });
            true
        };

        tracing::debug!(farmer, followed, "favorite farmer toggled");
        storage::save_collection(self.storage, FAVORITE_FARMERS_KEY, &farmers)?;

        Ok(followed)
    }

    /// Whether the farmer is followed.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Storage`] on persistence failure.
    pub fn is_favorite_farmer(&self, farmer: &str) -> Result<bool, WishlistError> {
        Ok(self.farmers()?.iter().any(|entry| entry.name == farmer))
    }

    /// Followed farmers, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::Storage`] on persistence failure.
    pub fn farmers(&self) -> Result<Vec<FavoriteFarmer>, WishlistError> {
        Ok(storage::load_collection(self.storage, FAVORITE_FARMERS_KEY)?)
    }
}
