//! Persistence adapter.
//!
//! Every collection in the crate (catalog, cart, orders, wishlist) is a named
//! JSON blob behind the [`Storage`] trait. Backends provide atomic whole-value
//! read/write per key; callers perform read-modify-write without isolation, so
//! two sessions sharing one backing store can overwrite each other's changes.
//! That lost-update window is an accepted limitation of the single-user scope.

use std::{
    cell::RefCell,
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

/// Storage key for the product catalog collection.
pub const PRODUCTS_KEY: &str = "ecomarket_products";

/// Storage key for the cart collection.
pub const CART_KEY: &str = "ecomarket_cart";

/// Storage key for the order history collection.
pub const ORDERS_KEY: &str = "ecomarket_orders";

/// Storage key for the wishlist collection.
pub const WISHLIST_KEY: &str = "ecomarket_wishlist";

/// Storage key for the favorite farmers collection.
pub const FAVORITE_FARMERS_KEY: &str = "ecomarket_favorite_farmers";

/// Errors surfaced by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store rejected a write (quota, permissions, I/O).
    #[error("storage write failed for key {key}")]
    Write {
        /// Key whose write was rejected.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The backing store could not be read.
    #[error("storage read failed for key {key}")]
    Read {
        /// Key whose read failed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A value could not be encoded as JSON.
    #[error("value for key {key} could not be encoded")]
    Encode {
        /// Key whose value failed to encode.
        key: String,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}

/// Named-blob persistence contract.
///
/// Absent and corrupted values are indistinguishable to callers: both come
/// back as `Ok(None)`. Corruption is logged and discarded, never surfaced.
/// Write failures are surfaced as [`StorageError`] so callers can report them.
pub trait Storage {
    /// Load the value stored under `key`, or `None` if never saved or
    /// unreadable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the backing store itself failed in a
    /// way that is not plain absence or corruption.
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Persist `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the backing store rejected the
    /// write.
    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError>;

    /// Delete the value stored under `key`. No-op if already absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the deletion itself failed.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Load a collection of records from `key`, treating absence and malformed
/// data as an empty collection.
///
/// # Errors
///
/// Returns a [`StorageError`] only for backend failures; shape mismatches are
/// logged and swallowed.
pub fn load_collection<T, S>(storage: &S, key: &str) -> Result<Vec<T>, StorageError>
where
    T: DeserializeOwned,
    S: Storage + ?Sized,
{
    match storage.load(key)? {
        Some(value) => match serde_json::from_value(value) {
            Ok(items) => Ok(items),
            Err(err) => {
                tracing::warn!(key, error = %err, "discarding malformed collection");
                Ok(Vec::new())
            }
        },
        None => Ok(Vec::new()),
    }
}

/// Encode `items` and persist the whole collection under `key`.
///
/// # Errors
///
/// Returns [`StorageError::Encode`] if the collection cannot be represented
/// as JSON, or [`StorageError::Write`] if the backend rejects the write.
pub fn save_collection<T, S>(storage: &S, key: &str, items: &[T]) -> Result<(), StorageError>
where
    T: Serialize,
    S: Storage + ?Sized,
{
    let value = serde_json::to_value(items).map_err(|source| StorageError::Encode {
        key: key.to_owned(),
        source,
    })?;

    storage.save(key, &value)
}

/// In-memory storage, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RefCell<FxHashMap<String, Value>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.clone());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().remove(key);

        Ok(())
    }
}

/// File-backed storage keeping one pretty-printed JSON file per key.
#[derive(Debug)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Open (and create if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();

        fs::create_dir_all(&dir).map_err(|source| StorageError::Write {
            key: dir.display().to_string(),
            source,
        })?;

        Ok(Self { dir })
    }

    /// Directory holding the JSON files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key);

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Read {
                    key: key.to_owned(),
                    source,
                });
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::warn!(key, error = %err, "discarding unreadable blob");
                Ok(None)
            }
        }
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        let encoded =
            serde_json::to_string_pretty(value).map_err(|source| StorageError::Encode {
                key: key.to_owned(),
                source,
            })?;

        fs::write(self.path_for(key), encoded).map_err(|source| StorageError::Write {
            key: key.to_owned(),
            source,
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Write {
                key: key.to_owned(),
                source,
            }),
        }
    }
}
