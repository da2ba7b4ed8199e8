//! Key-value storage areas holding JSON text blobs.
//!
//! # Responsibility
//! - Define the one seam through which every persisted blob flows.
//! - Provide durable (`SqliteStorage`) and tab-scoped (`MemoryStorage`) areas.
//!
//! # Invariants
//! - Values are opaque UTF-8 text; JSON decoding belongs to the stores above.
//! - `get_item` on an absent key returns `Ok(None)`, never an error.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::{SqliteStorage, LOCAL_AREA};

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure of the storage medium itself or of a blob stored in it.
#[derive(Debug)]
pub enum StorageError {
    /// The backing medium cannot be read or written.
    Unavailable(DbError),
    /// A blob exists but cannot be decoded.
    Corrupt { key: String, message: String },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::Corrupt { key, message } => {
                write!(f, "corrupt storage entry `{key}`: {message}")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
            Self::Corrupt { .. } => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Unavailable(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Unavailable(DbError::Sqlite(value))
    }
}

/// Synchronous string key-value area.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove_item(&self, key: &str) -> StorageResult<()>;
    fn clear(&self) -> StorageResult<()>;
}

impl<S: KeyValueStorage + ?Sized> KeyValueStorage for &S {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }
}
