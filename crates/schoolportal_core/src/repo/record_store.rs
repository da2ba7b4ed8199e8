//! Named JSON collections with whole-collection read-modify-write.
//!
//! # Responsibility
//! - Seed collections from fixtures exactly once.
//! - Provide typed CRUD over `students`, `teachers`, `admins`, `notices`.
//!
//! # Invariants
//! - Ids are unique within a collection; `add` rejects duplicates.
//! - `update`/`delete` on a missing id return `NotFound` without writing.
//! - A blob that does not decode as its typed records is surfaced as
//!   `StorageError::Corrupt` on reads and repaired only by `initialize`.

use crate::fixtures::Fixtures;
use crate::model::collection::Collection;
use crate::model::identity::Identity;
use crate::model::notice::Notice;
use crate::model::validation::ValidationError;
use crate::storage::{KeyValueStorage, StorageError};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Storage(StorageError),
    NotFound { collection: Collection, id: String },
    DuplicateId { collection: Collection, id: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::NotFound { collection, id } => {
                write!(f, "record not found in {collection}: {id}")
            }
            Self::DuplicateId { collection, id } => {
                write!(f, "record id already exists in {collection}: {id}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound { .. } | Self::DuplicateId { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// A record that can live in one of the named collections.
pub trait StoredRecord: Serialize + DeserializeOwned + Clone {
    fn record_id(&self) -> String;

    /// Checks record shape and that it belongs in `collection`.
    fn validate_for(&self, collection: Collection) -> Result<(), ValidationError>;
}

impl StoredRecord for Identity {
    fn record_id(&self) -> String {
        self.id.clone()
    }

    fn validate_for(&self, collection: Collection) -> Result<(), ValidationError> {
        if collection.role() != Some(self.role) {
            return Err(ValidationError::CollectionMismatch {
                collection: collection.storage_key(),
                record: self.id.clone(),
            });
        }
        self.validate()
    }
}

impl StoredRecord for Notice {
    fn record_id(&self) -> String {
        self.id.to_string()
    }

    fn validate_for(&self, collection: Collection) -> Result<(), ValidationError> {
        if collection != Collection::Notices {
            return Err(ValidationError::CollectionMismatch {
                collection: collection.storage_key(),
                record: self.record_id(),
            });
        }
        self.validate()
    }
}

/// Outcome of one `initialize` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Collections that were absent and got fixture data.
    pub seeded: Vec<Collection>,
    /// Collections whose blob was corrupt and got reset to fixture data.
    pub repaired: Vec<Collection>,
}

impl InitReport {
    pub fn is_noop(&self) -> bool {
        self.seeded.is_empty() && self.repaired.is_empty()
    }
}

/// Persistence facade over the named collections.
pub struct RecordStore<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> RecordStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Seeds every absent collection from `fixtures` and resets any whose
    /// records no longer decode as their typed record. Healthy collections
    /// are never touched.
    pub fn initialize(&self, fixtures: &Fixtures) -> RepoResult<InitReport> {
        let mut report = InitReport::default();
        for collection in Collection::ALL {
            let key = collection.storage_key();
            match self.storage.get_item(key)? {
                None => {
                    self.write_raw(collection, &self.fixture_blob(fixtures, collection)?)?;
                    report.seeded.push(collection);
                }
                Some(raw) => {
                    if let Err(err) = decode_typed(collection, &raw) {
                        warn!(
                            "event=store_repair module=repo status=reset collection={key} reason=undecodable error={err}"
                        );
                        self.write_raw(collection, &self.fixture_blob(fixtures, collection)?)?;
                        report.repaired.push(collection);
                    }
                }
            }
        }
        if report.is_noop() {
            debug!("event=store_init module=repo status=noop");
        } else {
            info!(
                "event=store_init module=repo status=ok seeded={} repaired={}",
                report.seeded.len(),
                report.repaired.len()
            );
        }
        Ok(report)
    }

    pub fn get_all<T: StoredRecord>(&self, collection: Collection) -> RepoResult<Vec<T>> {
        let Some(raw) = self.storage.get_item(collection.storage_key())? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|err| corrupt(collection, err))
    }

    pub fn get_by_id<T: StoredRecord>(
        &self,
        collection: Collection,
        id: &str,
    ) -> RepoResult<Option<T>> {
        Ok(self
            .get_all::<T>(collection)?
            .into_iter()
            .find(|record| record.record_id() == id))
    }

    pub fn add<T: StoredRecord>(&self, collection: Collection, record: &T) -> RepoResult<()> {
        record.validate_for(collection)?;
        let mut records = self.get_all::<T>(collection)?;
        let id = record.record_id();
        if records.iter().any(|existing| existing.record_id() == id) {
            return Err(RepoError::DuplicateId { collection, id });
        }
        records.push(record.clone());
        self.write(collection, &records)
    }

    pub fn update<T: StoredRecord>(&self, collection: Collection, record: &T) -> RepoResult<()> {
        record.validate_for(collection)?;
        let mut records = self.get_all::<T>(collection)?;
        let id = record.record_id();
        let Some(slot) = records.iter_mut().find(|existing| existing.record_id() == id) else {
            return Err(RepoError::NotFound { collection, id });
        };
        *slot = record.clone();
        self.write(collection, &records)
    }

    /// Removes every entry whose `id` matches. Returns how many were removed.
    pub fn delete(&self, collection: Collection, id: &str) -> RepoResult<usize> {
        let mut records = self.raw_records(collection)?;
        let before = records.len();
        records.retain(|record| !id_matches(record, id));
        let removed = before - records.len();
        if removed == 0 {
            return Err(RepoError::NotFound {
                collection,
                id: id.to_string(),
            });
        }
        self.write(collection, &records)?;
        Ok(removed)
    }

    pub fn count(&self, collection: Collection) -> RepoResult<usize> {
        Ok(self.raw_records(collection)?.len())
    }

    fn raw_records(&self, collection: Collection) -> RepoResult<Vec<Value>> {
        let Some(raw) = self.storage.get_item(collection.storage_key())? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|err| corrupt(collection, err))
    }

    fn fixture_blob(&self, fixtures: &Fixtures, collection: Collection) -> RepoResult<String> {
        fixtures
            .blob_for(collection)
            .map_err(|err| corrupt(collection, err))
    }

    fn write<T: Serialize>(&self, collection: Collection, records: &[T]) -> RepoResult<()> {
        let raw = serde_json::to_string(records).map_err(|err| corrupt(collection, err))?;
        self.write_raw(collection, &raw)
    }

    fn write_raw(&self, collection: Collection, raw: &str) -> RepoResult<()> {
        self.storage.set_item(collection.storage_key(), raw)?;
        Ok(())
    }
}

/// Decodes `raw` as the record type stored in `collection`.
fn decode_typed(collection: Collection, raw: &str) -> serde_json::Result<()> {
    match collection {
        Collection::Notices => serde_json::from_str::<Vec<Notice>>(raw).map(drop),
        Collection::Students | Collection::Teachers | Collection::Admins => {
            serde_json::from_str::<Vec<Identity>>(raw).map(drop)
        }
    }
}

fn id_matches(record: &Value, id: &str) -> bool {
    match record.get("id") {
        Some(Value::String(value)) => value == id,
        Some(Value::Number(value)) => value.to_string() == id,
        _ => false,
    }
}

fn corrupt(collection: Collection, err: serde_json::Error) -> RepoError {
    RepoError::Storage(StorageError::Corrupt {
        key: collection.storage_key().to_string(),
        message: err.to_string(),
    })
}
