//! Per-subject feature lock map.
//!
//! # Responsibility
//! - Persist `"<subjectId>_<featureKey>" -> bool` as one JSON object.
//! - Answer lock lookups for feature pages.
//!
//! # Invariants
//! - Absent entries read as unlocked.
//! - Subject ids never contain `_`, so key prefixes are unambiguous.
//! - Unknown entries already present in the map are preserved on write.

use crate::model::feature::{parse_feature, Feature};
use crate::model::identity::validate_identity_id;
use crate::repo::record_store::RepoResult;
use crate::storage::{KeyValueStorage, StorageError};
use log::{info, warn};
use serde_json::{Map, Value};

pub const FEATURE_LOCKS_KEY: &str = "featureLocks";

/// Builds the map key for one subject/feature pair.
pub fn lock_key(subject_id: &str, feature: Feature) -> String {
    format!("{subject_id}_{}", feature.as_str())
}

pub struct FeatureLockRegistry<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> FeatureLockRegistry<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn is_locked(&self, subject_id: &str, feature: Feature) -> RepoResult<bool> {
        let locks = self.read_map()?;
        Ok(matches!(
            locks.get(&lock_key(subject_id, feature)),
            Some(Value::Bool(true))
        ))
    }

    pub fn set_locked(&self, subject_id: &str, feature: Feature, locked: bool) -> RepoResult<()> {
        validate_identity_id(subject_id)?;
        let mut locks = self.read_map()?;
        locks.insert(lock_key(subject_id, feature), Value::Bool(locked));
        let raw = serde_json::to_string(&locks).map_err(|err| StorageError::Corrupt {
            key: FEATURE_LOCKS_KEY.to_string(),
            message: err.to_string(),
        })?;
        self.storage.set_item(FEATURE_LOCKS_KEY, &raw)?;
        info!(
            "event=feature_lock_set module=repo status=ok subject={subject_id} feature={} locked={locked}",
            feature.as_str()
        );
        Ok(())
    }

    /// Locked features for one subject, in `Feature` order.
    pub fn locks_for(&self, subject_id: &str) -> RepoResult<Vec<Feature>> {
        let prefix = format!("{subject_id}_");
        let locks = self.read_map()?;
        let mut features = locks
            .iter()
            .filter(|(_, value)| matches!(value, Value::Bool(true)))
            .filter_map(|(key, _)| key.strip_prefix(prefix.as_str()))
            .filter_map(|feature| parse_feature(feature).ok())
            .collect::<Vec<_>>();
        features.sort();
        Ok(features)
    }

    fn read_map(&self) -> RepoResult<Map<String, Value>> {
        let Some(raw) = self.storage.get_item(FEATURE_LOCKS_KEY)? else {
            return Ok(Map::new());
        };
        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(map) => Ok(map),
            Err(err) => {
                warn!(
                    "event=feature_lock_read module=repo status=fallback reason=corrupt_json error={err}"
                );
                Ok(Map::new())
            }
        }
    }
}
