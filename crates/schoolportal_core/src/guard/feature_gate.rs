//! Locked-state decision for feature pages.

use crate::model::feature::Feature;
use crate::model::identity::Session;
use crate::model::role::Role;
use crate::repo::feature_lock_repo::FeatureLockRegistry;
use crate::repo::record_store::RepoResult;
use crate::storage::KeyValueStorage;

/// What a feature page renders for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureView {
    Available,
    Locked {
        feature: Feature,
        message: &'static str,
    },
}

impl FeatureView {
    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}

pub struct FeatureGate<'a, S: KeyValueStorage> {
    locks: &'a FeatureLockRegistry<S>,
}

impl<'a, S: KeyValueStorage> FeatureGate<'a, S> {
    pub fn new(locks: &'a FeatureLockRegistry<S>) -> Self {
        Self { locks }
    }

    /// Locks apply to students only; staff always see the feature.
    pub fn view(&self, session: &Session, feature: Feature) -> RepoResult<FeatureView> {
        if session.role != Role::Student {
            return Ok(FeatureView::Available);
        }
        if self.locks.is_locked(&session.id, feature)? {
            return Ok(FeatureView::Locked {
                feature,
                message: feature.locked_message(),
            });
        }
        Ok(FeatureView::Available)
    }
}
