//! Explicitly passed portal context.
//!
//! # Responsibility
//! - Own the record, session and lock stores for one running client.
//! - Define the `new -> init -> dispose` lifecycle.
//!
//! # Invariants
//! - Route checks report `Loading` until `init` has completed.
//! - After `init`, every route check re-reads the session store.

use crate::fixtures::Fixtures;
use crate::guard::access_guard::{AccessDecision, AccessGuard, SessionState};
use crate::guard::feature_gate::{FeatureGate, FeatureView};
use crate::model::feature::Feature;
use crate::model::role::Role;
use crate::repo::feature_lock_repo::FeatureLockRegistry;
use crate::repo::record_store::{InitReport, RecordStore, RepoResult};
use crate::repo::session_store::SessionStore;
use crate::service::auth_service::{AuthError, AuthResult, AuthService};
use crate::service::notice_feed::NoticeFeed;
use crate::service::notice_service::NoticeService;
use crate::storage::KeyValueStorage;
use log::debug;

pub struct PortalContext<L: KeyValueStorage, T: KeyValueStorage> {
    records: RecordStore<L>,
    locks: FeatureLockRegistry<L>,
    sessions: SessionStore<T>,
    feed: NoticeFeed,
    state: SessionState,
}

impl<L: KeyValueStorage + Clone, T: KeyValueStorage> PortalContext<L, T> {
    /// Builds the stores. `local` is the durable area, `session` the
    /// tab-scoped one.
    pub fn new(local: L, session: T) -> Self {
        Self {
            records: RecordStore::new(local.clone()),
            locks: FeatureLockRegistry::new(local),
            sessions: SessionStore::new(session),
            feed: NoticeFeed::new(),
            state: SessionState::Loading,
        }
    }
}

impl<L: KeyValueStorage, T: KeyValueStorage> PortalContext<L, T> {
    /// Replaces the notice feed, e.g. with one that outlives this context.
    pub fn with_notice_feed(mut self, feed: NoticeFeed) -> Self {
        self.feed = feed;
        self
    }

    /// Seeds absent collections and rehydrates the stored session.
    pub fn init(&mut self, fixtures: &Fixtures) -> RepoResult<InitReport> {
        let report = self.records.initialize(fixtures)?;
        let session = self.sessions.load()?;
        debug!(
            "event=context_init module=context status=ok session={}",
            session.as_ref().map_or("none", |session| session.role.as_str())
        );
        self.state = SessionState::Loaded(session);
        Ok(report)
    }

    /// Session snapshot taken at `init`.
    pub fn session_state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self.state, SessionState::Loading)
    }

    pub fn records(&self) -> &RecordStore<L> {
        &self.records
    }

    pub fn sessions(&self) -> &SessionStore<T> {
        &self.sessions
    }

    pub fn feature_locks(&self) -> &FeatureLockRegistry<L> {
        &self.locks
    }

    pub fn notice_feed(&self) -> &NoticeFeed {
        &self.feed
    }

    pub fn auth(&self) -> AuthService<'_, L, T> {
        AuthService::new(&self.records, &self.sessions)
    }

    pub fn notices(&self) -> NoticeService<'_, L> {
        NoticeService::new(&self.records).with_feed(&self.feed)
    }

    pub fn check_route(&self, required: Option<Role>) -> RepoResult<AccessDecision> {
        if !self.is_initialized() {
            return Ok(AccessDecision::Loading);
        }
        AccessGuard::new(&self.sessions).check(required)
    }

    /// Feature-page decision for the current session.
    pub fn feature_view(&self, feature: Feature) -> AuthResult<FeatureView> {
        let session = self.sessions.load()?.ok_or(AuthError::NotAuthenticated)?;
        Ok(FeatureGate::new(&self.locks).view(&session, feature)?)
    }

    /// Ends the context; the tab-scoped area goes with it.
    pub fn dispose(self) {
        debug!(
            "event=context_dispose module=context status=ok subscribers={}",
            self.feed.subscriber_count()
        );
    }
}
