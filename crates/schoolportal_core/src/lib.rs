//! Core of the school portal: record store, sessions, authentication, route
//! guarding and per-student feature locks.
//! This crate is the single source of truth for access invariants.

pub mod config;
pub mod context;
pub mod db;
pub mod fixtures;
pub mod guard;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use config::{ConfigError, PortalConfig};
pub use context::PortalContext;
pub use fixtures::Fixtures;
pub use guard::access_guard::{evaluate_access, AccessDecision, AccessGuard, SessionState, LOGIN_ROUTE};
pub use guard::feature_gate::{FeatureGate, FeatureView};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::Collection;
pub use model::credential::Credential;
pub use model::feature::{parse_feature, Feature, FeatureParseError};
pub use model::identity::{Identity, Profile, Session, GRADE_LEVEL_KEY};
pub use model::notice::{Notice, NoticeDraft, NoticeId, Priority};
pub use model::role::Role;
pub use model::validation::ValidationError;
pub use repo::feature_lock_repo::{lock_key, FeatureLockRegistry, FEATURE_LOCKS_KEY};
pub use repo::record_store::{InitReport, RecordStore, RepoError, RepoResult, StoredRecord};
pub use repo::session_store::{SessionStore, SESSION_KEY};
pub use service::auth_service::{AuthError, AuthResult, AuthService, IdentityDraft};
pub use service::notice_feed::{NoticeFeed, Subscription};
pub use service::notice_service::{NoticeResult, NoticeService, NoticeServiceError};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError, StorageResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
