//! Single current-session slot in the tab-scoped storage area.
//!
//! # Invariants
//! - At most one session is stored, under `SESSION_KEY`.
//! - A corrupt session blob is discarded on load; the caller sees no session.

use crate::model::identity::{normalize_profile, Session};
use crate::repo::record_store::RepoResult;
use crate::storage::{KeyValueStorage, StorageError};
use log::warn;

pub const SESSION_KEY: &str = "currentUser";

pub struct SessionStore<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> RepoResult<Option<Session>> {
        let Some(raw) = self.storage.get_item(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(mut session) => {
                session.profile = normalize_profile(std::mem::take(&mut session.profile));
                Ok(Some(session))
            }
            Err(err) => {
                warn!(
                    "event=session_load module=repo status=reset reason=corrupt_json error={err}"
                );
                self.storage.remove_item(SESSION_KEY)?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> RepoResult<()> {
        let raw = serde_json::to_string(session).map_err(|err| StorageError::Corrupt {
            key: SESSION_KEY.to_string(),
            message: err.to_string(),
        })?;
        self.storage.set_item(SESSION_KEY, &raw)?;
        Ok(())
    }

    pub fn clear(&self) -> RepoResult<()> {
        self.storage.remove_item(SESSION_KEY)?;
        Ok(())
    }
}
