//! Login, logout and session maintenance.
//!
//! # Invariants
//! - Login succeeds only when exactly one identity across the admin, teacher
//!   and student collections matches both id and password. Ids match exactly.
//! - A collection that fails to decode is skipped, not fatal to the others.
//! - The session role comes from the collection the identity was found in.
//! - Only the sanitized `Session` is written to the session store.

use crate::model::collection::Collection;
use crate::model::credential::Credential;
use crate::model::identity::{normalize_profile, Identity, Profile, Session};
use crate::model::role::Role;
use crate::model::validation::ValidationError;
use crate::repo::record_store::{RecordStore, RepoError};
use crate::repo::session_store::SessionStore;
use crate::storage::{KeyValueStorage, StorageError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug)]
pub enum AuthError {
    /// No identity matched the id/password pair.
    InvalidCredentials,
    /// Identities in more than one collection matched.
    AmbiguousIdentity(String),
    /// The operation needs a session and none is stored.
    NotAuthenticated,
    /// The session role may not perform this action.
    Forbidden {
        role: Role,
        action: &'static str,
    },
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid id or password"),
            Self::AmbiguousIdentity(id) => {
                write!(f, "id `{id}` matches more than one account")
            }
            Self::NotAuthenticated => write!(f, "no active session"),
            Self::Forbidden { role, action } => write!(f, "{role} may not {action}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Input for creating a new account.
#[derive(Debug, Clone, Default)]
pub struct IdentityDraft {
    pub id: String,
    pub name: String,
    pub password: String,
    pub profile: Profile,
}

pub struct AuthService<'a, L: KeyValueStorage, T: KeyValueStorage> {
    records: &'a RecordStore<L>,
    sessions: &'a SessionStore<T>,
}

impl<'a, L: KeyValueStorage, T: KeyValueStorage> AuthService<'a, L, T> {
    pub fn new(records: &'a RecordStore<L>, sessions: &'a SessionStore<T>) -> Self {
        Self { records, sessions }
    }

    /// Verifies credentials and stores the resulting session.
    pub fn login(&self, id: &str, password: &str) -> AuthResult<Session> {
        let matches = match self.matching_identities(id, password) {
            Ok(matches) => matches,
            Err(err) => {
                warn!(
                    "event=auth_login module=service status=error id={id} error_code=lookup_failed error={err}"
                );
                return Err(err);
            }
        };

        let (collection, identity) = match matches.as_slice() {
            [] => {
                warn!(
                    "event=auth_login module=service status=error id={id} error_code=invalid_credentials"
                );
                return Err(AuthError::InvalidCredentials);
            }
            [single] => single,
            _ => {
                warn!(
                    "event=auth_login module=service status=error id={id} error_code=ambiguous_identity matches={}",
                    matches.len()
                );
                return Err(AuthError::AmbiguousIdentity(id.to_string()));
            }
        };

        let mut session = Session::from(identity);
        if let Some(role) = collection.role() {
            session.role = role;
        }
        self.sessions.save(&session)?;
        info!(
            "event=auth_login module=service status=ok id={} role={}",
            session.id, session.role
        );
        Ok(session)
    }

    pub fn logout(&self) -> AuthResult<()> {
        self.sessions.clear()?;
        info!("event=auth_logout module=service status=ok");
        Ok(())
    }

    pub fn current_session(&self) -> AuthResult<Option<Session>> {
        Ok(self.sessions.load()?)
    }

    /// Merges client-side profile changes into the stored session.
    pub fn update_session(&self, patch: &Profile) -> AuthResult<Session> {
        let mut session = self.sessions.load()?.ok_or(AuthError::NotAuthenticated)?;
        session.merge(patch)?;
        self.sessions.save(&session)?;
        Ok(session)
    }

    /// Creates an account in the collection for `role`. Admin only.
    pub fn register_identity(
        &self,
        actor: &Session,
        role: Role,
        draft: IdentityDraft,
    ) -> AuthResult<Session> {
        if actor.role != Role::Admin {
            return Err(AuthError::Forbidden {
                role: actor.role,
                action: "register accounts",
            });
        }
        if draft.password.is_empty() {
            return Err(ValidationError::EmptyField("password").into());
        }

        let mut identity = Identity::new(draft.id.trim(), draft.name.trim(), role, &draft.password);
        identity.profile = normalize_profile(draft.profile);
        self.records.add(Collection::for_role(role), &identity)?;
        info!(
            "event=identity_register module=service status=ok id={} role={role} by={}",
            identity.id, actor.id
        );
        Ok(Session::from(&identity))
    }

    /// Replaces a password after verifying the current one.
    pub fn change_password(&self, id: &str, current: &str, new_password: &str) -> AuthResult<()> {
        if new_password.is_empty() {
            return Err(ValidationError::EmptyField("password").into());
        }
        let matches = self.matching_identities(id, current)?;
        let (collection, identity) = match matches.as_slice() {
            [] => return Err(AuthError::InvalidCredentials),
            [single] => single,
            _ => return Err(AuthError::AmbiguousIdentity(id.to_string())),
        };

        let mut updated = identity.clone();
        updated.credential = Credential::from_password(new_password);
        self.records.update(*collection, &updated)?;
        info!("event=password_change module=service status=ok id={id}");
        Ok(())
    }

    fn matching_identities(
        &self,
        id: &str,
        password: &str,
    ) -> AuthResult<Vec<(Collection, Identity)>> {
        let mut matches = Vec::new();
        for collection in Collection::IDENTITIES {
            let found = match self.records.get_by_id::<Identity>(collection, id) {
                Ok(found) => found,
                Err(RepoError::Storage(StorageError::Corrupt { key, message })) => {
                    warn!(
                        "event=auth_lookup module=service status=skipped collection={key} error_code=corrupt_collection error={message}"
                    );
                    continue;
                }
                Err(err) => return Err(err.into()),
            };
            if let Some(identity) = found {
                if identity.credential.verify(password) {
                    matches.push((collection, identity));
                }
            }
        }
        Ok(matches)
    }
}
