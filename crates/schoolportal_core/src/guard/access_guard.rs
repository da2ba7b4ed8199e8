//! Role-based route entry decisions.
//!
//! # Invariants
//! - `Loading` is returned only while the session read is pending.
//! - A missing session always redirects to `LOGIN_ROUTE`.
//! - A role mismatch redirects to the session role's landing route, never to
//!   the requested route.

use crate::model::identity::Session;
use crate::model::role::Role;
use crate::repo::record_store::RepoResult;
use crate::repo::session_store::SessionStore;
use crate::storage::KeyValueStorage;
use log::debug;

pub const LOGIN_ROUTE: &str = "/login";

/// Session as observed by the guard at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// The session store read has not completed yet.
    Loading,
    Loaded(Option<Session>),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Loaded(Some(session)) => Some(session),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Render a loading placeholder.
    Loading,
    RedirectToLogin,
    /// Role mismatch; go to the session's own landing route.
    RedirectTo(&'static str),
    Allow,
}

impl AccessDecision {
    /// Route to navigate to, if the decision is a redirect.
    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::RedirectToLogin => Some(LOGIN_ROUTE),
            Self::RedirectTo(route) => Some(route),
            Self::Loading | Self::Allow => None,
        }
    }

    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

/// Pure decision function for one route entry.
pub fn evaluate_access(required: Option<Role>, state: &SessionState) -> AccessDecision {
    let session = match state {
        SessionState::Loading => return AccessDecision::Loading,
        SessionState::Loaded(None) => return AccessDecision::RedirectToLogin,
        SessionState::Loaded(Some(session)) => session,
    };
    match required {
        Some(role) if role != session.role => AccessDecision::RedirectTo(session.role.landing_route()),
        _ => AccessDecision::Allow,
    }
}

/// Evaluates route access against the live session store.
pub struct AccessGuard<'a, S: KeyValueStorage> {
    sessions: &'a SessionStore<S>,
}

impl<'a, S: KeyValueStorage> AccessGuard<'a, S> {
    pub fn new(sessions: &'a SessionStore<S>) -> Self {
        Self { sessions }
    }

    pub fn check(&self, required: Option<Role>) -> RepoResult<AccessDecision> {
        let state = SessionState::Loaded(self.sessions.load()?);
        let decision = evaluate_access(required, &state);
        debug!(
            "event=route_guard module=guard required={} decision={decision:?}",
            required.map_or("none", Role::as_str)
        );
        Ok(decision)
    }
}
