//! Use-case API for portal front ends.
//!
//! # Responsibility
//! - Expose login, route, notice and feature-lock calls as envelopes.
//! - Keep error semantics simple: `ok` plus a human-readable `message`.
//!
//! # Invariants
//! - Calls never panic and never return core error types.
//! - One `PortalApi` is one browser tab: its session area dies with it.
//! - The durable area is reopened per call; nothing else is cached.
//! - Every call repairs undecodable collections from the fixtures chosen at
//!   `open`, never from an empty set.

use log::{error, warn};
use rusqlite::Connection;
use schoolportal_core::db::open_db;
use schoolportal_core::{
    core_version as core_version_inner, parse_feature, ping as ping_inner, AccessDecision,
    AuthError, Feature, FeatureView, Fixtures, MemoryStorage, Notice, NoticeDraft, NoticeFeed,
    NoticeId, PortalConfig, PortalContext, Role, Session, SqliteStorage, Subscription,
};
use serde::Serialize;
use std::path::PathBuf;

type Context<'conn> = PortalContext<SqliteStorage<'conn>, MemoryStorage>;

/// Response envelope shared by every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            data: Some(data),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            message: message.into(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// JSON rendering for callers across a process or language boundary.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"ok":false,"data":null,"message":"encode failed"}"#.to_string())
    }
}

/// Route decision in caller-friendly form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteCheck {
    /// `allow`, `loading` or `redirect`.
    pub decision: &'static str,
    pub redirect_to: Option<&'static str>,
}

impl From<AccessDecision> for RouteCheck {
    fn from(decision: AccessDecision) -> Self {
        let label = match decision {
            AccessDecision::Allow => "allow",
            AccessDecision::Loading => "loading",
            AccessDecision::RedirectToLogin | AccessDecision::RedirectTo(_) => "redirect",
        };
        Self {
            decision: label,
            redirect_to: decision.redirect_target(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureStatus {
    pub feature: &'static str,
    pub locked: bool,
    pub message: Option<&'static str>,
}

pub struct PortalApi {
    db_path: PathBuf,
    /// Seed data chosen at `open`; also used to repair collections later.
    fixtures: Fixtures,
    tab: MemoryStorage,
    feed: NoticeFeed,
}

impl PortalApi {
    /// Opens the durable area, starts logging and seeds absent collections.
    pub fn open(config: &PortalConfig) -> Result<Self, String> {
        config.init_logging()?;
        let fixtures = if config.seed_fixtures {
            Fixtures::demo()
        } else {
            Fixtures::empty()
        };
        let api = Self {
            db_path: config.db_path.clone(),
            fixtures,
            tab: MemoryStorage::new(),
            feed: NoticeFeed::new(),
        };
        let conn = api.connect()?;
        let mut context = api.context(&conn);
        context
            .init(&api.fixtures)
            .map_err(|err| format!("portal init failed: {err}"))?;
        context.dispose();
        Ok(api)
    }

    /// Opens with `PortalConfig::from_env()`.
    pub fn open_from_env() -> Result<Self, String> {
        let config = PortalConfig::from_env().map_err(|err| err.to_string())?;
        Self::open(&config)
    }

    pub fn ping() -> String {
        ping_inner().to_owned()
    }

    pub fn core_version() -> String {
        core_version_inner().to_owned()
    }

    pub fn login(&self, id: &str, password: &str) -> ApiResponse<Session> {
        self.call("login", |context| {
            context.auth().login(id, password).map_err(|err| match err {
                AuthError::InvalidCredentials => "Invalid id or password.".to_string(),
                other => other.to_string(),
            })
        })
        .map_message(|session| format!("Welcome, {}.", session.name))
    }

    pub fn logout(&self) -> ApiResponse<()> {
        self.call("logout", |context| {
            context.auth().logout().map_err(|err| err.to_string())
        })
        .map_message(|_| "Logged out.".to_string())
    }

    pub fn current_user(&self) -> ApiResponse<Session> {
        self.call("current_user", |context| require_session(context))
            .map_message(|session| format!("Logged in as {}.", session.id))
    }

    /// Evaluates a route entry. `required_role` is `student|teacher|admin`,
    /// or `None` for routes open to any logged-in user.
    pub fn check_route(&self, required_role: Option<&str>) -> ApiResponse<RouteCheck> {
        let required = match required_role.map(|value| (value, Role::parse(value))) {
            None => None,
            Some((_, Some(role))) => Some(role),
            Some((value, None)) => {
                return ApiResponse::failure(format!("unknown role `{value}`"));
            }
        };
        self.call("check_route", |context| {
            context
                .check_route(required)
                .map(RouteCheck::from)
                .map_err(|err| err.to_string())
        })
        .map_message(|check| check.decision.to_string())
    }

    /// Notices visible to the current user, newest first.
    pub fn list_notices(&self) -> ApiResponse<Vec<Notice>> {
        self.call("list_notices", |context| {
            let session = require_session(context)?;
            context
                .notices()
                .list_for(&session)
                .map_err(|err| err.to_string())
        })
        .map_message(|notices| format!("{} notice(s).", notices.len()))
    }

    pub fn create_notice(&self, draft: NoticeDraft) -> ApiResponse<Notice> {
        self.call("create_notice", |context| {
            let session = require_session(context)?;
            context
                .notices()
                .create_notice(&session, draft)
                .map_err(|err| err.to_string())
        })
        .map_message(|_| "Notice posted.".to_string())
    }

    pub fn delete_notice(&self, id: NoticeId) -> ApiResponse<()> {
        self.call("delete_notice", |context| {
            let session = require_session(context)?;
            context
                .notices()
                .delete_notice(&session, id)
                .map_err(|err| err.to_string())
        })
        .map_message(|_| "Notice deleted.".to_string())
    }

    /// Admin only.
    pub fn set_feature_lock(
        &self,
        student_id: &str,
        feature: &str,
        locked: bool,
    ) -> ApiResponse<FeatureStatus> {
        let feature = match parse_feature(feature) {
            Ok(feature) => feature,
            Err(err) => return ApiResponse::failure(err.to_string()),
        };
        self.call("set_feature_lock", |context| {
            let session = require_session(context)?;
            if session.role != Role::Admin {
                return Err(format!("{} may not change feature locks", session.role));
            }
            context
                .feature_locks()
                .set_locked(student_id.trim(), feature, locked)
                .map_err(|err| err.to_string())?;
            Ok(FeatureStatus {
                feature: feature.as_str(),
                locked,
                message: locked.then(|| feature.locked_message()),
            })
        })
        .map_message(|status| {
            if status.locked {
                format!("{} locked for {}.", status.feature, student_id.trim())
            } else {
                format!("{} unlocked for {}.", status.feature, student_id.trim())
            }
        })
    }

    /// Whether the feature page renders its locked state for the current user.
    pub fn feature_view(&self, feature: &str) -> ApiResponse<FeatureStatus> {
        let feature = match parse_feature(feature) {
            Ok(feature) => feature,
            Err(err) => return ApiResponse::failure(err.to_string()),
        };
        self.call("feature_view", |context| {
            let view = context.feature_view(feature).map_err(|err| err.to_string())?;
            Ok(feature_status(feature, view))
        })
        .map_message(|status| {
            status
                .message
                .map(str::to_string)
                .unwrap_or_else(|| "Available.".to_string())
        })
    }

    /// Receives the full notice list after every create/delete made through
    /// this API. Drop the handle to unsubscribe.
    pub fn subscribe_notices(&self, listener: impl Fn(&[Notice]) + 'static) -> Subscription {
        self.feed.subscribe(listener)
    }

    fn connect(&self) -> Result<Connection, String> {
        open_db(&self.db_path).map_err(|err| {
            error!(
                "event=api_connect module=api status=error path={} error={err}",
                self.db_path.display()
            );
            format!("storage unavailable: {err}")
        })
    }

    fn context<'conn>(&self, conn: &'conn Connection) -> Context<'conn> {
        PortalContext::new(SqliteStorage::new(conn), self.tab.clone())
            .with_notice_feed(self.feed.clone())
    }

    fn call<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce(&Context<'_>) -> Result<T, String>,
    ) -> Pending<T> {
        let result = self.connect().and_then(|conn| {
            let mut context = self.context(&conn);
            context
                .init(&self.fixtures)
                .map_err(|err| format!("portal init failed: {err}"))?;
            let outcome = f(&context);
            context.dispose();
            outcome
        });
        if let Err(message) = &result {
            warn!("event=api_call module=api status=error op={operation} message={message}");
        }
        Pending(result)
    }
}

/// Call result awaiting its success message.
struct Pending<T>(Result<T, String>);

impl<T> Pending<T> {
    fn map_message(self, message: impl FnOnce(&T) -> String) -> ApiResponse<T> {
        match self.0 {
            Ok(data) => {
                let message = message(&data);
                ApiResponse::success(data, message)
            }
            Err(message) => ApiResponse::failure(message),
        }
    }
}

fn require_session(context: &Context<'_>) -> Result<Session, String> {
    context
        .sessions()
        .load()
        .map_err(|err| err.to_string())?
        .ok_or_else(|| "Not logged in.".to_string())
}

fn feature_status(feature: Feature, view: FeatureView) -> FeatureStatus {
    match view {
        FeatureView::Available => FeatureStatus {
            feature: feature.as_str(),
            locked: false,
            message: None,
        },
        FeatureView::Locked { message, .. } => FeatureStatus {
            feature: feature.as_str(),
            locked: true,
            message: Some(message),
        },
    }
}
