//! Notice board use-cases.
//!
//! # Invariants
//! - Only admins and teachers create notices.
//! - Admins delete any notice; teachers delete only their own.
//! - Assigned ids are strictly greater than every id already stored.
//! - Listings are newest first (`id DESC`).

use crate::model::collection::Collection;
use crate::model::identity::Session;
use crate::model::notice::{Notice, NoticeDraft, NoticeId};
use crate::model::role::Role;
use crate::model::validation::ValidationError;
use crate::repo::record_store::{RecordStore, RepoError};
use crate::service::notice_feed::NoticeFeed;
use crate::storage::KeyValueStorage;
use chrono::{DateTime, Utc};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum NoticeServiceError {
    Forbidden { actor: String, action: &'static str },
    NotFound(NoticeId),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for NoticeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden { actor, action } => write!(f, "`{actor}` may not {action}"),
            Self::NotFound(id) => write!(f, "notice not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoticeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoticeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub type NoticeResult<T> = Result<T, NoticeServiceError>;

pub struct NoticeService<'a, L: KeyValueStorage> {
    records: &'a RecordStore<L>,
    feed: Option<&'a NoticeFeed>,
}

impl<'a, L: KeyValueStorage> NoticeService<'a, L> {
    pub fn new(records: &'a RecordStore<L>) -> Self {
        Self {
            records,
            feed: None,
        }
    }

    /// Publishes the full list to `feed` after every change.
    pub fn with_feed(mut self, feed: &'a NoticeFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn create_notice(&self, author: &Session, draft: NoticeDraft) -> NoticeResult<Notice> {
        self.create_notice_at(author, draft, Utc::now())
    }

    /// Same as `create_notice` with an explicit clock reading.
    pub fn create_notice_at(
        &self,
        author: &Session,
        draft: NoticeDraft,
        now: DateTime<Utc>,
    ) -> NoticeResult<Notice> {
        if author.role == Role::Student {
            return Err(NoticeServiceError::Forbidden {
                actor: author.id.clone(),
                action: "post notices",
            });
        }

        let existing = self.records.get_all::<Notice>(Collection::Notices)?;
        let highest = existing.iter().map(|notice| notice.id).max();
        let now_ms = now.timestamp_millis();
        let id = match highest {
            Some(highest) if highest >= now_ms => highest.checked_add(1).ok_or(
                NoticeServiceError::Validation(ValidationError::IdExhausted(
                    Collection::Notices.storage_key(),
                )),
            )?,
            _ => now_ms,
        };

        let notice = Notice {
            id,
            title: draft.title.trim().to_string(),
            content: draft.content.trim().to_string(),
            date: now.date_naive().format("%Y-%m-%d").to_string(),
            priority: draft.priority,
            created_by: author.id.clone(),
            target_class: draft
                .target_class
                .map(|class| class.trim().to_string())
                .filter(|class| !class.is_empty()),
        };
        self.records.add(Collection::Notices, &notice)?;
        info!(
            "event=notice_create module=service status=ok id={} by={} priority={:?}",
            notice.id, author.id, notice.priority
        );
        self.publish()?;
        Ok(notice)
    }

    pub fn list_notices(&self) -> NoticeResult<Vec<Notice>> {
        let mut notices = self.records.get_all::<Notice>(Collection::Notices)?;
        notices.sort_by(|left, right| right.id.cmp(&left.id));
        Ok(notices)
    }

    /// Notices visible to `session`; students see only their class and
    /// school-wide notices.
    pub fn list_for(&self, session: &Session) -> NoticeResult<Vec<Notice>> {
        let notices = self.list_notices()?;
        if session.role != Role::Student {
            return Ok(notices);
        }
        let grade_level = session.grade_level();
        Ok(notices
            .into_iter()
            .filter(|notice| notice.visible_to_grade(grade_level))
            .collect())
    }

    pub fn delete_notice(&self, actor: &Session, id: NoticeId) -> NoticeResult<()> {
        let notice = self
            .records
            .get_by_id::<Notice>(Collection::Notices, &id.to_string())?
            .ok_or(NoticeServiceError::NotFound(id))?;

        let allowed = match actor.role {
            Role::Admin => true,
            Role::Teacher => notice.created_by == actor.id,
            Role::Student => false,
        };
        if !allowed {
            return Err(NoticeServiceError::Forbidden {
                actor: actor.id.clone(),
                action: "delete this notice",
            });
        }

        self.records.delete(Collection::Notices, &id.to_string())?;
        info!(
            "event=notice_delete module=service status=ok id={id} by={}",
            actor.id
        );
        self.publish()?;
        Ok(())
    }

    fn publish(&self) -> NoticeResult<()> {
        if let Some(feed) = self.feed {
            feed.publish(&self.list_notices()?);
        }
        Ok(())
    }
}
