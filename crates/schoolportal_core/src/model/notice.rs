//! Notice board records.
//!
//! # Invariants
//! - `id` is store-assigned, epoch-millisecond derived and unique.
//! - Notices are immutable after creation; only deletion is allowed.
//! - `date` is a calendar date in `YYYY-MM-DD` form.

use crate::model::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type NoticeId = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: NoticeId,
    pub title: String,
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub priority: Priority,
    /// Id of the admin or teacher who posted it.
    pub created_by: String,
    /// Restricts visibility to students whose `grade_level` matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_class: Option<String>,
}

impl Notice {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_text("title", &self.title)?;
        validate_text("content", &self.content)?;
        if NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_err() {
            return Err(ValidationError::InvalidDate(self.date.clone()));
        }
        Ok(())
    }

    /// Whether a student with `grade_level` should see this notice.
    pub fn visible_to_grade(&self, grade_level: Option<&str>) -> bool {
        match self.target_class.as_deref() {
            None => true,
            Some(target) => grade_level.is_some_and(|grade| grade == target),
        }
    }
}

/// Caller-provided part of a notice; the store assigns the rest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoticeDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub target_class: Option<String>,
}

impl NoticeDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn for_class(mut self, target_class: impl Into<String>) -> Self {
        self.target_class = Some(target_class.into());
        self
    }
}

fn validate_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(())
    }
}
