//! Identity and session records.
//!
//! # Responsibility
//! - Define the credential-bearing identity stored per role collection.
//! - Define the sanitized session copy handed to callers.
//! - Normalize open profile fields to canonical names.
//!
//! # Invariants
//! - `Session` has no credential or password field, by construction.
//! - Profile maps never carry reserved keys (`id`, `name`, `role`,
//!   `credential`, `password`).
//! - Grade aliases (`grade`, `gradeLevel`, `class`) collapse to `grade_level`.

use crate::model::credential::Credential;
use crate::model::role::Role;
use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

static IDENTITY_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9-]+$").expect("valid identity id regex"));

/// Open role-specific fields (department, phone, grade level, ...).
pub type Profile = Map<String, Value>;

/// Canonical profile key for the grade concept.
pub const GRADE_LEVEL_KEY: &str = "grade_level";

const GRADE_LEVEL_ALIASES: &[&str] = &["grade", "gradeLevel", "class"];
const RESERVED_PROFILE_KEYS: &[&str] = &["id", "name", "role", "credential", "password"];

/// Stored identity for a student, teacher or admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub credential: Credential,
    #[serde(flatten)]
    pub profile: Profile,
}

impl Identity {
    /// Builds an identity, hashing the plaintext password.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: Role,
        password: &str,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            credential: Credential::from_password(password),
            profile: Profile::new(),
        }
    }

    /// Adds one profile field, normalizing grade aliases.
    pub fn with_profile_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.profile.insert(canonical_profile_key(key).to_string(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_identity_id(&self.id)?;
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if let Some(key) = self
            .profile
            .keys()
            .find(|key| RESERVED_PROFILE_KEYS.contains(&key.as_str()))
        {
            return Err(ValidationError::ReservedProfileKey(key.clone()));
        }
        Ok(())
    }

    pub fn grade_level(&self) -> Option<&str> {
        self.profile.get(GRADE_LEVEL_KEY).and_then(Value::as_str)
    }
}

/// Authenticated identity as seen by the running client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(flatten)]
    pub profile: Profile,
}

impl Session {
    pub fn grade_level(&self) -> Option<&str> {
        self.profile.get(GRADE_LEVEL_KEY).and_then(Value::as_str)
    }

    /// Merges client-side profile updates into this session.
    ///
    /// `name` may be changed; `id`, `role` and credential keys may not.
    pub fn merge(&mut self, patch: &Profile) -> Result<(), ValidationError> {
        for key in patch.keys() {
            if matches!(key.as_str(), "id" | "role" | "credential" | "password") {
                return Err(ValidationError::ReservedProfileKey(key.clone()));
            }
        }
        for (key, value) in patch {
            if key == "name" {
                let name = value.as_str().unwrap_or_default().trim();
                if name.is_empty() {
                    return Err(ValidationError::EmptyField("name"));
                }
                self.name = name.to_string();
                continue;
            }
            self.profile
                .insert(canonical_profile_key(key).to_string(), value.clone());
        }
        Ok(())
    }
}

impl From<&Identity> for Session {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id.clone(),
            name: identity.name.clone(),
            role: identity.role,
            profile: normalize_profile(identity.profile.clone()),
        }
    }
}

/// Maps legacy field spellings to canonical ones.
pub fn canonical_profile_key(key: &str) -> &str {
    if GRADE_LEVEL_ALIASES.contains(&key) {
        GRADE_LEVEL_KEY
    } else {
        key
    }
}

/// Renames aliases and drops reserved keys. A canonical `grade_level` wins
/// over any alias present in the same map.
pub fn normalize_profile(profile: Profile) -> Profile {
    let mut normalized = Profile::new();
    let mut canonical_grade: Option<Value> = None;
    for (key, value) in profile {
        if RESERVED_PROFILE_KEYS.contains(&key.as_str()) {
            continue;
        }
        if key == GRADE_LEVEL_KEY {
            canonical_grade = Some(value);
            continue;
        }
        normalized.insert(canonical_profile_key(&key).to_string(), value);
    }
    if let Some(grade) = canonical_grade {
        normalized.insert(GRADE_LEVEL_KEY.to_string(), grade);
    }
    normalized
}

pub fn validate_identity_id(id: &str) -> Result<(), ValidationError> {
    if IDENTITY_ID_RE.is_match(id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidId(id.to_string()))
    }
}
