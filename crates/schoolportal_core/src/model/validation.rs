use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record shape violations detected before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidId(String),
    EmptyField(&'static str),
    InvalidDate(String),
    ReservedProfileKey(String),
    CollectionMismatch {
        collection: &'static str,
        record: String,
    },
    /// No id above the highest stored one is representable.
    IdExhausted(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(value) => write!(
                f,
                "invalid id `{value}`: expected ASCII letters, digits or `-`"
            ),
            Self::EmptyField(field) => write!(f, "`{field}` must not be empty"),
            Self::InvalidDate(value) => write!(f, "invalid date `{value}`: expected YYYY-MM-DD"),
            Self::ReservedProfileKey(key) => {
                write!(f, "profile key `{key}` is reserved and cannot be set")
            }
            Self::CollectionMismatch { collection, record } => {
                write!(f, "record `{record}` does not belong in collection `{collection}`")
            }
            Self::IdExhausted(collection) => {
                write!(f, "no record id left to assign in `{collection}`")
            }
        }
    }
}

impl Error for ValidationError {}
