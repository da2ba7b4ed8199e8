//! Lockable student-facing features.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Feature page an admin can lock per student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Feature {
    Attendance,
    Fees,
    Assignments,
    Tests,
    Timetable,
    Results,
    Notices,
    Gallery,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Attendance,
        Feature::Fees,
        Feature::Assignments,
        Feature::Tests,
        Feature::Timetable,
        Feature::Results,
        Feature::Notices,
        Feature::Gallery,
    ];

    /// Stable key used inside lock map entries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attendance => "attendance",
            Self::Fees => "fees",
            Self::Assignments => "assignments",
            Self::Tests => "tests",
            Self::Timetable => "timetable",
            Self::Results => "results",
            Self::Notices => "notices",
            Self::Gallery => "gallery",
        }
    }

    /// Message shown on the locked-state view.
    pub fn locked_message(self) -> &'static str {
        match self {
            Self::Attendance => "Attendance records are locked. Contact the school office.",
            Self::Fees => "Fee details are locked. Contact the accounts office.",
            Self::Assignments => "Assignments are locked by the administrator.",
            Self::Tests => "Test schedules are locked by the administrator.",
            Self::Timetable => "The timetable is locked by the administrator.",
            Self::Results => "Results are locked until they are published.",
            Self::Notices => "The notice board is locked by the administrator.",
            Self::Gallery => "The gallery is locked by the administrator.",
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a feature key. Matching is exact: keys are lowercase.
pub fn parse_feature(value: &str) -> Result<Feature, FeatureParseError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(FeatureParseError::Empty);
    }
    Feature::ALL
        .into_iter()
        .find(|feature| feature.as_str() == normalized)
        .ok_or_else(|| FeatureParseError::Unsupported(normalized.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureParseError {
    Empty,
    Unsupported(String),
}

impl Display for FeatureParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "feature key must not be empty"),
            Self::Unsupported(value) => write!(f, "feature key is unsupported: {value}"),
        }
    }
}

impl Error for FeatureParseError {}
