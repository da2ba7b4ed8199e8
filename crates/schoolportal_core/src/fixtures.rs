//! Seed data written by `RecordStore::initialize` into absent collections.

use crate::model::collection::Collection;
use crate::model::identity::Identity;
use crate::model::notice::{Notice, Priority};
use crate::model::role::Role;

/// Initial contents for each named collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixtures {
    pub students: Vec<Identity>,
    pub teachers: Vec<Identity>,
    pub admins: Vec<Identity>,
    pub notices: Vec<Notice>,
}

impl Fixtures {
    /// Seeds nothing; collections are created empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Demo school with one account per role plus a second student.
    ///
    /// Passwords: `student123`, `teacher123`, `admin123`.
    pub fn demo() -> Self {
        Self {
            students: vec![
                Identity::new("STU001", "Asha Rao", Role::Student, "student123")
                    .with_profile_field("grade_level", "10-A")
                    .with_profile_field("roll_number", 12)
                    .with_profile_field("parent_name", "Meera Rao"),
                Identity::new("STU002", "Kabir Sen", Role::Student, "student123")
                    .with_profile_field("grade_level", "9-B")
                    .with_profile_field("roll_number", 7)
                    .with_profile_field("parent_name", "Anil Sen"),
            ],
            teachers: vec![Identity::new("TCH001", "Ritu Iyer", Role::Teacher, "teacher123")
                .with_profile_field("department", "Science")
                .with_profile_field("subjects", vec!["Physics", "Chemistry"])],
            admins: vec![Identity::new("ADM001", "Vikram Das", Role::Admin, "admin123")
                .with_profile_field("designation", "Principal")],
            notices: vec![
                Notice {
                    id: 1_760_000_000_000,
                    title: "Term examinations".to_string(),
                    content: "Term examinations begin on the first Monday of next month."
                        .to_string(),
                    date: "2025-10-09".to_string(),
                    priority: Priority::High,
                    created_by: "ADM001".to_string(),
                    target_class: None,
                },
                Notice {
                    id: 1_760_000_100_000,
                    title: "Science fair".to_string(),
                    content: "Project abstracts are due with class teachers by Friday."
                        .to_string(),
                    date: "2025-10-09".to_string(),
                    priority: Priority::Medium,
                    created_by: "TCH001".to_string(),
                    target_class: Some("10-A".to_string()),
                },
            ],
        }
    }

    /// JSON array blob for one collection.
    pub fn blob_for(&self, collection: Collection) -> serde_json::Result<String> {
        match collection {
            Collection::Students => serde_json::to_string(&self.students),
            Collection::Teachers => serde_json::to_string(&self.teachers),
            Collection::Admins => serde_json::to_string(&self.admins),
            Collection::Notices => serde_json::to_string(&self.notices),
        }
    }
}
