/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time-of-day band attached to a curriculum template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Shift {
    Full,
    Morning,
    Afternoon,
    Night,
}

impl Shift {
    pub const ALL: [Shift; 4] = [Shift::Full, Shift::Morning, Shift::Afternoon, Shift::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Full => "FULL",
            Shift::Morning => "MORNING",
            Shift::Afternoon => "AFTERNOON",
            Shift::Night => "NIGHT",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Stored as text in postgres; see `#[sqlx(try_from = "String")]` on the model
impl TryFrom<String> for Shift {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Shift::ALL
            .into_iter()
            .find(|shift| shift.as_str().eq_ignore_ascii_case(&value))
            .ok_or_else(|| format!("unknown shift '{}'", value))
    }
}

/// The three many-to-many relations of the domain.
/// Edges are always stored as (left, right) in the order named by the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// (subject, section)
    SubjectSection,
    /// (subject, teacher)
    SubjectTeacher,
    /// (teacher, curriculum template)
    TeacherTemplate,
}

impl Relation {
    pub const ALL: [Relation; 3] = [
        Relation::SubjectSection,
        Relation::SubjectTeacher,
        Relation::TeacherTemplate,
    ];
}
