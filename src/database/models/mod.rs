pub mod curriculum;
pub mod owner;
pub mod section;
pub mod subject;
pub mod teacher;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use curriculum::CurriculumTemplate;
pub use owner::Owner;
pub use section::Section;
pub use subject::Subject;
pub use teacher::Teacher;

/// Any record scoped to a single owner (tenant)
pub trait OwnedEntity: Clone + Send + Sync + 'static {
    /// Human label used in error messages and logs
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;
    fn created_at(&self) -> DateTime<Utc>;
}
