use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::OwnedEntity;
use crate::types::Shift;

/// Period budget and shift shared by a group of sections
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CurriculumTemplate {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category: String,
    pub total_period_capacity: i32,
    #[sqlx(try_from = "String")]
    pub shift: Shift,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CurriculumTemplate {
    pub fn new(
        owner_id: Uuid,
        category: impl Into<String>,
        total_period_capacity: i32,
        shift: Shift,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category: category.into(),
            total_period_capacity,
            shift,
            created_at: now,
            updated_at: now,
        }
    }
}

impl OwnedEntity for CurriculumTemplate {
    const KIND: &'static str = "curriculum template";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
