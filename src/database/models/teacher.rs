use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::OwnedEntity;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Teacher {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Contracted weekly hour allotment
    pub rt_hours: i32,
    /// Free-form label (e.g. "morning"); unrelated to template shifts
    pub shift: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Teacher {
    pub fn new(owner_id: Uuid, name: impl Into<String>, rt_hours: i32, shift: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            rt_hours,
            shift,
            created_at: now,
            updated_at: now,
        }
    }
}

impl OwnedEntity for Teacher {
    const KIND: &'static str = "teacher";

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
