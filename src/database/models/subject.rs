use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::OwnedEntity;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    /// Weekly load, consumed as a period count everywhere
    pub period_load: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(owner_id: Uuid, name: impl Into<String>, period_load: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            period_load,
            created_at: now,
            updated_at: now,
        }
    }
}

impl OwnedEntity for Subject {
    const KIND: &'static str = "subject";

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
