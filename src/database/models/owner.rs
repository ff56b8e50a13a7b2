use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tenant identity. Every other entity carries an `owner_id` pointing here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub credential_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Owner {
    pub fn new(name: impl Into<String>, email: impl Into<String>, credential_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            credential_hash,
            created_at: Utc::now(),
        }
    }
}
