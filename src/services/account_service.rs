use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{self, Claims, PasswordError};
use crate::config::SecurityConfig;
use crate::database::models::Owner;
use crate::database::OwnerRepository;
use crate::services::error::{StaffingError, StaffingResult};
use crate::services::ownership::Caller;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    /// Seconds
    pub expires_in: u64,
    pub owner: Owner,
}

/// Owner registration and token issue
pub struct AccountService {
    owners: Arc<dyn OwnerRepository>,
    security: SecurityConfig,
}

impl AccountService {
    pub fn new(owners: Arc<dyn OwnerRepository>, security: SecurityConfig) -> Self {
        Self { owners, security }
    }

    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }

    pub async fn register(&self, input: RegisterInput) -> StaffingResult<Owner> {
        if !self.security.allow_registration {
            return Err(StaffingError::InvalidState("registration is disabled".to_string()));
        }

        let name = input.name.trim();
        if name.is_empty() {
            return Err(StaffingError::validation("name must not be empty"));
        }
        let email = input.email.trim().to_lowercase();
        auth::check_email(&email).map_err(StaffingError::ValidationFailed)?;
        auth::check_password_strength(&input.password).map_err(StaffingError::ValidationFailed)?;

        if self.owners.find_by_email(&email).await?.is_some() {
            return Err(StaffingError::validation(format!("'{}' is already registered", email)));
        }

        let credential_hash = hash_password(input.password, self.security.password_cost).await?;
        let owner = self.owners.save(Owner::new(name, email, credential_hash)).await?;
        info!("Registered owner {}", owner.id);
        Ok(owner)
    }

    pub async fn login(&self, input: LoginInput) -> StaffingResult<Session> {
        let email = input.email.trim();
        let owner = self
            .owners
            .find_by_email(email)
            .await?
            .ok_or_else(|| StaffingError::AccountNotFound(email.to_string()))?;

        if !verify_password(input.password, owner.credential_hash.clone()).await? {
            warn!("Failed login for owner {}", owner.id);
            return Err(StaffingError::Unauthenticated);
        }

        let claims = Claims::new(&self.security, owner.email.clone(), owner.id);
        let token = auth::generate_jwt(&self.security, &claims)?;
        info!("Owner {} logged in", owner.id);

        Ok(Session {
            token,
            expires_in: self.security.jwt_expiry_hours * 3600,
            owner,
        })
    }

    pub async fn whoami(&self, caller: &Caller) -> StaffingResult<Owner> {
        self.owners
            .find_by_id(caller.owner_id)
            .await?
            .ok_or_else(|| StaffingError::AccountNotFound(caller.email.clone()))
    }
}

// bcrypt runs on the blocking pool

async fn hash_password(password: String, cost: u32) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || auth::hash_password(&password, cost))
        .await
        .map_err(|e| PasswordError::Worker(e.to_string()))?
}

async fn verify_password(password: String, stored: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || auth::verify_password(&password, &stored))
        .await
        .map_err(|e| PasswordError::Worker(e.to_string()))?
}
