use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Identity asserted by a valid bearer token. Present in request extensions
/// only when the token verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Owner email
    pub sub: String,
    pub owner_id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(security: &SecurityConfig, email: String, owner_id: Uuid) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(security.jwt_expiry_hours as i64)).timestamp();

        Self {
            sub: email,
            owner_id,
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

pub fn generate_jwt(security: &SecurityConfig, claims: &Claims) -> Result<String, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.jwt_secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(security: &SecurityConfig, token: &str) -> Result<Claims, JwtError> {
    if security.jwt_secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Minimal shape check: one '@' with something on both sides and a dot in the domain
pub fn check_email(email: &str) -> Result<(), String> {
    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| "Email must contain '@'".to_string())?;
    if local.is_empty() || domain.contains('@') || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(format!("'{}' is not a valid email address", email));
    }
    Ok(())
}

/// At least 8 characters with an ASCII lowercase letter, an ASCII uppercase
/// letter and one character outside `[a-zA-Z0-9]`
pub fn check_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain an uppercase letter".to_string());
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Password must contain a special character".to_string());
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("password worker failed: {0}")]
    Worker(String),
}

/// bcrypt hash with the salt and cost embedded
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Fails only when `stored` is not a bcrypt hash
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(password, stored)?)
}
