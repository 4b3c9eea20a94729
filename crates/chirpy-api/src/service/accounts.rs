use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use tracing::{debug, info};

use chirpy_db::{Database, RefreshTokenRow};
use chirpy_types::models::User;

use crate::error::ApiError;

/// Refresh tokens are valid for this long after issue.
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

const REFRESH_TOKEN_BYTES: usize = 32;

/// User accounts and refresh-token lifecycle on top of the record store.
pub struct Accounts {
    db: Arc<Database>,
    argon2: Argon2<'static>,
}

impl Accounts {
    pub fn new(db: Arc<Database>) -> Self {
        Self::with_hasher(db, Argon2::default())
    }

    pub fn with_hasher(db: Arc<Database>, argon2: Argon2<'static>) -> Self {
        Self { db, argon2 }
    }

    // -- Users --

    pub fn create_user(&self, email: &str, password: &str) -> Result<User, ApiError> {
        validate_credentials(email, password)?;

        // Hash outside the store lock; it is the slow part.
        let password_hash = self.hash_password(password)?;

        let row = self.db.update(|data| {
            if data.user_by_email(email).is_some() {
                return Err(ApiError::DuplicateEmail);
            }
            Ok(data.insert_user(email.to_string(), password_hash))
        })?;

        info!("Created user {}", row.id);
        Ok(row.into())
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let row = self.db.read(|data| {
            data.user_by_email(email)
                .cloned()
                .ok_or(ApiError::UserNotFound)
        })?;

        let parsed_hash = PasswordHash::new(&row.password_hash)
            .map_err(|e| ApiError::Internal(format!("stored hash for user {} unreadable: {e}", row.id)))?;

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| ApiError::InvalidCredentials)?;

        Ok(row.into())
    }

    pub fn user(&self, user_id: u32) -> Result<User, ApiError> {
        self.db.read(|data| {
            data.user(user_id)
                .cloned()
                .map(User::from)
                .ok_or(ApiError::UserNotFound)
        })
    }

    /// Replace email and password. Email uniqueness is not re-checked here.
    pub fn update_user(&self, user_id: u32, email: &str, password: &str) -> Result<User, ApiError> {
        validate_credentials(email, password)?;
        let password_hash = self.hash_password(password)?;

        let row = self.db.update(|data| {
            let user = data.user_mut(user_id).ok_or(ApiError::UserNotFound)?;
            user.email = email.to_string();
            user.password_hash = password_hash;
            Ok::<_, ApiError>(user.clone())
        })?;

        debug!("Updated user {}", user_id);
        Ok(row.into())
    }

    pub fn upgrade_user(&self, user_id: u32) -> Result<User, ApiError> {
        let row = self.db.update(|data| {
            let user = data.user_mut(user_id).ok_or(ApiError::UserNotFound)?;
            user.is_chirpy_red = true;
            Ok::<_, ApiError>(user.clone())
        })?;

        info!("User {} upgraded to Chirpy Red", user_id);
        Ok(row.into())
    }

    // -- Refresh tokens --

    pub fn issue_refresh_token(&self, user_id: u32) -> Result<String, ApiError> {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        self.db.update(|data| {
            data.insert_refresh_token(token.clone(), user_id, Utc::now());
            Ok::<_, ApiError>(())
        })?;

        debug!("Issued refresh token for user {}", user_id);
        Ok(token)
    }

    /// Returns the user id the token was issued to.
    pub fn verify_refresh_token(&self, token: &str) -> Result<u32, ApiError> {
        self.verify_refresh_token_at(token, Utc::now())
    }

    pub fn verify_refresh_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<u32, ApiError> {
        self.db.read(|data| {
            let row = data.refresh_token(token).ok_or(ApiError::TokenNotFound)?;
            check_expiry(row, now)
        })
    }

    /// Expired tokens cannot be revoked; a second revoke finds nothing.
    pub fn revoke_refresh_token(&self, token: &str) -> Result<(), ApiError> {
        self.revoke_refresh_token_at(token, Utc::now())
    }

    pub fn revoke_refresh_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<(), ApiError> {
        let user_id = self.db.update(|data| {
            let user_id = check_expiry(
                data.refresh_token(token).ok_or(ApiError::TokenNotFound)?,
                now,
            )?;
            data.remove_refresh_token(token);
            Ok::<_, ApiError>(user_id)
        })?;

        debug!("Revoked refresh token for user {}", user_id);
        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
    }
}

fn check_expiry(row: &RefreshTokenRow, now: DateTime<Utc>) -> Result<u32, ApiError> {
    if now - row.created_at > Duration::days(REFRESH_TOKEN_TTL_DAYS) {
        return Err(ApiError::TokenExpired);
    }
    Ok(row.user_id)
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() {
        return Err(ApiError::InvalidInput("email is required".into()));
    }
    if password.is_empty() {
        return Err(ApiError::InvalidInput("password is required".into()));
    }
    Ok(())
}
