//! Registration, login and session validation.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use uuid::Uuid;

use budgetwise_domain::{normalize_email, Session, User, UserDirectory};

use crate::{CoreError, ServiceResult};

pub const MIN_PASSWORD_LEN: usize = 6;
const INVALID_CREDENTIALS: &str = "Invalid email or password";
const DUPLICATE_EMAIL: &str = "User with this email already exists";

/// Stateless helpers for user accounts and sessions.
pub struct AuthService;

impl AuthService {
    /// Creates a user in `directory` and returns a copy of the stored record.
    pub fn register(
        directory: &mut UserDirectory,
        full_name: &str,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<User> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(CoreError::Validation("Full name is required".into()));
        }
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(CoreError::Validation("A valid email is required".into()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if directory.find_by_email(&email).is_some() {
            return Err(CoreError::Duplicate(DUPLICATE_EMAIL.into()));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let user = User {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email,
            password_hash: hash_password(&salt, password),
            salt,
            created_at: now,
        };
        info!(user_id = %user.id, "registered user");
        directory.insert(user.clone());
        Ok(user)
    }

    /// Verifies credentials and issues a session valid for `ttl`.
    pub fn login(
        directory: &UserDirectory,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> ServiceResult<(User, Session)> {
        let user = directory
            .find_by_email(email)
            .filter(|user| hash_password(&user.salt, password) == user.password_hash)
            .ok_or_else(|| CoreError::Unauthorized(INVALID_CREDENTIALS.into()))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| CoreError::Validation("Session lifetime is out of range".into()))?;
        let session = Session {
            token: issue_token(),
            user_id: user.id,
            email: user.email.clone(),
            issued_at: now,
            expires_at,
        };
        info!(user_id = %user.id, "user logged in");
        Ok((user.clone(), session))
    }

    /// Resolves the user behind `session`, rejecting expired or orphaned sessions.
    pub fn authenticate<'a>(
        directory: &'a UserDirectory,
        session: Option<&Session>,
        now: DateTime<Utc>,
    ) -> ServiceResult<&'a User> {
        let session =
            session.ok_or_else(|| CoreError::Unauthorized("Not logged in".into()))?;
        if session.is_expired(now) {
            debug!(user_id = %session.user_id, "session expired");
            return Err(CoreError::Unauthorized(
                "Session expired, please log in again".into(),
            ));
        }
        directory
            .find(session.user_id)
            .ok_or_else(|| CoreError::Unauthorized("Session user no longer exists".into()))
    }
}

/// Hex-encoded SHA-256 of `salt` followed by `password`.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn issue_token() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}
