//! Account registration and login.
//!
//! Passwords are stored as argon2 PHC strings. Login hands back an opaque
//! random token but nothing records it, so logout has nothing to revoke.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::info;
use maze::shared::requests::{Credentials, LogoutRequest};
use maze::shared::responses::{LoginResponse, LogoutResponse, RegisterUserResponse};
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::error::ServiceError;
use crate::store::{NewUser, Store, StoreError};

const TOKEN_LEN: usize = 32;
const INVALID_CREDENTIALS: &str = "Invalid login credentials";

pub struct AuthService {
    store: Arc<dyn Store>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<RegisterUserResponse, ServiceError> {
        let email = credentials.email.trim();
        if !email.contains('@') {
            return Err(ServiceError::Validation(format!("{email:?} is not an email address")));
        }
        if credentials.password.is_empty() {
            return Err(ServiceError::Validation("Password must not be empty".to_string()));
        }

        // Saves hashing for the common case; the store still enforces uniqueness.
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(email_in_use());
        }

        let password_hash = hash_password(&credentials.password)?;
        let user = match self.store.create_user(NewUser { email: email.to_string(), password_hash }).await {
            Ok(user) => user,
            Err(StoreError::Duplicate(_)) => return Err(email_in_use()),
            Err(err) => return Err(err.into()),
        };
        info!("registered user {}", user.id);
        Ok(RegisterUserResponse { success: true, user_id: user.id })
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ServiceError> {
        let user = self.store.find_user_by_email(credentials.email.trim()).await?
            .ok_or_else(|| ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&credentials.password, &user.password_hash)? {
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        info!("user {} logged in", user.id);
        Ok(LoginResponse {
            session_token: session_token(),
            message: "Login successful".to_string(),
        })
    }

    pub fn logout(&self, _request: &LogoutRequest) -> LogoutResponse {
        LogoutResponse { message: "Successfully logged out.".to_string(), success: true }
    }
}

fn email_in_use() -> ServiceError {
    ServiceError::Conflict("Email already in use.".to_string())
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {e}")))
}

/// `Ok(false)` on a wrong password; `Err` only when the stored hash is corrupt.
fn verify_password(password: &str, stored: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| ServiceError::Internal(format!("stored password hash is invalid: {e}")))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

fn session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
