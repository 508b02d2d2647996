//! Password hashing and bearer-token handling.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use quotebook_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Bearer token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id.
    pub id: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Hash a password using Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Sign a bearer token for `user_id`.
pub fn issue_token(user_id: &str, secret: &str, expiry_secs: u64) -> AppResult<String> {
    let exp = chrono::Utc::now().timestamp() + i64::try_from(expiry_secs).unwrap_or(i64::MAX);
    let claims = Claims {
        id: user_id.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
}

/// Verify a bearer token and return the subject user id.
///
/// Signature and expiry failures all collapse into the single
/// authentication error; nothing about the token is leaked.
pub fn verify_token(token: &str, secret: &str) -> AppResult<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.id)
    .map_err(|_| AppError::Unauthorized)
}
