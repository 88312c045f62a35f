use argon2::password_hash::{self, rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use thiserror::Error;

use super::legacy;
use crate::user;

#[derive(Debug, Error)]
#[error("access denied")]
pub struct AccessDenied;

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

/// This grant represents a compile-time proof that the request belongs to a logged in user. It is
/// built from the user record as it is stored right now, never from a cached copy.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub email: user::Email,
    pub name: String,
}

impl SessionGrant {
    pub(crate) fn for_user(user: &user::User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// A salted password hash in PHC string format.
///
/// Argon2id with a random per-password salt is used, since passwords are low entropy and must
/// be expensive to brute force. Hashing and verifying are CPU bound and run on Tokio's blocking
/// pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub(crate) async fn generate(password: &str) -> Result<Self, HashError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || generate(&password))
            .await
            .map_err(|e| HashError(e.to_string()))?
    }

    pub(crate) fn from_stored(hash: String) -> Self {
        Self(hash)
    }

    /// Hashes that don't parse never verify.
    pub(crate) async fn verify(&self, password: &str) -> bool {
        let hash = self.0.clone();
        let password = password.to_owned();
        match tokio::task::spawn_blocking(move || verify(&hash, &password)).await {
            Ok(verified) => verified,
            Err(e) => {
                log::error!("password verification did not complete: {}", e);
                false
            }
        }
    }

    /// True for werkzeug hashes left over from the previous service. They still verify, but
    /// should be replaced by an Argon2 hash on the next successful login.
    pub(crate) fn is_legacy(&self) -> bool {
        !self.0.starts_with("$argon2")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn generate(password: &str) -> Result<PasswordHash, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordHash(hash.to_string()))
        .map_err(|e| HashError(e.to_string()))
}

fn verify(hash: &str, password: &str) -> bool {
    if !hash.starts_with('$') {
        return legacy::verify(hash, password).unwrap_or_else(|| {
            log::warn!("stored password hash has an unsupported format");
            false
        });
    }
    match password_hash::PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("stored password hash could not be parsed: {}", e);
            false
        }
    }
}
