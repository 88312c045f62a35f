//! Handles logging in, registration and resolving sessions. A session only remembers which user
//! it belongs to; proof of an authenticated session is a [`SessionGrant`], which is always built
//! from the stored user record.

use crate::storage::{self, Storage};
use crate::user;
use thiserror::Error;

mod entities;
mod legacy;

pub use entities::{AccessDenied, HashError, PasswordHash, SessionGrant};

#[derive(Debug, Error)]
pub enum Error {
    #[error("a required field is empty")]
    MissingField,
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("email is not registered")]
    UnknownEmail,
    #[error("wrong password")]
    WrongPassword,
    #[error("{0}")]
    AccessDenied(#[from] AccessDenied),
    #[error("{0}")]
    Hashing(#[from] HashError),
    #[error("{0}")]
    Storage(#[from] storage::Error),
}

impl From<user::Error> for Error {
    fn from(e: user::Error) -> Self {
        match e {
            user::Error::DuplicateEmail => Error::DuplicateEmail,
            user::Error::UnknownEmail => Error::UnknownEmail,
            user::Error::WrongPassword => Error::WrongPassword,
            user::Error::Hashing(e) => Error::Hashing(e),
            user::Error::Storage(e) => Error::Storage(e),
        }
    }
}

pub async fn login(storage: &Storage, email: &str, password: &str) -> Result<SessionGrant, Error> {
    require(&[email, password])?;
    let user = user::authenticate(storage, email, password).await?;
    log::info!("user {:?} logged in", user.email);
    Ok(SessionGrant::for_user(&user))
}

/// Registers a new user, who is logged in straight away.
pub async fn register(
    storage: &Storage,
    name: &str,
    email: &str,
    password: &str,
) -> Result<SessionGrant, Error> {
    require(&[name, email, password])?;
    let user = user::register(storage, name, email, password).await?;
    Ok(SessionGrant::for_user(&user))
}

/// Looks up the user a session points at.
pub async fn resolve(storage: &Storage, email: user::Email) -> Result<SessionGrant, Error> {
    user::get(storage, &email)
        .await?
        .map(|user| SessionGrant::for_user(&user))
        .ok_or(Error::AccessDenied(AccessDenied))
}

fn require(fields: &[&str]) -> Result<(), Error> {
    if fields.iter().any(|field| field.is_empty()) {
        Err(Error::MissingField)
    } else {
        Ok(())
    }
}
