//! The credential store: registered users, their password hashes and savings.

use crate::auth::{HashError, PasswordHash};
use crate::storage::{self, Storage};
use thiserror::Error;

mod entities;

pub use entities::{Email, Savings, User};
pub(crate) use queries::UserRow;

#[derive(Debug, Error)]
pub enum Error {
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("email is not registered")]
    UnknownEmail,
    #[error("wrong password")]
    WrongPassword,
    #[error("{0}")]
    Hashing(#[from] HashError),
    #[error("{0}")]
    Storage(#[from] storage::Error),
}

/// Creates a new user with zero savings. The password is hashed before anything is stored.
pub async fn register(
    storage: &Storage,
    name: &str,
    email: &str,
    password: &str,
) -> Result<User, Error> {
    let user = User {
        name: name.to_owned(),
        email: Email(email.to_owned()),
        password_hash: PasswordHash::generate(password).await?,
        savings: Savings::default(),
    };
    queries::insert(storage, &user).await?;
    log::info!("registered user {:?}", user.email);
    Ok(user)
}

/// A werkzeug hash left over from the previous service is replaced with an Argon2 hash once the
/// password has been verified against it.
pub async fn authenticate(storage: &Storage, email: &str, password: &str) -> Result<User, Error> {
    let mut user = queries::find(storage, email)
        .await?
        .ok_or(Error::UnknownEmail)?;
    if !user.password_hash.verify(password).await {
        return Err(Error::WrongPassword);
    }
    if user.password_hash.is_legacy() {
        let upgraded = PasswordHash::generate(password).await?;
        queries::update_password_hash(storage, &user.email.0, &upgraded).await?;
        log::info!("upgraded password hash of {:?} to argon2", user.email);
        user.password_hash = upgraded;
    }
    Ok(user)
}

pub async fn get(storage: &Storage, email: &Email) -> Result<Option<User>, storage::Error> {
    queries::find(storage, &email.0).await
}

pub async fn list_users(storage: &Storage) -> Result<Vec<User>, storage::Error> {
    queries::list(storage).await
}

/// Overwrites the whole credential store.
pub async fn save_users(storage: &Storage, users: Vec<User>) -> Result<(), storage::Error> {
    queries::save(storage, users).await
}

/// Returns false if there is no such user, in which case nothing is written.
pub(crate) async fn update_savings(
    storage: &Storage,
    email: &Email,
    savings: Savings,
) -> Result<bool, storage::Error> {
    queries::update_savings(storage, &email.0, savings).await
}

mod queries {
    use super::{Email, Error, Savings, User};
    use crate::auth::PasswordHash;
    use crate::storage::{self, Storage};
    use serde::{Deserialize, Serialize};
    use serde_json::Number;

    pub(super) async fn list(storage: &Storage) -> Result<Vec<User>, storage::Error> {
        Ok(storage
            .users
            .read()
            .await?
            .into_iter()
            .map(UserRow::into_entity)
            .collect())
    }

    pub(super) async fn save(storage: &Storage, users: Vec<User>) -> Result<(), storage::Error> {
        storage
            .users
            .replace(users.iter().map(UserRow::from_entity).collect())
            .await
    }

    pub(super) async fn find(storage: &Storage, email: &str) -> Result<Option<User>, storage::Error> {
        Ok(storage
            .users
            .read()
            .await?
            .into_iter()
            .find(|row| row.email == email)
            .map(UserRow::into_entity))
    }

    pub(super) async fn insert(storage: &Storage, user: &User) -> Result<(), Error> {
        storage
            .users
            .update(|rows| {
                if rows.iter().any(|row| row.email == user.email.0) {
                    return Err(Error::DuplicateEmail);
                }
                rows.push(UserRow::from_entity(user));
                Ok(())
            })
            .await
    }

    pub(super) async fn update_password_hash(
        storage: &Storage,
        email: &str,
        hash: &PasswordHash,
    ) -> Result<(), storage::Error> {
        storage
            .users
            .update(|rows| {
                if let Some(row) = rows.iter_mut().find(|row| row.email == email) {
                    row.password_hash = hash.as_str().to_owned();
                }
                Ok(())
            })
            .await
    }

    pub(super) async fn update_savings(
        storage: &Storage,
        email: &str,
        savings: Savings,
    ) -> Result<bool, storage::Error> {
        let updated = storage
            .users
            .update(|rows| match rows.iter_mut().find(|row| row.email == email) {
                Some(row) => {
                    row.savings = savings.0;
                    Ok(())
                }
                None => Err(Abort::MissingUser),
            })
            .await;
        match updated {
            Ok(()) => Ok(true),
            Err(Abort::MissingUser) => Ok(false),
            Err(Abort::Storage(e)) => Err(e),
        }
    }

    /// Stops an update before anything is written.
    enum Abort {
        MissingUser,
        Storage(storage::Error),
    }

    impl From<storage::Error> for Abort {
        fn from(e: storage::Error) -> Self {
            Abort::Storage(e)
        }
    }

    /// A user as laid out in the users file.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub(crate) struct UserRow {
        #[serde(rename = "nombre", default)]
        name: String,
        #[serde(rename = "correo")]
        email: String,
        #[serde(rename = "contraseña", default)]
        password_hash: String,
        #[serde(rename = "ahorro", default = "zero")]
        savings: Number,
    }

    fn zero() -> Number {
        Number::from(0)
    }

    impl UserRow {
        fn into_entity(self) -> User {
            User {
                name: self.name,
                email: Email(self.email),
                password_hash: PasswordHash::from_stored(self.password_hash),
                savings: Savings(self.savings),
            }
        }

        fn from_entity(user: &User) -> Self {
            Self {
                name: user.name.clone(),
                email: user.email.0.clone(),
                password_hash: user.password_hash.as_str().to_owned(),
                savings: user.savings.0.clone(),
            }
        }
    }
}
