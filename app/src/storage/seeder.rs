use super::{Error, Storage};
use crate::user;

/// Registers a couple of well-known accounts for local development.
pub async fn seed_development_data(storage: &Storage) -> Result<(), Error> {
    seed_test_user(storage, 1).await?;
    seed_test_user(storage, 2).await
}

async fn seed_test_user(storage: &Storage, index: u32) -> Result<(), Error> {
    let email = user::Email(format!("test-{}@user.net", index));
    if user::get(storage, &email).await?.is_some() {
        return Ok(());
    }
    match user::register(
        storage,
        &format!("Test {}", index),
        &email.0,
        &format!("test-{}", index),
    )
    .await
    {
        Ok(_) | Err(user::Error::DuplicateEmail) => Ok(()),
        Err(user::Error::Storage(e)) => Err(e),
        Err(e) => {
            log::error!("could not seed test user {:?}: {}", email, e);
            Ok(())
        }
    }
}
