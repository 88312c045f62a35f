//! Income and expense lists per user, plus the savings figure that lives with the user record.
//! Reads and writes always cover all three as one [`Snapshot`].

use crate::auth;
use crate::storage::{self, Storage};
use crate::user;
use std::collections::BTreeMap;
use thiserror::Error;

mod entities;

pub use entities::{Entry, Snapshot};

/// Layout of the income and expense files: email to that user's entries.
pub(crate) type EntriesByEmail = BTreeMap<String, Vec<Entry>>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("user {0:?} no longer exists")]
    UnknownUser(user::Email),
    #[error("{0}")]
    Storage(#[from] storage::Error),
}

/// Waits for any save in progress, so the three parts always come from the same save.
pub async fn get_snapshot(
    grant: &auth::SessionGrant,
    storage: &Storage,
) -> Result<Snapshot, Error> {
    let _guard = storage.snapshot_lock.lock().await;
    let (income, expenses) = queries::get(storage, &grant.email).await?;
    let savings = user::get(storage, &grant.email)
        .await?
        .map(|user| user.savings)
        .unwrap_or_default();
    Ok(Snapshot {
        income,
        expenses,
        savings,
    })
}

/// Replaces the user's income and expense lists and savings. Nothing is written if the user
/// doesn't exist anymore.
pub async fn save_snapshot(
    grant: &auth::SessionGrant,
    storage: &Storage,
    snapshot: Snapshot,
) -> Result<(), Error> {
    let _guard = storage.snapshot_lock.lock().await;
    if user::get(storage, &grant.email).await?.is_none() {
        return Err(Error::UnknownUser(grant.email.clone()));
    }
    log::info!(
        "saving {} income and {} expense entries for {:?}",
        snapshot.income.len(),
        snapshot.expenses.len(),
        grant.email
    );
    queries::put(storage, &grant.email, snapshot.income, snapshot.expenses).await?;
    if !user::update_savings(storage, &grant.email, snapshot.savings).await? {
        return Err(Error::UnknownUser(grant.email.clone()));
    }
    Ok(())
}

mod queries {
    use super::Entry;
    use crate::storage::{self, Storage};
    use crate::user::Email;

    /// Returns empty lists for a user without any entries.
    pub(super) async fn get(
        storage: &Storage,
        email: &Email,
    ) -> Result<(Vec<Entry>, Vec<Entry>), storage::Error> {
        let income = storage
            .income
            .read()
            .await?
            .remove(&email.0)
            .unwrap_or_default();
        let expenses = storage
            .expenses
            .read()
            .await?
            .remove(&email.0)
            .unwrap_or_default();
        Ok((income, expenses))
    }

    /// Overwrites one user's lists in both files, leaving everyone else untouched.
    pub(super) async fn put(
        storage: &Storage,
        email: &Email,
        income: Vec<Entry>,
        expenses: Vec<Entry>,
    ) -> Result<(), storage::Error> {
        storage
            .income
            .update(|entries| {
                entries.insert(email.0.clone(), income);
                Ok::<_, storage::Error>(())
            })
            .await?;
        storage
            .expenses
            .update(|entries| {
                entries.insert(email.0.clone(), expenses);
                Ok::<_, storage::Error>(())
            })
            .await
    }
}
