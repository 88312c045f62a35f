//! Flat-file persistence. Each store is one JSON document that is read and rewritten in full on
//! every change.

use std::path::Path;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{ledger, user};

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use document::Document;
pub use seeder::seed_development_data;

mod backend;
mod document;
mod seeder;

pub const USERS_FILE: &str = "usuarios.json";
pub const INCOME_FILE: &str = "ingresos.json";
pub const EXPENSES_FILE: &str = "gastos.json";

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error on {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{name} is not a valid document: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// All persisted state of the application.
pub struct Storage {
    pub(crate) users: Document<Vec<user::UserRow>>,
    pub(crate) income: Document<ledger::EntriesByEmail>,
    pub(crate) expenses: Document<ledger::EntriesByEmail>,
    /// Serializes snapshot saves, which touch all three documents.
    pub(crate) snapshot_lock: Mutex<()>,
}

impl Storage {
    pub fn new(
        users: impl Backend + 'static,
        income: impl Backend + 'static,
        expenses: impl Backend + 'static,
    ) -> Self {
        Self {
            users: Document::new(users),
            income: Document::new(income),
            expenses: Document::new(expenses),
            snapshot_lock: Mutex::new(()),
        }
    }

    /// Opens the three documents inside `data_dir`, creating the directory and any missing file.
    /// Fails if an existing file doesn't parse.
    pub async fn open(data_dir: &Path) -> Result<Self, Error> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|source| Error::Io {
                name: data_dir.display().to_string(),
                source,
            })?;
        let storage = Self::new(
            FileBackend::new(data_dir.join(USERS_FILE)),
            FileBackend::new(data_dir.join(INCOME_FILE)),
            FileBackend::new(data_dir.join(EXPENSES_FILE)),
        );
        storage.prepare().await?;
        log::info!("storage opened at {}", data_dir.display());
        Ok(storage)
    }

    pub fn in_memory() -> Self {
        Self::new(
            MemoryBackend::new(USERS_FILE),
            MemoryBackend::new(INCOME_FILE),
            MemoryBackend::new(EXPENSES_FILE),
        )
    }

    pub async fn prepare(&self) -> Result<(), Error> {
        self.users.prepare().await?;
        self.income.prepare().await?;
        self.expenses.prepare().await
    }
}
