//! Places where a document's bytes can live.

use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::Error;

/// Raw persistence for a single document. Implementations only move bytes around, encoding and
/// locking are handled by [`super::Document`].
#[async_trait]
pub trait Backend: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Returns `None` if nothing has been stored yet.
    async fn load(&self) -> Result<Option<Vec<u8>>, Error>;

    /// Replaces the stored contents. Readers never observe a partial write.
    async fn store(&self, contents: Vec<u8>) -> Result<(), Error>;
}

/// A JSON file on disk. Writes go to a temporary file in the same directory which is then renamed
/// over the target.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    name: String,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::Io {
            name: self.name.clone(),
            source,
        }
    }
}

#[async_trait]
impl Backend for FileBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Option<Vec<u8>>, Error> {
        match tokio::fs::read(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn store(&self, contents: Vec<u8>) -> Result<(), Error> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &contents))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
            .and_then(|result| result)
            .map_err(|e| self.io_error(e))
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Keeps the document in memory. Used by tests and throwaway instances.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    name: String,
    contents: Mutex<Option<Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            contents: Mutex::new(None),
        }
    }

    /// Starts out with the given bytes already stored, whether or not they are valid.
    pub fn with_contents(name: &str, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.to_owned(),
            contents: Mutex::new(Some(contents.into())),
        }
    }

    fn poisoned(&self) -> Error {
        Error::Io {
            name: self.name.clone(),
            source: io::Error::new(io::ErrorKind::Other, "memory backend lock poisoned"),
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Option<Vec<u8>>, Error> {
        let contents = self.contents.lock().map_err(|_| self.poisoned())?;
        Ok(contents.clone())
    }

    async fn store(&self, contents: Vec<u8>) -> Result<(), Error> {
        *self.contents.lock().map_err(|_| self.poisoned())? = Some(contents);
        Ok(())
    }
}
