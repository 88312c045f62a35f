use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use tokio::sync::Mutex;

use super::{Backend, Error};

/// A JSON document that is always read and written as a whole.
///
/// Every access holds the document's lock for the full load/modify/store cycle, so two
/// concurrent updates can never interleave and lose each other's changes.
pub struct Document<T> {
    backend: Box<dyn Backend>,
    lock: Mutex<()>,
    _contents: PhantomData<fn() -> T>,
}

impl<T> Document<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            lock: Mutex::new(()),
            _contents: PhantomData,
        }
    }

    /// Writes an empty document if none exists yet, and fails if the existing one doesn't parse.
    pub async fn prepare(&self) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        match self.backend.load().await? {
            Some(contents) => {
                self.decode(&contents)?;
            }
            None => {
                log::info!("creating empty document {}", self.backend.name());
                self.backend.store(self.encode(&T::default())?).await?;
            }
        }
        Ok(())
    }

    pub async fn read(&self) -> Result<T, Error> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Runs `f` against the current contents and persists the result. Nothing is written if `f`
    /// fails.
    pub async fn update<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E>
    where
        E: From<Error>,
    {
        let _guard = self.lock.lock().await;
        let mut contents = self.load().await?;
        let result = f(&mut contents)?;
        self.backend.store(self.encode(&contents)?).await?;
        Ok(result)
    }

    pub async fn replace(&self, contents: T) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        self.backend.store(self.encode(&contents)?).await
    }

    async fn load(&self) -> Result<T, Error> {
        match self.backend.load().await? {
            Some(contents) => self.decode(&contents),
            None => Ok(T::default()),
        }
    }

    fn decode(&self, contents: &[u8]) -> Result<T, Error> {
        serde_json::from_slice(contents).map_err(|source| Error::Malformed {
            name: self.backend.name().to_owned(),
            source,
        })
    }

    /// Same layout the files have always had: pretty printed, four space indent.
    fn encode(&self, contents: &T) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        contents
            .serialize(&mut serializer)
            .map_err(|source| Error::Malformed {
                name: self.backend.name().to_owned(),
                source,
            })?;
        Ok(out)
    }
}
