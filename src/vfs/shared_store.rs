use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::StorageBackend;
use crate::error::StoreResult;
use crate::options::WriteOptions;
use crate::vfs::{FileContents, FileMetadata, MemoryStore, Metadata, Visibility};

/// Cloneable handle to a [`MemoryStore`] shared between threads.
///
/// The whole store sits behind one mutex and every call holds it for its full duration, so
/// ancestor creation and cascading deletes never interleave. Use [`SharedStore::with`] to run
/// several operations as one atomic step.
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<MemoryStore>>,
}

impl SharedStore {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs `f` with exclusive access to the store.
    pub fn with<R>(&self, f: impl FnOnce(&mut MemoryStore) -> R) -> R {
        // store operations never leave the map half-updated, so a poisoned lock is still usable
        let mut store = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    /// Takes the store back if this is the last handle.
    pub fn try_unwrap(self) -> Result<MemoryStore, Self> {
        Arc::try_unwrap(self.inner)
            .map(|mutex| mutex.into_inner().unwrap_or_else(PoisonError::into_inner))
            .map_err(|inner| Self { inner })
    }
}

impl From<MemoryStore> for SharedStore {
    fn from(store: MemoryStore) -> Self {
        Self::new(store)
    }
}

impl StorageBackend for SharedStore {
    fn has(&self, path: &str) -> bool {
        self.with(|store| store.has(path))
    }

    fn has_file(&self, path: &str) -> bool {
        self.with(|store| store.has_file(path))
    }

    fn has_directory(&self, path: &str) -> bool {
        self.with(|store| store.has_directory(path))
    }

    fn create_dir(&mut self, path: &str) -> StoreResult<Metadata> {
        self.with(|store| store.create_dir(path))
    }

    fn write(
        &mut self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<FileMetadata> {
        self.with(|store| store.write(path, contents, options))
    }

    fn update(
        &mut self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<FileMetadata> {
        self.with(|store| store.update(path, contents, options))
    }

    fn delete(&mut self, path: &str) -> StoreResult<()> {
        self.with(|store| store.delete(path))
    }

    fn delete_dir(&mut self, path: &str) -> StoreResult<()> {
        self.with(|store| store.delete_dir(path))
    }

    fn copy(&mut self, path: &str, newpath: &str) -> StoreResult<()> {
        self.with(|store| store.copy(path, newpath))
    }

    fn rename(&mut self, path: &str, newpath: &str) -> StoreResult<()> {
        self.with(|store| store.rename(path, newpath))
    }

    fn set_visibility(&mut self, path: &str, visibility: Visibility) -> StoreResult<Visibility> {
        self.with(|store| store.set_visibility(path, visibility))
    }

    fn set_timestamp(&mut self, path: &str, timestamp: i64) -> StoreResult<i64> {
        self.with(|store| store.set_timestamp(path, timestamp))
    }

    fn read(&self, path: &str) -> StoreResult<FileContents> {
        self.with(|store| store.read(path))
    }

    fn get_metadata(&self, path: &str) -> StoreResult<Metadata> {
        self.with(|store| store.get_metadata(path))
    }

    fn get_size(&self, path: &str) -> StoreResult<u64> {
        self.with(|store| store.get_size(path))
    }

    fn get_timestamp(&self, path: &str) -> StoreResult<i64> {
        self.with(|store| store.get_timestamp(path))
    }

    fn get_visibility(&self, path: &str) -> StoreResult<Visibility> {
        self.with(|store| store.get_visibility(path))
    }

    fn get_mimetype(&self, path: &str) -> StoreResult<String> {
        self.with(|store| store.get_mimetype(path))
    }

    fn list_contents(&self, directory: &str, recursive: bool) -> Vec<Metadata> {
        self.with(|store| store.list_contents(directory, recursive))
    }
}
