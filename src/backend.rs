pub mod utils;

use crate::error::StoreResult;
use crate::options::WriteOptions;
use crate::vfs::{FileContents, FileMetadata, Metadata, Visibility};

/// File and directory operations over slash-separated string paths.
///
/// `""` is the root directory, which always exists. Paths carry no leading or trailing `/`
/// and are used verbatim as keys: `.`/`..` segments are not resolved.
pub trait StorageBackend {
    fn has(&self, path: &str) -> bool;
    fn has_file(&self, path: &str) -> bool;
    fn has_directory(&self, path: &str) -> bool;

    fn create_dir(&mut self, path: &str) -> StoreResult<Metadata>;
    fn write(
        &mut self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<FileMetadata>;
    fn update(
        &mut self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<FileMetadata>;
    fn delete(&mut self, path: &str) -> StoreResult<()>;
    fn delete_dir(&mut self, path: &str) -> StoreResult<()>;
    fn copy(&mut self, path: &str, newpath: &str) -> StoreResult<()>;
    fn rename(&mut self, path: &str, newpath: &str) -> StoreResult<()>;
    fn set_visibility(&mut self, path: &str, visibility: Visibility) -> StoreResult<Visibility>;
    fn set_timestamp(&mut self, path: &str, timestamp: i64) -> StoreResult<i64>;

    fn read(&self, path: &str) -> StoreResult<FileContents>;
    fn get_metadata(&self, path: &str) -> StoreResult<Metadata>;
    fn get_size(&self, path: &str) -> StoreResult<u64>;
    fn get_timestamp(&self, path: &str) -> StoreResult<i64>;
    fn get_visibility(&self, path: &str) -> StoreResult<Visibility>;
    fn get_mimetype(&self, path: &str) -> StoreResult<String>;

    fn list_contents(&self, directory: &str, recursive: bool) -> Vec<Metadata>;
}

pub type Result<T> = std::result::Result<T, anyhow::Error>;
