//! Seed sources: where a [`MemoryStore`](crate::MemoryStore) copies its initial tree from.
//!
//! ### Key Features:
//! - **Order-free**: a source may list entries depth-first, breadth-first or shuffled; the
//!   store creates missing ancestors itself.
//! - **Fail fast**: [`DirSource::new`] refuses a root that is missing, not a directory or not
//!   readable, so a store is never built from half a tree.
//! - **Read-only**: nothing is written back to the host.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};

use crate::backend::{Result, utils};
use crate::vfs::{NodeKind, Visibility};

/// One entry reported by a [`SourceTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Store path, relative to the source root (`"docs/readme.md"`).
    pub path: String,
    pub kind: NodeKind,
    /// Seconds since the Unix epoch. Ignored for directories.
    pub timestamp: i64,
    /// Ignored for directories.
    pub visibility: Visibility,
}

/// Anything that can list a tree and hand out file bytes by path.
pub trait SourceTree {
    /// Every entry below the root, the root itself excluded, in any order.
    fn entries(&self) -> Result<Vec<SourceEntry>>;

    /// Full contents of the file at `path` (a path from `entries()`).
    fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// A [`SourceTree`] over a directory on the host filesystem.
///
/// Symlinks are followed. Visibility is derived from the permission bits on unix: a file that
/// others may read (`0o044`) is public, anything else is private. Other hosts report every
/// file as public.
///
/// ### Example:
/// ```no_run
/// use memstore_kit::{DirSource, MemoryStore};
///
/// let source = DirSource::new("/srv/fixtures").unwrap();
/// let store = MemoryStore::from_source(&source).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf, // host path
}

impl DirSource {
    /// * `root` is a host path to an existing, readable directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();

        if root.as_os_str().is_empty() {
            return Err(anyhow!("invalid root path: empty"));
        }
        if !root.is_dir() {
            return Err(anyhow!(
                "{} does not exist or is not a directory",
                root.display()
            ));
        }
        fs::read_dir(root).with_context(|| format!("{} is not readable", root.display()))?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Recursively collects the entries under `host_path`, which maps to `inner_path`.
    fn collect(
        &self,
        host_path: &Path,
        inner_path: &str,
        out: &mut Vec<SourceEntry>,
    ) -> Result<()> {
        let dir = fs::read_dir(host_path)
            .with_context(|| format!("cannot list {}", host_path.display()))?;

        for entry in dir {
            let entry = entry?;
            let host_child = entry.path();
            let name = entry.file_name();
            let name = name
                .to_str()
                .ok_or_else(|| anyhow!("{} is not valid UTF-8", host_child.display()))?;
            let inner_child = utils::join(inner_path, name);

            let meta = fs::metadata(&host_child)
                .with_context(|| format!("cannot stat {}", host_child.display()))?;
            let kind = if meta.is_dir() {
                NodeKind::Directory
            } else {
                NodeKind::File
            };

            out.push(SourceEntry {
                path: inner_child.clone(),
                kind,
                timestamp: modified(&meta),
                visibility: visibility(&meta),
            });

            if kind == NodeKind::Directory {
                self.collect(&host_child, &inner_child, out)?;
            }
        }

        Ok(())
    }
}

impl SourceTree for DirSource {
    fn entries(&self) -> Result<Vec<SourceEntry>> {
        let mut out = Vec::new();
        self.collect(&self.root, utils::ROOT, &mut out)?;
        Ok(out)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>> {
        let host = self.root.join(path);
        fs::read(&host).with_context(|| format!("cannot read {}", host.display()))
    }
}

fn modified(meta: &fs::Metadata) -> i64 {
    meta.modified()
        .map(|time| DateTime::<Utc>::from(time).timestamp())
        .unwrap_or_default()
}

#[cfg(unix)]
fn visibility(meta: &fs::Metadata) -> Visibility {
    use std::os::unix::fs::PermissionsExt;

    if meta.permissions().mode() & 0o044 != 0 {
        Visibility::Public
    } else {
        Visibility::Private
    }
}

#[cfg(not(unix))]
fn visibility(_meta: &fs::Metadata) -> Visibility {
    Visibility::Public
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, StorageBackend};
    use tempdir::TempDir;

    fn setup_test_env() -> TempDir {
        let tmp = TempDir::new("dirsource_test").unwrap();
        fs::create_dir_all(tmp.path().join("tmp/nested")).unwrap();
        fs::write(tmp.path().join("readme.txt"), b"Hello").unwrap();
        fs::write(tmp.path().join("tmp/tmpfile.txt"), b"").unwrap();
        fs::write(tmp.path().join("tmp/nested/data.json"), b"{\"a\": 1}").unwrap();
        tmp
    }

    mod creations {
        use super::*;

        #[test]
        fn test_new_existing_directory() {
            let tmp = setup_test_env();
            let source = DirSource::new(tmp.path()).unwrap();
            assert_eq!(source.root(), tmp.path());
        }

        #[test]
        fn test_new_nonexistent_path() {
            let result = DirSource::new("does not exist");
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("does not exist"));
        }

        #[test]
        fn test_new_root_is_file() {
            let tmp = setup_test_env();
            let result = DirSource::new(tmp.path().join("readme.txt"));
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("not a directory"));
        }

        #[test]
        fn test_new_empty_path() {
            let result = DirSource::new("");
            assert!(result.unwrap_err().to_string().contains("empty"));
        }
    }

    mod entries {
        use super::*;

        #[test]
        fn test_entries_lists_whole_tree() -> Result<()> {
            let tmp = setup_test_env();
            let source = DirSource::new(tmp.path())?;

            let mut entries = source.entries()?;
            entries.sort_by(|a, b| a.path.cmp(&b.path));
            let listed: Vec<_> = entries
                .iter()
                .map(|e| (e.path.as_str(), e.kind))
                .collect();

            assert_eq!(
                listed,
                vec![
                    ("readme.txt", NodeKind::File),
                    ("tmp", NodeKind::Directory),
                    ("tmp/nested", NodeKind::Directory),
                    ("tmp/nested/data.json", NodeKind::File),
                    ("tmp/tmpfile.txt", NodeKind::File),
                ]
            );
            assert!(entries.iter().all(|e| e.timestamp > 0));
            Ok(())
        }

        #[test]
        fn test_read_file() -> Result<()> {
            let tmp = setup_test_env();
            let source = DirSource::new(tmp.path())?;
            assert_eq!(source.read("readme.txt")?, b"Hello");
            assert_eq!(source.read("tmp/nested/data.json")?, b"{\"a\": 1}");
            assert!(source.read("missing.txt").is_err());
            Ok(())
        }

        #[cfg(unix)]
        #[test]
        fn test_visibility_from_permissions() -> Result<()> {
            use std::os::unix::fs::PermissionsExt;

            let tmp = setup_test_env();
            let secret = tmp.path().join("secret.txt");
            fs::write(&secret, b"s")?;
            fs::set_permissions(&secret, fs::Permissions::from_mode(0o600))?;
            fs::set_permissions(
                tmp.path().join("readme.txt"),
                fs::Permissions::from_mode(0o644),
            )?;

            let entries = DirSource::new(tmp.path())?.entries()?;
            let find = |path: &str| {
                entries
                    .iter()
                    .find(|e| e.path == path)
                    .map(|e| e.visibility)
            };
            assert_eq!(find("secret.txt"), Some(Visibility::Private));
            assert_eq!(find("readme.txt"), Some(Visibility::Public));
            Ok(())
        }
    }

    mod seeding {
        use super::*;

        #[test]
        fn test_store_from_path() -> Result<()> {
            let tmp = setup_test_env();
            let store = MemoryStore::from_path(tmp.path())?;

            let listed: Vec<_> = store
                .list_contents("", true)
                .into_iter()
                .map(|meta| meta.path)
                .collect();
            assert_eq!(
                listed,
                vec![
                    "readme.txt",
                    "tmp",
                    "tmp/nested",
                    "tmp/nested/data.json",
                    "tmp/tmpfile.txt"
                ]
            );
            assert_eq!(store.read("readme.txt")?.contents, b"Hello");
            assert_eq!(store.get_size("tmp/tmpfile.txt")?, 0);
            assert_eq!(store.get_mimetype("tmp/nested/data.json")?, "application/json");
            Ok(())
        }

        #[test]
        fn test_store_keeps_host_timestamps() -> Result<()> {
            let tmp = setup_test_env();
            let source = DirSource::new(tmp.path())?;
            let expected = source
                .entries()?
                .into_iter()
                .find(|e| e.path == "readme.txt")
                .map(|e| e.timestamp);

            let store = MemoryStore::from_source(&source)?;
            assert_eq!(Some(store.get_timestamp("readme.txt")?), expected);
            Ok(())
        }

        #[test]
        fn test_store_from_file_path_fails() {
            let tmp = setup_test_env();
            assert!(MemoryStore::from_path(tmp.path().join("readme.txt")).is_err());
        }

        #[test]
        fn test_host_is_untouched() -> Result<()> {
            let tmp = setup_test_env();
            let mut store = MemoryStore::from_path(tmp.path())?;
            store.delete_dir("")?;
            assert!(tmp.path().join("readme.txt").exists());
            assert!(tmp.path().join("tmp/nested/data.json").exists());
            Ok(())
        }
    }
}
