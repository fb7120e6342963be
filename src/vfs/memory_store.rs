//! This module provides the in-memory path store: a flat map from path strings to nodes that
//! behaves like a directory tree.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info, trace};

use crate::backend::{Result, StorageBackend, utils};
use crate::error::{StoreError, StoreResult};
use crate::mime::{DefaultMimeGuesser, MimeGuesser};
use crate::options::WriteOptions;
use crate::vfs::dir_source::{DirSource, SourceTree};
use crate::vfs::{FileContents, FileMetadata, FileNode, Metadata, Node, NodeKind, Visibility};

/// A file store kept entirely in process memory.
///
/// `MemoryStore` offers file and directory semantics (create, read, update, delete, copy,
/// rename, list, metadata) without touching the host filesystem. It is meant as a fast,
/// deterministic stand-in for a real storage backend in tests and caching layers.
///
/// ### Internal state
///
/// * `entries`: every node keyed by its full path.
///   - Keys are slash-separated, without leading or trailing `/`; `""` is the root.
///   - There are no parent/child links: membership in a directory is a key prefix
///     (`dir + "/"`), so subtree deletes and listings are range scans over the map.
///   - `BTreeMap` keeps iteration lexicographic, so listings are repeatable.
/// * `guesser`: asked for a mimetype once per `write()`/`update()`.
///
/// ### Invariants
///
/// 1. **Root existence**: `""` is always present and is a `Directory`, also after
///    `delete_dir("")`.
/// 2. **Files are leaves**: no key extends a file's key with `/segment`.
/// 3. **Parent consistency**: every ancestor of a stored path is a `Directory`. Writes create
///    missing ancestors and refuse when one of them is a file.
/// 4. **All or nothing**: every operation validates before it mutates, so a failed call leaves
///    the map untouched.
///
/// ### Thread Safety
///
/// Single owner. For shared access use [`SharedStore`](crate::SharedStore), which puts the
/// whole store behind one lock.
///
/// ### Example
///
/// ```
/// use memstore_kit::{MemoryStore, StorageBackend, WriteOptions};
///
/// let mut store = MemoryStore::new();
/// store.write("a/b/c.txt", b"hi", &WriteOptions::default()).unwrap();
///
/// assert!(store.has_directory("a/b"));
/// assert_eq!(store.get_size("a/b/c.txt").unwrap(), 2);
/// ```
pub struct MemoryStore {
    entries: BTreeMap<String, Node>,
    guesser: Box<dyn MimeGuesser>,
}

impl MemoryStore {
    /// Creates an empty store (root directory only) with the default mimetype guesser.
    pub fn new() -> Self {
        Self::with_mime_guesser(DefaultMimeGuesser)
    }

    pub fn with_mime_guesser<G: MimeGuesser + 'static>(guesser: G) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(utils::ROOT.to_string(), Node::Directory);
        Self {
            entries,
            guesser: Box::new(guesser),
        }
    }

    /// Builds a store holding a copy of the tree under the host directory `root`.
    ///
    /// Fails if `root` does not exist, is not a directory or cannot be read.
    pub fn from_path<P: AsRef<Path>>(root: P) -> Result<Self> {
        let source = DirSource::new(root)?;
        Self::from_source(&source)
    }

    /// Builds a store from any [`SourceTree`], using the default mimetype guesser.
    pub fn from_source<S: SourceTree + ?Sized>(source: &S) -> Result<Self> {
        Self::new().seeded_from(source)
    }

    /// Copies every entry of `source` into this store and returns it.
    ///
    /// Entries may come in any order: missing ancestors are created on the way and a
    /// directory listed after its children is a no-op. Files keep the provider's timestamp
    /// and visibility. The store is consumed, so nothing partially seeded escapes on error.
    pub fn seeded_from<S: SourceTree + ?Sized>(mut self, source: &S) -> Result<Self> {
        let entries = source.entries().context("failed to list seed source")?;
        let (mut files, mut dirs) = (0usize, 0usize);

        for entry in entries {
            match entry.kind {
                NodeKind::Directory => {
                    self.create_dir(&entry.path)
                        .with_context(|| format!("failed to seed directory {}", entry.path))?;
                    dirs += 1;
                }
                NodeKind::File => {
                    let contents = source
                        .read(&entry.path)
                        .with_context(|| format!("failed to read seed file {}", entry.path))?;
                    let options = WriteOptions::new()
                        .with_visibility(entry.visibility)
                        .with_timestamp(entry.timestamp);
                    self.write(&entry.path, &contents, &options)
                        .with_context(|| format!("failed to seed file {}", entry.path))?;
                    files += 1;
                }
            }
        }

        info!(files, dirs, "memory store seeded");
        Ok(self)
    }

    /// Iterates over all nodes, root included, in lexicographic path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(path, node)| (path.as_str(), node))
    }

    /// Number of stored nodes, root included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when only the root directory is left.
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 1
    }

    fn node(&self, path: &str) -> StoreResult<&Node> {
        self.entries
            .get(path)
            .ok_or_else(|| StoreError::not_found(path))
    }

    fn file(&self, path: &str) -> StoreResult<&FileNode> {
        self.node(path)?
            .as_file()
            .ok_or_else(|| StoreError::wrong_kind(path, NodeKind::File))
    }

    fn file_mut(&mut self, path: &str) -> StoreResult<&mut FileNode> {
        self.entries
            .get_mut(path)
            .ok_or_else(|| StoreError::not_found(path))?
            .as_file_mut()
            .ok_or_else(|| StoreError::wrong_kind(path, NodeKind::File))
    }

    fn ensure_dir(&self, path: &str) -> StoreResult<()> {
        match self.node(path)? {
            Node::Directory => Ok(()),
            Node::File(_) => Err(StoreError::wrong_kind(path, NodeKind::Directory)),
        }
    }

    /// Fails if any ancestor of `path` is a file.
    fn check_ancestors(&self, path: &str) -> StoreResult<()> {
        match utils::ancestors(path).find(|ancestor| {
            self.entries.get(*ancestor).is_some_and(Node::is_file)
        }) {
            Some(ancestor) => Err(StoreError::ancestor_blocked(path, ancestor)),
            None => Ok(()),
        }
    }

    /// Creates the missing ancestors of `path`. Call `check_ancestors()` first.
    fn materialize_ancestors(&mut self, path: &str) {
        for ancestor in utils::ancestors(path) {
            if !self.entries.contains_key(ancestor) {
                self.entries.insert(ancestor.to_string(), Node::Directory);
                debug!(path = ancestor, "directory created");
            }
        }
    }

    /// Every node strictly below `directory`.
    fn subtree(&self, directory: &str) -> impl Iterator<Item = (&str, &Node)> {
        let prefix = if utils::is_root(directory) {
            String::new()
        } else {
            format!("{directory}/")
        };
        self.entries
            .range(prefix.clone()..)
            .take_while(move |(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| !utils::is_root(path))
            .map(|(path, node)| (path.as_str(), node))
    }

    /// Removes `directory` and its whole subtree; the root is cleared and put back.
    fn remove_subtree(&mut self, directory: &str) -> usize {
        if utils::is_root(directory) {
            let removed = self.entries.len() - 1;
            self.entries.clear();
            self.entries.insert(utils::ROOT.to_string(), Node::Directory);
            return removed;
        }

        let doomed: Vec<String> = self
            .subtree(directory)
            .map(|(path, _)| path.to_string())
            .collect();
        for path in &doomed {
            self.entries.remove(path);
        }
        self.entries.remove(directory);
        doomed.len() + 1
    }

    /// Stores new contents and recomputes everything derived from them.
    fn fill(
        guesser: &dyn MimeGuesser,
        path: &str,
        file: &mut FileNode,
        contents: &[u8],
        options: &WriteOptions,
    ) {
        file.contents = contents.to_vec();
        file.mimetype = guesser.guess(path, &file.contents);
        file.timestamp = options
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp());
        if let Some(visibility) = options.visibility {
            file.visibility = visibility;
        }
    }

    fn try_create_dir(&mut self, path: &str) -> StoreResult<Metadata> {
        match self.entries.get(path) {
            Some(Node::Directory) => return Ok(Self::dir_metadata(path)),
            Some(Node::File(_)) => return Err(StoreError::wrong_kind(path, NodeKind::Directory)),
            None => {}
        }
        self.check_ancestors(path)?;

        self.materialize_ancestors(path);
        self.entries.insert(path.to_string(), Node::Directory);
        debug!(path, "directory created");
        Ok(Self::dir_metadata(path))
    }

    fn try_write(
        &mut self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<FileMetadata> {
        if self.has(path) {
            return Err(StoreError::conflict(path));
        }
        self.check_ancestors(path)?;

        let mut file = FileNode {
            contents: Vec::new(),
            timestamp: 0,
            visibility: Visibility::Public,
            mimetype: String::new(),
        };
        Self::fill(&*self.guesser, path, &mut file, contents, options);
        let metadata = FileMetadata::new(path, &file);

        self.materialize_ancestors(path);
        self.entries.insert(path.to_string(), Node::File(file));
        debug!(path, size = metadata.size, "file written");
        Ok(metadata)
    }

    fn try_update(
        &mut self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<FileMetadata> {
        let file = self
            .entries
            .get_mut(path)
            .ok_or_else(|| StoreError::not_found(path))?
            .as_file_mut()
            .ok_or_else(|| StoreError::wrong_kind(path, NodeKind::File))?;
        Self::fill(&*self.guesser, path, file, contents, options);
        debug!(path, size = file.size(), "file updated");
        Ok(FileMetadata::new(path, file))
    }

    fn try_copy(&mut self, path: &str, newpath: &str) -> StoreResult<()> {
        let kind = self.node(path)?.kind();
        if path == newpath {
            return Ok(());
        }
        if let Some(target) = self.entries.get(newpath) {
            if target.kind() != kind {
                return Err(StoreError::conflict(newpath));
            }
        }
        self.check_ancestors(newpath)?;

        let node = self.node(path)?.clone();
        self.materialize_ancestors(newpath);
        self.entries.insert(newpath.to_string(), node);
        debug!(from = path, to = newpath, "node copied");
        Ok(())
    }

    fn try_rename(&mut self, path: &str, newpath: &str) -> StoreResult<()> {
        let kind = self.node(path)?.kind();
        if path == newpath {
            return Ok(());
        }
        if kind == NodeKind::Directory
            && (utils::is_root(path) || utils::is_in_directory(newpath, path))
        {
            return Err(StoreError::conflict(newpath));
        }

        self.try_copy(path, newpath)?;
        match kind {
            NodeKind::File => {
                self.entries.remove(path);
            }
            NodeKind::Directory => {
                self.remove_subtree(path);
            }
        }
        debug!(from = path, to = newpath, "node renamed");
        Ok(())
    }

    fn dir_metadata(path: &str) -> Metadata {
        Metadata {
            path: path.to_string(),
            kind: NodeKind::Directory,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl StorageBackend for MemoryStore {
    /// `true` if a node of either kind exists at `path`.
    fn has(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    fn has_file(&self, path: &str) -> bool {
        self.entries.get(path).is_some_and(Node::is_file)
    }

    fn has_directory(&self, path: &str) -> bool {
        self.entries.get(path).is_some_and(Node::is_dir)
    }

    /// Creates the directory `path` and any missing ancestors.
    ///
    /// Idempotent: an existing directory is returned as is. Fails with `WrongKind` if `path`
    /// is a file and with `AncestorBlocked` if one of its ancestors is.
    fn create_dir(&mut self, path: &str) -> StoreResult<Metadata> {
        self.try_create_dir(path)
            .inspect_err(|err| trace!(path, %err, "create_dir rejected"))
    }

    /// Creates a new file, plus any missing ancestor directories.
    ///
    /// The file is public and stamped with the current time unless `options` say otherwise.
    /// Fails with `Conflict` if anything already exists at `path` (use `update()` to
    /// replace contents) and with `AncestorBlocked` if an ancestor is a file.
    fn write(
        &mut self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<FileMetadata> {
        self.try_write(path, contents, options)
            .inspect_err(|err| trace!(path, %err, "write rejected"))
    }

    /// Replaces the contents of an existing file.
    ///
    /// Size and mimetype are recomputed, the timestamp becomes "now" (or
    /// `options.timestamp`), and `options.visibility` is applied when set.
    fn update(
        &mut self,
        path: &str,
        contents: &[u8],
        options: &WriteOptions,
    ) -> StoreResult<FileMetadata> {
        self.try_update(path, contents, options)
            .inspect_err(|err| trace!(path, %err, "update rejected"))
    }

    /// Removes the file at `path`. Directories are removed with `delete_dir()`.
    fn delete(&mut self, path: &str) -> StoreResult<()> {
        self.file(path)
            .map(|_| ())
            .inspect_err(|err| trace!(path, %err, "delete rejected"))?;
        self.entries.remove(path);
        debug!(path, "file deleted");
        Ok(())
    }

    /// Removes the directory `path` together with everything below it.
    ///
    /// `delete_dir("")` empties the store; the root directory itself stays.
    fn delete_dir(&mut self, path: &str) -> StoreResult<()> {
        self.ensure_dir(path)
            .inspect_err(|err| trace!(path, %err, "delete_dir rejected"))?;
        let removed = self.remove_subtree(path);
        debug!(path, removed, "directory deleted");
        Ok(())
    }

    /// Duplicates the node at `path` under `newpath`, creating missing ancestors.
    ///
    /// Only that one node is copied: the descendants of a directory are not. A file may
    /// overwrite a file; replacing a node of the other kind is a `Conflict`.
    fn copy(&mut self, path: &str, newpath: &str) -> StoreResult<()> {
        self.try_copy(path, newpath)
            .inspect_err(|err| trace!(path, newpath, %err, "copy rejected"))
    }

    /// `copy()` followed by removal of the source. A failed copy leaves the source intact.
    ///
    /// Like `copy()`, renaming a directory moves only the directory node; its former
    /// contents are deleted with it. Moving a directory into itself, or moving the root, is
    /// a `Conflict`.
    fn rename(&mut self, path: &str, newpath: &str) -> StoreResult<()> {
        self.try_rename(path, newpath)
            .inspect_err(|err| trace!(path, newpath, %err, "rename rejected"))
    }

    fn set_visibility(&mut self, path: &str, visibility: Visibility) -> StoreResult<Visibility> {
        let file = self
            .file_mut(path)
            .inspect_err(|err| trace!(path, %err, "set_visibility rejected"))?;
        file.visibility = visibility;
        debug!(path, %visibility, "visibility changed");
        Ok(visibility)
    }

    /// Overrides the timestamp of a file without touching its contents.
    fn set_timestamp(&mut self, path: &str, timestamp: i64) -> StoreResult<i64> {
        let file = self
            .file_mut(path)
            .inspect_err(|err| trace!(path, %err, "set_timestamp rejected"))?;
        file.timestamp = timestamp;
        debug!(path, timestamp, "timestamp changed");
        Ok(timestamp)
    }

    fn read(&self, path: &str) -> StoreResult<FileContents> {
        let file = self.file(path)?;
        Ok(FileContents {
            path: path.to_string(),
            contents: file.contents.clone(),
        })
    }

    /// `{type, path}` for a node of either kind.
    fn get_metadata(&self, path: &str) -> StoreResult<Metadata> {
        let node = self.node(path)?;
        Ok(Metadata {
            path: path.to_string(),
            kind: node.kind(),
        })
    }

    fn get_size(&self, path: &str) -> StoreResult<u64> {
        Ok(self.file(path)?.size())
    }

    fn get_timestamp(&self, path: &str) -> StoreResult<i64> {
        Ok(self.file(path)?.timestamp)
    }

    fn get_visibility(&self, path: &str) -> StoreResult<Visibility> {
        Ok(self.file(path)?.visibility)
    }

    fn get_mimetype(&self, path: &str) -> StoreResult<String> {
        Ok(self.file(path)?.mimetype.clone())
    }

    /// Lists what is inside `directory`.
    ///
    /// Non-recursive listings hold the direct children only; recursive ones hold the whole
    /// subtree. `directory` itself is never listed. Entries come in lexicographic path order.
    /// A missing path or a file yields an empty list.
    fn list_contents(&self, directory: &str, recursive: bool) -> Vec<Metadata> {
        if !self.has_directory(directory) {
            return Vec::new();
        }
        self.subtree(directory)
            .filter(|(path, _)| recursive || utils::is_direct_child(path, directory))
            .map(|(path, node)| Metadata {
                path: path.to_string(),
                kind: node.kind(),
            })
            .collect()
    }
}
