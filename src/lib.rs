//! An in-memory path store with file and directory semantics.
//! Works as a fast, deterministic stand-in for a real storage backend: ideal for tests and
//! for caching layers that want filesystem-like behaviour without touching the disk.
//!
//! ### Overview
//!
//! `memstore-kit` keeps a flat map from slash-separated paths to nodes (directories or files
//! with metadata) and enforces the rules that make that map behave like a tree.
//! It defines the `StorageBackend` trait and implements it with `MemoryStore` (single owner)
//! and `SharedStore` (one lock, many handles).
//!
//! **Key ideas**:
//! - **Flat storage**: directory membership is a path prefix, not a pointer; subtree deletes and
//!   listings are ordered range scans.
//! - **Tree rules**: files never have children, missing parents are created on write, and a
//!   file in the way of a parent chain makes the write fail.
//! - **Typed failures**: every operation returns a `StoreError` naming what went wrong instead
//!   of a bare `false`.
//! - **Seeding**: `MemoryStore::from_path()` copies a host directory into memory; any
//!   `SourceTree` implementation can be used instead.
//! - **Determinism**: listings are returned in lexicographic path order.
//!
//! ### Example
//!
//! ```
//! use memstore_kit::{MemoryStore, StorageBackend, Visibility, WriteOptions};
//!
//! let mut store = MemoryStore::new();
//! store.write("docs/note.txt", b"Hello", &WriteOptions::default()).unwrap();
//! store.set_visibility("docs/note.txt", Visibility::Private).unwrap();
//!
//! let listed: Vec<_> = store.list_contents("", true).into_iter().map(|m| m.path).collect();
//! assert_eq!(listed, ["docs", "docs/note.txt"]);
//!
//! store.delete_dir("docs").unwrap();
//! assert!(!store.has("docs/note.txt"));
//! ```

mod backend;
mod error;
mod mime;
mod options;
mod vfs;

pub use backend::{Result, StorageBackend, utils};
pub use error::{StoreError, StoreResult};
pub use mime::{DefaultMimeGuesser, MimeGuesser};
pub use options::WriteOptions;
pub use vfs::{
    DirSource, FileContents, FileMetadata, FileNode, Metadata, MemoryStore, Node, NodeKind,
    ParseVisibilityError, SharedStore, SourceEntry, SourceTree, Visibility,
};
