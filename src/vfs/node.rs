use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "file")]
    File,
    #[serde(rename = "dir")]
    Directory,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => f.write_str("file"),
            NodeKind::Directory => f.write_str("directory"),
        }
    }
}

/// Two-valued label attached to files. It is stored and reported, never enforced.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown visibility: {0:?} (expected \"public\" or \"private\")")]
pub struct ParseVisibilityError(String);

impl FromStr for Visibility {
    type Err = ParseVisibilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            other => Err(ParseVisibilityError(other.to_string())),
        }
    }
}

/// Attributes of a stored file. `size` is always the length of `contents`.
#[derive(Debug, Clone, PartialEq)]
pub struct FileNode {
    pub(crate) contents: Vec<u8>,
    pub(crate) timestamp: i64,
    pub(crate) visibility: Visibility,
    pub(crate) mimetype: String,
}

impl FileNode {
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn mimetype(&self) -> &str {
        &self.mimetype
    }
}

/// The unit of storage, keyed by its full path in the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Directory,
    File(FileNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Directory => NodeKind::Directory,
            Node::File(_) => NodeKind::File,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory)
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory => None,
        }
    }

    pub(crate) fn as_file_mut(&mut self) -> Option<&mut FileNode> {
        match self {
            Node::File(file) => Some(file),
            Node::Directory => None,
        }
    }
}

/// `{type, path}` pair reported by `get_metadata()` and `list_contents()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

impl Metadata {
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Everything known about a file except its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    pub path: String,
    pub size: u64,
    pub timestamp: i64,
    pub visibility: Visibility,
    pub mimetype: String,
}

impl FileMetadata {
    pub(crate) fn new(path: &str, file: &FileNode) -> Self {
        Self {
            path: path.to_string(),
            size: file.size(),
            timestamp: file.timestamp,
            visibility: file.visibility,
            mimetype: file.mimetype.clone(),
        }
    }
}

/// Result of `read()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    pub path: String,
    pub contents: Vec<u8>,
}
