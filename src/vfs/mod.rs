mod dir_source;
mod memory_store;
mod node;
mod shared_store;

pub use dir_source::{DirSource, SourceEntry, SourceTree};
pub use memory_store::MemoryStore;
pub use node::{
    FileContents, FileMetadata, FileNode, Metadata, Node, NodeKind, ParseVisibilityError,
    Visibility,
};
pub use shared_store::SharedStore;
