//! In-memory directory/file hierarchy.
//!
//! [`FileTree`] owns every node in an index-addressed arena. Directories are
//! addressed by their stored path string (exact match, no normalization),
//! files by name within a directory.

pub mod info;
pub mod node;
pub mod tree;

pub use info::{DirInfo, EntryKind, FileEntry, FileInfo, Listing, TreeEntry, TreeView};
pub use node::{join_path, DirId, DirNode, FileId, FileNode};
pub use tree::FileTree;
