/// Index of a directory in the tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirId(pub(crate) usize);

/// Index of a file in the tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) usize);

#[derive(Debug, Clone)]
pub struct DirNode {
    pub name: String,
    pub path: String,
    /// `None` only for the root
    pub parent: Option<DirId>,
    pub subdirs: Vec<DirId>,
    pub files: Vec<FileId>,
}

impl DirNode {
    pub(crate) fn new(name: String, path: String, parent: Option<DirId>) -> Self {
        Self {
            name,
            path,
            parent,
            subdirs: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subdirs.is_empty() && self.files.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FileNode {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub parent: DirId,
}

/// Join a child name onto a directory path without doubling the root slash.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}
