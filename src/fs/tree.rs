use crate::config::FsConfig;
use crate::error::{Result, ShellError};
use crate::fs::info::{
    DirDetail, DirInfo, EntryKind, FileDetail, FileEntry, FileInfo, Listing, Timestamps,
    TreeEntry, TreeView,
};
use crate::fs::node::{join_path, DirId, DirNode, FileId, FileNode};

const ROOT_PATH: &str = "/";

/// One directory of a detached subtree copy, used by
/// [`FileTree::duplicate_directory`]. Entries are kept in pre-order, so a
/// parent always precedes its children.
struct SnapshotDir {
    name: String,
    /// Index of the parent entry; `None` for the copied directory itself
    parent: Option<usize>,
    files: Vec<(String, u64)>,
}

/// Pending step of a subtree walk
enum Visit {
    Dir(DirId, usize),
    File(FileId, usize),
}

/// In-memory directory/file hierarchy rooted at `/`.
///
/// Nodes live in two arenas addressed by [`DirId`] and [`FileId`]; every
/// directory keeps its children as ordered id lists and every node records
/// its single parent. Directories are looked up by exact match on their
/// stored path string, in pre-order from the root.
///
/// The tree has no interior locking. Callers sharing it between tasks wrap
/// it in a reader/writer lock: queries take `&self`, mutations `&mut self`.
#[derive(Debug, Clone)]
pub struct FileTree {
    dirs: Vec<Option<DirNode>>,
    files: Vec<Option<FileNode>>,
    free_dirs: Vec<usize>,
    free_files: Vec<usize>,
    root: DirId,
    config: FsConfig,
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new(FsConfig::default())
    }
}

impl FileTree {
    pub fn new(config: FsConfig) -> Self {
        let root = DirNode::new(ROOT_PATH.to_string(), ROOT_PATH.to_string(), None);
        Self {
            dirs: vec![Some(root)],
            files: Vec::new(),
            free_dirs: Vec::new(),
            free_files: Vec::new(),
            root: DirId(0),
            config,
        }
    }

    pub fn config(&self) -> FsConfig {
        self.config
    }

    pub fn root(&self) -> DirId {
        self.root
    }

    pub fn directory(&self, id: DirId) -> Option<&DirNode> {
        self.dirs.get(id.0).and_then(Option::as_ref)
    }

    pub fn file(&self, id: FileId) -> Option<&FileNode> {
        self.files.get(id.0).and_then(Option::as_ref)
    }

    /// Number of live directories, root included
    pub fn directory_count(&self) -> usize {
        self.dirs.iter().filter(|d| d.is_some()).count()
    }

    /// Number of live files
    pub fn file_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_some()).count()
    }

    /// First directory, in pre-order from the root, whose path equals `path`.
    pub fn find_directory(&self, path: &str) -> Option<DirId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(dir) = self.directory(id) else {
                continue;
            };
            if dir.path == path {
                return Some(id);
            }
            stack.extend(dir.subdirs.iter().rev());
        }
        None
    }

    /// File named `name` directly inside the directory at `path`.
    pub fn find_file(&self, path: &str, name: &str) -> Result<&FileNode> {
        let (_, dir) = self.resolve(path)?;
        self.file_in(dir, name)
            .and_then(|(_, id)| self.file(id))
            .ok_or_else(|| ShellError::FileNotFound {
                dir: path.to_string(),
                name: name.to_string(),
            })
    }

    pub fn create_directory(&mut self, parent_path: &str, name: &str) -> Result<String> {
        validate_name(name)?;
        let (parent_id, parent) = self.resolve(parent_path)?;
        let path = join_path(&parent.path, name);
        if self.config.unique_names && self.name_taken(parent, name, None) {
            return Err(ShellError::AlreadyExists(path));
        }

        let id = self.alloc_dir(DirNode::new(name.to_string(), path.clone(), Some(parent_id)));
        if let Some(parent) = self.dir_mut(parent_id) {
            parent.subdirs.push(id);
        }
        tracing::debug!(path = %path, "Directory created");
        Ok(path)
    }

    /// Rename a directory in place and return its new path.
    ///
    /// Unless `cascade_rename` is set, descendants keep the paths they were
    /// created with.
    pub fn rename_directory(&mut self, path: &str, new_name: &str) -> Result<String> {
        validate_name(new_name)?;
        let (id, dir) = self.resolve(path)?;
        let Some(parent_id) = dir.parent else {
            return Err(ShellError::InvalidOperation(
                "cannot rename the root directory".to_string(),
            ));
        };
        let parent = self.dir_ref(parent_id)?;
        let new_path = join_path(&parent.path, new_name);
        if self.config.unique_names && self.name_taken(parent, new_name, Some(id)) {
            return Err(ShellError::AlreadyExists(new_path));
        }

        if let Some(dir) = self.dir_mut(id) {
            dir.name = new_name.to_string();
            dir.path = new_path.clone();
        }
        if self.config.cascade_rename {
            self.repath_descendants(id);
        }
        tracing::debug!(from = %path, to = %new_path, "Directory renamed");
        Ok(new_path)
    }

    /// Delete a directory and everything below it.
    ///
    /// Without `deep_delete` only direct children of `/` can be targeted.
    /// A non-empty directory needs `recursive`.
    pub fn delete_directory(&mut self, path: &str, recursive: bool) -> Result<()> {
        let id = if self.config.deep_delete {
            self.lookup(path)?
        } else {
            self.root_child(path)
                .ok_or_else(|| ShellError::NotFound(path.to_string()))?
        };
        let dir = self.dir_ref(id)?;
        let Some(parent_id) = dir.parent else {
            return Err(ShellError::InvalidOperation(
                "cannot delete the root directory".to_string(),
            ));
        };
        if !recursive && !dir.is_empty() {
            return Err(ShellError::NotEmpty(path.to_string()));
        }

        if let Some(parent) = self.dir_mut(parent_id) {
            parent.subdirs.retain(|&sub| sub != id);
        }
        self.free_subtree(id);
        tracing::debug!(path = %path, recursive, "Directory deleted");
        Ok(())
    }

    pub fn create_file(&mut self, path: &str, name: &str, size: u64) -> Result<String> {
        validate_name(name)?;
        let (dir_id, dir) = self.resolve(path)?;
        let file_path = join_path(&dir.path, name);
        if self.config.unique_names && self.name_taken(dir, name, None) {
            return Err(ShellError::AlreadyExists(file_path));
        }

        let id = self.alloc_file(FileNode {
            name: name.to_string(),
            path: file_path.clone(),
            size,
            parent: dir_id,
        });
        if let Some(dir) = self.dir_mut(dir_id) {
            dir.files.push(id);
        }
        tracing::debug!(path = %file_path, size, "File created");
        Ok(file_path)
    }

    pub fn delete_file(&mut self, path: &str, name: &str) -> Result<()> {
        let (dir_id, dir) = self.resolve(path)?;
        let (index, file_id) = self
            .file_in(dir, name)
            .ok_or_else(|| ShellError::FileNotFound {
                dir: path.to_string(),
                name: name.to_string(),
            })?;

        if let Some(dir) = self.dir_mut(dir_id) {
            dir.files.remove(index);
        }
        self.free_file(file_id);
        tracing::debug!(dir = %path, name, "File deleted");
        Ok(())
    }

    /// Relink a file from one directory into another and return its new path.
    pub fn move_file(&mut self, src_path: &str, name: &str, dest_path: &str) -> Result<String> {
        let (src_id, src) = self.resolve(src_path)?;
        let (index, file_id) = self
            .file_in(src, name)
            .ok_or_else(|| ShellError::FileNotFound {
                dir: src_path.to_string(),
                name: name.to_string(),
            })?;
        let (dest_id, dest) = self.resolve(dest_path)?;
        let new_path = join_path(&dest.path, name);
        if self.config.unique_names && src_id != dest_id && self.name_taken(dest, name, None) {
            return Err(ShellError::AlreadyExists(new_path));
        }

        if let Some(src) = self.dir_mut(src_id) {
            src.files.remove(index);
        }
        if let Some(dest) = self.dir_mut(dest_id) {
            dest.files.push(file_id);
        }
        if let Some(file) = self.file_mut(file_id) {
            file.parent = dest_id;
            file.path = new_path.clone();
        }
        tracing::debug!(from = %src_path, to = %dest_path, name, "File moved");
        Ok(new_path)
    }

    /// Copy a file under a new name in the same directory.
    pub fn duplicate_file(&mut self, path: &str, name: &str, new_name: &str) -> Result<String> {
        let size = self.find_file(path, name)?.size;
        self.create_file(path, new_name, size)
    }

    /// Deep-copy the directory at `src_path` into the directory at `dest_path`.
    ///
    /// The copy keeps the source's name, so it lands at `dest_path/<name>`.
    /// Copying a directory into one of its own descendants copies the
    /// subtree as it was before the call.
    pub fn duplicate_directory(&mut self, src_path: &str, dest_path: &str) -> Result<String> {
        let (src_id, src) = self.resolve(src_path)?;
        if src.parent.is_none() {
            return Err(ShellError::InvalidOperation(
                "cannot duplicate the root directory".to_string(),
            ));
        }
        let (dest_id, dest) = self.resolve(dest_path)?;
        if self.config.unique_names && self.name_taken(dest, &src.name, None) {
            return Err(ShellError::AlreadyExists(join_path(&dest.path, &src.name)));
        }

        let snapshot = self.snapshot(src_id)?;
        let copy = self.materialize(&snapshot, dest_id)?;
        let path = self.dir_ref(copy)?.path.clone();
        tracing::debug!(from = %src_path, to = %path, "Directory duplicated");
        Ok(path)
    }

    /// Every file named `name` in the subtree at `path`, in walk order.
    pub fn search_file(&self, path: &str, name: &str) -> Result<Vec<FileEntry>> {
        let (id, _) = self.resolve(path)?;
        let mut hits = Vec::new();
        self.walk(id, &mut |entry| {
            if entry.kind == EntryKind::File && entry.name == name {
                hits.push(FileEntry {
                    name: entry.name,
                    path: entry.path,
                    size: entry.size.unwrap_or(0),
                });
            }
        });
        Ok(hits)
    }

    pub fn list_directory(&self, path: &str) -> Result<Listing> {
        let (_, dir) = self.resolve(path)?;
        let subdirs = dir
            .subdirs
            .iter()
            .filter_map(|&id| self.directory(id))
            .map(|d| d.name.clone())
            .collect();
        let files = dir
            .files
            .iter()
            .filter_map(|&id| self.file(id))
            .map(|f| FileEntry {
                name: f.name.clone(),
                path: f.path.clone(),
                size: f.size,
            })
            .collect();
        Ok(Listing {
            path: dir.path.clone(),
            subdirs,
            files,
        })
    }

    /// Pre-order walk of the subtree at `path`, directories before files.
    pub fn display_tree(&self, path: &str) -> Result<TreeView> {
        let (id, _) = self.resolve(path)?;
        let mut entries = Vec::new();
        self.walk(id, &mut |entry| entries.push(entry));
        Ok(TreeView { entries })
    }

    pub fn file_info(&self, path: &str, name: &str, detailed: bool) -> Result<FileInfo> {
        let file = self.find_file(path, name)?;
        let detail = detailed.then(|| FileDetail {
            directory: self
                .directory(file.parent)
                .map(|d| d.path.clone())
                .unwrap_or_default(),
            timestamps: Timestamps::default(),
        });
        Ok(FileInfo {
            name: file.name.clone(),
            path: file.path.clone(),
            size: file.size,
            detail,
        })
    }

    pub fn dir_info(&self, path: &str, detailed: bool) -> Result<DirInfo> {
        let (id, dir) = self.resolve(path)?;
        let mut total_files = 0;
        let mut total_subdirs = 0;
        let mut total_size: u64 = 0;
        self.walk(id, &mut |entry| match entry.kind {
            EntryKind::File => {
                total_files += 1;
                // Saturates at u64::MAX
                total_size = total_size.saturating_add(entry.size.unwrap_or(0));
            }
            EntryKind::Directory if entry.depth > 0 => total_subdirs += 1,
            EntryKind::Directory => {}
        });

        let detail = detailed.then(|| DirDetail {
            parent: dir
                .parent
                .and_then(|p| self.directory(p))
                .map(|p| p.path.clone()),
            total_files,
            total_subdirs,
            timestamps: Timestamps::default(),
        });
        Ok(DirInfo {
            name: dir.name.clone(),
            path: dir.path.clone(),
            files: dir.files.len(),
            subdirs: dir.subdirs.len(),
            total_size,
            detail,
        })
    }

    fn lookup(&self, path: &str) -> Result<DirId> {
        self.find_directory(path)
            .ok_or_else(|| ShellError::NotFound(path.to_string()))
    }

    fn resolve(&self, path: &str) -> Result<(DirId, &DirNode)> {
        let id = self.lookup(path)?;
        Ok((id, self.dir_ref(id)?))
    }

    fn dir_ref(&self, id: DirId) -> Result<&DirNode> {
        self.directory(id)
            .ok_or_else(|| ShellError::NotFound(format!("<directory #{}>", id.0)))
    }

    fn dir_mut(&mut self, id: DirId) -> Option<&mut DirNode> {
        self.dirs.get_mut(id.0).and_then(Option::as_mut)
    }

    fn file_mut(&mut self, id: FileId) -> Option<&mut FileNode> {
        self.files.get_mut(id.0).and_then(Option::as_mut)
    }

    fn root_child(&self, path: &str) -> Option<DirId> {
        let root = self.directory(self.root)?;
        root.subdirs
            .iter()
            .copied()
            .find(|&id| self.directory(id).is_some_and(|d| d.path == path))
    }

    /// Position and id of the first file called `name` directly in `dir`.
    fn file_in(&self, dir: &DirNode, name: &str) -> Option<(usize, FileId)> {
        dir.files
            .iter()
            .enumerate()
            .find(|&(_, &id)| self.file(id).is_some_and(|f| f.name == name))
            .map(|(index, &id)| (index, id))
    }

    fn name_taken(&self, dir: &DirNode, name: &str, except: Option<DirId>) -> bool {
        let dir_clash = dir
            .subdirs
            .iter()
            .filter(|&&id| Some(id) != except)
            .any(|&id| self.directory(id).is_some_and(|d| d.name == name));
        dir_clash || self.file_in(dir, name).is_some()
    }

    fn alloc_dir(&mut self, node: DirNode) -> DirId {
        match self.free_dirs.pop() {
            Some(index) => {
                self.dirs[index] = Some(node);
                DirId(index)
            }
            None => {
                self.dirs.push(Some(node));
                DirId(self.dirs.len() - 1)
            }
        }
    }

    fn alloc_file(&mut self, node: FileNode) -> FileId {
        match self.free_files.pop() {
            Some(index) => {
                self.files[index] = Some(node);
                FileId(index)
            }
            None => {
                self.files.push(Some(node));
                FileId(self.files.len() - 1)
            }
        }
    }

    fn free_file(&mut self, id: FileId) {
        if let Some(slot) = self.files.get_mut(id.0) {
            if slot.take().is_some() {
                self.free_files.push(id.0);
            }
        }
    }

    fn free_subtree(&mut self, id: DirId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.dirs.get_mut(current.0).and_then(Option::take) else {
                continue;
            };
            self.free_dirs.push(current.0);
            for file in node.files {
                self.free_file(file);
            }
            stack.extend(node.subdirs);
        }
    }

    /// Recompute the stored path of every node below `id` from its parent.
    fn repath_descendants(&mut self, id: DirId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(dir) = self.directory(current) else {
                continue;
            };
            let base = dir.path.clone();
            let files = dir.files.clone();
            let subdirs = dir.subdirs.clone();

            for file_id in files {
                if let Some(file) = self.file_mut(file_id) {
                    file.path = join_path(&base, &file.name);
                }
            }
            for sub_id in subdirs {
                if let Some(sub) = self.dir_mut(sub_id) {
                    sub.path = join_path(&base, &sub.name);
                }
                stack.push(sub_id);
            }
        }
    }

    /// Flatten the subtree at `id` into pre-order entries.
    fn snapshot(&self, id: DirId) -> Result<Vec<SnapshotDir>> {
        let mut entries = Vec::new();
        let mut stack = vec![(id, None)];
        while let Some((current, parent)) = stack.pop() {
            let dir = self.dir_ref(current)?;
            let files = dir
                .files
                .iter()
                .filter_map(|&f| self.file(f))
                .map(|f| (f.name.clone(), f.size))
                .collect();
            entries.push(SnapshotDir {
                name: dir.name.clone(),
                parent,
                files,
            });
            let index = entries.len() - 1;
            stack.extend(dir.subdirs.iter().rev().map(|&sub| (sub, Some(index))));
        }
        Ok(entries)
    }

    /// Recreate snapshot entries below `dest` and return the copy's root.
    fn materialize(&mut self, entries: &[SnapshotDir], dest: DirId) -> Result<DirId> {
        let mut created: Vec<DirId> = Vec::with_capacity(entries.len());
        for entry in entries {
            let parent = match entry.parent {
                Some(index) => created[index],
                None => dest,
            };
            let path = join_path(&self.dir_ref(parent)?.path, &entry.name);
            let id = self.alloc_dir(DirNode::new(entry.name.clone(), path.clone(), Some(parent)));
            if let Some(parent) = self.dir_mut(parent) {
                parent.subdirs.push(id);
            }

            for (name, size) in &entry.files {
                let file = self.alloc_file(FileNode {
                    name: name.clone(),
                    path: join_path(&path, name),
                    size: *size,
                    parent: id,
                });
                if let Some(dir) = self.dir_mut(id) {
                    dir.files.push(file);
                }
            }
            created.push(id);
        }
        created
            .first()
            .copied()
            .ok_or_else(|| ShellError::InvalidOperation("empty directory snapshot".to_string()))
    }

    /// Visit `id` and its subtree in pre-order, subdirectories before files.
    fn walk(&self, id: DirId, visit: &mut dyn FnMut(TreeEntry)) {
        let mut stack = vec![Visit::Dir(id, 0)];
        while let Some(step) = stack.pop() {
            match step {
                Visit::Dir(current, depth) => {
                    let Some(dir) = self.directory(current) else {
                        continue;
                    };
                    visit(TreeEntry {
                        depth,
                        kind: EntryKind::Directory,
                        name: dir.name.clone(),
                        path: dir.path.clone(),
                        size: None,
                    });
                    // Files go underneath so the whole subdirectory walk pops first
                    stack.extend(dir.files.iter().rev().map(|&f| Visit::File(f, depth + 1)));
                    stack.extend(dir.subdirs.iter().rev().map(|&d| Visit::Dir(d, depth + 1)));
                }
                Visit::File(file, depth) => {
                    let Some(file) = self.file(file) else {
                        continue;
                    };
                    visit(TreeEntry {
                        depth,
                        kind: EntryKind::File,
                        name: file.name.clone(),
                        path: file.path.clone(),
                        size: Some(file.size),
                    });
                }
            }
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(ShellError::InvalidOperation(format!(
            "invalid name '{}': names must be non-empty and contain no '/'",
            name
        )));
    }
    Ok(())
}
