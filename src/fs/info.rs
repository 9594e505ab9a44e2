use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A file as seen from a listing or a search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
    pub size: u64,
}

/// One level of a directory: subdirectories first, then files.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub path: String,
    pub subdirs: Vec<String>,
    pub files: Vec<FileEntry>,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Directory: {}", self.path)?;
        for dir in &self.subdirs {
            write!(f, "\n  Directory: {}", dir)?;
        }
        for file in &self.files {
            write!(f, "\n  File: {} ({} bytes)", file.name, file.size)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// 0 for the directory the walk started from
    pub depth: usize,
    pub kind: EntryKind,
    pub name: String,
    pub path: String,
    pub size: Option<u64>,
}

/// Pre-order walk of a subtree, directories before files at every level.
#[derive(Debug, Clone, Serialize)]
pub struct TreeView {
    pub entries: Vec<TreeEntry>,
}

impl fmt::Display for TreeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let indent = "  ".repeat(entry.depth);
            match entry.kind {
                EntryKind::Directory if entry.depth == 0 => write!(f, "{}", entry.path)?,
                EntryKind::Directory => write!(f, "{}{}/", indent, entry.name)?,
                EntryKind::File => write!(
                    f,
                    "{}{} ({} bytes)",
                    indent,
                    entry.name,
                    entry.size.unwrap_or(0)
                )?,
            }
        }
        Ok(())
    }
}

/// Timestamps are not tracked by the tree; they are always reported as unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timestamps {
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

fn write_timestamp(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    ts: &Option<DateTime<Utc>>,
) -> fmt::Result {
    match ts {
        Some(ts) => write!(f, "\n  {}: {}", label, ts.to_rfc3339()),
        None => write!(f, "\n  {}: unknown", label),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileDetail {
    pub directory: String,
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<FileDetail>,
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "File: {}", self.path)?;
        write!(f, "\n  Name: {}", self.name)?;
        write!(f, "\n  Size: {} bytes", self.size)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  Directory: {}", detail.directory)?;
            write_timestamp(f, "Created", &detail.timestamps.created)?;
            write_timestamp(f, "Modified", &detail.timestamps.modified)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DirDetail {
    pub parent: Option<String>,
    /// Files anywhere below the directory
    pub total_files: usize,
    /// Directories anywhere below the directory
    pub total_subdirs: usize,
    pub timestamps: Timestamps,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirInfo {
    pub name: String,
    pub path: String,
    pub files: usize,
    pub subdirs: usize,
    /// Sum of all file sizes in the subtree
    pub total_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<DirDetail>,
}

impl fmt::Display for DirInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Directory: {}", self.path)?;
        write!(f, "\n  Name: {}", self.name)?;
        write!(f, "\n  Files: {}", self.files)?;
        write!(f, "\n  Subdirectories: {}", self.subdirs)?;
        write!(f, "\n  Total size: {} bytes", self.total_size)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n  Parent: {}", detail.parent.as_deref().unwrap_or("-"))?;
            write!(f, "\n  Total files: {}", detail.total_files)?;
            write!(f, "\n  Total subdirectories: {}", detail.total_subdirs)?;
            write_timestamp(f, "Created", &detail.timestamps.created)?;
            write_timestamp(f, "Modified", &detail.timestamps.modified)?;
        }
        Ok(())
    }
}
