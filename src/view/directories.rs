use serde::Serialize;

use crate::error::BackendError;
use crate::services::git::{FileStatus, WorkingTreeStatus};

pub const NO_CHANGES: &str = "no changes";
pub const STATUS_UNAVAILABLE: &str = "status unavailable";

/// One candidate git directory offered by the directory browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub full_path: String,
    /// Path relative to the common root of the listing.
    pub directory: String,
    pub branch: String,
    pub ahead: u32,
    pub is_ahead: bool,
    pub behind: u32,
    pub is_behind: bool,
    /// e.g. "2 new, 1 modified"
    pub status: String,
    pub error: Option<String>,
}

impl DirectoryEntry {
    pub fn new(full_path: &str, root: &str) -> Self {
        Self {
            full_path: full_path.to_string(),
            directory: relative_name(full_path, root),
            branch: String::new(),
            ahead: 0,
            is_ahead: false,
            behind: 0,
            is_behind: false,
            status: String::new(),
            error: None,
        }
    }

    pub fn apply_status(&mut self, status: &WorkingTreeStatus) {
        self.branch = status.branch.clone().unwrap_or_default();
        self.ahead = status.ahead;
        self.is_ahead = status.ahead > 0;
        self.behind = status.behind;
        self.is_behind = status.behind > 0;
        self.status = ChangeCounts::from_files(status.files.values()).summary();
        self.error = None;
    }

    /// Leaves branch and counters as they were and flags the entry.
    pub fn mark_failed(&mut self, error: &BackendError) {
        self.status = STATUS_UNAVAILABLE.to_string();
        self.error = Some(error.to_string());
    }
}

/// Files per change category. Each file lands in exactly one category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChangeCounts {
    pub conflicted: usize,
    pub new: usize,
    pub removed: usize,
    pub renamed: usize,
    pub staged: usize,
    pub modified: usize,
}

impl ChangeCounts {
    pub fn from_files<'a>(files: impl IntoIterator<Item = &'a FileStatus>) -> Self {
        let mut counts = Self::default();
        for file in files {
            // precedence: conflicted > new > removed > renamed > staged > modified
            if file.conflict {
                counts.conflicted += 1;
            } else if file.is_new {
                counts.new += 1;
            } else if file.removed {
                counts.removed += 1;
            } else if file.renamed {
                counts.renamed += 1;
            } else if file.staged {
                counts.staged += 1;
            } else {
                counts.modified += 1;
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.conflicted + self.new + self.removed + self.renamed + self.staged + self.modified
    }

    pub fn summary(&self) -> String {
        if self.total() == 0 {
            return NO_CHANGES.to_string();
        }
        [
            (self.conflicted, "conflicted"),
            (self.new, "new"),
            (self.removed, "removed"),
            (self.renamed, "renamed"),
            (self.staged, "staged"),
            (self.modified, "modified"),
        ]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, label)| format!("{n} {label}"))
        .collect::<Vec<_>>()
        .join(", ")
    }
}

pub fn relative_name(full_path: &str, root: &str) -> String {
    let prefix = format!("{}/", root.trim_end_matches('/'));
    full_path
        .strip_prefix(prefix.as_str())
        .filter(|rest| !rest.is_empty())
        .unwrap_or(full_path)
        .to_string()
}

/// Merges a `/fs/listDirectories` result into `entries`.
///
/// The first listed path is the common root and never becomes an entry.
/// Known paths keep their existing entry. Returns the number added.
pub fn merge_listing(entries: &mut Vec<DirectoryEntry>, listing: &[String]) -> usize {
    let Some((root, candidates)) = listing.split_first() else {
        return 0;
    };
    let mut added = 0;
    for full_path in candidates {
        if entries.iter().any(|e| &e.full_path == full_path) {
            continue;
        }
        entries.push(DirectoryEntry::new(full_path, root));
        added += 1;
    }
    added
}
