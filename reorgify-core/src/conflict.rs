use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How to handle a planned move whose destination already exists. Applied
/// independently for file and directory destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Rename for files, recursive merge for directories.
    Auto,
    Skip,
    Overwrite,
    Rename,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self::Auto
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Auto => "auto",
            Self::Skip => "skip",
            Self::Overwrite => "overwrite",
            Self::Rename => "rename",
        };
        f.write_str(label)
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "skip" => Ok(Self::Skip),
            "overwrite" => Ok(Self::Overwrite),
            "rename" => Ok(Self::Rename),
            other => Err(format!("unknown conflict policy: {other}")),
        }
    }
}

/// The effective destination decision for one planned move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Destination is free; proceed as planned.
    Proceed,
    /// Operation abandoned; outcome is a skip, not an error.
    Skip,
    /// Destination exists and is replaced (delete then move).
    Replace,
    /// Directory onto directory: merge recursively, then remove the
    /// emptied source root.
    Merge,
    /// Move to a numbered free name instead.
    Renamed(PathBuf),
}

/// Decide the effective destination for `src -> dst`.
///
/// Reads the current filesystem state; deterministic for a given state.
/// Directory/directory collisions are governed by `dir_policy`, everything
/// else by `file_policy`.
pub fn resolve(
    src: &Path,
    dst: &Path,
    file_policy: ConflictPolicy,
    dir_policy: ConflictPolicy,
) -> Resolution {
    if !dst.exists() {
        return Resolution::Proceed;
    }
    let dir_collision = dst.is_dir() && src.is_dir();
    let policy = if dir_collision { dir_policy } else { file_policy };
    match policy {
        ConflictPolicy::Skip => Resolution::Skip,
        ConflictPolicy::Rename => Resolution::Renamed(free_name(dst)),
        ConflictPolicy::Overwrite => {
            if dir_collision {
                Resolution::Merge
            } else {
                Resolution::Replace
            }
        },
        ConflictPolicy::Auto => {
            if dir_collision {
                Resolution::Merge
            } else {
                Resolution::Renamed(free_name(dst))
            }
        },
    }
}

/// First free `name_1`, `name_2`, ... sibling of `dst`, preserving the
/// extension.
pub fn free_name(dst: &Path) -> PathBuf {
    let parent = dst.parent().unwrap_or_else(|| Path::new(""));
    let stem = dst
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = dst.extension().map(|e| e.to_string_lossy().into_owned());

    for n in 1u32.. {
        let candidate_name = match &ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        let candidate = parent.join(candidate_name);
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!("ran out of numeric suffixes")
}
