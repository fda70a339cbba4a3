use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Parse a comma-separated exclude string into lowercase keywords.
pub fn parse_exclude_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}

/// A path is excluded when its full textual form contains any keyword,
/// case-insensitively. Applied during descent so the whole subtree is
/// pruned, never as a post-filter.
pub fn is_excluded(path: &Path, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return false;
    }
    let haystack = path.to_string_lossy().to_lowercase();
    keywords.iter().any(|kw| haystack.contains(kw))
}

/// One directory level, split into files and subdirectories, each sorted by
/// name. Sorting before traversal is what makes repeated plans over an
/// unchanged tree identical.
#[derive(Debug, Default)]
pub struct DirListing {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
}

impl DirListing {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }

    /// All entries interleaved in name order.
    pub fn entries(&self) -> Vec<PathBuf> {
        let mut all: Vec<PathBuf> = self
            .files
            .iter()
            .chain(self.dirs.iter())
            .cloned()
            .collect();
        all.sort_by_key(|p| p.file_name().map(std::ffi::OsStr::to_os_string));
        all
    }
}

/// List one directory level, pruning excluded entries.
pub fn list_dir(dir: &Path, keywords: &[String]) -> Result<DirListing> {
    let mut listing = DirListing::default();
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if is_excluded(&path, keywords) {
            continue;
        }
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", path.display()))?;
        if file_type.is_dir() {
            listing.dirs.push(path);
        } else {
            listing.files.push(path);
        }
    }
    listing
        .files
        .sort_by_key(|p| p.file_name().map(std::ffi::OsStr::to_os_string));
    listing
        .dirs
        .sort_by_key(|p| p.file_name().map(std::ffi::OsStr::to_os_string));
    Ok(listing)
}

/// The entry's bare name as UTF-8, lossily.
pub fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
