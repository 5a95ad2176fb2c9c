//! Walks a directory tree and builds one record per regular file.

use crate::builder::RecordBuilder;
use crate::error::{InventoryError, Result};
use crate::models::FileRecord;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    pub excludes: Vec<String>,
    pub include_hidden: bool,
    pub follow_links: bool,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            excludes: Vec::new(),
            include_hidden: true,
            follow_links: false,
        }
    }
}

pub type ScanOutcome = Result<FileRecord>;

/// Regular files under `options.root`, sorted by name within each directory.
///
/// Symlinks that do not resolve to a directory are yielded too, even when
/// links are not followed: the builder stats through them, and a dangling
/// link surfaces as an open error instead of vanishing. Walk errors are
/// yielded in place so the caller decides whether to stop.
pub fn files(options: &ScanOptions) -> Result<impl Iterator<Item = Result<PathBuf>>> {
    let excludes = build_globset(&options.excludes)?;
    let root = options.root.clone();
    let include_hidden = options.include_hidden;

    let iter = WalkDir::new(&options.root)
        .follow_links(options.follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            e.depth() == 0 || should_descend(&root, e.path(), include_hidden, &excludes)
        })
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() => Some(Ok(e.into_path())),
            Ok(e) if e.path_is_symlink() && !e.path().is_dir() => Some(Ok(e.into_path())),
            Ok(_) => None,
            Err(e) => Some(Err(InventoryError::from(e))),
        });
    Ok(iter)
}

/// Walk and build records on a blocking thread, one file at a time.
///
/// Outcomes arrive in walk order. Dropping the receiver stops the walk after
/// the file in progress.
pub fn spawn_scan(
    options: ScanOptions,
    builder: RecordBuilder,
) -> Result<(JoinHandle<()>, mpsc::Receiver<ScanOutcome>)> {
    let (tx, rx) = mpsc::channel(100);
    let walk = files(&options)?;
    let root = options.root;

    let handle = task::spawn_blocking(move || {
        for entry in walk {
            let outcome = entry.and_then(|path| builder.build(&root, &path));
            if tx.blocking_send(outcome).is_err() {
                debug!("receiver dropped, stopping walk");
                break;
            }
        }
    });

    Ok((handle, rx))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat)?);
    }
    Ok(builder.build()?)
}

fn should_descend(root: &Path, path: &Path, include_hidden: bool, excludes: &GlobSet) -> bool {
    if is_excluded(root, path, excludes) {
        return false;
    }
    if !include_hidden && is_hidden(path) {
        return false;
    }
    true
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

// Patterns are matched against the root-relative path.
fn is_excluded(root: &Path, path: &Path, excludes: &GlobSet) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path);
    excludes.is_match(rel)
}
