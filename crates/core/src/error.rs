use std::path::PathBuf;
use thiserror::Error;

/// Failures that cross the record-builder boundary.
///
/// Sniffing and tag parsing never produce one of these; they degrade to
/// absent fields instead.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read failed for {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("failed to write csv row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write record: {0}")]
    Emit(#[source] std::io::Error),
}

impl InventoryError {
    /// Path of the file the error concerns, when there is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            InventoryError::Open { path, .. }
            | InventoryError::Read { path, .. }
            | InventoryError::Stat { path, .. } => Some(path),
            InventoryError::Walk(e) => e.path(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
