use crate::extractor::Metadata;
use serde::Serialize;

/// One inventory row. Built once per file and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    /// Relative to the walk root, `/`-separated.
    pub path: String,
    pub mimetype: Option<String>,
    pub mimetype_verbose: Option<String>,
    pub size: u64,
    /// Seconds since the Unix epoch.
    pub ctime: f64,
    pub hash: String,
    pub metadata: Metadata,
}

impl FileRecord {
    /// Serialized `metadata` column, `{}` when nothing was extracted.
    pub fn metadata_json(&self) -> String {
        serde_json::to_string(&self.metadata).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Fields derived from the byte stream alone, before any stat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSummary {
    pub mimetype: Option<String>,
    pub mimetype_verbose: Option<String>,
    pub hash: String,
    pub metadata: Metadata,
    pub bytes_read: u64,
}
