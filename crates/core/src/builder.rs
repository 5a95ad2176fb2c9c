//! Builds one [`FileRecord`] from one file.
//!
//! The file is streamed in fixed-size blocks. Every block goes to the hash
//! accumulator; only the first one is sniffed and searched for tags.

use crate::error::{InventoryError, Result};
use crate::extractor::{self, Metadata};
use crate::hasher::{Accumulator, HashAlgorithm};
use crate::models::{ContentSummary, FileRecord};
use crate::sniffer;
use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Component, Path};
use tracing::debug;

pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct RecordBuilder {
    block_size: usize,
    algorithm: HashAlgorithm,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE, HashAlgorithm::default())
    }
}

impl RecordBuilder {
    /// A zero `block_size` is bumped to one byte.
    pub fn new(block_size: usize, algorithm: HashAlgorithm) -> Self {
        Self {
            block_size: block_size.max(1),
            algorithm,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Build the record for `path`, reporting it relative to `root`.
    pub fn build(&self, root: &Path, path: &Path) -> Result<FileRecord> {
        let content = {
            let file = File::open(path).map_err(|source| InventoryError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            self.build_from_reader(file, path)?
        };

        let meta = fs::metadata(path).map_err(|source| InventoryError::Stat {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(
            path = %path.display(),
            size = meta.len(),
            mime = content.mimetype.as_deref().unwrap_or("-"),
            "built record"
        );

        Ok(FileRecord {
            path: relative_display(root, path),
            mimetype: content.mimetype,
            mimetype_verbose: content.mimetype_verbose,
            size: meta.len(),
            ctime: change_time(&meta),
            hash: content.hash,
            metadata: content.metadata,
        })
    }

    /// Hash, sniff and extract from any byte stream. `path` is only used for
    /// the extension fallback and error reporting.
    pub fn build_from_reader<R: Read>(&self, mut reader: R, path: &Path) -> Result<ContentSummary> {
        let mut accumulator = Accumulator::new(self.algorithm);
        let mut buf = vec![0u8; self.block_size];
        let mut first: Option<(sniffer::Sniffed, Metadata, Option<String>)> = None;
        let mut bytes_read = 0u64;
        let ext_guess = sniffer::guess_from_extension(path);

        loop {
            let n = fill_block(&mut reader, &mut buf).map_err(|source| InventoryError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            if n == 0 {
                break;
            }
            let block = &buf[..n];

            if first.is_none() {
                let sniffed = sniffer::identify(block);
                let mimetype = sniffed.mime.clone().or_else(|| ext_guess.map(str::to_string));
                let metadata = mimetype
                    .as_deref()
                    .map_or(Metadata::None, |m| extractor::extract(block, m));
                first = Some((sniffed, metadata, mimetype));
            }

            accumulator.update(block);
            bytes_read += n as u64;
        }

        let (mimetype, mimetype_verbose, metadata) = match first {
            Some((sniffed, metadata, mimetype)) => (mimetype, Some(sniffed.description), metadata),
            None => {
                let guess = ext_guess.map(str::to_string);
                (guess.clone(), guess, Metadata::None)
            }
        };

        Ok(ContentSummary {
            mimetype,
            mimetype_verbose,
            hash: accumulator.finalize(),
            metadata,
            bytes_read,
        })
    }
}

/// Read until `buf` is full or the stream ends. Returns bytes read.
fn fill_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn relative_display(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned())
    } else {
        parts.join("/")
    }
}

#[cfg(unix)]
fn change_time(meta: &fs::Metadata) -> f64 {
    use std::os::unix::fs::MetadataExt;
    meta.ctime() as f64 + meta.ctime_nsec() as f64 / 1e9
}

#[cfg(not(unix))]
fn change_time(meta: &fs::Metadata) -> f64 {
    meta.created()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
