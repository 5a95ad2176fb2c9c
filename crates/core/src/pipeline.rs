use crate::builder::RecordBuilder;
use crate::config::{InventoryConfig, OnError};
use crate::emitter::RecordWriter;
use crate::scanner::{self, ScanOptions};
use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub files: usize,
    pub failed: usize,
    pub bytes: u64,
}

pub fn record_builder(config: &InventoryConfig) -> RecordBuilder {
    RecordBuilder::new(config.scan.block_size, config.hash.algorithm)
}

pub fn scan_options(config: &InventoryConfig) -> ScanOptions {
    ScanOptions {
        root: PathBuf::from(&config.scan.root),
        excludes: config.scan.exclude.clone(),
        include_hidden: config.scan.include_hidden,
        follow_links: config.scan.follow_links,
    }
}

/// Walk the configured root and write one record per file to `out`.
pub async fn run<W: Write>(config: &InventoryConfig, out: W) -> anyhow::Result<ScanSummary> {
    config.validate()?;
    let options = scan_options(config);
    info!(
        "Starting scan of {} ({:?}, {} byte blocks)...",
        options.root.display(),
        config.hash.algorithm,
        config.scan.block_size
    );

    let (walker, mut rx) = scanner::spawn_scan(options, record_builder(config))?;
    let mut writer = RecordWriter::new(config.output.format, out);
    let mut summary = ScanSummary::default();

    while let Some(outcome) = rx.recv().await {
        match outcome {
            Ok(record) => {
                writer
                    .write(&record)
                    .with_context(|| format!("Failed to emit record for {}", record.path))?;
                summary.files += 1;
                summary.bytes += record.size;
            }
            Err(e) => {
                summary.failed += 1;
                match config.scan.on_error {
                    OnError::Skip => {
                        warn!("skipping: {}", e);
                    }
                    OnError::Abort => {
                        drop(rx);
                        writer.flush()?;
                        walker.await?;
                        return Err(anyhow::Error::new(e).context("scan aborted"));
                    }
                }
            }
        }
    }

    walker.await?;
    writer.flush()?;
    info!(
        "Scan complete. {} files, {} failed, {} bytes.",
        summary.files, summary.failed, summary.bytes
    );
    Ok(summary)
}
