//! Line-oriented record output.

use crate::config::OutputFormat;
use crate::error::{InventoryError, Result};
use crate::models::FileRecord;
use std::io::{BufWriter, Write};

pub enum RecordWriter<W: Write> {
    /// `path, mimetype, mimetype_verbose, size, ctime, hash, metadata_json`
    Csv(csv::Writer<W>),
    Jsonl(BufWriter<W>),
}

impl<W: Write> RecordWriter<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        match format {
            OutputFormat::Csv => RecordWriter::Csv(
                csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(out),
            ),
            OutputFormat::Jsonl => RecordWriter::Jsonl(BufWriter::new(out)),
        }
    }

    pub fn write(&mut self, record: &FileRecord) -> Result<()> {
        match self {
            RecordWriter::Csv(w) => {
                let size = record.size.to_string();
                let ctime = record.ctime.to_string();
                let metadata = record.metadata_json();
                w.write_record([
                    record.path.as_str(),
                    record.mimetype.as_deref().unwrap_or(""),
                    record.mimetype_verbose.as_deref().unwrap_or(""),
                    size.as_str(),
                    ctime.as_str(),
                    record.hash.as_str(),
                    metadata.as_str(),
                ])?;
                Ok(())
            }
            RecordWriter::Jsonl(w) => {
                serde_json::to_writer(&mut *w, record)?;
                w.write_all(b"\n").map_err(InventoryError::Emit)
            }
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        let res = match self {
            RecordWriter::Csv(w) => w.flush(),
            RecordWriter::Jsonl(w) => w.flush(),
        };
        res.map_err(InventoryError::Emit)
    }
}
