//! Core library: content sniffing, hashing, tag extraction, record building and tree walking.

pub mod builder;
pub mod config;
pub mod emitter;
pub mod error;
pub mod extractor;
pub mod hasher;
pub mod models;
pub mod pipeline;
pub mod scanner;
pub mod sniffer;

pub use builder::RecordBuilder;
pub use error::InventoryError;
pub use models::FileRecord;
