//! Incremental content hashing, one accumulator per file.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Matches the ETag of single-part S3 uploads.
    #[default]
    Md5,
    Blake3,
}

impl From<&str> for HashAlgorithm {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "blake3" => HashAlgorithm::Blake3,
            _ => HashAlgorithm::Md5,
        }
    }
}

/// Digest state for a single file.
///
/// `finalize` takes `self`, so an accumulator can never leak state into the
/// next file's hash.
pub enum Accumulator {
    Md5(md5::Context),
    Blake3(Box<blake3::Hasher>),
}

impl Accumulator {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Md5 => Accumulator::Md5(md5::Context::new()),
            HashAlgorithm::Blake3 => Accumulator::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    pub fn update(&mut self, buf: &[u8]) {
        match self {
            Accumulator::Md5(ctx) => ctx.consume(buf),
            Accumulator::Blake3(hasher) => {
                hasher.update(buf);
            }
        }
    }

    /// Lowercase hex digest of everything passed to `update`.
    pub fn finalize(self) -> String {
        match self {
            Accumulator::Md5(ctx) => format!("{:x}", ctx.compute()),
            Accumulator::Blake3(hasher) => hasher.finalize().to_hex().to_string(),
        }
    }
}
