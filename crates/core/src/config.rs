use crate::builder::DEFAULT_BLOCK_SIZE;
use crate::error::InventoryError;
use crate::hasher::HashAlgorithm;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub scan: ScanConfig,
    pub hash: HashConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub root: String,
    pub exclude: Vec<String>,
    pub include_hidden: bool,
    pub follow_links: bool,
    pub block_size: usize,
    pub on_error: OnError,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            exclude: Vec::new(),
            include_hidden: true,
            follow_links: false,
            block_size: DEFAULT_BLOCK_SIZE,
            on_error: OnError::default(),
        }
    }
}

/// What the walk does when a single file cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    #[default]
    Skip,
    Abort,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig {
    pub algorithm: HashAlgorithm,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Stdout when unset.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Jsonl,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "jsonl" | "json" => OutputFormat::Jsonl,
            _ => OutputFormat::Csv,
        }
    }
}

impl InventoryConfig {
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.scan.block_size == 0 {
            return Err(InventoryError::Config(
                "scan.block_size must be greater than zero".to_string(),
            ));
        }
        for pat in &self.scan.exclude {
            globset::Glob::new(pat)?;
        }
        Ok(())
    }
}

/// Layered load: optional file, then `INVENTORY__SECTION__KEY` variables.
pub fn load(path: Option<&str>) -> anyhow::Result<InventoryConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("INVENTORY")
            .prefix_separator("__")
            .separator("__"),
    );
    let cfg: InventoryConfig = settings.build()?.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}
