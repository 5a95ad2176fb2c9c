use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inventory_core::config::{self, InventoryConfig, OnError, OutputFormat};
use inventory_core::hasher::HashAlgorithm;
use inventory_core::pipeline;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan(args) => run_scan(cfg, args).await,
        Commands::Inspect {
            file,
            hash,
            block_size,
        } => run_inspect(cfg, file, hash, block_size),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries records
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(Parser)]
#[command(name = "file-inventory")]
#[command(about = "Hash, type and tag every file under a directory", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk a directory and emit one record per file
    Scan(ScanArgs),
    /// Print the record for a single file as JSON
    Inspect {
        file: PathBuf,
        /// Hash algorithm: md5|blake3
        #[arg(long, value_parser = ["md5", "blake3"])]
        hash: Option<String>,
        /// Read size in bytes
        #[arg(long)]
        block_size: Option<usize>,
    },
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Directory to walk (defaults to scan.root, then ".")
    root: Option<String>,
    /// Output format: csv|jsonl
    #[arg(long, value_parser = ["csv", "jsonl"])]
    format: Option<String>,
    /// Write records here instead of stdout
    #[arg(short, long)]
    output: Option<String>,
    /// Hash algorithm: md5|blake3
    #[arg(long, value_parser = ["md5", "blake3"])]
    hash: Option<String>,
    /// Read size in bytes
    #[arg(long)]
    block_size: Option<usize>,
    /// Glob of paths to skip, relative to the root (repeatable)
    #[arg(long)]
    exclude: Vec<String>,
    /// Skip dotfiles and dot-directories
    #[arg(long, default_value_t = false)]
    skip_hidden: bool,
    /// Follow symbolic links
    #[arg(long, default_value_t = false)]
    follow_links: bool,
    /// Stop at the first unreadable file
    #[arg(long, default_value_t = false)]
    fail_fast: bool,
    /// Print a JSON summary to stderr when done
    #[arg(long, default_value_t = false)]
    summary: bool,
}

fn apply_overrides(cfg: &mut InventoryConfig, args: &ScanArgs) {
    if let Some(root) = &args.root {
        cfg.scan.root = root.clone();
    }
    if let Some(format) = &args.format {
        cfg.output.format = OutputFormat::from(format.as_str());
    }
    if let Some(output) = &args.output {
        cfg.output.path = Some(output.clone());
    }
    if let Some(hash) = &args.hash {
        cfg.hash.algorithm = HashAlgorithm::from(hash.as_str());
    }
    if let Some(block_size) = args.block_size {
        cfg.scan.block_size = block_size;
    }
    cfg.scan.exclude.extend(args.exclude.iter().cloned());
    if args.skip_hidden {
        cfg.scan.include_hidden = false;
    }
    cfg.scan.follow_links |= args.follow_links;
    if args.fail_fast {
        cfg.scan.on_error = OnError::Abort;
    }
}

async fn run_scan(mut cfg: InventoryConfig, args: ScanArgs) -> Result<()> {
    apply_overrides(&mut cfg, &args);
    cfg.validate()?;

    let out: Box<dyn Write> = match &cfg.output.path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let summary = pipeline::run(&cfg, out).await?;
    if args.summary {
        eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn run_inspect(
    mut cfg: InventoryConfig,
    file: PathBuf,
    hash: Option<String>,
    block_size: Option<usize>,
) -> Result<()> {
    if let Some(hash) = hash {
        cfg.hash.algorithm = HashAlgorithm::from(hash.as_str());
    }
    if let Some(block_size) = block_size {
        cfg.scan.block_size = block_size;
    }
    cfg.validate()?;

    let root = file
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let record = pipeline::record_builder(&cfg)
        .build(&root, &file)
        .with_context(|| format!("Failed to inspect {}", file.display()))?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
