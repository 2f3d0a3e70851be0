//! confmerge CLI
//!
//! Merges YAML configuration fragments into a single document according to
//! path-pattern merge policies.

use anyhow::{Context, Result};
use clap::Parser;
use confmerge::{MergeOptions, merge_files};
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Merge YAML configuration fragments under a path-pattern policy
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML documents to merge, in order
    #[arg(required = true)]
    files: Vec<String>,

    /// Options file (YAML) providing patterns and defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base directory input files are resolved against
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// Let later documents win on conflicts when no pattern matches
    #[arg(long)]
    default_overwrite: bool,

    /// Pattern forcing overwrite-on-conflict (repeatable)
    #[arg(long = "overwrite", value_name = "PATTERN")]
    overwrite: Vec<String>,

    /// Pattern forcing append-on-conflict (repeatable)
    #[arg(long = "append", value_name = "PATTERN")]
    append: Vec<String>,

    /// Pattern whose string leaves resolve against each source's directory (repeatable)
    #[arg(long = "resolve-path", value_name = "PATTERN")]
    resolve_path: Vec<String>,

    /// Write the merged document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    log: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    // Load options from file, then apply CLI overrides
    let mut options = match &cli.config {
        Some(path) => MergeOptions::from_file(path)?,
        None => MergeOptions::default(),
    };
    if let Some(base_dir) = &cli.base_dir {
        options.base_dir = base_dir.clone();
    }
    if cli.default_overwrite {
        options.default_overwrite = true;
    }
    options.overwrite.extend(cli.overwrite);
    options.append.extend(cli.append);
    options.resolve_path.extend(cli.resolve_path);

    let merged = merge_files(&options, &cli.files)?;
    let yaml = serde_yaml::to_string(&merged).context("serializing merged document")?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &yaml)
                .with_context(|| format!("writing merged document to {}", path.display()))?;
            info!("Wrote merged document to {}", path.display());
        }
        None => print!("{yaml}"),
    }

    Ok(())
}
