use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "cgrisk",
    version,
    about = "Constraint-aware risk scoring for embedded C/C++ static-analysis findings"
)]
pub struct Args {
    /// SARIF input file(s) produced by a static analyzer
    #[arg(required = true)]
    pub sarif_paths: Vec<PathBuf>,

    /// YAML constraint profile for the target device
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// GNU LD linker script to extract memory constraints from
    #[arg(long)]
    pub linker_script: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "json")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Number of findings to include in rendered output and top-findings summary
    #[arg(long, default_value_t = 10)]
    pub top_k: usize,

    /// Exit with code 2 if any finding reaches this severity tier
    #[arg(long, value_name = "TIER")]
    pub fail_on: Option<FailTier>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FailTier {
    Critical,
    High,
    Medium,
    Low,
}
