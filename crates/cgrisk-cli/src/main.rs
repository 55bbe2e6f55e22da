use anyhow::Result;
use clap::Parser;

use cgrisk_core::report::model::{RiskReport, TierCounts};
use cgrisk_core::report::render;
use cgrisk_core::{RunInfo, score_findings};

mod args;

use args::FailTier;

fn source_label(paths: &[std::path::PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A finding at or above the requested tier trips the gate.
fn gate_tripped(counts: TierCounts, fail_on: FailTier) -> bool {
    match fail_on {
        FailTier::Critical => counts.critical > 0,
        FailTier::High => counts.critical + counts.high > 0,
        FailTier::Medium => counts.critical + counts.high + counts.medium > 0,
        FailTier::Low => {
            counts.critical + counts.high + counts.medium + counts.low > 0
        }
    }
}

fn render_output(report: &RiskReport, args: &args::Args) -> Result<String> {
    let output = match args.format {
        args::OutputFormat::Json => serde_json::to_string_pretty(report)?,
        args::OutputFormat::Text => render::render_text(report, args.top_k),
        args::OutputFormat::Markdown => render::render_markdown(report, args.top_k),
    };
    Ok(output)
}

fn main() -> Result<()> {
    let args = args::Args::parse();

    let run = RunInfo {
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        command: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        source_path: Some(source_label(&args.sarif_paths)),
    };

    let report = score_findings(
        &args.sarif_paths,
        args.config.as_deref(),
        args.linker_script.as_deref(),
        args.top_k,
        run,
    )?;

    let output = render_output(&report, &args)?;
    match &args.out {
        Some(path) => std::fs::write(path, &output)?,
        None => print!("{output}"),
    }

    if let Some(fail_on) = args.fail_on {
        if gate_tripped(report.summary.tier_counts, fail_on) {
            std::process::exit(2);
        }
    }

    Ok(())
}
