use std::path::{Path, PathBuf};

use chrono::Utc;

pub mod constraints;
pub mod error;
pub mod report;
pub mod sarif;
pub mod scoring;
pub mod util;

use report::model::{AnalysisInfo, RiskReport, RunMetadata};
use sarif::model::Vulnerability;
use sarif::read::InputArtifact;

pub const TOOL_NAME: &str = "cgrisk";

/// JSON schema version of risk reports.
/// Bump only when the report structure changes semantically.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Invocation context recorded in the report, supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct RunInfo {
    pub tool_version: String,
    pub command: Option<String>,
    pub source_path: Option<String>,
}

/// Full scoring pipeline: resolve constraints, parse every SARIF input,
/// score all findings, and assemble the report.
///
/// Fatal errors are constraint-resolution failures, unreadable inputs, and
/// structurally invalid SARIF documents. Individually malformed results
/// inside an otherwise valid document are skipped and surfaced as warnings
/// in `report.analysis`.
pub fn score_findings(
    sarif_paths: &[PathBuf],
    config_path: Option<&Path>,
    linker_script_path: Option<&Path>,
    top_k: usize,
    run: RunInfo,
) -> anyhow::Result<RiskReport> {
    let (spec, provenance) = constraints::resolve::resolve_constraints(
        config_path,
        linker_script_path,
    )?;

    let mut vulnerabilities: Vec<Vulnerability> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();
    let mut inputs: Vec<InputArtifact> = Vec::new();

    for path in sarif_paths {
        let input = sarif::read::read_sarif_input(path)?;
        let findings = sarif::parse::parse_sarif_bytes(&input.bytes, &input.artifact.path)?;
        vulnerabilities.extend(findings.vulnerabilities);
        warnings.extend(findings.warnings);
        inputs.push(input.artifact);
    }

    let items = scoring::engine::score_all(&vulnerabilities, &spec);

    let run_metadata = RunMetadata {
        tool_name: TOOL_NAME.to_string(),
        tool_version: run.tool_version,
        timestamp: Utc::now(),
        command: run.command,
        source_path: run.source_path,
        config_path: config_path.map(|p| p.display().to_string()),
        inputs,
    };

    Ok(RiskReport::new(
        run_metadata,
        spec,
        provenance,
        AnalysisInfo::with_warnings(warnings),
        items,
        top_k,
    ))
}
