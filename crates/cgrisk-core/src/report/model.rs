use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::constraints::model::{ConstraintProvenance, HardwareSpec};
use crate::sarif::model::Vulnerability;
use crate::sarif::read::InputArtifact;
use crate::scoring::base::SeverityTier;
use crate::scoring::rules::RuleFiring;

/// Top-level risk report.
///
/// This struct is the stable JSON contract. Apart from the run timestamp
/// it must remain deterministic for identical inputs, including the order
/// of `items` and `summary.top_findings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub schema_version: String,
    pub run_metadata: RunMetadata,
    pub hardware_spec: HardwareSpec,
    pub provenance: ConstraintProvenance,
    pub analysis: AnalysisInfo,
    pub summary: ReportSummary,
    pub items: Vec<RiskItem>,
}

impl RiskReport {
    /// Assemble a report from pipeline outputs.
    ///
    /// Assumes `items` are already deterministically sorted; the summary is
    /// derived from them in that order.
    pub fn new(
        run_metadata: RunMetadata,
        hardware_spec: HardwareSpec,
        provenance: ConstraintProvenance,
        analysis: AnalysisInfo,
        items: Vec<RiskItem>,
        top_k: usize,
    ) -> Self {
        let summary = ReportSummary {
            total_findings: items.len(),
            tier_counts: TierCounts::from_items(&items),
            top_findings: top_finding_labels(&items, top_k),
        };

        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            run_metadata,
            hardware_spec,
            provenance,
            analysis,
            summary,
            items,
        }
    }
}

/// One scored finding with its full explanation trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskItem {
    pub vulnerability: Vulnerability,
    pub base_score: u32,
    pub final_score: u32,
    pub tier: SeverityTier,
    pub rule_firings: Vec<RuleFiring>,
    pub explanation: String,
    pub remediation: String,
}

/// Finding counts per severity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl TierCounts {
    pub fn from_items(items: &[RiskItem]) -> Self {
        let mut counts = Self::default();
        for item in items {
            match item.tier {
                SeverityTier::Critical => counts.critical += 1,
                SeverityTier::High => counts.high += 1,
                SeverityTier::Medium => counts.medium += 1,
                SeverityTier::Low => counts.low += 1,
            }
        }
        counts
    }
}

/// Aggregate counts and headline labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_findings: usize,
    pub tier_counts: TierCounts,
    pub top_findings: Vec<String>,
}

/// Invocation metadata bound to this report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub tool_name: String,
    pub tool_version: String,
    pub timestamp: DateTime<Utc>,
    pub command: Option<String>,
    pub source_path: Option<String>,
    pub config_path: Option<String>,
    pub inputs: Vec<InputArtifact>,
}

/// Parsing/analysis status.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisInfo {
    pub status: String,
    pub warnings: Vec<String>,
}

impl AnalysisInfo {
    pub fn ok() -> Self {
        Self {
            status: "ok".into(),
            warnings: vec![],
        }
    }

    /// Status stays "ok" when some results were skipped; the warnings list
    /// records each skip so nothing is dropped silently.
    pub fn with_warnings(mut warnings: Vec<String>) -> Self {
        warnings.sort();
        Self {
            status: "ok".into(),
            warnings,
        }
    }
}

fn top_finding_labels(items: &[RiskItem], top_k: usize) -> Vec<String> {
    items
        .iter()
        .take(top_k)
        .map(|item| {
            let vuln = &item.vulnerability;
            let location = match vuln.line {
                Some(line) => format!("{}:{line}", vuln.path),
                None => vuln.path.clone(),
            };
            format!(
                "{} at {location} (score={})",
                vuln.category, item.final_score
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sarif::model::Category;

    fn item(score: u32, tier: SeverityTier, path: &str, line: Option<u32>) -> RiskItem {
        RiskItem {
            vulnerability: Vulnerability {
                tool: "clang-analyzer".into(),
                rule_id: "unix.Malloc".into(),
                message: "m".into(),
                path: path.into(),
                line,
                column: None,
                function: None,
                cwe: None,
                category: Category::BufferOverflow,
            },
            base_score: 60,
            final_score: score,
            tier,
            rule_firings: vec![],
            explanation: String::new(),
            remediation: String::new(),
        }
    }

    fn metadata() -> RunMetadata {
        RunMetadata {
            tool_name: "cgrisk".into(),
            tool_version: "0.1.0".into(),
            timestamp: Utc::now(),
            command: None,
            source_path: None,
            config_path: None,
            inputs: vec![],
        }
    }

    #[test]
    fn tier_counts_tally_each_tier() {
        let items = vec![
            item(90, SeverityTier::Critical, "a.c", Some(1)),
            item(75, SeverityTier::High, "b.c", Some(2)),
            item(75, SeverityTier::High, "c.c", Some(3)),
            item(10, SeverityTier::Low, "d.c", Some(4)),
        ];
        let counts = TierCounts::from_items(&items);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.medium, 0);
        assert_eq!(counts.low, 1);
    }

    #[test]
    fn top_finding_labels_include_location_and_score() {
        let items = vec![
            item(80, SeverityTier::High, "src/main.c", Some(15)),
            item(40, SeverityTier::Medium, "src/util.c", None),
        ];
        let report = RiskReport::new(
            metadata(),
            HardwareSpec::default(),
            ConstraintProvenance::default(),
            AnalysisInfo::ok(),
            items,
            10,
        );
        assert_eq!(
            report.summary.top_findings,
            vec![
                "buffer-overflow at src/main.c:15 (score=80)",
                "buffer-overflow at src/util.c (score=40)",
            ]
        );
        assert_eq!(report.summary.total_findings, 2);
        assert_eq!(report.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn top_findings_respect_top_k() {
        let items: Vec<RiskItem> = (0..5)
            .map(|i| item(50, SeverityTier::Medium, "f.c", Some(i)))
            .collect();
        let report = RiskReport::new(
            metadata(),
            HardwareSpec::default(),
            ConstraintProvenance::default(),
            AnalysisInfo::ok(),
            items,
            3,
        );
        assert_eq!(report.summary.top_findings.len(), 3);
        assert_eq!(report.summary.total_findings, 5);
    }

    #[test]
    fn analysis_warnings_are_sorted() {
        let analysis = AnalysisInfo::with_warnings(vec!["b".into(), "a".into()]);
        assert_eq!(analysis.status, "ok");
        assert_eq!(analysis.warnings, vec!["a", "b"]);
    }
}
