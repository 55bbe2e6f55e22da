//! Text and markdown renderings of a risk report.
//!
//! JSON is the structured contract; these renderers are for humans. Both
//! walk the already-sorted `items` list, so rendering never re-orders
//! anything.

use crate::report::format::{format_bytes, format_us};
use crate::report::model::{RiskItem, RiskReport};

fn profile_label(report: &RiskReport) -> String {
    let spec = &report.hardware_spec;
    let mut label = spec
        .platform
        .clone()
        .unwrap_or_else(|| "embedded target".to_string());
    if let Some(level) = &spec.safety_level {
        label.push_str(&format!(" ({level})"));
    }
    label
}

fn constraint_summary_lines(report: &RiskReport) -> Vec<String> {
    let spec = &report.hardware_spec;
    let mut lines = Vec::new();

    let mut mem_parts: Vec<String> = Vec::new();
    if let Some(ram) = spec.ram_size_bytes {
        mem_parts.push(format!("RAM: {}", format_bytes(ram)));
    }
    if let Some(flash) = spec.flash_size_bytes {
        mem_parts.push(format!("Flash: {}", format_bytes(flash)));
    }
    if let Some(stack) = spec.stack_size_bytes {
        mem_parts.push(format!("Stack: {}", format_bytes(stack)));
    }
    if let Some(heap) = spec.heap_size_bytes {
        mem_parts.push(format!("Heap: {}", format_bytes(heap)));
    }
    if !mem_parts.is_empty() {
        lines.push(mem_parts.join("   "));
    }

    if let Some(latency) = spec.max_interrupt_latency_us {
        lines.push(format!("Max IRQ latency: {}", format_us(latency)));
    }
    if !spec.critical_functions.is_empty() {
        lines.push(format!(
            "Critical functions: {}",
            spec.critical_functions.join(", ")
        ));
    }

    let mut sources: Vec<&str> = report
        .provenance
        .field_origins
        .values()
        .filter_map(|origin| origin.source_path.as_deref())
        .collect();
    sources.sort_unstable();
    sources.dedup();
    if !sources.is_empty() {
        lines.push(format!("Sources: {}", sources.join(", ")));
    }

    lines
}

fn item_location(item: &RiskItem) -> String {
    let vuln = &item.vulnerability;
    match vuln.line {
        Some(line) => format!("{}:{line}", vuln.path),
        None => vuln.path.clone(),
    }
}

fn fired_rules_line(item: &RiskItem) -> String {
    if item.rule_firings.is_empty() {
        return "none".to_string();
    }
    item.rule_firings
        .iter()
        .map(|f| format!("{}({:+})", f.rule_id, f.delta))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_text(report: &RiskReport, top_k: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {} risk report: {}\n",
        report.run_metadata.tool_name,
        report.run_metadata.tool_version,
        profile_label(report)
    ));
    if let Some(source) = &report.run_metadata.source_path {
        out.push_str(&format!("Source: {source}\n"));
    }
    if let Some(config) = &report.run_metadata.config_path {
        out.push_str(&format!("Config: {config}\n"));
    }
    out.push('\n');

    out.push_str("Constraint profile:\n");
    let summary_lines = constraint_summary_lines(report);
    if summary_lines.is_empty() {
        out.push_str("  (no profile fields resolved)\n");
    }
    for line in &summary_lines {
        out.push_str(&format!("  {line}\n"));
    }
    out.push('\n');

    let counts = report.summary.tier_counts;
    out.push_str("Severity distribution:\n");
    out.push_str(&format!("  CRITICAL  {}\n", counts.critical));
    out.push_str(&format!("  HIGH      {}\n", counts.high));
    out.push_str(&format!("  MEDIUM    {}\n", counts.medium));
    out.push_str(&format!("  LOW       {}\n", counts.low));
    out.push_str(&format!("  Total     {}\n", report.summary.total_findings));

    for warning in &report.analysis.warnings {
        out.push_str(&format!("Warning: {warning}\n"));
    }

    let top_items = &report.items[..report.items.len().min(top_k)];
    if top_items.is_empty() {
        out.push_str("\nNo findings to display.\n");
        return out;
    }

    out.push_str(&format!("\nTop {} finding(s):\n", top_items.len()));
    for (rank, item) in top_items.iter().enumerate() {
        let vuln = &item.vulnerability;
        out.push_str(&format!(
            "\n[{}] {}  score: {}  category: {}\n",
            rank + 1,
            item.tier,
            item.final_score,
            vuln.category
        ));
        out.push_str(&format!("    {}", item_location(item)));
        if let Some(function) = &vuln.function {
            out.push_str(&format!("  in {function}"));
        }
        out.push_str(&format!("  [{}]\n", vuln.rule_id));
        out.push_str(&format!("    {}\n", item.explanation));
        out.push_str(&format!("    Remediation: {}\n", item.remediation));
        out.push_str(&format!("    Fired rules: {}\n", fired_rules_line(item)));
    }

    out
}

pub fn render_markdown(report: &RiskReport, top_k: usize) -> String {
    let mut out = String::new();
    let meta = &report.run_metadata;

    out.push_str("# Risk Report\n\n");
    out.push_str(&format!(
        "**Tool:** {} {}  \n",
        meta.tool_name, meta.tool_version
    ));
    out.push_str(&format!(
        "**Generated:** {}  \n",
        meta.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(source) = &meta.source_path {
        out.push_str(&format!("**Source:** {source}  \n"));
    }
    if let Some(config) = &meta.config_path {
        out.push_str(&format!("**Config:** {config}  \n"));
    }
    if let Some(command) = &meta.command {
        out.push_str(&format!("\n```\n{command}\n```\n"));
    }
    out.push_str("\n---\n\n");

    out.push_str("## Constraint Profile\n\n");
    let spec = &report.hardware_spec;
    if let Some(platform) = &spec.platform {
        out.push_str(&format!("- **Platform:** {platform}  \n"));
    }
    if let Some(level) = &spec.safety_level {
        out.push_str(&format!("- **Safety level:** {level}  \n"));
    }
    for line in constraint_summary_lines(report) {
        out.push_str(&format!("- {line}  \n"));
    }
    out.push_str("\n---\n\n");

    let counts = report.summary.tier_counts;
    out.push_str("## Severity Distribution\n\n");
    out.push_str("| Tier | Count |\n");
    out.push_str("|:-----|------:|\n");
    out.push_str(&format!("| CRITICAL | {} |\n", counts.critical));
    out.push_str(&format!("| HIGH | {} |\n", counts.high));
    out.push_str(&format!("| MEDIUM | {} |\n", counts.medium));
    out.push_str(&format!("| LOW | {} |\n", counts.low));
    out.push_str(&format!(
        "| **Total** | **{}** |\n",
        report.summary.total_findings
    ));
    out.push_str("\n---\n\n");

    let top_items = &report.items[..report.items.len().min(top_k)];
    if !top_items.is_empty() {
        let heading = if report.summary.total_findings > top_items.len() {
            format!(
                "## Findings (top {} of {})\n\n",
                top_items.len(),
                report.summary.total_findings
            )
        } else {
            "## Findings\n\n".to_string()
        };
        out.push_str(&heading);

        for (rank, item) in top_items.iter().enumerate() {
            let vuln = &item.vulnerability;
            out.push_str(&format!(
                "### [{}] {} (score {}) `{}`\n\n",
                rank + 1,
                item.tier,
                item.final_score,
                vuln.category
            ));
            out.push_str(&format!("**Location:** `{}`", item_location(item)));
            if let Some(function) = &vuln.function {
                out.push_str(&format!(" in `{function}`"));
            }
            out.push_str("  \n");
            out.push_str(&format!("**Rule:** `{}`", vuln.rule_id));
            if let Some(cwe) = &vuln.cwe {
                out.push_str(&format!("  **CWE:** {cwe}"));
            }
            out.push_str("  \n\n");
            out.push_str("**Why it's risky on this target:**  \n");
            out.push_str(&format!("{}\n\n", item.explanation));
            out.push_str("**Remediation:**  \n");
            out.push_str(&format!("{}\n\n", item.remediation));
            if !item.rule_firings.is_empty() {
                out.push_str("**Fired rules:**  \n");
                for firing in &item.rule_firings {
                    let constraints = firing
                        .constraints_used
                        .iter()
                        .map(|c| format!("`{c}`"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    out.push_str(&format!(
                        "- `{}` ({:+}): {} (constraints: {})  \n",
                        firing.rule_id, firing.delta, firing.rationale, constraints
                    ));
                }
                out.push('\n');
            }
            out.push_str("---\n\n");
        }
    }

    out
}
