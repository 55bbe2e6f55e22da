//! Tolerant SARIF ingestion.
//!
//! A SARIF document is walked as loose JSON rather than deserialized into a
//! rigid schema: real analyzer output deviates constantly, and one malformed
//! result must never sink the batch. Structural failures (missing file, not
//! a JSON object) are fatal for that input; everything below that level is
//! skipped with a warning that names the result index and source file.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::sarif::model::{Category, Vulnerability};
use crate::sarif::rule_map::{resolve_category, resolve_cwe};

/// Output of parsing one SARIF document: findings plus skip diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ParsedFindings {
    pub vulnerabilities: Vec<Vulnerability>,
    pub warnings: Vec<String>,
}

/// The three allocator checkers that report several distinct defect kinds
/// under one rule id; message text disambiguates use-after-free for these
/// and only these.
const MESSAGE_REFINED_RULES: [&str; 3] =
    ["unix.Malloc", "cplusplus.NewDelete", "cplusplus.NewDeleteLeaks"];

const USE_AFTER_FREE_PHRASES: [&str; 4] = [
    "use of memory after",
    "used after",
    "use-after-free",
    "after it is freed",
];
const DOUBLE_FREE_PHRASES: [&str; 3] =
    ["double free", "freed twice", "attempt to free released"];

/// Parse a SARIF file from disk.
pub fn parse_sarif(path: &Path) -> Result<ParsedFindings> {
    if !path.exists() {
        return Err(Error::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path)?;
    parse_sarif_bytes(&bytes, &path.display().to_string())
}

/// Parse SARIF bytes; `source` labels the input in diagnostics.
pub fn parse_sarif_bytes(bytes: &[u8], source: &str) -> Result<ParsedFindings> {
    let doc: Value = serde_json::from_slice(bytes).map_err(|e| Error::InvalidSarif {
        path: source.into(),
        reason: format!("not valid JSON: {e}"),
    })?;

    if !doc.is_object() {
        return Err(Error::InvalidSarif {
            path: source.into(),
            reason: "document must be a JSON object at the top level".into(),
        });
    }

    let mut parsed = ParsedFindings::default();

    let runs = doc.get("runs").and_then(Value::as_array);
    for run in runs.into_iter().flatten() {
        if !run.is_object() {
            parsed
                .warnings
                .push(format!("skipping non-object run entry in {source}"));
            continue;
        }
        parse_run(run, source, &mut parsed);
    }

    Ok(parsed)
}

fn parse_run(run: &Value, source: &str, parsed: &mut ParsedFindings) {
    let tool_name = run
        .pointer("/tool/driver/name")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let rule_cwe_registry = build_rule_cwe_registry(run);

    let results = run.get("results").and_then(Value::as_array);
    for (index, result) in results.into_iter().flatten().enumerate() {
        match parse_result(result, tool_name, &rule_cwe_registry) {
            Ok(Some(vuln)) => parsed.vulnerabilities.push(vuln),
            Ok(None) => parsed.warnings.push(format!(
                "skipping result {index} in {source}: missing rule id or message"
            )),
            Err(reason) => parsed.warnings.push(format!(
                "skipping malformed result {index} in {source}: {reason}"
            )),
        }
    }
}

/// Per-run rule-id → CWE map built from the driver's declared rule metadata:
/// explicit `CWE-\d+` tags first, then relationship edges to a toolComponent
/// named "CWE".
fn build_rule_cwe_registry(run: &Value) -> BTreeMap<String, String> {
    let mut registry = BTreeMap::new();

    let rules = run.pointer("/tool/driver/rules").and_then(Value::as_array);
    for rule in rules.into_iter().flatten() {
        let Some(rule_id) = rule.get("id").and_then(Value::as_str) else {
            continue;
        };
        if let Some(cwe) = cwe_from_rule_definition(rule) {
            registry.insert(rule_id.to_string(), cwe);
        }
    }
    registry
}

fn cwe_from_rule_definition(rule: &Value) -> Option<String> {
    if let Some(cwe) = cwe_from_tags(rule.pointer("/properties/tags")) {
        return Some(cwe);
    }

    let relationships = rule.get("relationships").and_then(Value::as_array)?;
    for relationship in relationships {
        let component = relationship
            .pointer("/target/toolComponent/name")
            .and_then(Value::as_str);
        if component.is_some_and(|name| name.eq_ignore_ascii_case("CWE")) {
            if let Some(id) = relationship.pointer("/target/id").and_then(Value::as_str) {
                return Some(format!("CWE-{id}"));
            }
        }
    }
    None
}

fn cwe_from_tags(tags: Option<&Value>) -> Option<String> {
    let tags = tags?.as_array()?;
    for tag in tags {
        let Some(tag) = tag.as_str() else { continue };
        if is_cwe_tag(tag) {
            return Some(tag.to_ascii_uppercase());
        }
    }
    None
}

fn is_cwe_tag(tag: &str) -> bool {
    let Some(rest) = tag
        .strip_prefix("CWE-")
        .or_else(|| tag.strip_prefix("cwe-"))
        .or_else(|| tag.strip_prefix("Cwe-"))
    else {
        return false;
    };
    !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
}

/// Parse one SARIF result.
///
/// `Ok(None)` means the result is well-formed but unusable (no rule id or
/// empty message) and is dropped; `Err` carries the reason a structurally
/// broken result was skipped. Neither aborts the batch.
fn parse_result(
    result: &Value,
    tool_name: &str,
    rule_cwe_registry: &BTreeMap<String, String>,
) -> std::result::Result<Option<Vulnerability>, String> {
    if !result.is_object() {
        return Err("result is not a JSON object".into());
    }

    let Some(rule_id) = extract_rule_id(result) else {
        return Ok(None);
    };
    let Some(message) = extract_message(result) else {
        return Ok(None);
    };

    let locations = result.get("locations").and_then(Value::as_array);
    let (path, line, column) = extract_physical_location(locations)?;
    let function = extract_function_name(locations);

    let mut category = resolve_category(&rule_id);
    category = refine_category_from_message(category, &rule_id, &message);
    let cwe = extract_cwe(result, &rule_id, rule_cwe_registry, category);

    Ok(Some(Vulnerability {
        tool: tool_name.to_string(),
        rule_id,
        message,
        path,
        line,
        column,
        function,
        cwe,
        category,
    }))
}

fn extract_rule_id(result: &Value) -> Option<String> {
    result
        .get("ruleId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .or_else(|| result.pointer("/rule/id").and_then(Value::as_str))
        .map(str::to_string)
}

fn extract_message(result: &Value) -> Option<String> {
    let message = result.get("message")?;
    message
        .get("text")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            message
                .get("markdown")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
        })
        .map(str::to_string)
}

fn extract_physical_location(
    locations: Option<&Vec<Value>>,
) -> std::result::Result<(String, Option<u32>, Option<u32>), String> {
    let Some(first) = locations.and_then(|l| l.first()).filter(|l| l.is_object()) else {
        return Ok(("unknown".into(), None, None));
    };

    let Some(physical) = first.get("physicalLocation").filter(|p| p.is_object()) else {
        return Ok(("unknown".into(), None, None));
    };

    let raw_path = physical
        .pointer("/artifactLocation/uri")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let path = normalize_file_path(raw_path);

    let Some(region) = physical.get("region").filter(|r| r.is_object()) else {
        return Ok((path, None, None));
    };

    let line = region_coordinate(region, "startLine")?;
    let column = region_coordinate(region, "startColumn")?;
    Ok((path, line, column))
}

fn region_coordinate(region: &Value, key: &str) -> std::result::Result<Option<u32>, String> {
    match region.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| format!("region {key} is not a non-negative integer: {value}")),
    }
}

/// First logical location whose kind is "function", "method", or
/// unspecified, preferring entries that actually carry a name.
fn extract_function_name(locations: Option<&Vec<Value>>) -> Option<String> {
    let logical = locations
        .and_then(|l| l.first())?
        .get("logicalLocations")?
        .as_array()?;

    for entry in logical {
        let kind = entry.get("kind").and_then(Value::as_str).unwrap_or("");
        if !kind.is_empty() && kind != "function" && kind != "method" {
            continue;
        }
        let name = entry
            .get("name")
            .and_then(Value::as_str)
            .or_else(|| entry.get("fullyQualifiedName").and_then(Value::as_str));
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
    }
    None
}

fn refine_category_from_message(category: Category, rule_id: &str, message: &str) -> Category {
    if !MESSAGE_REFINED_RULES.contains(&rule_id) {
        return category;
    }
    let lower = message.to_lowercase();
    let matches_phrase = USE_AFTER_FREE_PHRASES
        .iter()
        .chain(DOUBLE_FREE_PHRASES.iter())
        .any(|phrase| lower.contains(phrase));
    if matches_phrase {
        Category::UseAfterFree
    } else {
        category
    }
}

/// CWE resolution cascade: explicit result-level tag, the per-run rule
/// registry, then the static tables (rule id, then category default).
fn extract_cwe(
    result: &Value,
    rule_id: &str,
    rule_cwe_registry: &BTreeMap<String, String>,
    category: Category,
) -> Option<String> {
    if let Some(cwe) = cwe_from_tags(result.pointer("/properties/tags")) {
        return Some(cwe);
    }
    if let Some(cwe) = rule_cwe_registry.get(rule_id) {
        return Some(cwe.clone());
    }
    resolve_cwe(rule_id, category).map(str::to_string)
}

/// Decode `file://` URIs and percent-escapes into a plain path.
fn normalize_file_path(raw: &str) -> String {
    let path = raw.strip_prefix("file://").unwrap_or(raw);
    percent_decode(path)
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let decoded = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(byte) = decoded {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
