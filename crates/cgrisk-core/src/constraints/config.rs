//! Structured constraint extraction from a declarative YAML document.
//!
//! Unlike the linker-script extractor, this input is an intentional,
//! authoritative declaration: any recognized key whose value fails
//! validation is a fatal configuration error, never a silent skip.

use std::path::Path;

use serde_yaml::Value;

use crate::constraints::model::{
    ConstraintProvenance, ConstraintSource, FieldProvenance, HardwareSpec, fields,
};
use crate::error::{Error, Result};
use crate::util::units::{parse_size_bytes, parse_time_us};

const SIZE_KEYS: [(&str, &str); 4] = [
    ("ram_size", fields::RAM_SIZE_BYTES),
    ("flash_size", fields::FLASH_SIZE_BYTES),
    ("stack_size", fields::STACK_SIZE_BYTES),
    ("heap_size", fields::HEAP_SIZE_BYTES),
];

const TIME_KEYS: [(&str, &str); 1] = [("max_interrupt_latency", fields::MAX_INTERRUPT_LATENCY_US)];

const SCALAR_KEYS: [&str; 2] = [fields::PLATFORM, fields::SAFETY_LEVEL];

/// Load and validate a constraint config file.
pub fn parse_config(path: &Path) -> Result<(HardwareSpec, ConstraintProvenance)> {
    if !path.exists() {
        return Err(Error::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let raw = std::fs::read_to_string(path)?;
    parse_config_str(&raw, &path.display().to_string())
}

/// Parse constraint YAML text. The document must be a mapping at the top
/// level; unrecognized keys are ignored.
pub fn parse_config_str(raw: &str, source_path: &str) -> Result<(HardwareSpec, ConstraintProvenance)> {
    let doc: Value = serde_yaml::from_str(raw)
        .map_err(|e| Error::Config(format!("invalid YAML in {source_path}: {e}")))?;

    let Value::Mapping(_) = doc else {
        return Err(Error::Config(format!(
            "constraint config must be a YAML mapping at the top level: {source_path}"
        )));
    };

    let mut spec = HardwareSpec::default();
    let mut provenance = ConstraintProvenance::default();

    for (key, field) in SIZE_KEYS {
        if let Some(value) = doc.get(key) {
            let bytes = parse_size_value(key, value)?;
            set_field(&mut spec, field, FieldValue::Bytes(bytes));
            record(&mut provenance, field, source_path, key);
        }
    }

    for (key, field) in TIME_KEYS {
        if let Some(value) = doc.get(key) {
            let us = parse_time_value(key, value)?;
            set_field(&mut spec, field, FieldValue::Micros(us));
            record(&mut provenance, field, source_path, key);
        }
    }

    for field in SCALAR_KEYS {
        if let Some(value) = doc.get(field) {
            let text = scalar_to_string(field, value)?;
            set_field(&mut spec, field, FieldValue::Text(text));
            record(&mut provenance, field, source_path, field);
        }
    }

    if let Some(value) = doc.get("critical_functions") {
        spec.critical_functions = parse_string_list("critical_functions", value)?;
        record(
            &mut provenance,
            fields::CRITICAL_FUNCTIONS,
            source_path,
            "critical_functions",
        );
    }

    Ok((spec, provenance))
}

enum FieldValue {
    Bytes(u64),
    Micros(u64),
    Text(String),
}

fn set_field(spec: &mut HardwareSpec, field: &str, value: FieldValue) {
    match (field, value) {
        (fields::RAM_SIZE_BYTES, FieldValue::Bytes(b)) => spec.ram_size_bytes = Some(b),
        (fields::FLASH_SIZE_BYTES, FieldValue::Bytes(b)) => spec.flash_size_bytes = Some(b),
        (fields::STACK_SIZE_BYTES, FieldValue::Bytes(b)) => spec.stack_size_bytes = Some(b),
        (fields::HEAP_SIZE_BYTES, FieldValue::Bytes(b)) => spec.heap_size_bytes = Some(b),
        (fields::MAX_INTERRUPT_LATENCY_US, FieldValue::Micros(us)) => {
            spec.max_interrupt_latency_us = Some(us)
        }
        (fields::PLATFORM, FieldValue::Text(s)) => spec.platform = Some(s),
        (fields::SAFETY_LEVEL, FieldValue::Text(s)) => spec.safety_level = Some(s),
        _ => unreachable!("field/value pairing is fixed by the key tables"),
    }
}

fn record(provenance: &mut ConstraintProvenance, field: &str, source_path: &str, key: &str) {
    provenance.record(
        field,
        FieldProvenance {
            source: ConstraintSource::StructuredConfig,
            source_path: Some(source_path.to_string()),
            extraction_note: Some(format!("parsed from '{key}' field")),
        },
    );
}

fn parse_size_value(key: &str, value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| {
            Error::Config(format!(
                "invalid value for '{key}': {n} is not a non-negative integer"
            ))
        }),
        Value::String(s) => parse_size_bytes(s)
            .map_err(|e| Error::Config(format!("invalid value for '{key}': {e}"))),
        other => Err(Error::Config(format!(
            "invalid value for '{key}': expected a size literal or integer, got {}",
            value_kind(other)
        ))),
    }
}

fn parse_time_value(key: &str, value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| {
            Error::Config(format!(
                "invalid value for '{key}': {n} is not a non-negative integer"
            ))
        }),
        Value::String(s) => parse_time_us(s)
            .map_err(|e| Error::Config(format!("invalid value for '{key}': {e}"))),
        other => Err(Error::Config(format!(
            "invalid value for '{key}': expected a time literal or integer, got {}",
            value_kind(other)
        ))),
    }
}

fn scalar_to_string(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Error::Config(format!(
            "invalid value for '{key}': expected a scalar, got {}",
            value_kind(other)
        ))),
    }
}

/// A non-list value, or any non-string entry, is a hard validation error.
/// Entries are deduplicated preserving first occurrence: the profile treats
/// critical functions as an ordered set.
fn parse_string_list(key: &str, value: &Value) -> Result<Vec<String>> {
    let Value::Sequence(entries) = value else {
        return Err(Error::Config(format!(
            "field '{key}' must be a YAML list of strings, got {}",
            value_kind(value)
        )));
    };

    let mut names: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::String(name) = entry else {
            return Err(Error::Config(format!(
                "all entries in '{key}' must be strings, found {}",
                value_kind(entry)
            )));
        };
        if !names.iter().any(|n| n == name) {
            names.push(name.clone());
        }
    }
    Ok(names)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
