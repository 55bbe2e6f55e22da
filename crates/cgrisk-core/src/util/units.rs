//! Parsing of human-written size and time literals.
//!
//! Constraint documents and linker scripts express budgets the way humans
//! write them ("2KB", "0x4000", "50us"). Everything downstream works in
//! canonical integer units: bytes and microseconds.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static SIZE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*(B|KB|MB|GB|K|M|G)?\s*$").unwrap()
});

static TIME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*(us|ms|s)\s*$").unwrap());

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

fn size_multiplier(unit: &str) -> u64 {
    match unit.to_ascii_lowercase().as_str() {
        "b" => 1,
        "kb" | "k" => KIB,
        "mb" | "m" => MIB,
        "gb" | "g" => GIB,
        _ => unreachable!("unit set is closed by SIZE_PATTERN"),
    }
}

fn time_multiplier(unit: &str) -> u64 {
    match unit.to_ascii_lowercase().as_str() {
        "us" => 1,
        "ms" => 1_000,
        "s" => 1_000_000,
        _ => unreachable!("unit set is closed by TIME_PATTERN"),
    }
}

/// Multiplies a decimal literal by a unit multiplier, truncating fractions
/// after multiplication ("1.5KB" -> 1536).
fn apply_multiplier(number: &str, multiplier: u64) -> Option<u64> {
    if number.contains('.') {
        let value: f64 = number.parse().ok()?;
        Some((value * multiplier as f64) as u64)
    } else {
        let value: u64 = number.parse().ok()?;
        Some(value.saturating_mul(multiplier))
    }
}

/// Parses a size literal into bytes.
///
/// Accepts plain integers (already bytes), hexadecimal literals ("0x4000"),
/// and `<number><unit>` with binary multiples (K=1024, M=1024^2, G=1024^3).
pub fn parse_size_bytes(value: &str) -> Result<u64> {
    let stripped = value.trim();

    if let Some(hex) = stripped
        .strip_prefix("0x")
        .or_else(|| stripped.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16).map_err(|_| Error::InvalidSize {
            value: value.to_string(),
        });
    }

    let caps = SIZE_PATTERN
        .captures(stripped)
        .ok_or_else(|| Error::InvalidSize {
            value: value.to_string(),
        })?;

    let unit = caps.get(2).map_or("b", |m| m.as_str());
    apply_multiplier(&caps[1], size_multiplier(unit)).ok_or_else(|| Error::InvalidSize {
        value: value.to_string(),
    })
}

/// Parses a time literal into microseconds.
///
/// Accepts plain integers (already microseconds) and `<number><unit>` with
/// unit in {us, ms, s}.
pub fn parse_time_us(value: &str) -> Result<u64> {
    let stripped = value.trim();

    if let Ok(us) = stripped.parse::<u64>() {
        return Ok(us);
    }

    let caps = TIME_PATTERN
        .captures(stripped)
        .ok_or_else(|| Error::InvalidTime {
            value: value.to_string(),
        })?;

    apply_multiplier(&caps[1], time_multiplier(&caps[2])).ok_or_else(|| Error::InvalidTime {
        value: value.to_string(),
    })
}
