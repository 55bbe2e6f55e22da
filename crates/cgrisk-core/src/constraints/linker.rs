//! Best-effort constraint extraction from GNU linker-script text.
//!
//! Only two constructs are interpreted: `MEMORY { ... }` region declarations
//! and `_stack_size` / `_heap_size` symbol assignments. Everything else in
//! the script is ignored. Linker scripts are opportunistic evidence, not a
//! required schema: a malformed literal omits that single field and
//! extraction continues.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::constraints::model::{
    ConstraintProvenance, ConstraintSource, FieldProvenance, HardwareSpec, fields,
};
use crate::error::{Error, Result};
use crate::util::units::parse_size_bytes;

static BLOCK_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//[^\n]*").unwrap());

static MEMORY_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)MEMORY\s*\{([^}]*)\}").unwrap());

/// `NAME (attrs) : ORIGIN = x, LENGTH = y`
static MEMORY_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\w+)\s*\([^)]*\)\s*:\s*ORIGIN\s*=\s*[^,]+,\s*LENGTH\s*=\s*(\S+)").unwrap()
});

static STACK_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:PROVIDE\s*\(\s*)?_+stack_size\s*=\s*(0x[0-9a-fA-F]+|\d+)\s*;").unwrap()
});
static HEAP_SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:PROVIDE\s*\(\s*)?_+heap_size\s*=\s*(0x[0-9a-fA-F]+|\d+)\s*;").unwrap()
});

static RAM_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)ram|sram|dtcm|ccm").unwrap());
static FLASH_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)flash|rom|nor").unwrap());

/// Extract memory constraints from a linker script on disk.
///
/// A missing file is fatal; everything past that point is best-effort.
pub fn parse_linker_script(path: &Path) -> Result<(HardwareSpec, ConstraintProvenance)> {
    if !path.exists() {
        return Err(Error::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(extract_from_source(&raw, &path.display().to_string()))
}

/// Extraction over in-memory script text; the unit most tests target.
pub fn extract_from_source(raw: &str, source_path: &str) -> (HardwareSpec, ConstraintProvenance) {
    let source = strip_comments(raw);

    let mut spec = HardwareSpec::default();
    let mut provenance = ConstraintProvenance::default();

    let mut record = |field: &str, note: &str| {
        provenance.record(
            field,
            FieldProvenance {
                source: ConstraintSource::LinkerScript,
                source_path: Some(source_path.to_string()),
                extraction_note: Some(note.to_string()),
            },
        );
    };

    let (ram, flash) = extract_memory_regions(&source);
    if let Some(bytes) = ram {
        spec.ram_size_bytes = Some(bytes);
        record(fields::RAM_SIZE_BYTES, "extracted from MEMORY block RAM regions");
    }
    if let Some(bytes) = flash {
        spec.flash_size_bytes = Some(bytes);
        record(fields::FLASH_SIZE_BYTES, "extracted from MEMORY block FLASH regions");
    }

    if let Some(bytes) = extract_symbol(&STACK_SYMBOL, &source) {
        spec.stack_size_bytes = Some(bytes);
        record(fields::STACK_SIZE_BYTES, "extracted from _stack_size symbol");
    }
    if let Some(bytes) = extract_symbol(&HEAP_SYMBOL, &source) {
        spec.heap_size_bytes = Some(bytes);
        record(fields::HEAP_SIZE_BYTES, "extracted from _heap_size symbol");
    }

    (spec, provenance)
}

/// Comments must never be scanned for content, so they are removed before
/// any pattern matching.
fn strip_comments(raw: &str) -> String {
    let without_block = BLOCK_COMMENT.replace_all(raw, " ");
    LINE_COMMENT.replace_all(&without_block, " ").into_owned()
}

/// Sum RAM-like and FLASH-like region lengths inside the `MEMORY` block.
///
/// A region whose name matches neither class, or whose length literal does
/// not parse, contributes nothing. A class with no matching region yields
/// `None`, not zero.
fn extract_memory_regions(source: &str) -> (Option<u64>, Option<u64>) {
    let Some(block) = MEMORY_BLOCK.captures(source) else {
        return (None, None);
    };

    let mut ram_total: Option<u64> = None;
    let mut flash_total: Option<u64> = None;

    for region in MEMORY_REGION.captures_iter(&block[1]) {
        let name = &region[1];
        let length = region[2].trim_end_matches([',', ';']);

        let Ok(bytes) = parse_size_bytes(length) else {
            continue;
        };

        if RAM_NAME.is_match(name) {
            ram_total = Some(ram_total.unwrap_or(0) + bytes);
        } else if FLASH_NAME.is_match(name) {
            flash_total = Some(flash_total.unwrap_or(0) + bytes);
        }
    }

    (ram_total, flash_total)
}

/// First symbol assignment wins; an unparseable value omits the field.
fn extract_symbol(pattern: &Regex, source: &str) -> Option<u64> {
    let caps = pattern.captures(source)?;
    parse_size_bytes(&caps[1]).ok()
}
