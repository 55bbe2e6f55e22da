//! Canonical hardware constraint profile and its per-field provenance.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Resolved constraint profile for one target device.
///
/// Every field is independently optional: absence means "unconstrained",
/// never zero. Instances are built once per run by the constraint resolver
/// and are immutable thereafter; callers comparing device profiles must
/// score against independent `HardwareSpec` values, never mutate one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSpec {
    pub platform: Option<String>,
    pub ram_size_bytes: Option<u64>,
    pub flash_size_bytes: Option<u64>,
    pub stack_size_bytes: Option<u64>,
    pub heap_size_bytes: Option<u64>,
    pub max_interrupt_latency_us: Option<u64>,
    /// Ordered set of designated safety-critical function names.
    #[serde(default)]
    pub critical_functions: Vec<String>,
    /// Free-form functional-safety declaration, e.g. "ISO26262-ASIL-B".
    pub safety_level: Option<String>,
}

/// Which kind of input a profile field was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConstraintSource {
    StructuredConfig,
    LinkerScript,
    Default,
    Unknown,
}

/// Provenance record for a single `HardwareSpec` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldProvenance {
    pub source: ConstraintSource,
    pub source_path: Option<String>,
    pub extraction_note: Option<String>,
}

/// Field-name → provenance map for a resolved profile.
///
/// Provenance is diagnostic: scoring never depends on it, and a populated
/// spec field without an entry here is tolerated. `BTreeMap` keeps report
/// serialization order stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintProvenance {
    pub field_origins: BTreeMap<String, FieldProvenance>,
}

impl ConstraintProvenance {
    pub fn record(&mut self, field: &str, provenance: FieldProvenance) {
        self.field_origins.insert(field.to_string(), provenance);
    }
}

/// Canonical field names used as provenance keys.
pub mod fields {
    pub const PLATFORM: &str = "platform";
    pub const RAM_SIZE_BYTES: &str = "ram_size_bytes";
    pub const FLASH_SIZE_BYTES: &str = "flash_size_bytes";
    pub const STACK_SIZE_BYTES: &str = "stack_size_bytes";
    pub const HEAP_SIZE_BYTES: &str = "heap_size_bytes";
    pub const MAX_INTERRUPT_LATENCY_US: &str = "max_interrupt_latency_us";
    pub const CRITICAL_FUNCTIONS: &str = "critical_functions";
    pub const SAFETY_LEVEL: &str = "safety_level";
}
