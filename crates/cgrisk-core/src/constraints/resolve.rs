//! Constraint resolution across heterogeneous sources.
//!
//! Linker-script fields are applied first and structured-config fields
//! second, so the config wins on a field-by-field basis when both sources
//! populate the same field. The config is the authoritative, intentional
//! declaration; the linker script is opportunistic evidence.

use std::path::Path;

use crate::constraints::config::parse_config;
use crate::constraints::linker::parse_linker_script;
use crate::constraints::model::{ConstraintProvenance, HardwareSpec, fields};
use crate::error::{Error, Result};

/// Merge zero-or-more-but-not-both-missing constraint sources into one
/// resolved profile with field-level provenance.
pub fn resolve_constraints(
    config_path: Option<&Path>,
    linker_script_path: Option<&Path>,
) -> Result<(HardwareSpec, ConstraintProvenance)> {
    if config_path.is_none() && linker_script_path.is_none() {
        return Err(Error::Config(
            "at least one constraint source is required: --config or --linker-script".into(),
        ));
    }

    let mut merged = HardwareSpec::default();
    let mut origins = ConstraintProvenance::default();

    if let Some(path) = linker_script_path {
        let (spec, provenance) = parse_linker_script(path)?;
        apply_fields(&spec, &provenance, &mut merged, &mut origins);
    }

    if let Some(path) = config_path {
        let (spec, provenance) = parse_config(path)?;
        apply_fields(&spec, &provenance, &mut merged, &mut origins);
    }

    Ok((merged, origins))
}

/// Copy every populated field of `spec` into `target`, overwriting earlier
/// values and their provenance. The merge is written out field by field
/// rather than driven by reflection so that precedence stays auditable and
/// independently testable per field.
pub fn apply_fields(
    spec: &HardwareSpec,
    provenance: &ConstraintProvenance,
    target: &mut HardwareSpec,
    target_origins: &mut ConstraintProvenance,
) {
    let mut carry = |field: &str| {
        if let Some(p) = provenance.field_origins.get(field) {
            target_origins.record(field, p.clone());
        }
    };

    if let Some(v) = &spec.platform {
        target.platform = Some(v.clone());
        carry(fields::PLATFORM);
    }
    if let Some(v) = spec.ram_size_bytes {
        target.ram_size_bytes = Some(v);
        carry(fields::RAM_SIZE_BYTES);
    }
    if let Some(v) = spec.flash_size_bytes {
        target.flash_size_bytes = Some(v);
        carry(fields::FLASH_SIZE_BYTES);
    }
    if let Some(v) = spec.stack_size_bytes {
        target.stack_size_bytes = Some(v);
        carry(fields::STACK_SIZE_BYTES);
    }
    if let Some(v) = spec.heap_size_bytes {
        target.heap_size_bytes = Some(v);
        carry(fields::HEAP_SIZE_BYTES);
    }
    if let Some(v) = spec.max_interrupt_latency_us {
        target.max_interrupt_latency_us = Some(v);
        carry(fields::MAX_INTERRUPT_LATENCY_US);
    }
    // An empty list means "not provided", not an explicit empty value.
    if !spec.critical_functions.is_empty() {
        target.critical_functions = spec.critical_functions.clone();
        carry(fields::CRITICAL_FUNCTIONS);
    }
    if let Some(v) = &spec.safety_level {
        target.safety_level = Some(v.clone());
        carry(fields::SAFETY_LEVEL);
    }
}
