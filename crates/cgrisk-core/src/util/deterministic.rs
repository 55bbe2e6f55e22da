//! Deterministic ordering helpers.
//!
//! Report ordering is part of the output contract: identical inputs must
//! produce byte-identical reports regardless of the order findings were
//! parsed or scored in.

use std::cmp::Reverse;

use crate::report::model::RiskItem;

/// Sort risk items by descending final score, then ascending file path,
/// then ascending line number (missing line sorts as 0).
///
/// This ordering is part of the report schema contract and must not change
/// without a schema version bump.
pub fn sort_risk_items(items: &mut [RiskItem]) {
    items.sort_by(|a, b| {
        (
            Reverse(a.final_score),
            a.vulnerability.path.as_str(),
            a.vulnerability.line.unwrap_or(0),
        )
            .cmp(&(
                Reverse(b.final_score),
                b.vulnerability.path.as_str(),
                b.vulnerability.line.unwrap_or(0),
            ))
    });
}
