//! Scoring engine: base score plus constraint-rule deltas.

use crate::constraints::model::HardwareSpec;
use crate::report::explain::build_explanation;
use crate::report::model::RiskItem;
use crate::report::remediation::build_remediation;
use crate::sarif::model::Vulnerability;
use crate::scoring::base::{SCORE_MAX, SCORE_MIN, base_score_for_category, score_to_tier};
use crate::scoring::rules::{RULE_REGISTRY, RuleFiring};
use crate::util::deterministic::sort_risk_items;

fn apply_rules(vuln: &Vulnerability, spec: &HardwareSpec) -> Vec<RuleFiring> {
    RULE_REGISTRY
        .iter()
        .filter_map(|rule| rule(vuln, spec))
        .collect()
}

fn clip_score(raw: i64) -> u32 {
    raw.clamp(i64::from(SCORE_MIN), i64::from(SCORE_MAX)) as u32
}

/// Score one finding against a constraint profile.
///
/// Pure: identical inputs always produce an identical item, and neither
/// argument is mutated.
pub fn score_vulnerability(vuln: &Vulnerability, spec: &HardwareSpec) -> RiskItem {
    let base_score = base_score_for_category(vuln.category);
    let firings = apply_rules(vuln, spec);

    let delta_sum: i64 = firings.iter().map(|f| i64::from(f.delta)).sum();
    let final_score = clip_score(i64::from(base_score) + delta_sum);
    let tier = score_to_tier(final_score);

    let explanation = build_explanation(vuln, spec, base_score, &firings);
    let remediation = build_remediation(vuln.category, spec);

    RiskItem {
        vulnerability: vuln.clone(),
        base_score,
        final_score,
        tier,
        rule_firings: firings,
        explanation,
        remediation,
    }
}

/// Score every finding and return the deterministically ordered item list.
pub fn score_all(vulns: &[Vulnerability], spec: &HardwareSpec) -> Vec<RiskItem> {
    let mut items: Vec<RiskItem> = vulns
        .iter()
        .map(|vuln| score_vulnerability(vuln, spec))
        .collect();
    sort_risk_items(&mut items);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sarif::model::Category;
    use crate::scoring::base::SeverityTier;

    fn vuln(
        category: Category,
        path: &str,
        line: Option<u32>,
        function: Option<&str>,
    ) -> Vulnerability {
        Vulnerability {
            tool: "clang-analyzer".into(),
            rule_id: "test.Rule".into(),
            message: "m".into(),
            path: path.into(),
            line,
            column: None,
            function: function.map(str::to_string),
            cwe: None,
            category,
        }
    }

    #[test]
    fn tight_stack_escalates_overflow_to_high() {
        let spec = HardwareSpec {
            stack_size_bytes: Some(2048),
            ..Default::default()
        };
        let item = score_vulnerability(
            &vuln(
                Category::BufferOverflow,
                "src/main.c",
                Some(15),
                Some("copy_input"),
            ),
            &spec,
        );

        assert_eq!(item.base_score, 60);
        assert_eq!(item.final_score, 80);
        assert_eq!(item.tier, SeverityTier::High);
        assert_eq!(item.rule_firings.len(), 1);
        assert_eq!(item.rule_firings[0].rule_id, "stack-tight");
        assert_eq!(
            item.rule_firings[0].constraints_used,
            vec!["stack_size_bytes"]
        );
    }

    #[test]
    fn isr_deadlock_clips_at_score_max() {
        // 45 base + 25 (ISR name) + 30 (ISR deadlock) = 100
        let spec = HardwareSpec::default();
        let item = score_vulnerability(
            &vuln(Category::Deadlock, "src/uart.c", Some(88), Some("isr_uart")),
            &spec,
        );

        assert_eq!(item.base_score, 45);
        assert_eq!(item.final_score, 100);
        assert_eq!(item.tier, SeverityTier::Critical);
        let ids: Vec<&str> = item
            .rule_firings
            .iter()
            .map(|f| f.rule_id.as_str())
            .collect();
        assert_eq!(ids, vec!["isr-name-match", "isr-deadlock"]);
    }

    #[test]
    fn stacked_escalations_never_exceed_score_max() {
        let spec = HardwareSpec {
            stack_size_bytes: Some(1024),
            ram_size_bytes: Some(16 * 1024),
            max_interrupt_latency_us: Some(40),
            safety_level: Some("ISO26262-ASIL-D".into()),
            critical_functions: vec!["isr_brake".into()],
            ..Default::default()
        };
        let item = score_vulnerability(
            &vuln(
                Category::BufferOverflow,
                "src/brake.c",
                Some(7),
                Some("isr_brake"),
            ),
            &spec,
        );

        assert_eq!(item.final_score, 100);
        assert_eq!(item.tier, SeverityTier::Critical);
        assert!(item.rule_firings.len() >= 5);
    }

    #[test]
    fn clip_bounds_raw_scores_in_both_directions() {
        assert_eq!(clip_score(140), 100);
        assert_eq!(clip_score(100), 100);
        assert_eq!(clip_score(-25), 0);
        assert_eq!(clip_score(0), 0);
        assert_eq!(clip_score(55), 55);
        assert_eq!(score_to_tier(clip_score(-25)), SeverityTier::Low);
    }

    #[test]
    fn unconstrained_profile_keeps_base_score() {
        let item = score_vulnerability(
            &vuln(Category::DivideByZero, "src/calc.c", Some(2), Some("ratio")),
            &HardwareSpec::default(),
        );
        assert_eq!(item.final_score, item.base_score);
        assert!(item.rule_firings.is_empty());
        assert!(item.explanation.contains("base score: 40"));
    }

    #[test]
    fn score_all_orders_items_deterministically() {
        let spec = HardwareSpec {
            stack_size_bytes: Some(2048),
            ..Default::default()
        };
        let vulns = vec![
            vuln(Category::DivideByZero, "b.c", Some(9), None),
            vuln(Category::BufferOverflow, "z.c", Some(1), None),
            vuln(Category::BufferOverflow, "a.c", Some(5), None),
        ];
        let items = score_all(&vulns, &spec);

        let keys: Vec<(u32, &str)> = items
            .iter()
            .map(|i| (i.final_score, i.vulnerability.path.as_str()))
            .collect();
        assert_eq!(keys, vec![(80, "a.c"), (80, "z.c"), (40, "b.c")]);
    }

    #[test]
    fn scoring_is_reproducible() {
        let spec = HardwareSpec {
            heap_size_bytes: Some(4096),
            safety_level: Some("MISRA-C:2012".into()),
            ..Default::default()
        };
        let v = vuln(Category::Leak, "src/pool.c", Some(33), Some("pool_get"));
        assert_eq!(score_vulnerability(&v, &spec), score_vulnerability(&v, &spec));
    }
}
