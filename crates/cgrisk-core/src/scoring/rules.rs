//! Constraint-aware escalation rules.
//!
//! The registry is an ordered list of independent pure functions over one
//! (finding, profile) pair. Each either declines or returns a `RuleFiring`
//! with a signed delta and a human-readable rationale. Registry order
//! determines explanation ordering only; the delta sum is commutative.
//! New rules are added by appending to `RULE_REGISTRY`, never by
//! introducing a trait hierarchy.

use serde::{Deserialize, Serialize};

use crate::constraints::model::{HardwareSpec, fields};
use crate::sarif::model::{Category, Vulnerability};

/// One heuristic's triggered contribution to a finding's score.
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFiring {
    pub rule_id: String,
    pub delta: i32,
    pub rationale: String,
    pub constraints_used: Vec<String>,
}

pub type RuleFn = fn(&Vulnerability, &HardwareSpec) -> Option<RuleFiring>;

pub const RULE_REGISTRY: &[RuleFn] = &[
    rule_stack_tight,
    rule_heap_tight,
    rule_ram_tight,
    rule_no_dynamic_heap,
    rule_isr_name_match,
    rule_isr_latency_overflow,
    rule_isr_deadlock,
    rule_critical_function,
    rule_asil_strict,
    rule_functional_safety_generic,
    rule_latency_ultra_tight,
    rule_latency_deadlock,
    rule_safety_integer_overflow,
];

pub const STACK_TIGHT_BYTES: u64 = 4096;
pub const HEAP_TIGHT_BYTES: u64 = 8192;
pub const RAM_TIGHT_BYTES: u64 = 65536;
pub const LATENCY_TIGHT_US: u64 = 100;
pub const LATENCY_ULTRA_TIGHT_US: u64 = 50;

const MEMORY_SAFETY: [Category; 3] = [
    Category::BufferOverflow,
    Category::UseAfterFree,
    Category::NullDeref,
];
const OVERFLOW_UAF: [Category; 2] = [Category::BufferOverflow, Category::UseAfterFree];
const LEAK_UAF: [Category; 2] = [Category::Leak, Category::UseAfterFree];
const HIGH_IMPACT: [Category; 4] = [
    Category::BufferOverflow,
    Category::UseAfterFree,
    Category::NullDeref,
    Category::FormatString,
];

const HIGH_ASIL_LEVELS: [&str; 3] = ["asil-b", "asil-c", "asil-d"];
const FUNCTIONAL_SAFETY_STANDARDS: [&str; 5] =
    ["iso26262", "iec62443", "do-178", "iec61508", "misra"];

const ISR_SUFFIXES: [&str; 3] = ["_isr", "_irq", "_IRQHandler"];
const CMSIS_FAULT_HANDLERS: [&str; 8] = [
    "SysTick_Handler",
    "PendSV_Handler",
    "HardFault_Handler",
    "NMI_Handler",
    "MemManage_Handler",
    "BusFault_Handler",
    "UsageFault_Handler",
    "DebugMon_Handler",
];

/// Interrupt-service-routine naming heuristic: `isr_` prefix, `_isr`/`_irq`/
/// `_IRQHandler` suffix, an "interrupt" substring, or a known Cortex-M
/// fault-handler name.
pub fn is_isr_function(name: Option<&str>) -> bool {
    let Some(name) = name else { return false };
    if name.is_empty() {
        return false;
    }
    let lower = name.to_lowercase();
    if lower.starts_with("isr_") {
        return true;
    }
    if ISR_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(&suffix.to_lowercase()))
    {
        return true;
    }
    if lower.contains("interrupt") {
        return true;
    }
    CMSIS_FAULT_HANDLERS
        .iter()
        .any(|handler| name.contains(handler))
}

fn is_high_asil(safety_level: Option<&str>) -> bool {
    let Some(level) = safety_level else {
        return false;
    };
    let normalized = level.to_lowercase();
    HIGH_ASIL_LEVELS.iter().any(|asil| normalized.contains(asil))
}

fn is_functional_safety(safety_level: Option<&str>) -> bool {
    let Some(level) = safety_level else {
        return false;
    };
    let normalized = level.to_lowercase();
    FUNCTIONAL_SAFETY_STANDARDS
        .iter()
        .any(|standard| normalized.contains(standard))
}

fn firing(rule_id: &str, delta: i32, rationale: String, constraints: &[&str]) -> RuleFiring {
    RuleFiring {
        rule_id: rule_id.to_string(),
        delta,
        rationale,
        constraints_used: constraints.iter().map(|c| c.to_string()).collect(),
    }
}

fn rule_stack_tight(vuln: &Vulnerability, spec: &HardwareSpec) -> Option<RuleFiring> {
    let stack = spec.stack_size_bytes.filter(|b| *b <= STACK_TIGHT_BYTES)?;
    if !OVERFLOW_UAF.contains(&vuln.category) {
        return None;
    }
    Some(firing(
        "stack-tight",
        20,
        format!(
            "Stack is tightly constrained at {stack}B (≤4096B); {} can overwrite stack \
             frames and corrupt return addresses",
            vuln.category
        ),
        &[fields::STACK_SIZE_BYTES],
    ))
}

fn rule_heap_tight(vuln: &Vulnerability, spec: &HardwareSpec) -> Option<RuleFiring> {
    let heap = spec.heap_size_bytes.filter(|b| *b <= HEAP_TIGHT_BYTES)?;
    if vuln.category != Category::Leak {
        return None;
    }
    Some(firing(
        "heap-tight",
        15,
        format!(
            "Heap budget is only {heap}B (≤8192B); repeated memory leaks rapidly exhaust \
             the allocation pool and trigger undefined behaviour"
        ),
        &[fields::HEAP_SIZE_BYTES],
    ))
}

fn rule_ram_tight(vuln: &Vulnerability, spec: &HardwareSpec) -> Option<RuleFiring> {
    let ram = spec.ram_size_bytes.filter(|b| *b <= RAM_TIGHT_BYTES)?;
    if !MEMORY_SAFETY.contains(&vuln.category) {
        return None;
    }
    Some(firing(
        "ram-tight",
        15,
        format!(
            "Total RAM is limited to {ram}B (≤64KB); {} corrupts a significant fraction \
             of addressable memory on this device",
            vuln.category
        ),
        &[fields::RAM_SIZE_BYTES],
    ))
}

fn rule_no_dynamic_heap(vuln: &Vulnerability, spec: &HardwareSpec) -> Option<RuleFiring> {
    if spec.heap_size_bytes.is_some() {
        return None;
    }
    if !LEAK_UAF.contains(&vuln.category) {
        return None;
    }
    Some(firing(
        "no-dynamic-heap",
        10,
        format!(
            "No heap budget is declared in the constraint profile; a {} defect suggests \
             untracked or unexpected dynamic allocation on this target",
            vuln.category
        ),
        &[fields::HEAP_SIZE_BYTES],
    ))
}

fn rule_isr_name_match(vuln: &Vulnerability, _spec: &HardwareSpec) -> Option<RuleFiring> {
    if !is_isr_function(vuln.function.as_deref()) {
        return None;
    }
    let function = vuln.function.as_deref().unwrap_or("unknown");
    Some(firing(
        "isr-name-match",
        25,
        format!(
            "Function '{function}' matches interrupt service routine naming conventions; \
             a fault in an ISR cannot be caught by normal exception handling and may lock \
             the device"
        ),
        &["function"],
    ))
}

fn rule_isr_latency_overflow(vuln: &Vulnerability, spec: &HardwareSpec) -> Option<RuleFiring> {
    let latency = spec
        .max_interrupt_latency_us
        .filter(|us| *us <= LATENCY_TIGHT_US)?;
    if !MEMORY_SAFETY.contains(&vuln.category) {
        return None;
    }
    Some(firing(
        "isr-latency-overflow",
        15,
        format!(
            "Maximum interrupt latency budget is {latency}µs (≤100µs); a {} in an \
             interrupt-sensitive code path can cause a missed real-time deadline",
            vuln.category
        ),
        &[fields::MAX_INTERRUPT_LATENCY_US],
    ))
}

fn rule_isr_deadlock(vuln: &Vulnerability, _spec: &HardwareSpec) -> Option<RuleFiring> {
    if vuln.category != Category::Deadlock {
        return None;
    }
    if !is_isr_function(vuln.function.as_deref()) {
        return None;
    }
    let function = vuln.function.as_deref().unwrap_or("unknown ISR");
    Some(firing(
        "isr-deadlock",
        30,
        format!(
            "Deadlock detected in interrupt service routine '{function}'; interrupt \
             starvation caused by a deadlock in an ISR requires a hardware reset to recover"
        ),
        &["function"],
    ))
}

fn rule_critical_function(vuln: &Vulnerability, spec: &HardwareSpec) -> Option<RuleFiring> {
    let function = vuln.function.as_deref()?;
    if !spec.critical_functions.iter().any(|f| f == function) {
        return None;
    }
    Some(firing(
        "critical-function",
        25,
        format!(
            "Function '{function}' is designated safety-critical in the constraint \
             profile; any defect in this function directly impacts controlled system \
             operation"
        ),
        &[fields::CRITICAL_FUNCTIONS],
    ))
}

fn rule_asil_strict(vuln: &Vulnerability, spec: &HardwareSpec) -> Option<RuleFiring> {
    if !is_high_asil(spec.safety_level.as_deref()) {
        return None;
    }
    if !HIGH_IMPACT.contains(&vuln.category) {
        return None;
    }
    let level = spec.safety_level.as_deref().unwrap_or_default();
    Some(firing(
        "asil-strict",
        15,
        format!(
            "Safety integrity level '{level}' mandates deterministic memory-safe \
             behaviour; {} directly violates ISO 26262 ASIL freedom-from-interference \
             requirements",
            vuln.category
        ),
        &[fields::SAFETY_LEVEL],
    ))
}

fn rule_functional_safety_generic(
    _vuln: &Vulnerability,
    spec: &HardwareSpec,
) -> Option<RuleFiring> {
    if !is_functional_safety(spec.safety_level.as_deref()) {
        return None;
    }
    let level = spec.safety_level.as_deref().unwrap_or_default();
    Some(firing(
        "functional-safety-generic",
        5,
        format!(
            "Functional safety standard '{level}' is declared for this target; all \
             findings are escalated to reflect stricter acceptance criteria"
        ),
        &[fields::SAFETY_LEVEL],
    ))
}

fn rule_latency_ultra_tight(_vuln: &Vulnerability, spec: &HardwareSpec) -> Option<RuleFiring> {
    let latency = spec
        .max_interrupt_latency_us
        .filter(|us| *us <= LATENCY_ULTRA_TIGHT_US)?;
    Some(firing(
        "latency-ultra-tight",
        10,
        format!(
            "Interrupt latency budget is extremely tight at {latency}µs (≤50µs); findings \
             across any execution path are escalated due to near-zero timing slack"
        ),
        &[fields::MAX_INTERRUPT_LATENCY_US],
    ))
}

fn rule_latency_deadlock(vuln: &Vulnerability, spec: &HardwareSpec) -> Option<RuleFiring> {
    let latency = spec.max_interrupt_latency_us?;
    if vuln.category != Category::Deadlock {
        return None;
    }
    Some(firing(
        "latency-deadlock",
        20,
        format!(
            "Interrupt latency budget of {latency}µs is declared; a deadlock anywhere in \
             the system can prevent interrupt servicing and violate this budget"
        ),
        &[fields::MAX_INTERRUPT_LATENCY_US],
    ))
}

fn rule_safety_integer_overflow(vuln: &Vulnerability, spec: &HardwareSpec) -> Option<RuleFiring> {
    if !is_functional_safety(spec.safety_level.as_deref()) {
        return None;
    }
    if vuln.category != Category::IntegerOverflow {
        return None;
    }
    let level = spec.safety_level.as_deref().unwrap_or_default();
    Some(firing(
        "safety-integer-overflow",
        12,
        format!(
            "Safety standard '{level}' is active; integer overflow can silently produce \
             incorrect sensor or actuator values, violating numerical safety invariants"
        ),
        &[fields::SAFETY_LEVEL],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vuln(category: Category, function: Option<&str>) -> Vulnerability {
        Vulnerability {
            tool: "clang-analyzer".into(),
            rule_id: "test.Rule".into(),
            message: "m".into(),
            path: "main.c".into(),
            line: Some(10),
            column: None,
            function: function.map(str::to_string),
            cwe: None,
            category,
        }
    }

    fn apply_all(vuln: &Vulnerability, spec: &HardwareSpec) -> Vec<RuleFiring> {
        RULE_REGISTRY.iter().filter_map(|rule| rule(vuln, spec)).collect()
    }

    fn fired_ids(firings: &[RuleFiring]) -> Vec<&str> {
        firings.iter().map(|f| f.rule_id.as_str()).collect()
    }

    #[test]
    fn stack_tight_fires_at_boundary_for_overflow() {
        let spec = HardwareSpec {
            stack_size_bytes: Some(4096),
            ..Default::default()
        };
        let f = rule_stack_tight(&vuln(Category::BufferOverflow, None), &spec).unwrap();
        assert_eq!(f.delta, 20);
        assert_eq!(f.constraints_used, vec!["stack_size_bytes"]);
        assert!(f.rationale.contains("4096B"));
    }

    #[test]
    fn stack_tight_declines_above_threshold_or_wrong_category() {
        let roomy = HardwareSpec {
            stack_size_bytes: Some(4097),
            ..Default::default()
        };
        assert!(rule_stack_tight(&vuln(Category::BufferOverflow, None), &roomy).is_none());

        let tight = HardwareSpec {
            stack_size_bytes: Some(1024),
            ..Default::default()
        };
        assert!(rule_stack_tight(&vuln(Category::Leak, None), &tight).is_none());
    }

    #[test]
    fn stack_tight_declines_when_stack_unconstrained() {
        let spec = HardwareSpec::default();
        assert!(rule_stack_tight(&vuln(Category::BufferOverflow, None), &spec).is_none());
    }

    #[test]
    fn heap_tight_fires_only_for_leaks() {
        let spec = HardwareSpec {
            heap_size_bytes: Some(8192),
            ..Default::default()
        };
        assert!(rule_heap_tight(&vuln(Category::Leak, None), &spec).is_some());
        assert!(rule_heap_tight(&vuln(Category::UseAfterFree, None), &spec).is_none());
    }

    #[test]
    fn ram_tight_covers_memory_safety_categories() {
        let spec = HardwareSpec {
            ram_size_bytes: Some(65536),
            ..Default::default()
        };
        for cat in [Category::BufferOverflow, Category::UseAfterFree, Category::NullDeref] {
            assert!(rule_ram_tight(&vuln(cat, None), &spec).is_some(), "{cat}");
        }
        assert!(rule_ram_tight(&vuln(Category::Leak, None), &spec).is_none());
    }

    #[test]
    fn no_dynamic_heap_fires_when_heap_unset() {
        let spec = HardwareSpec::default();
        let f = rule_no_dynamic_heap(&vuln(Category::Leak, None), &spec).unwrap();
        assert_eq!(f.delta, 10);

        let with_heap = HardwareSpec {
            heap_size_bytes: Some(1024),
            ..Default::default()
        };
        assert!(rule_no_dynamic_heap(&vuln(Category::Leak, None), &with_heap).is_none());
    }

    #[test]
    fn isr_naming_heuristics() {
        for name in [
            "isr_uart",
            "ISR_timer",
            "uart_isr",
            "timer_IRQ",
            "EXTI0_IRQHandler",
            "handle_interrupt_flags",
            "HardFault_Handler",
        ] {
            assert!(is_isr_function(Some(name)), "{name} should match");
        }
        for name in ["main", "copy_input", "israel_counter_update"] {
            assert!(!is_isr_function(Some(name)), "{name} should not match");
        }
        assert!(!is_isr_function(None));
    }

    #[test]
    fn isr_name_match_fires_regardless_of_category() {
        let spec = HardwareSpec::default();
        let f = rule_isr_name_match(&vuln(Category::DivideByZero, Some("isr_uart")), &spec)
            .unwrap();
        assert_eq!(f.delta, 25);
        assert!(f.rationale.contains("isr_uart"));
    }

    #[test]
    fn isr_latency_overflow_requires_tight_budget_and_memory_safety() {
        let spec = HardwareSpec {
            max_interrupt_latency_us: Some(100),
            ..Default::default()
        };
        assert!(rule_isr_latency_overflow(&vuln(Category::NullDeref, None), &spec).is_some());
        assert!(rule_isr_latency_overflow(&vuln(Category::Leak, None), &spec).is_none());

        let loose = HardwareSpec {
            max_interrupt_latency_us: Some(101),
            ..Default::default()
        };
        assert!(rule_isr_latency_overflow(&vuln(Category::NullDeref, None), &loose).is_none());
    }

    #[test]
    fn isr_deadlock_needs_both_category_and_isr_name() {
        let spec = HardwareSpec::default();
        assert!(
            rule_isr_deadlock(&vuln(Category::Deadlock, Some("isr_uart")), &spec).is_some()
        );
        assert!(rule_isr_deadlock(&vuln(Category::Deadlock, Some("main")), &spec).is_none());
        assert!(
            rule_isr_deadlock(&vuln(Category::Leak, Some("isr_uart")), &spec).is_none()
        );
    }

    #[test]
    fn critical_function_requires_exact_list_membership() {
        let spec = HardwareSpec {
            critical_functions: vec!["brake_engage".into()],
            ..Default::default()
        };
        assert!(
            rule_critical_function(&vuln(Category::Leak, Some("brake_engage")), &spec).is_some()
        );
        assert!(
            rule_critical_function(&vuln(Category::Leak, Some("brake_release")), &spec)
                .is_none()
        );
        assert!(rule_critical_function(&vuln(Category::Leak, None), &spec).is_none());
    }

    #[test]
    fn asil_strict_matches_high_asil_case_insensitively() {
        let spec = HardwareSpec {
            safety_level: Some("ISO26262-ASIL-B".into()),
            ..Default::default()
        };
        assert!(rule_asil_strict(&vuln(Category::FormatString, None), &spec).is_some());
        assert!(rule_asil_strict(&vuln(Category::Leak, None), &spec).is_none());

        let asil_a = HardwareSpec {
            safety_level: Some("ISO26262-ASIL-A".into()),
            ..Default::default()
        };
        assert!(rule_asil_strict(&vuln(Category::FormatString, None), &asil_a).is_none());
    }

    #[test]
    fn functional_safety_generic_fires_for_any_category() {
        for level in ["MISRA-C:2012", "DO-178C Level A", "iec61508-sil2"] {
            let spec = HardwareSpec {
                safety_level: Some(level.into()),
                ..Default::default()
            };
            assert!(
                rule_functional_safety_generic(&vuln(Category::Unknown, None), &spec).is_some(),
                "{level}"
            );
        }
        let unrelated = HardwareSpec {
            safety_level: Some("in-house checklist".into()),
            ..Default::default()
        };
        assert!(
            rule_functional_safety_generic(&vuln(Category::Unknown, None), &unrelated).is_none()
        );
    }

    #[test]
    fn latency_ultra_tight_is_category_independent() {
        let spec = HardwareSpec {
            max_interrupt_latency_us: Some(50),
            ..Default::default()
        };
        assert!(rule_latency_ultra_tight(&vuln(Category::Unknown, None), &spec).is_some());

        let loose = HardwareSpec {
            max_interrupt_latency_us: Some(51),
            ..Default::default()
        };
        assert!(rule_latency_ultra_tight(&vuln(Category::Unknown, None), &loose).is_none());
    }

    #[test]
    fn latency_deadlock_fires_whenever_budget_is_declared() {
        let spec = HardwareSpec {
            max_interrupt_latency_us: Some(10_000),
            ..Default::default()
        };
        assert!(rule_latency_deadlock(&vuln(Category::Deadlock, None), &spec).is_some());
        assert!(rule_latency_deadlock(&vuln(Category::Leak, None), &spec).is_none());
        assert!(
            rule_latency_deadlock(&vuln(Category::Deadlock, None), &HardwareSpec::default())
                .is_none()
        );
    }

    #[test]
    fn safety_integer_overflow_needs_standard_and_category() {
        let spec = HardwareSpec {
            safety_level: Some("IEC61508".into()),
            ..Default::default()
        };
        let f = rule_safety_integer_overflow(&vuln(Category::IntegerOverflow, None), &spec)
            .unwrap();
        assert_eq!(f.delta, 12);
        assert!(
            rule_safety_integer_overflow(&vuln(Category::BufferOverflow, None), &spec).is_none()
        );
    }

    #[test]
    fn registry_preserves_declaration_order_in_firings() {
        let spec = HardwareSpec {
            stack_size_bytes: Some(2048),
            ram_size_bytes: Some(32 * 1024),
            safety_level: Some("ISO26262-ASIL-D".into()),
            ..Default::default()
        };
        let firings = apply_all(&vuln(Category::BufferOverflow, Some("isr_rx")), &spec);
        assert_eq!(
            fired_ids(&firings),
            vec![
                "stack-tight",
                "ram-tight",
                "isr-name-match",
                "asil-strict",
                "functional-safety-generic",
            ]
        );
    }

    #[test]
    fn rules_are_pure_given_identical_inputs() {
        let spec = HardwareSpec {
            stack_size_bytes: Some(1024),
            ..Default::default()
        };
        let v = vuln(Category::BufferOverflow, Some("isr_rx"));
        assert_eq!(apply_all(&v, &spec), apply_all(&v, &spec));
    }
}
