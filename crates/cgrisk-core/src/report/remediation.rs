//! Remediation guidance per vulnerability category.
//!
//! Each category has a base template written for embedded C firmware. When
//! the constraint profile makes one specific fix strategy clearly more
//! urgent, a single targeted addendum is appended; addenda are checked in a
//! fixed priority order and at most one applies.

use crate::constraints::model::HardwareSpec;
use crate::report::format::{format_bytes, format_us};
use crate::sarif::model::Category;
use crate::scoring::rules::{HEAP_TIGHT_BYTES, STACK_TIGHT_BYTES};

fn base_template(category: Category) -> &'static str {
    match category {
        Category::BufferOverflow => {
            "Replace unsafe memory operations with size-bounded equivalents (strncpy, \
             snprintf, memcpy with explicit length). Validate all input lengths before \
             copying into fixed-size buffers. On embedded targets, prefer statically-sized \
             buffers with compile-time size assertions that enforce upper bounds."
        }
        Category::NullDeref => {
            "Add null-pointer guards before every pointer dereference. Use assertion \
             macros in debug builds and explicit error-return paths in production. On \
             bare-metal targets, a null dereference typically triggers a HardFault; \
             ensure a fault handler is installed that logs diagnostics and performs a \
             controlled reset."
        }
        Category::Leak => {
            "Ensure every allocation has a corresponding free on all exit paths, including \
             error paths. On embedded targets, consider replacing dynamic allocation with \
             a static memory pool or arena allocator, which eliminates fragmentation and \
             removes leak risk entirely. MISRA C Rule 21.3 prohibits dynamic memory \
             allocation in safety-critical code."
        }
        Category::UseAfterFree => {
            "Set pointers to NULL immediately after freeing. Audit all pointer copies and \
             lifetime boundaries; prefer single-owner allocation patterns. On embedded \
             firmware, apply MPU read-after-free detection during testing if the hardware \
             supports memory protection."
        }
        Category::IntegerOverflow => {
            "Validate arithmetic operands against their type bounds before computation. \
             Enable UBSan (undefined behaviour sanitizer) during testing. In \
             safety-critical paths, use checked-arithmetic macros or a safe-integer \
             library that returns an error on overflow instead of wrapping silently."
        }
        Category::FormatString => {
            "Replace any user-controlled format string argument with a fixed literal: use \
             printf(\"%s\", user_input) rather than printf(user_input). On embedded \
             targets, restrict or disable formatted I/O in production builds to reduce \
             both attack surface and code size."
        }
        Category::DivideByZero => {
            "Guard all divisors with an explicit non-zero check before division. Return a \
             safe default or error code when the divisor is zero. On embedded targets, \
             install a divide-by-zero trap handler that logs a diagnostic and performs a \
             controlled reset rather than leaving the system in an unknown state."
        }
        Category::Uninitialized => {
            "Initialize all variables at the point of declaration. Enable -Wuninitialized \
             and -Wmaybe-uninitialized compiler warnings and treat them as errors. In \
             safety-critical code, zero-initialize all buffers and structs explicitly and \
             avoid relying on BSS initialization order across translation units."
        }
        Category::Deadlock => {
            "Enforce a consistent global lock-acquisition ordering across all execution \
             paths. Avoid holding locks while calling functions that may acquire \
             additional locks. On RTOS-based targets, use priority-ceiling or \
             priority-inheritance mutexes to prevent priority inversion alongside \
             deadlock risks."
        }
        Category::Unknown => {
            "Review the finding manually and apply the principle of least privilege. \
             Consult the static analyzer's rule documentation for guidance specific to \
             this rule. On embedded targets, treat any undefined behaviour conservatively; \
             assume it can corrupt device state and require a hardware reset to recover."
        }
    }
}

fn constraint_addendum(category: Category, spec: &HardwareSpec) -> Option<String> {
    if matches!(category, Category::BufferOverflow | Category::UseAfterFree) {
        if let Some(stack) = spec.stack_size_bytes.filter(|b| *b <= STACK_TIGHT_BYTES) {
            return Some(format!(
                "With only {} of stack on this target, overflows are more likely to \
                 silently corrupt adjacent frames; enable stack canaries \
                 (-fstack-protector-all) and MPU stack-guard regions if the hardware \
                 supports it.",
                format_bytes(stack)
            ));
        }
    }

    if category == Category::Leak {
        if let Some(heap) = spec.heap_size_bytes.filter(|b| *b <= HEAP_TIGHT_BYTES) {
            return Some(format!(
                "With only {} of heap on this target, a single recurring leak path will \
                 exhaust memory quickly; replacing all dynamic allocation with a \
                 fixed-size pool allocator is strongly recommended.",
                format_bytes(heap)
            ));
        }
    }

    if category == Category::NullDeref && !spec.critical_functions.is_empty() {
        return Some(
            "In safety-critical functions, add both a pre-condition null check and a \
             static assertion to document and enforce the non-null invariant at compile \
             time."
                .to_string(),
        );
    }

    if category == Category::IntegerOverflow {
        if let Some(level) = spec.safety_level.as_deref() {
            return Some(format!(
                "Under {level}, apply a MISRA-compliant checked-arithmetic pattern for \
                 every arithmetic operation in the call path of this finding."
            ));
        }
    }

    if category == Category::Deadlock {
        if let Some(latency) = spec.max_interrupt_latency_us {
            return Some(format!(
                "With a {} interrupt latency budget, any deadlock that blocks interrupt \
                 servicing will immediately violate this budget; audit all lock \
                 acquisitions in interrupt-shared code paths.",
                format_us(latency)
            ));
        }
    }

    if category == Category::Uninitialized {
        if let Some(level) = spec.safety_level.as_deref() {
            return Some(format!(
                "Under {level}, treat uninitialized reads as non-compliant by default and \
                 require zero-initialization of all local variables in safety-relevant \
                 translation units."
            ));
        }
    }

    None
}

pub fn build_remediation(category: Category, spec: &HardwareSpec) -> String {
    let base = base_template(category);
    match constraint_addendum(category, spec) {
        Some(addendum) => format!("{base} {addendum}"),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_profile_returns_base_template_only() {
        let text = build_remediation(Category::BufferOverflow, &HardwareSpec::default());
        assert!(text.starts_with("Replace unsafe memory operations"));
        assert!(!text.contains("stack canaries"));
    }

    #[test]
    fn tight_stack_adds_canary_addendum_for_overflow_and_uaf() {
        let spec = HardwareSpec {
            stack_size_bytes: Some(2048),
            ..Default::default()
        };
        for category in [Category::BufferOverflow, Category::UseAfterFree] {
            let text = build_remediation(category, &spec);
            assert!(text.contains("With only 2KB of stack"), "{category}");
            assert!(text.contains("-fstack-protector-all"), "{category}");
        }
        assert!(!build_remediation(Category::Leak, &spec).contains("stack canaries"));
    }

    #[test]
    fn roomy_stack_gets_no_addendum() {
        let spec = HardwareSpec {
            stack_size_bytes: Some(16 * 1024),
            ..Default::default()
        };
        let text = build_remediation(Category::BufferOverflow, &spec);
        assert!(!text.contains("With only"));
    }

    #[test]
    fn tight_heap_adds_pool_allocator_addendum_for_leaks() {
        let spec = HardwareSpec {
            heap_size_bytes: Some(4096),
            ..Default::default()
        };
        let text = build_remediation(Category::Leak, &spec);
        assert!(text.contains("With only 4KB of heap"));
        assert!(text.contains("fixed-size pool allocator"));
    }

    #[test]
    fn critical_functions_add_null_check_addendum() {
        let spec = HardwareSpec {
            critical_functions: vec!["brake_engage".into()],
            ..Default::default()
        };
        let text = build_remediation(Category::NullDeref, &spec);
        assert!(text.contains("static assertion"));
    }

    #[test]
    fn safety_level_addenda_name_the_standard() {
        let spec = HardwareSpec {
            safety_level: Some("ISO26262-ASIL-B".into()),
            ..Default::default()
        };
        assert!(
            build_remediation(Category::IntegerOverflow, &spec)
                .contains("Under ISO26262-ASIL-B, apply a MISRA-compliant")
        );
        assert!(
            build_remediation(Category::Uninitialized, &spec)
                .contains("Under ISO26262-ASIL-B, treat uninitialized reads")
        );
    }

    #[test]
    fn latency_budget_adds_deadlock_addendum() {
        let spec = HardwareSpec {
            max_interrupt_latency_us: Some(100),
            ..Default::default()
        };
        let text = build_remediation(Category::Deadlock, &spec);
        assert!(text.contains("With a 100µs interrupt latency budget"));
    }
}
