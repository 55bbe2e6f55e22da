//! Explanation prose for scored findings.
//!
//! Every scored item carries a few sentences of plain English: what was
//! found, where, what it does to this particular target, and which
//! constraint-driven escalations applied. The wording is deterministic so
//! reports diff cleanly between runs.

use crate::constraints::model::HardwareSpec;
use crate::report::format::{format_bytes, format_us};
use crate::sarif::model::{Category, Vulnerability};
use crate::scoring::rules::RuleFiring;

fn plain_name(category: Category) -> &'static str {
    match category {
        Category::BufferOverflow => "buffer overflow",
        Category::NullDeref => "null pointer dereference",
        Category::Leak => "memory leak",
        Category::UseAfterFree => "use-after-free",
        Category::IntegerOverflow => "integer overflow",
        Category::FormatString => "format string vulnerability",
        Category::DivideByZero => "division by zero",
        Category::Uninitialized => "uninitialized memory read",
        Category::Deadlock => "potential deadlock",
        Category::Unknown => "static analysis finding",
    }
}

fn embedded_consequence(category: Category) -> &'static str {
    match category {
        Category::BufferOverflow => {
            "corrupts adjacent memory, potentially overwriting stack frames, return \
             addresses, or global state; on a resource-constrained embedded target, \
             recovery may require a full device reset"
        }
        Category::NullDeref => {
            "triggers a processor fault (e.g., ARM HardFault) that halts execution \
             immediately; on bare-metal or RTOS targets there is typically no OS-level \
             exception handler to recover from this"
        }
        Category::Leak => {
            "permanently consumes heap or pool memory on each call path that reaches it; \
             on embedded targets with kilobytes of RAM, repeated leaks exhaust available \
             memory rapidly"
        }
        Category::UseAfterFree => {
            "accesses freed memory that may have been reallocated, introducing \
             non-deterministic behaviour; on embedded targets without full memory \
             protection, this can silently corrupt live data structures"
        }
        Category::IntegerOverflow => {
            "silently wraps arithmetic results, producing incorrect values that propagate \
             through control, sensor, or actuator calculations without any runtime \
             indication"
        }
        Category::FormatString => {
            "allows arbitrary memory reads and writes via format specifiers if user input \
             reaches the format argument; on embedded targets, this can compromise the \
             entire firmware image"
        }
        Category::DivideByZero => {
            "triggers a processor divide-by-zero fault that halts execution unless an \
             explicit trap handler is installed and tested"
        }
        Category::Uninitialized => {
            "reads indeterminate stack or register values, producing device-specific \
             non-deterministic behaviour that is difficult to reproduce and may differ \
             between debug and release builds"
        }
        Category::Deadlock => {
            "permanently blocks one or more tasks from running; on an RTOS or bare-metal \
             scheduler, this starves all dependent tasks and interrupts indefinitely"
        }
        Category::Unknown => {
            "produces undefined behaviour whose exact impact depends on the execution \
             context and runtime state"
        }
    }
}

fn location_phrase(vuln: &Vulnerability) -> String {
    match (vuln.function.as_deref(), vuln.line) {
        (Some(function), Some(line)) => {
            format!("in function '{function}' ({}:{line})", vuln.path)
        }
        (Some(function), None) => format!("in function '{function}' ({})", vuln.path),
        (None, Some(line)) => format!("at {}:{line}", vuln.path),
        (None, None) => format!("in {}", vuln.path),
    }
}

fn profile_descriptor(spec: &HardwareSpec) -> String {
    let parts: Vec<&str> = [spec.platform.as_deref(), spec.safety_level.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        "this embedded target".to_string()
    } else {
        format!("your {} target", parts.join(" / "))
    }
}

/// One sentence listing the declared budgets, used when no escalation rule
/// fired so the reader still sees what the finding was scored against.
fn budget_context_sentence(spec: &HardwareSpec) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(ram) = spec.ram_size_bytes {
        parts.push(format!("{} RAM", format_bytes(ram)));
    }
    if let Some(stack) = spec.stack_size_bytes {
        parts.push(format!("{} stack", format_bytes(stack)));
    }
    if let Some(heap) = spec.heap_size_bytes {
        parts.push(format!("{} heap", format_bytes(heap)));
    }
    if let Some(latency) = spec.max_interrupt_latency_us {
        parts.push(format!("{} interrupt latency budget", format_us(latency)));
    }
    if parts.is_empty() {
        return None;
    }
    Some(format!(
        "The constraint profile for {} declares {}.",
        profile_descriptor(spec),
        parts.join(", ")
    ))
}

fn combine_rationales(firings: &[RuleFiring]) -> String {
    let rationales: Vec<&str> = firings
        .iter()
        .map(|f| f.rationale.trim_end_matches('.'))
        .collect();
    match rationales.as_slice() {
        [only] => format!("{only}."),
        [rest @ .., last] => format!("{}; and {last}.", rest.join("; ")),
        [] => String::new(),
    }
}

pub fn build_explanation(
    vuln: &Vulnerability,
    spec: &HardwareSpec,
    base_score: u32,
    firings: &[RuleFiring],
) -> String {
    let opening = format!(
        "A {} was detected {}.",
        plain_name(vuln.category),
        location_phrase(vuln)
    );
    let profile = profile_descriptor(spec);
    let consequence = embedded_consequence(vuln.category);

    if firings.is_empty() {
        let ctx = budget_context_sentence(spec)
            .map(|s| format!(" {s}"))
            .unwrap_or_default();
        return format!(
            "{opening}{ctx} On {profile}, this {consequence}. No constraint-specific \
             escalations apply to this finding (base score: {base_score})."
        );
    }

    format!(
        "{opening} On {profile}, this {consequence}. This finding is escalated because: {}",
        combine_rationales(firings)
    )
}
