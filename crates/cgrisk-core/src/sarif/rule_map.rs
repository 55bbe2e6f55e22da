//! Static resolution tables from analyzer rule identifiers to the closed
//! defect taxonomy and to CWE identifiers.
//!
//! Category resolution is a cascade: exact-id table, then an ordered prefix
//! table (table order is match priority), then `Unknown`. CWE resolution
//! falls back from an exact-id table to a per-category default.

use crate::sarif::model::Category;

const RULE_CATEGORY: &[(&str, Category)] = &[
    // Buffer overflow / out-of-bounds
    ("alpha.security.ArrayBoundV2", Category::BufferOverflow),
    ("alpha.security.ReturnPtrRange", Category::BufferOverflow),
    ("alpha.unix.cstring.OutOfBounds", Category::BufferOverflow),
    ("alpha.unix.cstring.BufferOverlap", Category::BufferOverflow),
    ("security.insecureAPI.strcpy", Category::BufferOverflow),
    ("security.insecureAPI.strcat", Category::BufferOverflow),
    ("security.insecureAPI.gets", Category::BufferOverflow),
    ("security.insecureAPI.sprintf", Category::BufferOverflow),
    ("security.insecureAPI.vsprintf", Category::BufferOverflow),
    ("security.insecureAPI.scanf", Category::BufferOverflow),
    ("security.insecureAPI.strncat", Category::BufferOverflow),
    // Null dereference
    ("core.NullDereference", Category::NullDeref),
    ("alpha.core.CastToStruct", Category::NullDeref),
    ("alpha.core.NullDereference", Category::NullDeref),
    // Memory leaks
    ("unix.Malloc", Category::Leak),
    ("cplusplus.NewDeleteLeaks", Category::Leak),
    ("alpha.unix.MallocWithAnnotations", Category::Leak),
    ("alpha.cplusplus.MismatchedIterator", Category::Leak),
    // Use-after-free / double-free
    ("cplusplus.NewDelete", Category::UseAfterFree),
    ("unix.MismatchedDeallocator", Category::UseAfterFree),
    ("alpha.cplusplus.DeleteWithNonVirtualDtor", Category::UseAfterFree),
    // Integer overflow / taint
    ("alpha.security.taint.TaintPropagation", Category::IntegerOverflow),
    ("alpha.security.taint.TaintPropagationChecker", Category::IntegerOverflow),
    ("alpha.core.CastSize", Category::IntegerOverflow),
    // Format string
    ("security.insecureAPI.vfprintf", Category::FormatString),
    ("security.insecureAPI.printf", Category::FormatString),
    // Divide by zero
    ("core.DivideZero", Category::DivideByZero),
    // Uninitialized values
    ("core.uninitialized.Assign", Category::Uninitialized),
    ("core.uninitialized.Branch", Category::Uninitialized),
    ("core.uninitialized.CapturedBlockVariable", Category::Uninitialized),
    ("core.uninitialized.UndefReturn", Category::Uninitialized),
    ("core.uninitialized.ArraySubscript", Category::Uninitialized),
    // Concurrency / deadlock
    ("alpha.unix.PthreadLock", Category::Deadlock),
];

/// Scanned in order after an exact-id miss; order is priority.
const PREFIX_CATEGORY: &[(&str, Category)] = &[
    ("core.uninitialized.", Category::Uninitialized),
    ("alpha.security.taint.", Category::IntegerOverflow),
    ("alpha.unix.cstring.", Category::BufferOverflow),
    ("security.insecureAPI.", Category::BufferOverflow),
    ("cplusplus.NewDelete", Category::UseAfterFree),
    ("unix.Malloc", Category::Leak),
    ("alpha.unix.PthreadLock", Category::Deadlock),
];

const RULE_CWE: &[(&str, &str)] = &[
    ("alpha.security.ArrayBoundV2", "CWE-119"),
    ("alpha.security.ReturnPtrRange", "CWE-119"),
    ("alpha.unix.cstring.OutOfBounds", "CWE-119"),
    ("alpha.unix.cstring.BufferOverlap", "CWE-119"),
    ("security.insecureAPI.strcpy", "CWE-120"),
    ("security.insecureAPI.strcat", "CWE-120"),
    ("security.insecureAPI.gets", "CWE-120"),
    ("security.insecureAPI.sprintf", "CWE-120"),
    ("security.insecureAPI.vsprintf", "CWE-120"),
    ("security.insecureAPI.scanf", "CWE-120"),
    ("security.insecureAPI.strncat", "CWE-120"),
    ("core.NullDereference", "CWE-476"),
    ("alpha.core.CastToStruct", "CWE-476"),
    ("alpha.core.NullDereference", "CWE-476"),
    ("unix.Malloc", "CWE-401"),
    ("cplusplus.NewDeleteLeaks", "CWE-401"),
    ("alpha.unix.MallocWithAnnotations", "CWE-401"),
    ("cplusplus.NewDelete", "CWE-416"),
    ("unix.MismatchedDeallocator", "CWE-416"),
    ("alpha.security.taint.TaintPropagation", "CWE-190"),
    ("alpha.core.CastSize", "CWE-190"),
    ("security.insecureAPI.vfprintf", "CWE-134"),
    ("security.insecureAPI.printf", "CWE-134"),
    ("core.DivideZero", "CWE-369"),
    ("core.uninitialized.Assign", "CWE-457"),
    ("core.uninitialized.Branch", "CWE-457"),
    ("core.uninitialized.CapturedBlockVariable", "CWE-457"),
    ("core.uninitialized.UndefReturn", "CWE-457"),
    ("core.uninitialized.ArraySubscript", "CWE-457"),
    ("alpha.unix.PthreadLock", "CWE-833"),
];

/// Resolve a rule identifier into the closed taxonomy.
pub fn resolve_category(rule_id: &str) -> Category {
    if let Some((_, category)) = RULE_CATEGORY.iter().find(|(id, _)| *id == rule_id) {
        return *category;
    }
    for (prefix, category) in PREFIX_CATEGORY {
        if rule_id.starts_with(prefix) {
            return *category;
        }
    }
    Category::Unknown
}

fn category_fallback_cwe(category: Category) -> Option<&'static str> {
    match category {
        Category::BufferOverflow => Some("CWE-120"),
        Category::NullDeref => Some("CWE-476"),
        Category::Leak => Some("CWE-401"),
        Category::UseAfterFree => Some("CWE-416"),
        Category::IntegerOverflow => Some("CWE-190"),
        Category::FormatString => Some("CWE-134"),
        Category::DivideByZero => Some("CWE-369"),
        Category::Uninitialized => Some("CWE-457"),
        Category::Deadlock => Some("CWE-833"),
        Category::Unknown => None,
    }
}

/// Resolve a CWE identifier: exact rule-id table first, then the
/// per-category fallback.
pub fn resolve_cwe(rule_id: &str, category: Category) -> Option<&'static str> {
    RULE_CWE
        .iter()
        .find(|(id, _)| *id == rule_id)
        .map(|(_, cwe)| *cwe)
        .or_else(|| category_fallback_cwe(category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_id_lookup_wins() {
        assert_eq!(resolve_category("core.NullDereference"), Category::NullDeref);
        assert_eq!(resolve_category("unix.Malloc"), Category::Leak);
        assert_eq!(resolve_category("alpha.unix.PthreadLock"), Category::Deadlock);
    }

    #[test]
    fn prefix_match_applies_after_exact_miss() {
        assert_eq!(
            resolve_category("core.uninitialized.SomeNewChecker"),
            Category::Uninitialized
        );
        assert_eq!(
            resolve_category("security.insecureAPI.memset"),
            Category::BufferOverflow
        );
        // "cplusplus.NewDeleteLeaks" resolves exactly to Leak even though
        // the "cplusplus.NewDelete" prefix would map it to UseAfterFree.
        assert_eq!(resolve_category("cplusplus.NewDeleteLeaks"), Category::Leak);
    }

    #[test]
    fn prefix_table_order_is_priority() {
        // An id matching two prefixes resolves to the earliest table entry.
        assert_eq!(
            resolve_category("alpha.security.taint.NewThing"),
            Category::IntegerOverflow
        );
    }

    #[test]
    fn unmatched_rule_ids_fall_to_unknown() {
        assert_eq!(resolve_category("vendor.custom.Checker"), Category::Unknown);
        assert_eq!(resolve_category(""), Category::Unknown);
    }

    #[test]
    fn cwe_exact_rule_lookup() {
        assert_eq!(resolve_cwe("core.DivideZero", Category::DivideByZero), Some("CWE-369"));
        assert_eq!(
            resolve_cwe("security.insecureAPI.strcpy", Category::BufferOverflow),
            Some("CWE-120")
        );
    }

    #[test]
    fn cwe_falls_back_to_category_default() {
        assert_eq!(
            resolve_cwe("vendor.custom.Overflow", Category::BufferOverflow),
            Some("CWE-120")
        );
        assert_eq!(
            resolve_cwe("vendor.custom.Lock", Category::Deadlock),
            Some("CWE-833")
        );
    }

    #[test]
    fn unknown_category_has_no_fallback_cwe() {
        assert_eq!(resolve_cwe("vendor.custom.Checker", Category::Unknown), None);
    }
}
