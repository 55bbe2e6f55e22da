//! Human-readable unit formatting for report prose.
//!
//! Integer division is intentional; "2KB" reads better than "2.00KB" in
//! explanation sentences and the loss of precision is irrelevant at the
//! granularity these budgets are declared in.

/// Format a byte count with a binary unit suffix.
pub fn format_bytes(n: u64) -> String {
    if n >= 1_048_576 {
        format!("{}MB", n / 1_048_576)
    } else if n >= 1024 {
        format!("{}KB", n / 1024)
    } else {
        format!("{n}B")
    }
}

/// Format a microsecond count with the largest fitting time unit.
pub fn format_us(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{}s", n / 1_000_000)
    } else if n >= 1000 {
        format!("{}ms", n / 1000)
    } else {
        format!("{n}µs")
    }
}
