pub mod deterministic;
pub mod units;
