//! Category base scores and severity tiers.

use serde::{Deserialize, Serialize};

use crate::sarif::model::Category;

pub const SCORE_MIN: u32 = 0;
pub const SCORE_MAX: u32 = 100;

pub const CRITICAL_THRESHOLD: u32 = 85;
pub const HIGH_THRESHOLD: u32 = 70;
pub const MEDIUM_THRESHOLD: u32 = 40;

pub const DEFAULT_BASE_SCORE: u32 = 35;

/// Severity tier derived from the final numeric score via fixed,
/// inclusive lower-bound thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityTier {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SeverityTier::Critical => "CRITICAL",
            SeverityTier::High => "HIGH",
            SeverityTier::Medium => "MEDIUM",
            SeverityTier::Low => "LOW",
        };
        f.write_str(label)
    }
}

/// Hardware-independent starting score per defect category. Constraint
/// rules only ever adjust from here.
pub fn base_score_for_category(category: Category) -> u32 {
    match category {
        Category::UseAfterFree => 65,
        Category::BufferOverflow => 60,
        Category::FormatString => 55,
        Category::NullDeref => 50,
        Category::IntegerOverflow => 50,
        Category::Leak => 45,
        Category::Deadlock => 45,
        Category::DivideByZero => 40,
        Category::Uninitialized => 40,
        Category::Unknown => DEFAULT_BASE_SCORE,
    }
}

pub fn score_to_tier(score: u32) -> SeverityTier {
    if score >= CRITICAL_THRESHOLD {
        SeverityTier::Critical
    } else if score >= HIGH_THRESHOLD {
        SeverityTier::High
    } else if score >= MEDIUM_THRESHOLD {
        SeverityTier::Medium
    } else {
        SeverityTier::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_scores_match_the_category_table() {
        assert_eq!(base_score_for_category(Category::UseAfterFree), 65);
        assert_eq!(base_score_for_category(Category::BufferOverflow), 60);
        assert_eq!(base_score_for_category(Category::FormatString), 55);
        assert_eq!(base_score_for_category(Category::NullDeref), 50);
        assert_eq!(base_score_for_category(Category::IntegerOverflow), 50);
        assert_eq!(base_score_for_category(Category::Leak), 45);
        assert_eq!(base_score_for_category(Category::Deadlock), 45);
        assert_eq!(base_score_for_category(Category::DivideByZero), 40);
        assert_eq!(base_score_for_category(Category::Uninitialized), 40);
        assert_eq!(base_score_for_category(Category::Unknown), 35);
    }

    #[test]
    fn tier_thresholds_are_inclusive_lower_bounds() {
        assert_eq!(score_to_tier(100), SeverityTier::Critical);
        assert_eq!(score_to_tier(85), SeverityTier::Critical);
        assert_eq!(score_to_tier(84), SeverityTier::High);
        assert_eq!(score_to_tier(70), SeverityTier::High);
        assert_eq!(score_to_tier(69), SeverityTier::Medium);
        assert_eq!(score_to_tier(40), SeverityTier::Medium);
        assert_eq!(score_to_tier(39), SeverityTier::Low);
        assert_eq!(score_to_tier(0), SeverityTier::Low);
    }

    #[test]
    fn tier_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&SeverityTier::Critical).unwrap(),
            "\"CRITICAL\""
        );
        assert_eq!(SeverityTier::High.to_string(), "HIGH");
    }
}
