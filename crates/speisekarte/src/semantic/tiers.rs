//! Confidence tier classification and the menu-level confidence summary.

use std::collections::BTreeMap;

use crate::types::{CategoryConfidenceSummary, ConfidenceTier, MenuConfidenceSummary, MenuItem, TierCounts};

pub const TIER_HIGH: f64 = 0.80;
pub const TIER_MEDIUM: f64 = 0.60;
pub const TIER_LOW: f64 = 0.40;

pub const GRADE_A_THRESHOLD: f64 = 0.80;
pub const GRADE_B_THRESHOLD: f64 = 0.60;
pub const GRADE_C_THRESHOLD: f64 = 0.40;

const UNCATEGORIZED: &str = "Uncategorized";

/// Tier for a semantic confidence score.
pub fn tier_for_score(score: f64) -> ConfidenceTier {
    if score >= TIER_HIGH {
        ConfidenceTier::High
    } else if score >= TIER_MEDIUM {
        ConfidenceTier::Medium
    } else if score >= TIER_LOW {
        ConfidenceTier::Low
    } else {
        ConfidenceTier::Reject
    }
}

/// Assign `semantic_tier` and `needs_review` per item. A missing confidence
/// value defaults defensively to Reject + review. Idempotent.
pub fn classify_confidence_tiers(items: &mut [MenuItem]) {
    for item in items {
        let tier = match item.semantic_confidence {
            Some(score) => tier_for_score(score),
            None => ConfidenceTier::Reject,
        };
        item.semantic_tier = Some(tier);
        item.needs_review = tier != ConfidenceTier::High;
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Grade by percentage of high-tier items: A >= 80%, B >= 60%, C >= 40%,
/// else D.
pub fn quality_grade(high_count: usize, total: usize) -> &'static str {
    if total == 0 {
        return "D";
    }
    let share = high_count as f64 / total as f64;
    if share >= GRADE_A_THRESHOLD {
        "A"
    } else if share >= GRADE_B_THRESHOLD {
        "B"
    } else if share >= GRADE_C_THRESHOLD {
        "C"
    } else {
        "D"
    }
}

/// Aggregate confidence statistics over a completed item list. Read-only.
pub fn compute_menu_confidence_summary(items: &[MenuItem]) -> MenuConfidenceSummary {
    let total = items.len();
    if total == 0 {
        return MenuConfidenceSummary {
            total_items: 0,
            mean_confidence: 0.0,
            median_confidence: 0.0,
            stdev_confidence: 0.0,
            tier_counts: TierCounts::default(),
            needs_review_count: 0,
            quality_grade: "D".to_string(),
            category_summary: BTreeMap::new(),
        };
    }

    let scores: Vec<f64> = items.iter().map(|i| i.semantic_confidence.unwrap_or(0.0)).collect();
    let mean = scores.iter().sum::<f64>() / total as f64;

    let mut sorted = scores.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("confidence is never NaN"));
    let median = if total % 2 == 1 {
        sorted[total / 2]
    } else {
        (sorted[total / 2 - 1] + sorted[total / 2]) / 2.0
    };

    let stdev = if total > 1 {
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (total - 1) as f64;
        variance.sqrt()
    } else {
        0.0
    };

    let mut tier_counts = TierCounts::default();
    let mut needs_review_count = 0;
    let mut categories: BTreeMap<String, (Vec<f64>, TierCounts, usize)> = BTreeMap::new();

    for item in items {
        let tier = item.semantic_tier.unwrap_or(ConfidenceTier::Reject);
        tier_counts.bump(tier);
        if item.needs_review {
            needs_review_count += 1;
        }

        let category = item
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED)
            .to_string();
        let entry = categories.entry(category).or_default();
        entry.0.push(item.semantic_confidence.unwrap_or(0.0));
        entry.1.bump(tier);
        if item.needs_review {
            entry.2 += 1;
        }
    }

    let category_summary = categories
        .into_iter()
        .map(|(cat, (scores, tiers, review))| {
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            (
                cat,
                CategoryConfidenceSummary {
                    count: scores.len(),
                    mean: round4(mean),
                    tier_counts: tiers,
                    needs_review_count: review,
                },
            )
        })
        .collect();

    MenuConfidenceSummary {
        total_items: total,
        mean_confidence: round4(mean),
        median_confidence: round4(median),
        stdev_confidence: round4(stdev),
        quality_grade: quality_grade(tier_counts.high, total).to_string(),
        tier_counts,
        needs_review_count,
        category_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::tests_support::bare_item;

    fn scored_item(score: f64, category: Option<&str>) -> MenuItem {
        let mut item = bare_item("Scored Item");
        item.semantic_confidence = Some(score);
        item.category = category.map(str::to_string);
        item
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_for_score(1.0), ConfidenceTier::High);
        assert_eq!(tier_for_score(0.80), ConfidenceTier::High);
        assert_eq!(tier_for_score(0.7999), ConfidenceTier::Medium);
        assert_eq!(tier_for_score(0.60), ConfidenceTier::Medium);
        assert_eq!(tier_for_score(0.5999), ConfidenceTier::Low);
        assert_eq!(tier_for_score(0.40), ConfidenceTier::Low);
        assert_eq!(tier_for_score(0.3999), ConfidenceTier::Reject);
        assert_eq!(tier_for_score(0.0), ConfidenceTier::Reject);
    }

    #[test]
    fn test_classification_sets_review() {
        let mut items = vec![scored_item(0.90, None), scored_item(0.70, None), scored_item(0.50, None)];
        classify_confidence_tiers(&mut items);
        assert_eq!(items[0].semantic_tier, Some(ConfidenceTier::High));
        assert!(!items[0].needs_review);
        assert_eq!(items[1].semantic_tier, Some(ConfidenceTier::Medium));
        assert!(items[1].needs_review);
        assert_eq!(items[2].semantic_tier, Some(ConfidenceTier::Low));
        assert!(items[2].needs_review);
    }

    #[test]
    fn test_missing_confidence_defaults_to_reject() {
        let mut items = vec![bare_item("No Score")];
        classify_confidence_tiers(&mut items);
        assert_eq!(items[0].semantic_tier, Some(ConfidenceTier::Reject));
        assert!(items[0].needs_review);
    }

    #[test]
    fn test_classification_idempotent() {
        let mut items = vec![scored_item(0.85, None)];
        classify_confidence_tiers(&mut items);
        let first = items[0].semantic_tier;
        classify_confidence_tiers(&mut items);
        assert_eq!(items[0].semantic_tier, first);
    }

    fn tiered(score: f64, category: &str) -> MenuItem {
        let mut item = scored_item(score, Some(category));
        classify_confidence_tiers(std::slice::from_mut(&mut item));
        item
    }

    #[test]
    fn test_empty_summary() {
        let summary = compute_menu_confidence_summary(&[]);
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.quality_grade, "D");
    }

    #[test]
    fn test_summary_statistics() {
        let items: Vec<MenuItem> = [0.95, 0.85, 0.70, 0.50, 0.30]
            .iter()
            .map(|&s| tiered(s, "Pizza"))
            .collect();
        let summary = compute_menu_confidence_summary(&items);
        assert_eq!(summary.total_items, 5);
        assert_eq!(summary.tier_counts.high, 2);
        assert_eq!(summary.tier_counts.medium, 1);
        assert_eq!(summary.tier_counts.low, 1);
        assert_eq!(summary.tier_counts.reject, 1);
        assert_eq!(summary.needs_review_count, 3);
        assert!((summary.mean_confidence - 0.66).abs() < 1e-9);
        assert!((summary.median_confidence - 0.70).abs() < 1e-9);
        assert!(summary.stdev_confidence > 0.0);
    }

    #[test]
    fn test_grade_thresholds() {
        let menu = |high: usize, low: usize| {
            let mut items: Vec<MenuItem> = (0..high).map(|_| tiered(0.90, "Pizza")).collect();
            items.extend((0..low).map(|_| tiered(0.50, "Pizza")));
            compute_menu_confidence_summary(&items).quality_grade
        };
        assert_eq!(menu(10, 0), "A");
        assert_eq!(menu(8, 2), "A");
        assert_eq!(menu(7, 3), "B");
        assert_eq!(menu(6, 4), "B");
        assert_eq!(menu(5, 5), "C");
        assert_eq!(menu(4, 6), "C");
        assert_eq!(menu(3, 7), "D");
        assert_eq!(menu(0, 5), "D");
    }

    #[test]
    fn test_category_breakdown() {
        let items = vec![
            tiered(0.90, "Pizza"),
            tiered(0.85, "Pizza"),
            tiered(0.70, "Pizza"),
            tiered(0.50, "Wings"),
        ];
        let summary = compute_menu_confidence_summary(&items);
        let pizza = &summary.category_summary["Pizza"];
        assert_eq!(pizza.count, 3);
        assert!((pizza.mean - round4((0.90 + 0.85 + 0.70) / 3.0)).abs() < 1e-9);
        assert_eq!(pizza.needs_review_count, 1);
        assert_eq!(pizza.tier_counts.high, 2);
        assert_eq!(summary.category_summary["Wings"].count, 1);
    }

    #[test]
    fn test_uncategorized_bucket() {
        let items = vec![tiered(0.80, "")];
        let summary = compute_menu_confidence_summary(&items);
        assert!(summary.category_summary.contains_key("Uncategorized"));
    }

    #[test]
    fn test_single_item_stdev_zero() {
        let items = vec![tiered(0.90, "Pizza")];
        let summary = compute_menu_confidence_summary(&items);
        assert_eq!(summary.stdev_confidence, 0.0);
        assert_eq!(summary.quality_grade, "A");
    }
}
