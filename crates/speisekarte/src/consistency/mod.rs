//! Cross-item consistency checks.
//!
//! These run once over the complete item list (they need global context) and
//! are additive-only: they attach flags, never mutate name/price/category.
//! Mutation is reserved for the opt-in repair engine.

pub mod coherence;
pub mod duplicates;
pub mod outliers;
pub mod patterns;

pub(crate) mod stats {
    /// Median of integer cents, averaging the middle pair on even counts.
    pub fn median_u32(values: &mut [u32]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.sort_unstable();
        let n = values.len();
        if n % 2 == 1 {
            values[n / 2] as f64
        } else {
            (values[n / 2 - 1] as f64 + values[n / 2] as f64) / 2.0
        }
    }

    pub fn median_f64(values: &mut [f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        values.sort_by(|a, b| a.partial_cmp(b).expect("menu statistics are never NaN"));
        let n = values.len();
        if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) / 2.0
        }
    }
}

use crate::core::config::PipelineConfig;
use crate::types::MenuItem;

/// Run all eight cross-item checks. Each inspects a disjoint concern, so
/// the order among them does not matter; running twice on an unmodified
/// list produces identical flag sets.
pub fn check_cross_item_consistency(items: &mut [MenuItem], config: &PipelineConfig) {
    if items.len() < 2 {
        return;
    }
    duplicates::check_duplicate_names(items, config);
    outliers::check_category_price_outliers(items, config);
    outliers::check_category_isolation(items);
    outliers::check_category_suggestions(items);
    coherence::check_cross_category_coherence(items, config);
    patterns::check_variant_count_consistency(items);
    patterns::check_variant_label_consistency(items);
    patterns::check_variant_price_steps(items);
}


#[cfg(test)]
mod tests {
    use super::*;
    use tests_support::priced_item;

    #[test]
    fn test_single_item_is_a_noop() {
        let mut items = vec![priced_item("Cheese Pizza", "Pizza", 1099)];
        check_cross_item_consistency(&mut items, &PipelineConfig::default());
        assert!(items[0].flags.is_empty());
    }

    #[test]
    fn test_deduplication_determinism() {
        let build = || {
            let mut items = vec![
                priced_item("Cheese Pizza", "Pizza", 1099),
                priced_item("Cheese Pizza", "Pizza", 1299),
                priced_item("Pepperoni Pizza", "Pizza", 1399),
                priced_item("Coke", "Beverages", 199),
                priced_item("Sprite", "Beverages", 199),
                priced_item("Iced Tea", "Beverages", 249),
            ];
            check_cross_item_consistency(&mut items, &PipelineConfig::default());
            items
                .iter()
                .map(|i| {
                    let mut reasons: Vec<String> = i.flags.iter().map(|f| f.reason.clone()).collect();
                    reasons.sort();
                    reasons
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_all_cross_item_flags_use_reason_prefixes() {
        let mut items = vec![
            priced_item("Pizza A", "Pizza", 1299),
            priced_item("Pizza B", "Pizza", 1399),
            priced_item("Pizza C", "Pizza", 1499),
            priced_item("Pizza D", "Pizza", 9999),
        ];
        check_cross_item_consistency(&mut items, &PipelineConfig::default());
        for item in &items {
            for flag in &item.flags {
                assert!(
                    flag.reason.starts_with("cross_item_") || flag.reason.starts_with("cross_category_"),
                    "unexpected reason: {}",
                    flag.reason
                );
            }
        }
    }
}
