//! Cross-category price coherence.
//!
//! Sixteen fixed directional rules of the form (cheap category, expensive
//! category): beverages are priced below pizza, sides below burgers, and so
//! on. A rule only applies when the two categories' medians actually differ
//! by the configured gap in this menu, so menus whose categories naturally
//! overlap in price produce no false positives.

use ahash::AHashMap;
use serde_json::json;

use crate::consistency::stats::median_u32;
use crate::core::config::PipelineConfig;
use crate::types::{FlagSeverity, MenuItem};
use crate::vocab::headings::category;

pub const REASON_PRICE_ABOVE: &str = "cross_category_price_above";
pub const REASON_PRICE_BELOW: &str = "cross_category_price_below";

/// The 16 directional rules: (cheap, expensive).
pub const CROSS_CATEGORY_PRICE_RULES: [(&str, &str); 16] = [
    (category::BEVERAGES, category::PIZZA),
    (category::BEVERAGES, category::PASTA),
    (category::BEVERAGES, category::CALZONES),
    (category::BEVERAGES, category::BURGERS),
    (category::BEVERAGES, category::SUBS),
    (category::BEVERAGES, category::SALADS),
    (category::BEVERAGES, category::SIDES),
    (category::SIDES, category::PIZZA),
    (category::SIDES, category::PASTA),
    (category::SIDES, category::BURGERS),
    (category::SIDES, category::SUBS),
    (category::SIDES, category::CALZONES),
    (category::DESSERTS, category::PIZZA),
    (category::DESSERTS, category::PASTA),
    (category::DESSERTS, category::BURGERS),
    (category::DESSERTS, category::SUBS),
];

struct Violation {
    compared_category: String,
    compared_median_cents: u32,
    gap: f64,
}

/// Check every rule against per-category medians, flagging the single most
/// dramatic violation per item and direction.
pub fn check_cross_category_coherence(items: &mut [MenuItem], config: &PipelineConfig) {
    let mut groups: AHashMap<&str, Vec<(usize, u32)>> = AHashMap::new();
    for (idx, item) in items.iter().enumerate() {
        let Some(cat) = item.category.as_deref() else { continue };
        let Some(price) = item.primary_price_cents() else { continue };
        groups.entry(cat).or_default().push((idx, price));
    }

    let mut medians: AHashMap<&str, u32> = AHashMap::new();
    for (cat, members) in &groups {
        if members.len() < config.cross_category_min_items {
            continue;
        }
        let mut prices: Vec<u32> = members.iter().map(|(_, p)| *p).collect();
        medians.insert(*cat, median_u32(&mut prices).round() as u32);
    }

    // Strongest violation per (item, direction).
    let mut above: AHashMap<usize, Violation> = AHashMap::new();
    let mut below: AHashMap<usize, Violation> = AHashMap::new();

    for (cheap, expensive) in CROSS_CATEGORY_PRICE_RULES {
        let (Some(&cheap_median), Some(&expensive_median)) = (medians.get(cheap), medians.get(expensive)) else {
            continue;
        };
        // Small epsilon so an exact-ratio gap still counts despite float
        // representation of the threshold.
        if (expensive_median as f64) + 1e-6 < cheap_median as f64 * config.cross_category_min_gap_ratio {
            continue;
        }

        // A cheap-category item priced above the expensive category's
        // median, or an expensive-category item priced down in cheap
        // territory (below the cheap median, or below half its own
        // category's typical price), violates the rule.
        let below_cutoff = (cheap_median as f64).max(expensive_median as f64 * 0.5);

        for &(idx, price) in &groups[cheap] {
            if price > expensive_median {
                let gap = price as f64 / expensive_median as f64;
                let stronger = above.get(&idx).map(|v| gap > v.gap).unwrap_or(true);
                if stronger {
                    above.insert(
                        idx,
                        Violation {
                            compared_category: expensive.to_string(),
                            compared_median_cents: expensive_median,
                            gap,
                        },
                    );
                }
            }
        }

        for &(idx, price) in &groups[expensive] {
            if (price as f64) < below_cutoff {
                let gap = below_cutoff / price.max(1) as f64;
                let stronger = below.get(&idx).map(|v| gap > v.gap).unwrap_or(true);
                if stronger {
                    below.insert(
                        idx,
                        Violation {
                            compared_category: cheap.to_string(),
                            compared_median_cents: cheap_median,
                            gap,
                        },
                    );
                }
            }
        }
    }

    let item_snapshot: Vec<(Option<String>, Option<u32>)> = items
        .iter()
        .map(|i| (i.category.clone(), i.primary_price_cents()))
        .collect();

    for (idx, violation) in above {
        let (cat, price) = &item_snapshot[idx];
        items[idx].push_flag(
            FlagSeverity::Warn,
            REASON_PRICE_ABOVE,
            json!({
                "item_category": cat,
                "compared_category": violation.compared_category,
                "item_price_cents": price,
                "compared_median_cents": violation.compared_median_cents,
            }),
        );
    }
    for (idx, violation) in below {
        let (cat, price) = &item_snapshot[idx];
        items[idx].push_flag(
            FlagSeverity::Warn,
            REASON_PRICE_BELOW,
            json!({
                "item_category": cat,
                "compared_category": violation.compared_category,
                "item_price_cents": price,
                "compared_median_cents": violation.compared_median_cents,
            }),
        );
    }
}
