//! Variant-pattern consistency within a category: modal variant count,
//! dominant size-label set, and MAD-based price-step expectations.

use ahash::AHashMap;
use serde_json::json;

use crate::consistency::stats::median_f64;
use crate::types::{FlagSeverity, MenuItem, VariantKind};
use crate::vocab::size::size_ordinal;

pub const REASON_VARIANT_COUNT_OUTLIER: &str = "cross_item_variant_count_outlier";
pub const REASON_VARIANT_LABEL_MISMATCH: &str = "cross_item_variant_label_mismatch";
pub const REASON_PRICE_STEP_OUTLIER: &str = "cross_item_price_step_outlier";

const VARIANT_COUNT_MIN_ITEMS: usize = 3;
const VARIANT_COUNT_MIN_GAP: usize = 2;
const VARIANT_LABEL_MIN_ITEMS: usize = 3;
const VARIANT_LABEL_MIN_AGREEMENT: f64 = 0.60;
const PRICE_STEP_MIN_ITEMS: usize = 3;
const PRICE_STEP_MAD_MULTIPLIER: f64 = 3.0;

fn category_of(item: &MenuItem) -> Option<&str> {
    item.category.as_deref().filter(|c| !c.is_empty())
}

/// Flag items whose variant count sits 2+ below their category's mode among
/// multi-variant items.
pub fn check_variant_count_consistency(items: &mut [MenuItem]) {
    let mut groups: AHashMap<String, Vec<(usize, usize)>> = AHashMap::new();
    for (idx, item) in items.iter().enumerate() {
        let Some(cat) = category_of(item) else { continue };
        let count = item.variants.len();
        if count >= 2 {
            groups.entry(cat.to_string()).or_default().push((idx, count));
        }
    }

    let mut pending = Vec::new();
    for (cat, members) in &groups {
        if members.len() < VARIANT_COUNT_MIN_ITEMS {
            continue;
        }
        let mut freq: AHashMap<usize, usize> = AHashMap::new();
        for (_, count) in members {
            *freq.entry(*count).or_insert(0) += 1;
        }
        let mode = freq
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)))
            .map(|(&c, _)| c)
            .expect("group non-empty");

        for (idx, count) in members {
            if mode.saturating_sub(*count) >= VARIANT_COUNT_MIN_GAP {
                pending.push((
                    *idx,
                    json!({
                        "category": cat,
                        "item_variant_count": count,
                        "category_mode_count": mode,
                        "category_multi_variant_items": members.len(),
                    }),
                ));
            }
        }
    }

    for (idx, details) in pending {
        items[idx].push_flag(FlagSeverity::Info, REASON_VARIANT_COUNT_OUTLIER, details);
    }
}

fn size_label_set(item: &MenuItem) -> Vec<String> {
    let mut labels: Vec<String> = item
        .variants
        .iter()
        .filter(|v| v.kind == VariantKind::Size)
        .filter_map(|v| v.normalized_size.clone())
        .collect();
    labels.sort();
    labels.dedup();
    labels
}

fn is_subset(a: &[String], b: &[String]) -> bool {
    a.iter().all(|x| b.contains(x))
}

/// Flag items whose size-label set disagrees with the category's dominant
/// set. Subsets and supersets are tolerated; a gourmet item offering only
/// M/L under a dominant S/M/L is fine, disjoint inch labels are not.
pub fn check_variant_label_consistency(items: &mut [MenuItem]) {
    let mut groups: AHashMap<String, Vec<(usize, Vec<String>)>> = AHashMap::new();
    for (idx, item) in items.iter().enumerate() {
        let Some(cat) = category_of(item) else { continue };
        let labels = size_label_set(item);
        if labels.len() >= 2 {
            groups.entry(cat.to_string()).or_default().push((idx, labels));
        }
    }

    let mut pending = Vec::new();
    for (cat, members) in &groups {
        if members.len() < VARIANT_LABEL_MIN_ITEMS {
            continue;
        }
        let mut freq: AHashMap<&[String], usize> = AHashMap::new();
        for (_, labels) in members {
            *freq.entry(labels.as_slice()).or_insert(0) += 1;
        }
        let (dominant, dominant_count) = freq
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.len().cmp(&a.0.len())))
            .map(|(&l, &c)| (l.to_vec(), c))
            .expect("group non-empty");

        if (dominant_count as f64) < VARIANT_LABEL_MIN_AGREEMENT * members.len() as f64 {
            continue;
        }

        for (idx, labels) in members {
            if labels.as_slice() == dominant.as_slice() {
                continue;
            }
            if is_subset(labels, &dominant) || is_subset(&dominant, labels) {
                continue;
            }
            pending.push((
                *idx,
                json!({
                    "category": cat,
                    "item_labels": labels,
                    "dominant_labels": dominant,
                    "dominant_count": dominant_count,
                }),
            ));
        }
    }

    for (idx, details) in pending {
        items[idx].push_flag(FlagSeverity::Info, REASON_VARIANT_LABEL_MISMATCH, details);
    }
}

/// Average positive price step between consecutive (ordinal-sorted) size
/// variants. Items with no positive step (inversions, single sizes) are
/// excluded.
fn average_price_step(item: &MenuItem) -> Option<f64> {
    let mut sized: Vec<(i64, u32)> = item
        .variants
        .iter()
        .filter(|v| v.kind == VariantKind::Size && v.price_cents > 0)
        .filter_map(|v| {
            let ns = v.normalized_size.as_deref()?;
            Some((size_ordinal(ns)?, v.price_cents))
        })
        .collect();
    if sized.len() < 2 {
        return None;
    }
    sized.sort_by_key(|(ordinal, _)| *ordinal);

    let steps: Vec<f64> = sized
        .windows(2)
        .filter_map(|pair| {
            let diff = pair[1].1 as i64 - pair[0].1 as i64;
            (diff > 0).then_some(diff as f64)
        })
        .collect();
    if steps.is_empty() {
        return None;
    }
    Some(steps.iter().sum::<f64>() / steps.len() as f64)
}

/// Flag items whose inter-size price step deviates dramatically from the
/// category's MAD-based expected step.
pub fn check_variant_price_steps(items: &mut [MenuItem]) {
    let mut groups: AHashMap<String, Vec<(usize, f64)>> = AHashMap::new();
    for (idx, item) in items.iter().enumerate() {
        let Some(cat) = category_of(item) else { continue };
        if let Some(step) = average_price_step(item) {
            groups.entry(cat.to_string()).or_default().push((idx, step));
        }
    }

    let mut pending = Vec::new();
    for (cat, members) in &groups {
        if members.len() < PRICE_STEP_MIN_ITEMS {
            continue;
        }
        let mut steps: Vec<f64> = members.iter().map(|(_, s)| *s).collect();
        let median = median_f64(&mut steps.clone());
        if median <= 0.0 {
            continue;
        }
        let mut deviations: Vec<f64> = steps.iter().map(|s| (s - median).abs()).collect();
        let mad = median_f64(&mut deviations);
        let mad_effective = mad.max(median * 0.10);
        let threshold = PRICE_STEP_MAD_MULTIPLIER * mad_effective;

        for (idx, step) in members {
            let deviation = (step - median).abs();
            if deviation > threshold {
                let direction = if *step > median { "above" } else { "below" };
                pending.push((
                    *idx,
                    json!({
                        "category": cat,
                        "item_avg_step_cents": step.round() as u64,
                        "category_median_step_cents": median.round() as u64,
                        "direction": direction,
                    }),
                ));
            }
        }
    }

    for (idx, details) in pending {
        items[idx].push_flag(FlagSeverity::Info, REASON_PRICE_STEP_OUTLIER, details);
    }
}
