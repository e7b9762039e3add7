//! Category price outliers, category isolation, and category reassignment
//! suggestions.

use ahash::AHashMap;
use serde_json::json;

use crate::consistency::stats::{median_f64, median_u32};
use crate::core::config::PipelineConfig;
use crate::types::{FlagSeverity, MenuItem};
use crate::vocab::headings::{in_price_band, keyword_match_count};

pub const REASON_PRICE_OUTLIER: &str = "cross_item_category_price_outlier";
pub const REASON_CATEGORY_ISOLATED: &str = "cross_item_category_isolated";
pub const REASON_CATEGORY_SUGGESTION: &str = "cross_item_category_suggestion";

/// Flag items whose price deviates from their category by more than
/// `mad_multiplier` x MAD-effective. MAD is robust to outliers, unlike IQR;
/// the 10%-of-median floor avoids over-flagging tightly-clustered cheap
/// categories.
pub fn check_category_price_outliers(items: &mut [MenuItem], config: &PipelineConfig) {
    let mut groups: AHashMap<String, Vec<(usize, u32)>> = AHashMap::new();
    for (idx, item) in items.iter().enumerate() {
        let Some(category) = item.category.clone() else { continue };
        let Some(price) = item.primary_price_cents() else { continue };
        groups.entry(category).or_default().push((idx, price));
    }

    let mut pending = Vec::new();
    for (category, members) in &groups {
        if members.len() < config.min_category_samples {
            continue;
        }
        let mut prices: Vec<u32> = members.iter().map(|(_, p)| *p).collect();
        let median = median_u32(&mut prices);
        if median <= 0.0 {
            continue;
        }
        let mut deviations: Vec<f64> = members.iter().map(|(_, p)| (*p as f64 - median).abs()).collect();
        let mad = median_f64(&mut deviations);
        let mad_effective = mad.max(median * 0.10);
        let threshold = config.outlier_mad_multiplier * mad_effective;

        for (idx, price) in members {
            let deviation = (*price as f64 - median).abs();
            if deviation > threshold {
                let direction = if (*price as f64) > median { "above" } else { "below" };
                pending.push((
                    *idx,
                    json!({
                        "category": category,
                        "item_price_cents": price,
                        "category_median_cents": median as u64,
                        "category_mad_cents": mad as u64,
                        "deviation_cents": deviation as u64,
                        "threshold_cents": threshold as u64,
                        "direction": direction,
                        "category_item_count": members.len(),
                    }),
                ));
            }
        }
    }

    for (idx, details) in pending {
        items[idx].push_flag(FlagSeverity::Warn, REASON_PRICE_OUTLIER, details);
    }
}

const ISOLATION_WINDOW: isize = 2;
const ISOLATION_MIN_NEIGHBORS: usize = 2;

/// Flag items whose category differs from every categorized neighbor in a
/// +/-2 window. Needs 2+ categorized neighbors to judge.
pub fn check_category_isolation(items: &mut [MenuItem]) {
    let n = items.len() as isize;
    let mut pending = Vec::new();

    for idx in 0..items.len() {
        let Some(category) = items[idx].category.as_deref() else { continue };

        let mut neighbor_cats: Vec<String> = Vec::new();
        for offset in [-ISOLATION_WINDOW, -1, 1, ISOLATION_WINDOW] {
            let ni = idx as isize + offset;
            if ni >= 0 && ni < n {
                if let Some(nc) = items[ni as usize].category.as_deref() {
                    neighbor_cats.push(nc.to_string());
                }
            }
        }

        if neighbor_cats.len() < ISOLATION_MIN_NEIGHBORS {
            continue;
        }
        if neighbor_cats.iter().any(|nc| nc == category) {
            continue;
        }

        let mut counts: AHashMap<&str, usize> = AHashMap::new();
        for nc in &neighbor_cats {
            *counts.entry(nc.as_str()).or_insert(0) += 1;
        }
        let dominant = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(&c, _)| c.to_string())
            .expect("neighbors non-empty");

        pending.push((
            idx,
            json!({
                "item_category": category,
                "neighbor_categories": neighbor_cats,
                "dominant_neighbor_category": dominant,
                "position_index": idx,
            }),
        ));
    }

    for (idx, details) in pending {
        items[idx].push_flag(FlagSeverity::Info, REASON_CATEGORY_ISOLATED, details);
    }
}

const SUGGESTION_WINDOW: isize = 3;
const SUGGESTION_MIN_NEIGHBORS: usize = 3;
const SUGGESTION_MIN_AGREEMENT: f64 = 0.5;
const SUGGESTION_NEIGHBOR_WEIGHT: f64 = 0.40;
const SUGGESTION_KEYWORD_BONUS: f64 = 0.20;
const SUGGESTION_PRICE_BONUS: f64 = 0.15;
const SUGGESTION_LOW_CONF_BONUS: f64 = 0.10;
const SUGGESTION_HIGH_CONF_PENALTY: f64 = -0.15;
const SUGGESTION_MIN_CONFIDENCE: f64 = 0.30;
const SUGGESTION_KEYWORD_GUARD: usize = 2;
const CONF_LOW_CUTOFF: u8 = 40;
const CONF_HIGH_CUTOFF: u8 = 80;

/// Multi-signal category reassignment suggestion: neighbor agreement,
/// keyword fit, price-band fit, and original category confidence combine
/// into one score. The keyword guard suppresses suggestions for items whose
/// name clearly argues for their current category ("Caesar Salad" in
/// Salads).
pub fn check_category_suggestions(items: &mut [MenuItem]) {
    let n = items.len() as isize;
    let mut pending = Vec::new();

    for idx in 0..items.len() {
        let Some(current) = items[idx].category.as_deref() else { continue };

        let mut neighbor_cats: Vec<&str> = Vec::new();
        for offset in -SUGGESTION_WINDOW..=SUGGESTION_WINDOW {
            if offset == 0 {
                continue;
            }
            let ni = idx as isize + offset;
            if ni >= 0 && ni < n {
                if let Some(nc) = items[ni as usize].category.as_deref() {
                    neighbor_cats.push(nc);
                }
            }
        }
        if neighbor_cats.len() < SUGGESTION_MIN_NEIGHBORS {
            continue;
        }

        let mut counts: AHashMap<&str, usize> = AHashMap::new();
        for nc in &neighbor_cats {
            *counts.entry(*nc).or_insert(0) += 1;
        }
        let (dominant, dominant_count) = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(&c, &n)| (c, n))
            .expect("neighbors non-empty");
        if dominant == current {
            continue;
        }
        let agreement = dominant_count as f64 / neighbor_cats.len() as f64;
        if agreement < SUGGESTION_MIN_AGREEMENT {
            continue;
        }

        let name = items[idx].name.clone();
        let current_keywords = keyword_match_count(&name, current);
        if current_keywords >= SUGGESTION_KEYWORD_GUARD {
            continue;
        }
        let suggested_keywords = keyword_match_count(&name, dominant);

        let mut signals: Vec<String> = Vec::new();
        let mut score = SUGGESTION_NEIGHBOR_WEIGHT * agreement;
        signals.push(format!(
            "{dominant_count}/{} neighbors are {dominant}",
            neighbor_cats.len()
        ));

        if suggested_keywords > current_keywords {
            score += SUGGESTION_KEYWORD_BONUS;
            signals.push(format!("name keywords fit {dominant}"));
        } else if current_keywords > suggested_keywords {
            score -= SUGGESTION_KEYWORD_BONUS;
            signals.push(format!("name keywords fit {current}"));
        }

        if let Some(price) = items[idx].primary_price_cents() {
            let fits_suggested = in_price_band(price, dominant);
            let fits_current = in_price_band(price, current);
            match (fits_suggested, fits_current) {
                (Some(true), Some(false)) => {
                    score += SUGGESTION_PRICE_BONUS;
                    signals.push(format!("price fits {dominant} band"));
                }
                (Some(false), Some(true)) => {
                    score -= SUGGESTION_PRICE_BONUS;
                    signals.push(format!("price fits {current} band"));
                }
                _ => {}
            }
        }

        let confidence = items[idx].category_confidence.unwrap_or(50);
        if confidence < CONF_LOW_CUTOFF {
            score += SUGGESTION_LOW_CONF_BONUS;
            signals.push("original category confidence is low".to_string());
        } else if confidence >= CONF_HIGH_CUTOFF {
            score += SUGGESTION_HIGH_CONF_PENALTY;
            signals.push("original category confidence is high".to_string());
        }

        if score < SUGGESTION_MIN_CONFIDENCE {
            continue;
        }

        let rounded = (score * 10_000.0).round() / 10_000.0;
        pending.push((
            idx,
            json!({
                "current_category": current,
                "suggested_category": dominant,
                "suggestion_confidence": rounded,
                "neighbor_agreement": (agreement * 10_000.0).round() / 10_000.0,
                "neighbor_count": neighbor_cats.len(),
                "signals": signals,
            }),
        ));
    }

    for (idx, details) in pending {
        items[idx].push_flag(FlagSeverity::Info, REASON_CATEGORY_SUGGESTION, details);
    }
}
