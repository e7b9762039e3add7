//! Unified per-item semantic confidence from five weighted signals.
//!
//! Signals: grammar/parse confidence, name quality, price presence, variant
//! quality, and flag penalty. Every signal's raw value, weight, and weighted
//! contribution is retained in the audit record.

use crate::types::{FlagSeverity, MenuItem, SemanticConfidenceDetails};

pub const W_GRAMMAR: f64 = 0.30;
pub const W_NAME: f64 = 0.20;
pub const W_PRICE: f64 = 0.20;
pub const W_VARIANT: f64 = 0.15;
pub const W_FLAGS: f64 = 0.15;

const FLAG_PENALTY_WARN: f64 = 0.15;
const FLAG_PENALTY_INFO: f64 = 0.05;
const FLAG_PENALTY_AUTOFIX: f64 = 0.02;

const NAME_SHORT_THRESHOLD: usize = 3;
const NAME_MEDIUM_THRESHOLD: usize = 6;

const PRICE_PRESENT_SCORE: f64 = 1.0;
const PRICE_ABSENT_SCORE: f64 = 0.3;

const DEFAULT_VARIANT_SCORE: f64 = 0.5;

// Garble detection for scoring purposes: a stricter cousin of the span
// stripper (no length signal, tighter ratios) applied to parsed names.
const GARBLE_CHARS: &str = "secrnotvw";

fn has_triple_repeat(text: &str) -> bool {
    let chars: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Whether a parsed name still reads as OCR garble rather than a real menu
/// item name.
pub fn is_name_garbled(name: &str) -> bool {
    let alpha: Vec<char> = name.chars().filter(|c| c.is_alphabetic()).collect();
    if alpha.len() < 4 {
        return false;
    }
    let garble_hits = alpha
        .iter()
        .filter(|c| GARBLE_CHARS.contains(c.to_ascii_lowercase()))
        .count();
    let garble_ratio = garble_hits as f64 / alpha.len() as f64;

    let mut unique: Vec<char> = alpha.iter().map(|c| c.to_ascii_lowercase()).collect();
    unique.sort_unstable();
    unique.dedup();
    let unique_ratio = unique.len() as f64 / alpha.len() as f64;

    let signals = usize::from(has_triple_repeat(name))
        + usize::from(garble_ratio >= 0.60)
        + usize::from(unique_ratio <= 0.40);
    signals >= 2
}

fn score_name_quality(name: &str) -> f64 {
    if name.is_empty() {
        return 0.1;
    }

    let length_score: f64 = if name.len() < NAME_SHORT_THRESHOLD {
        0.3
    } else if name.len() < NAME_MEDIUM_THRESHOLD {
        0.6
    } else {
        1.0
    };

    let garble_score = if is_name_garbled(name) { 0.2 } else { 1.0 };

    // All-caps gets a small ding; OCR output is frequently all-caps and the
    // name is probably fine, just unpolished.
    let caps_score = if name.len() > 2 && name == name.to_uppercase() { 0.9 } else { 1.0 };

    length_score.min(garble_score).min(caps_score)
}

fn score_price_presence(item: &MenuItem) -> f64 {
    if item.primary_price_cents().is_some() {
        PRICE_PRESENT_SCORE
    } else {
        PRICE_ABSENT_SCORE
    }
}

fn score_variant_quality(item: &MenuItem) -> f64 {
    if item.variants.is_empty() {
        return DEFAULT_VARIANT_SCORE;
    }
    item.variants.iter().map(|v| v.confidence).sum::<f64>() / item.variants.len() as f64
}

fn score_flag_penalty(item: &MenuItem) -> f64 {
    if item.flags.is_empty() {
        return 1.0;
    }
    let total: f64 = item
        .flags
        .iter()
        .map(|f| match f.severity {
            FlagSeverity::Warn => FLAG_PENALTY_WARN,
            FlagSeverity::Info => FLAG_PENALTY_INFO,
            FlagSeverity::AutoFix => FLAG_PENALTY_AUTOFIX,
        })
        .sum();
    (1.0 - total).max(0.0)
}

/// Compute `semantic_confidence` and its audit record for every item.
pub fn score_semantic_confidence(items: &mut [MenuItem]) {
    for item in items {
        let grammar_raw = item.grammar.parse_confidence;
        let name_raw = score_name_quality(item.name.trim());
        let price_raw = score_price_presence(item);
        let variant_raw = score_variant_quality(item);
        let flag_raw = score_flag_penalty(item);

        let weighted_grammar = grammar_raw * W_GRAMMAR;
        let weighted_name = name_raw * W_NAME;
        let weighted_price = price_raw * W_PRICE;
        let weighted_variant = variant_raw * W_VARIANT;
        let weighted_flags = flag_raw * W_FLAGS;

        let raw = weighted_grammar + weighted_name + weighted_price + weighted_variant + weighted_flags;
        let final_score = round4(raw).clamp(0.0, 1.0);

        item.semantic_confidence = Some(final_score);
        item.semantic_confidence_details = Some(SemanticConfidenceDetails {
            grammar_score: round4(grammar_raw),
            grammar_weight: W_GRAMMAR,
            grammar_weighted: round4(weighted_grammar),
            name_quality_score: round4(name_raw),
            name_quality_weight: W_NAME,
            name_quality_weighted: round4(weighted_name),
            price_score: round4(price_raw),
            price_weight: W_PRICE,
            price_weighted: round4(weighted_price),
            variant_score: round4(variant_raw),
            variant_weight: W_VARIANT,
            variant_weighted: round4(weighted_variant),
            flag_penalty_score: round4(flag_raw),
            flag_penalty_weight: W_FLAGS,
            flag_penalty_weighted: round4(weighted_flags),
            final_score,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::tests_support::{bare_item, priced_item};
    use crate::types::ItemFlag;
    use serde_json::json;

    #[test]
    fn test_name_garble_detection() {
        assert!(is_name_garbled("eeeecccrrrvvvw"));
        assert!(is_name_garbled("ssseeeccc"));
        assert!(!is_name_garbled("Margherita Pizza"));
        assert!(!is_name_garbled("BUFFALO CHICKEN"));
        assert!(!is_name_garbled("XY"));
        assert!(!is_name_garbled("CHEESE"));
    }

    #[test]
    fn test_name_quality_tiers() {
        assert_eq!(score_name_quality("XY"), 0.3);
        assert_eq!(score_name_quality("Taco"), 0.6);
        assert_eq!(score_name_quality("Margherita Pizza"), 1.0);
        // All-caps: mild x0.9 penalty via the minimum combine.
        assert_eq!(score_name_quality("BUFFALO WINGS"), 0.9);
        // Garbled names bottom out regardless of length.
        assert_eq!(score_name_quality("eeeecccrrrvvvw"), 0.2);
        assert_eq!(score_name_quality(""), 0.1);
    }

    #[test]
    fn test_high_quality_item_scores_high() {
        let mut item = priced_item("Margherita Pizza", "Pizza", 1299);
        item.grammar.parse_confidence = 1.0;
        item.variants[0].confidence = 1.0;
        score_semantic_confidence(std::slice::from_mut(&mut item));
        // 0.30 + 0.20 + 0.20 + 0.15 + 0.15 = 1.0
        assert_eq!(item.semantic_confidence, Some(1.0));
        let d = item.semantic_confidence_details.as_ref().unwrap();
        assert_eq!(d.grammar_weighted, 0.30);
        assert_eq!(d.flag_penalty_score, 1.0);
    }

    #[test]
    fn test_priceless_item_dinged() {
        let mut item = bare_item("Margherita Pizza");
        item.grammar.parse_confidence = 0.80;
        score_semantic_confidence(std::slice::from_mut(&mut item));
        let d = item.semantic_confidence_details.as_ref().unwrap();
        assert_eq!(d.price_score, 0.3);
        assert_eq!(d.variant_score, 0.5);
        // 0.24 + 0.20 + 0.06 + 0.075 + 0.15 = 0.725
        assert_eq!(item.semantic_confidence, Some(0.725));
    }

    #[test]
    fn test_flag_penalties_by_severity() {
        let mut item = priced_item("Margherita Pizza", "Pizza", 1299);
        item.flags.push(ItemFlag::new(FlagSeverity::Warn, "a", json!({})));
        item.flags.push(ItemFlag::new(FlagSeverity::Info, "b", json!({})));
        item.flags.push(ItemFlag::new(FlagSeverity::AutoFix, "c", json!({})));
        score_semantic_confidence(std::slice::from_mut(&mut item));
        let d = item.semantic_confidence_details.as_ref().unwrap();
        assert!((d.flag_penalty_score - 0.78).abs() < 1e-9);
    }

    #[test]
    fn test_flag_penalty_floor_at_zero() {
        let mut item = priced_item("Margherita Pizza", "Pizza", 1299);
        for i in 0..10 {
            item.flags.push(ItemFlag::new(FlagSeverity::Warn, format!("w{i}"), json!({})));
        }
        score_semantic_confidence(std::slice::from_mut(&mut item));
        assert_eq!(item.semantic_confidence_details.as_ref().unwrap().flag_penalty_score, 0.0);
    }

    #[test]
    fn test_variant_quality_is_mean() {
        let mut item = priced_item("Margherita Pizza", "Pizza", 1299);
        item.variants[0].confidence = 0.8;
        item.variants.push(item.variants[0].clone());
        item.variants[1].confidence = 0.4;
        score_semantic_confidence(std::slice::from_mut(&mut item));
        let d = item.semantic_confidence_details.as_ref().unwrap();
        assert!((d.variant_score - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_bounded() {
        let mut items = vec![bare_item(""), priced_item("ssseeeccc", "Pizza", 0)];
        score_semantic_confidence(&mut items);
        for item in &items {
            let score = item.semantic_confidence.unwrap();
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        }
    }
}
