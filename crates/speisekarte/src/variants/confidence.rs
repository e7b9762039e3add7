//! Per-variant confidence scoring.
//!
//! Base score adjusted additively by four signal categories: label clarity,
//! grammar-context quality, grid-context bonus, and targeted price-flag
//! penalties. Every contribution lands in `confidence_details` — this is an
//! auditable score, not a black box.

use crate::types::{FlagSeverity, ItemFlag, MenuItem, Variant, VariantConfidenceDetails, VariantKind};
use crate::variants::validate::{
    REASON_DUPLICATE_VARIANT, REASON_GRID_COUNT_OUTLIER, REASON_GRID_INCOMPLETE, REASON_GRID_RIGHT_ALIGNED,
    REASON_MIXED_KINDS, REASON_PRICE_INVERSION, REASON_SIZE_GAP, REASON_ZERO_PRICE,
};

const LABEL_BONUS_SIZE: f64 = 0.05;
const LABEL_BONUS_COMBO: f64 = 0.03;
const LABEL_BONUS_FLAVOR_STYLE: f64 = 0.02;
const LABEL_PENALTY_OTHER: f64 = -0.10;
const LABEL_PENALTY_EMPTY: f64 = -0.20;

const GRAMMAR_HIGH_CUTOFF: f64 = 0.80;
const GRAMMAR_LOW_CUTOFF: f64 = 0.50;
const GRAMMAR_BONUS: f64 = 0.03;
const GRAMMAR_MAX_PENALTY: f64 = -0.10;

const GRID_BONUS: f64 = 0.05;

const PENALTY_INVERSION: f64 = -0.12;
const PENALTY_DUPLICATE: f64 = -0.15;
const PENALTY_ZERO_PRICE: f64 = -0.20;
const PENALTY_MIXED_KINDS_WARN: f64 = -0.05;
const PENALTY_INFORMATIONAL: f64 = -0.03;

const SCORE_FLOOR: f64 = 0.05;
const SCORE_CAP: f64 = 1.0;

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn label_modifier(variant: &Variant) -> f64 {
    if variant.label.trim().is_empty() {
        return LABEL_PENALTY_EMPTY;
    }
    match variant.kind {
        VariantKind::Size => {
            if variant.normalized_size.is_some() {
                LABEL_BONUS_SIZE
            } else {
                0.0
            }
        }
        VariantKind::Combo => LABEL_BONUS_COMBO,
        VariantKind::Flavor | VariantKind::Style => LABEL_BONUS_FLAVOR_STYLE,
        VariantKind::Other => LABEL_PENALTY_OTHER,
    }
}

fn grammar_modifier(parse_confidence: f64) -> f64 {
    if parse_confidence >= GRAMMAR_HIGH_CUTOFF {
        GRAMMAR_BONUS
    } else if parse_confidence < GRAMMAR_LOW_CUTOFF {
        round4(GRAMMAR_MAX_PENALTY * (1.0 - parse_confidence / GRAMMAR_LOW_CUTOFF))
    } else {
        0.0
    }
}

/// Whether this variant appears in any recorded inversion pair.
fn variant_in_inversion(variant: &Variant, flag: &ItemFlag) -> bool {
    let Some(ns) = variant.normalized_size.as_deref() else {
        return false;
    };
    flag.details["inversions"]
        .as_array()
        .is_some_and(|pairs| {
            pairs
                .iter()
                .any(|p| p["smaller_size"] == ns || p["larger_size"] == ns)
        })
}

fn variant_is_duplicate(variant: &Variant, flag: &ItemFlag) -> bool {
    let Some(key) = variant.group_key.as_deref() else {
        return false;
    };
    flag.details["duplicated_keys"]
        .as_array()
        .is_some_and(|keys| keys.iter().any(|k| k == key))
}

/// Targeted flag penalties: each reason contributes at most once, and only
/// to variants it actually implicates.
fn flag_penalty(variant: &Variant, flags: &[ItemFlag]) -> f64 {
    let mut penalty = 0.0;
    let mut seen: Vec<&str> = Vec::new();
    for flag in flags {
        let reason = flag.reason.as_str();
        if seen.contains(&reason) {
            continue;
        }
        let contribution = match reason {
            REASON_PRICE_INVERSION if variant_in_inversion(variant, flag) => PENALTY_INVERSION,
            REASON_DUPLICATE_VARIANT if variant_is_duplicate(variant, flag) => PENALTY_DUPLICATE,
            REASON_ZERO_PRICE if variant.price_cents == 0 => PENALTY_ZERO_PRICE,
            REASON_MIXED_KINDS if flag.severity == FlagSeverity::Warn => PENALTY_MIXED_KINDS_WARN,
            REASON_SIZE_GAP | REASON_GRID_INCOMPLETE | REASON_GRID_COUNT_OUTLIER | REASON_GRID_RIGHT_ALIGNED => {
                PENALTY_INFORMATIONAL
            }
            _ => 0.0,
        };
        if contribution != 0.0 {
            penalty += contribution;
            seen.push(reason);
        }
    }
    round4(penalty)
}

fn score_single_variant(
    variant: &Variant,
    parse_confidence: f64,
    grid_applied: bool,
    flags: &[ItemFlag],
) -> VariantConfidenceDetails {
    let base = variant.confidence;
    let label_mod = label_modifier(variant);
    let grammar_mod = grammar_modifier(parse_confidence);
    let grid_mod = if grid_applied { GRID_BONUS } else { 0.0 };
    let penalty = flag_penalty(variant, flags);

    let final_score = round4((base + label_mod + grammar_mod + grid_mod + penalty).clamp(SCORE_FLOOR, SCORE_CAP));

    VariantConfidenceDetails {
        base: round4(base),
        label_mod: round4(label_mod),
        grammar_mod,
        grid_mod,
        flag_penalty: penalty,
        final_score,
    }
}

/// Score every variant of every item, writing `confidence` and
/// `confidence_details` back in place.
pub fn score_variant_confidence(items: &mut [MenuItem]) {
    for item in items {
        if item.variants.is_empty() {
            continue;
        }
        let parse_confidence = item.grammar.parse_confidence;
        let grid_applied = item.grid.is_some();
        let flags = item.flags.clone();
        for variant in &mut item.variants {
            let details = score_single_variant(variant, parse_confidence, grid_applied, &flags);
            variant.confidence = details.final_score;
            variant.confidence_details = Some(details);
        }
    }
}
