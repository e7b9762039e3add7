//! Variant construction: one priced variant per price mention.
//!
//! Grid labels win when a grid is active and alignment succeeds; otherwise
//! the item's own size/combo/flavor mentions label the variants; the generic
//! `Price N` label is a last resort. A price is never silently dropped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::grid::{grid_labels_for_prices, GridTracker};
use crate::types::{GridApplication, ParsedMenuLine, Variant, VariantKind};
use crate::vocab::combo::{extract_combo_hints, is_combo_food};
use crate::vocab::components::{FLAVOR_TOKENS, STYLE_TOKENS};
use crate::vocab::size::{normalize_size_token, SIZE_WORD_MAP};

static INCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(\d{1,2})\s*(?:["\u{201d}\u{00b0}]|in\b|inch(?:es)?\b)"#)
        .expect("inch regex is valid and should compile")
});

static PIECE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,2})\s*(?:pcs?|pieces?|ct)\b").expect("piece regex is valid and should compile")
});

static BARE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})\b").expect("bare number regex is valid and should compile"));

static COMBO_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:w/\s*|with\s+)(.+)$").expect("combo label regex is valid and should compile")
});

/// Infer a normalized size (and kind Size) from a variant label, if any.
fn normalize_size_from_label(label: &str) -> Option<String> {
    let low = label.trim().to_lowercase();
    if low.is_empty() {
        return None;
    }

    if let Some(caps) = INCH_RE.captures(&low) {
        return Some(format!("{}in", caps[1].parse::<u32>().ok()?));
    }
    if let Some(caps) = PIECE_RE.captures(&low) {
        return Some(format!("{}pc", caps[1].parse::<u32>().ok()?));
    }

    for token in low.split_whitespace() {
        let clean = token.trim_matches(|c: char| ".,;:-".contains(c));
        if clean.is_empty() {
            continue;
        }
        if let Some(mapped) = SIZE_WORD_MAP.get(clean) {
            return Some((*mapped).to_string());
        }
    }

    // Bare numbers in 6-30 read as inches in a pizza context.
    for caps in BARE_NUMBER_RE.captures_iter(&low) {
        if let Ok(n) = caps[1].parse::<u32>() {
            if (6..=30).contains(&n) {
                return Some(format!("{n}in"));
            }
        }
    }

    None
}

fn infer_flavor_or_style(label: &str) -> Option<VariantKind> {
    let low = label.to_lowercase();
    // Style wins on crust/bone hints.
    if STYLE_TOKENS.iter().any(|t| low.contains(t)) {
        return Some(VariantKind::Style);
    }
    if FLAVOR_TOKENS.iter().any(|t| low.contains(t)) {
        return Some(VariantKind::Flavor);
    }
    None
}

/// High-level classifier for a variant label.
pub fn infer_variant_kind(label: &str) -> (VariantKind, Option<String>) {
    if let Some(normalized) = normalize_size_from_label(label) {
        return (VariantKind::Size, Some(normalized));
    }

    let stripped = label.trim();
    if let Some(caps) = COMBO_LABEL_RE.captures(stripped) {
        if is_combo_food(caps[1].trim()) {
            return (VariantKind::Combo, None);
        }
    }
    if is_combo_food(stripped) {
        return (VariantKind::Combo, None);
    }

    if let Some(kind) = infer_flavor_or_style(label) {
        return (kind, None);
    }

    (VariantKind::Other, None)
}

/// Stable clustering key for a variant.
pub fn build_group_key(kind: VariantKind, label: &str, normalized_size: Option<&str>) -> Option<String> {
    match kind {
        VariantKind::Size => normalized_size.map(|ns| format!("size:{ns}")),
        VariantKind::Combo => Some(format!("combo:{}", label.trim().to_lowercase())),
        VariantKind::Flavor => Some(format!("flavor:{}", label.trim().to_lowercase())),
        VariantKind::Style => Some(format!("style:{}", label.trim().to_lowercase())),
        VariantKind::Other => None,
    }
}

fn make_variant(label: String, price_cents: u32, confidence: f64) -> Variant {
    let (kind, normalized_size) = infer_variant_kind(&label);
    let group_key = build_group_key(kind, &label, normalized_size.as_deref());
    Variant {
        kind,
        label,
        price_cents,
        normalized_size,
        group_key,
        confidence,
        confidence_details: None,
    }
}

fn make_combo_variant(label: String, price_cents: u32, confidence: f64) -> Variant {
    let (kind, normalized_size) = infer_variant_kind(&label);
    // Inference may come back empty-handed on an unusual side; the combo
    // evidence from the line itself wins then.
    let kind = if kind == VariantKind::Other { VariantKind::Combo } else { kind };
    let group_key = build_group_key(kind, &label, normalized_size.as_deref());
    Variant {
        kind,
        label,
        price_cents,
        normalized_size,
        group_key,
        confidence,
        confidence_details: None,
    }
}

fn title_case_words(text: &str) -> String {
    text.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

const BASE_CONFIDENCE: f64 = 0.85;
const RIGHT_ALIGNED_CONFIDENCE: f64 = 0.75;

/// Build the variants for one decomposed item line.
///
/// `raw_text` is the cleaned line text, used for combo-pair evidence.
/// Returns the variants plus grid bookkeeping when grid labels applied.
pub fn build_variants(
    grammar: &ParsedMenuLine,
    raw_text: &str,
    tracker: &GridTracker,
) -> (Vec<Variant>, Option<GridApplication>) {
    let prices = &grammar.price_mentions;
    if prices.is_empty() {
        return (Vec::new(), None);
    }

    // Grid labels first.
    if let Some(grid) = tracker.active() {
        if let Some((labels, right_aligned)) = grid_labels_for_prices(grid, prices.len()) {
            let confidence = if right_aligned { RIGHT_ALIGNED_CONFIDENCE } else { BASE_CONFIDENCE };
            let variants = labels
                .into_iter()
                .zip(prices.iter())
                .map(|(label, &price)| make_variant(label, price, confidence))
                .collect();
            let application = GridApplication {
                source_line: grid.started_at_line,
                column_count: grid.column_count(),
                right_aligned,
            };
            return (variants, Some(application));
        }
    }

    // Combo price pair: "9.95 with FRIES 13.50".
    if prices.len() == 2 {
        let hints = extract_combo_hints(raw_text);
        if let Some(food) = hints.first() {
            let base_label = grammar
                .size_mentions
                .first()
                .map(|s| normalize_size_token(s))
                .unwrap_or_else(|| "Price 1".to_string());
            let combo_label = format!("W/{}", title_case_words(food));
            let variants = vec![
                make_variant(base_label, prices[0], BASE_CONFIDENCE),
                make_combo_variant(combo_label, prices[1], BASE_CONFIDENCE),
            ];
            return (variants, None);
        }
    }

    // The item's own size mentions, when they pair 1:1 with prices.
    if grammar.size_mentions.len() == prices.len() {
        let variants = grammar
            .size_mentions
            .iter()
            .zip(prices.iter())
            .map(|(size, &price)| make_variant(normalize_size_token(size), price, BASE_CONFIDENCE))
            .collect();
        return (variants, None);
    }

    // Flavor options pairing 1:1 with prices (choose-one lists with a price
    // per flavor).
    if let Some(components) = &grammar.components {
        if components.flavor_options.len() == prices.len() && prices.len() >= 2 {
            let variants = components
                .flavor_options
                .iter()
                .zip(prices.iter())
                .map(|(flavor, &price)| make_variant(title_case_words(flavor), price, BASE_CONFIDENCE))
                .collect();
            return (variants, None);
        }
    }

    // Single price with a single size mention still gets a semantic label.
    if prices.len() == 1 {
        if let Some(size) = grammar.size_mentions.first() {
            return (vec![make_variant(normalize_size_token(size), prices[0], BASE_CONFIDENCE)], None);
        }
    }

    // Generic labels: never drop a price. Built directly as Other so the
    // position number is not mistaken for an inch size.
    let variants = prices
        .iter()
        .enumerate()
        .map(|(i, &price)| Variant {
            kind: VariantKind::Other,
            label: format!("Price {}", i + 1),
            price_cents: price,
            normalized_size: None,
            group_key: None,
            confidence: BASE_CONFIDENCE,
            confidence_details: None,
        })
        .collect();
    (variants, None)
}
