//! Per-line heuristic classification.
//!
//! Pure function over one line: normalization, garble stripping, then
//! classification rules tested in priority order (size header, topping/info,
//! price-only, heading, menu item, unknown). Never fails; unmatched input
//! degrades to `Unknown` with confidence 0.0.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::garble::clean_line;
use crate::classify::normalize::normalize_ocr_typos;
use crate::grammar::decompose::caps_split_applies;
use crate::grammar::prices::{count_price_mentions, PRICE_RE};
use crate::types::{Line, LineClassification, LineType};
use crate::vocab::components::{is_flavorish, topping_match_count};
use crate::vocab::headings::is_known_section_heading;
use crate::vocab::size::{NUMERIC_SIZE_RE, SIZE_WORD_RE};

static SLICE_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b\d{1,2}\s*(?:slices?|cuts?)\b").expect("slice count regex is valid and should compile"));

static TOPPING_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\btoppings?\b").expect("topping header regex is valid and should compile"));

static PRICE_ONLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s.\-–—»*·…$]*\$?\s*\d{1,3}[.,]\d{2}[\s.]*$")
        .expect("price-only regex is valid and should compile")
});

static OPTION_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-z]+(?:\s[a-z]+)?\s+or\s+[a-z]+(?:\s[a-z]+)?[.,]?$")
        .expect("option pair regex is valid and should compile")
});

static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+[-–—]\s+|\s*:\s+|\s*[•·]\s*").expect("separator regex is valid and should compile")
});

static MODIFIER_LEAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:extra|add|no|without|hold the|sub|substitute|make it)\b")
        .expect("modifier lead regex is valid and should compile")
});

/// Size-grid header: 2+ size-word/numeric-size/slice-count mentions, zero
/// prices.
fn is_size_header(text: &str) -> bool {
    if PRICE_RE.is_match(text) {
        return false;
    }
    let mut mentions = SIZE_WORD_RE.find_iter(text).count() + SLICE_COUNT_RE.find_iter(text).count();
    // Numeric sizes that are not already covered by slice counts.
    mentions += NUMERIC_SIZE_RE
        .find_iter(text)
        .filter(|m| !SLICE_COUNT_RE.is_match(m.as_str()))
        .count();
    mentions >= 2
}

fn is_topping_list(text: &str) -> bool {
    !PRICE_RE.is_match(text) && TOPPING_HEADER_RE.is_match(text)
}

fn is_all_caps(text: &str) -> bool {
    let mut saw_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            saw_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        }
    }
    saw_alpha
}

/// Informational lines: choice lists, blanket statements, option pairs,
/// ALL-CAPS flavor menus.
fn is_info_line(text: &str) -> bool {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();

    if lower.starts_with("choice of") {
        return true;
    }
    if lower.starts_with("all ") || lower.starts_with("served with") {
        return true;
    }
    if lower.starts_with("add ") && (trimmed.contains('$') || lower.contains("extra")) {
        return true;
    }
    if lower.contains("same as") {
        return true;
    }
    if !PRICE_RE.is_match(trimmed) && OPTION_PAIR_RE.is_match(trimmed) && trimmed.split_whitespace().count() <= 4 {
        return true;
    }
    // ALL-CAPS flavor lists: "HOT, MILD, BBQ, HONEY BBQ, GARLIC ROMANO,"
    if is_all_caps(trimmed) && !PRICE_RE.is_match(trimmed) {
        let segments: Vec<&str> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if segments.len() >= 3 {
            let flavorish = segments.iter().filter(|s| is_flavorish(s)).count();
            if flavorish * 10 >= segments.len() * 6 {
                return true;
            }
        }
    }
    false
}

fn is_price_only(text: &str) -> bool {
    PRICE_ONLY_RE.is_match(text.trim())
}

/// Section-heading shape: short, no price, ALL-CAPS or a known phrase.
fn is_heading(text: &str) -> bool {
    let stripped = text.trim();
    if stripped.is_empty() {
        return false;
    }
    let word_count = stripped.split_whitespace().count();
    if word_count > 5 {
        return false;
    }
    if PRICE_RE.is_match(stripped) {
        return false;
    }
    if is_all_caps(stripped) && word_count <= 4 {
        return true;
    }
    is_known_section_heading(stripped)
}

/// Description continuation: ingredient list fragments without a name or
/// price. The comma/"and" list shape is required so a topping-flavored item
/// name like "BBQ Chicken Pizza" is not mistaken for a fragment.
fn is_description_continuation(text: &str) -> bool {
    let trimmed = text.trim();
    if PRICE_RE.is_match(trimmed) {
        return false;
    }
    if trimmed.split_whitespace().count() > 14 {
        return false;
    }
    let has_list_shape = trimmed.contains(',') || trimmed.to_lowercase().contains(" and ");
    if !has_list_shape {
        return false;
    }
    let starts_lower = trimmed.chars().next().is_some_and(|c| c.is_lowercase());
    starts_lower || topping_match_count(trimmed) >= 2
}

fn is_modifier_line(text: &str) -> bool {
    let trimmed = text.trim();
    MODIFIER_LEAD_RE.is_match(trimmed) && trimmed.split_whitespace().count() <= 6
}

/// Classify one raw OCR line. Deterministic, no shared state.
pub fn classify_line(line: &Line) -> LineClassification {
    let normalized = normalize_ocr_typos(&line.text);
    let cleaned = clean_line(&normalized);

    let mut classification = LineClassification {
        line_index: line.line_index,
        line_type: LineType::Unknown,
        confidence: 0.0,
        cleaned_text: cleaned.clone(),
        raw_text: line.text.clone(),
        initial_line_type: None,
        column_segments: None,
    };

    let text = cleaned.trim();
    if text.is_empty() {
        return classification;
    }

    if is_size_header(text) {
        classification.line_type = LineType::SizeHeader;
        classification.confidence = 0.85;
        return classification;
    }

    if is_topping_list(text) {
        classification.line_type = LineType::ToppingList;
        classification.confidence = 0.75;
        return classification;
    }

    if is_info_line(text) {
        classification.line_type = LineType::InfoLine;
        classification.confidence = 0.70;
        return classification;
    }

    if is_price_only(text) {
        classification.line_type = LineType::PriceOnly;
        classification.confidence = 0.80;
        return classification;
    }

    if is_heading(text) {
        classification.line_type = LineType::Heading;
        classification.confidence = 0.85;
        return classification;
    }

    let price_count = count_price_mentions(text);
    let has_split = SEPARATOR_RE.is_match(text) || caps_split_applies(text);

    if price_count > 0 {
        classification.line_type = LineType::MenuItem;
        classification.confidence = if has_split { 0.80 } else { 0.65 };
        return classification;
    }

    if has_split {
        classification.line_type = LineType::MenuItem;
        classification.confidence = 0.80;
        return classification;
    }

    if is_description_continuation(text) {
        classification.line_type = LineType::DescriptionOnly;
        classification.confidence = 0.60;
        return classification;
    }

    if is_modifier_line(text) {
        classification.line_type = LineType::ModifierLine;
        classification.confidence = 0.55;
        return classification;
    }

    // Name-like residue with no price still counts as an item; symbol-only
    // residue falls through to Unknown.
    if text.chars().any(|c| c.is_alphanumeric()) {
        classification.line_type = LineType::MenuItem;
        classification.confidence = 0.45;
        return classification;
    }

    classification
}
