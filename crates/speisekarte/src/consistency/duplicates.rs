//! Duplicate and near-duplicate name detection across the whole menu.
//!
//! Exact matching groups normalized names; fuzzy matching catches OCR
//! near-misses like "BUFALO" vs "BUFFALO". Same-price duplicates are
//! informational, conflicting-price duplicates are warnings.

use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::core::config::PipelineConfig;
use crate::types::{FlagSeverity, MenuItem};

pub const REASON_EXACT_DUPLICATE: &str = "cross_item_exact_duplicate";
pub const REASON_DUPLICATE_NAME: &str = "cross_item_duplicate_name";
pub const REASON_FUZZY_EXACT_DUPLICATE: &str = "cross_item_fuzzy_exact_duplicate";
pub const REASON_FUZZY_DUPLICATE: &str = "cross_item_fuzzy_duplicate";

const EXACT_MIN_NAME_LEN: usize = 3;

static COMMON_PREFIXES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:our\s+|the\s+|homemade\s+|fresh\s+|classic\s+)")
        .expect("common prefixes regex is valid and should compile")
});

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid and should compile"));

/// Normalize a name for comparison: lowercase, strip common prefixes
/// (repeatedly, so "Our Classic ..." loses both), collapse whitespace,
/// strip trailing punctuation.
pub fn normalize_name(name: &str) -> String {
    let mut n = name.to_lowercase().trim().to_string();
    loop {
        let stripped = COMMON_PREFIXES_RE.replace(&n, "").into_owned();
        if stripped == n {
            break;
        }
        n = stripped;
    }
    let n = WHITESPACE_RE.replace_all(&n, " ").into_owned();
    n.trim().trim_end_matches(['.', ':', '-', ' ']).to_string()
}

pub fn name_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Run exact + fuzzy duplicate detection, attaching flags in place.
pub fn check_duplicate_names(items: &mut [MenuItem], config: &PipelineConfig) {
    // Phase 1: collect comparable names.
    let mut entries: Vec<(usize, String, u32)> = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let raw = item.name.trim();
        if raw.len() < EXACT_MIN_NAME_LEN {
            continue;
        }
        let norm = normalize_name(raw);
        if norm.is_empty() {
            continue;
        }
        entries.push((idx, norm, item.primary_price_cents().unwrap_or(0)));
    }

    // Phase 2: exact groups.
    let mut groups: AHashMap<&str, Vec<(usize, u32)>> = AHashMap::new();
    for (idx, norm, price) in &entries {
        groups.entry(norm.as_str()).or_default().push((*idx, *price));
    }

    let mut pending: Vec<(usize, FlagSeverity, &'static str, serde_json::Value)> = Vec::new();

    for (norm, members) in &groups {
        if members.len() < 2 {
            continue;
        }
        let prices: AHashSet<u32> = members.iter().map(|(_, p)| *p).collect();
        let (reason, severity) = if prices.len() == 1 {
            (REASON_EXACT_DUPLICATE, FlagSeverity::Info)
        } else {
            (REASON_DUPLICATE_NAME, FlagSeverity::Warn)
        };
        for (idx, price) in members {
            let other_indices: Vec<usize> = members.iter().filter(|(i, _)| i != idx).map(|(i, _)| *i).collect();
            let other_prices: Vec<u32> = members.iter().filter(|(i, _)| i != idx).map(|(_, p)| *p).collect();
            pending.push((
                *idx,
                severity,
                reason,
                json!({
                    "normalized_name": norm,
                    "this_price_cents": price,
                    "other_prices_cents": other_prices,
                    "other_indices": other_indices,
                    "group_size": members.len(),
                }),
            ));
        }
    }

    // Phase 3: fuzzy matching across different exact groups.
    let fuzzy: Vec<&(usize, String, u32)> = entries
        .iter()
        .filter(|(_, norm, _)| norm.len() >= config.fuzzy_min_name_len)
        .collect();

    let mut flagged_pairs: AHashSet<(usize, usize)> = AHashSet::new();

    for a_pos in 0..fuzzy.len() {
        let (a_idx, a_norm, a_price) = fuzzy[a_pos];
        for item_b in fuzzy.iter().skip(a_pos + 1) {
            let (b_idx, b_norm, b_price) = item_b;
            if a_norm == b_norm {
                continue;
            }
            let similarity = name_similarity(a_norm, b_norm);
            if similarity < config.fuzzy_similarity_threshold {
                continue;
            }
            let pair = (*a_idx.min(b_idx), *a_idx.max(b_idx));
            if !flagged_pairs.insert(pair) {
                continue;
            }
            let (reason, severity) = if a_price == b_price {
                (REASON_FUZZY_EXACT_DUPLICATE, FlagSeverity::Info)
            } else {
                (REASON_FUZZY_DUPLICATE, FlagSeverity::Warn)
            };
            let rounded = (similarity * 1000.0).round() / 1000.0;
            pending.push((
                *a_idx,
                severity,
                reason,
                json!({
                    "this_name": a_norm,
                    "matched_name": b_norm,
                    "similarity": rounded,
                    "this_price_cents": a_price,
                    "matched_price_cents": b_price,
                    "matched_index": b_idx,
                }),
            ));
            pending.push((
                *b_idx,
                severity,
                reason,
                json!({
                    "this_name": b_norm,
                    "matched_name": a_norm,
                    "similarity": rounded,
                    "this_price_cents": b_price,
                    "matched_price_cents": a_price,
                    "matched_index": a_idx,
                }),
            ));
        }
    }

    for (idx, severity, reason, details) in pending {
        items[idx].push_flag(severity, reason, details);
    }
}
