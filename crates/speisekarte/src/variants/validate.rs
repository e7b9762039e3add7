//! Per-item variant validation: monotonic price ordering plus consistency
//! checks (duplicates, zero prices, mixed kinds, size gaps, grid
//! completeness, grid-group count outliers).
//!
//! All checks are flag-only. A price inversion could be a legitimate menu
//! oddity, so it is never auto-corrected.

use ahash::AHashMap;
use serde_json::json;

use crate::types::{FlagSeverity, MenuItem, Variant, VariantKind};
use crate::vocab::size::{
    size_ordinal, size_track, SizeTrack, MULTIPLICITY_CHAIN, PORTION_CHAIN, WORD_ABBREVIATED_CHAIN,
    WORD_NAMED_CHAIN,
};

pub const REASON_PRICE_INVERSION: &str = "variant_price_inversion";
pub const REASON_DUPLICATE_VARIANT: &str = "duplicate_variant";
pub const REASON_ZERO_PRICE: &str = "zero_price_variant";
pub const REASON_MIXED_KINDS: &str = "mixed_variant_kinds";
pub const REASON_SIZE_GAP: &str = "size_gap";
pub const REASON_GRID_INCOMPLETE: &str = "grid_incomplete";
pub const REASON_GRID_COUNT_OUTLIER: &str = "grid_count_outlier";
pub const REASON_GRID_RIGHT_ALIGNED: &str = "grid_right_alignment_assumed";

struct SizedEntry<'a> {
    normalized: &'a str,
    ordinal: i64,
    price_cents: u32,
    track: SizeTrack,
}

fn sized_entries(variants: &[Variant]) -> Vec<SizedEntry<'_>> {
    variants
        .iter()
        .filter(|v| v.kind == VariantKind::Size && v.price_cents > 0)
        .filter_map(|v| {
            let normalized = v.normalized_size.as_deref()?;
            let ordinal = size_ordinal(normalized)?;
            let track = size_track(normalized)?;
            Some(SizedEntry {
                normalized,
                ordinal,
                price_cents: v.price_cents,
                track,
            })
        })
        .collect()
}

/// Verify monotonic non-decreasing prices across same-track size variants.
/// Equal prices are valid; a strict decrease raises a warn flag on the pair.
pub fn validate_variant_prices(item: &mut MenuItem) {
    if item.variants.len() < 2 {
        return;
    }

    let mut flags = Vec::new();
    {
        let sized = sized_entries(&item.variants);
        if sized.len() < 2 {
            return;
        }

        let mut tracks: AHashMap<SizeTrack, Vec<&SizedEntry>> = AHashMap::new();
        for entry in &sized {
            tracks.entry(entry.track).or_default().push(entry);
        }

        for (track, mut entries) in tracks {
            if entries.len() < 2 {
                continue;
            }
            entries.sort_by_key(|e| e.ordinal);

            let mut inversions = Vec::new();
            for pair in entries.windows(2) {
                if pair[1].price_cents < pair[0].price_cents {
                    inversions.push(json!({
                        "smaller_size": pair[0].normalized,
                        "smaller_price_cents": pair[0].price_cents,
                        "larger_size": pair[1].normalized,
                        "larger_price_cents": pair[1].price_cents,
                    }));
                }
            }

            if !inversions.is_empty() {
                flags.push((
                    FlagSeverity::Warn,
                    REASON_PRICE_INVERSION,
                    json!({
                        "track": track.as_str(),
                        "inversions": inversions,
                        "expected_order": entries.iter().map(|e| e.normalized).collect::<Vec<_>>(),
                        "actual_prices_cents": entries.iter().map(|e| e.price_cents).collect::<Vec<_>>(),
                    }),
                ));
            }
        }
    }

    for (severity, reason, details) in flags {
        item.push_flag(severity, reason, details);
    }
}

fn check_duplicate_variants(item: &mut MenuItem) {
    let keys: Vec<&str> = item.variants.iter().filter_map(|v| v.group_key.as_deref()).collect();
    if keys.len() < 2 {
        return;
    }
    let mut counts: AHashMap<&str, usize> = AHashMap::new();
    for key in &keys {
        *counts.entry(*key).or_insert(0) += 1;
    }
    let mut duped: Vec<&str> = counts.iter().filter(|&(_, &c)| c > 1).map(|(&k, _)| k).collect();
    if duped.is_empty() {
        return;
    }
    duped.sort_unstable();
    let details = json!({ "duplicated_keys": duped, "variant_count": item.variants.len() });
    item.push_flag(FlagSeverity::Warn, REASON_DUPLICATE_VARIANT, details);
}

fn check_zero_price_variants(item: &mut MenuItem) {
    let zero_labels: Vec<&str> = item
        .variants
        .iter()
        .filter(|v| v.price_cents == 0)
        .map(|v| v.label.as_str())
        .collect();
    let nonzero_count = item.variants.iter().filter(|v| v.price_cents > 0).count();
    if zero_labels.is_empty() || nonzero_count == 0 {
        return;
    }
    let details = json!({ "zero_labels": zero_labels, "nonzero_count": nonzero_count });
    item.push_flag(FlagSeverity::Warn, REASON_ZERO_PRICE, details);
}

fn check_mixed_kinds(item: &mut MenuItem) {
    let mut kinds: Vec<&str> = item
        .variants
        .iter()
        .filter(|v| v.kind != VariantKind::Other)
        .map(|v| match v.kind {
            VariantKind::Size => "size",
            VariantKind::Combo => "combo",
            VariantKind::Flavor => "flavor",
            VariantKind::Style => "style",
            VariantKind::Other => unreachable!("other filtered above"),
        })
        .collect();
    kinds.sort_unstable();
    kinds.dedup();
    if kinds.len() < 2 {
        return;
    }
    let severity = if kinds.len() >= 3 { FlagSeverity::Warn } else { FlagSeverity::Info };
    let details = json!({ "kinds_found": kinds, "variant_count": item.variants.len() });
    item.push_flag(severity, REASON_MIXED_KINDS, details);
}

fn check_size_gaps(item: &mut MenuItem) {
    let mut by_track: AHashMap<SizeTrack, Vec<String>> = AHashMap::new();
    for v in &item.variants {
        if v.kind != VariantKind::Size {
            continue;
        }
        let Some(ns) = v.normalized_size.as_deref() else { continue };
        match size_track(ns) {
            // Inch and piece tracks are naturally sparse; no gap detection.
            Some(track @ (SizeTrack::Word | SizeTrack::Portion | SizeTrack::Multiplicity)) => {
                by_track.entry(track).or_default().push(ns.to_string());
            }
            _ => {}
        }
    }

    let mut flags = Vec::new();
    for (track, present) in &by_track {
        if present.len() < 2 {
            continue;
        }
        let sub_chains: &[&[&str]] = match track {
            SizeTrack::Word => &[WORD_ABBREVIATED_CHAIN, WORD_NAMED_CHAIN],
            SizeTrack::Portion => &[PORTION_CHAIN],
            SizeTrack::Multiplicity => &[MULTIPLICITY_CHAIN],
            _ => continue,
        };

        // Pick the sub-chain with the most matches.
        let best = sub_chains
            .iter()
            .map(|chain| (chain, present.iter().filter(|s| chain.contains(&s.as_str())).count()))
            .max_by_key(|(_, hits)| *hits);
        let Some((chain, hits)) = best else { continue };
        if hits < 2 {
            continue;
        }

        let positions: Vec<usize> = present
            .iter()
            .filter_map(|s| chain.iter().position(|c| c == s))
            .collect();
        if positions.len() < 2 {
            continue;
        }
        let lo = *positions.iter().min().expect("positions non-empty");
        let hi = *positions.iter().max().expect("positions non-empty");
        let missing: Vec<&str> = (lo + 1..hi)
            .map(|i| chain[i])
            .filter(|c| !present.iter().any(|p| p == c))
            .collect();
        if missing.is_empty() {
            continue;
        }

        let mut present_sorted: Vec<&str> = present
            .iter()
            .filter(|s| chain.contains(&s.as_str()))
            .map(String::as_str)
            .collect();
        present_sorted.sort_by_key(|s| chain.iter().position(|c| c == s));
        flags.push(json!({
            "track": track.as_str(),
            "present_sizes": present_sorted,
            "missing_sizes": missing,
        }));
    }

    for details in flags {
        item.push_flag(FlagSeverity::Info, REASON_SIZE_GAP, details);
    }
}

fn check_grid_completeness(item: &mut MenuItem) {
    let Some(grid) = &item.grid else { return };
    if grid.column_count < 2 {
        return;
    }
    let missing = grid.column_count.saturating_sub(item.variants.len());
    // One missing column is normal (gourmet right-alignment); 2+ is suspicious.
    if missing < 2 {
        return;
    }
    let details = json!({
        "grid_column_count": grid.column_count,
        "variant_count": item.variants.len(),
        "missing_count": missing,
        "grid_source_line": grid.source_line,
    });
    item.push_flag(FlagSeverity::Info, REASON_GRID_INCOMPLETE, details);
}

fn flag_right_alignment(item: &mut MenuItem) {
    let Some(grid) = &item.grid else { return };
    if !grid.right_aligned {
        return;
    }
    let details = json!({
        "grid_column_count": grid.column_count,
        "variant_count": item.variants.len(),
        "grid_source_line": grid.source_line,
    });
    item.push_flag(FlagSeverity::Info, REASON_GRID_RIGHT_ALIGNED, details);
}

/// All per-item consistency checks for one item.
pub fn check_variant_consistency(item: &mut MenuItem) {
    if item.variants.is_empty() {
        return;
    }
    check_duplicate_variants(item);
    check_zero_price_variants(item);
    check_mixed_kinds(item);
    check_size_gaps(item);
    check_grid_completeness(item);
    flag_right_alignment(item);
}

/// Cross-item: flag items whose variant count is an outlier within their
/// grid group (items labeled from the same size header).
pub fn check_grid_count_consistency(items: &mut [MenuItem]) {
    let mut groups: AHashMap<usize, Vec<usize>> = AHashMap::new();
    for (idx, item) in items.iter().enumerate() {
        if let Some(grid) = &item.grid {
            groups.entry(grid.source_line).or_default().push(idx);
        }
    }

    for (source_line, member_indices) in groups {
        if member_indices.len() < 2 {
            continue;
        }
        let counts: Vec<usize> = member_indices.iter().map(|&i| items[i].variants.len()).collect();
        let mut freq: AHashMap<usize, usize> = AHashMap::new();
        for &c in &counts {
            *freq.entry(c).or_insert(0) += 1;
        }
        let mode = freq
            .iter()
            .max_by_key(|&(_, &f)| f)
            .map(|(&c, _)| c)
            .expect("group is non-empty");

        for &idx in &member_indices {
            let var_count = items[idx].variants.len();
            if mode.saturating_sub(var_count) >= 2 {
                let details = json!({
                    "grid_source_line": source_line,
                    "item_variant_count": var_count,
                    "group_mode_count": mode,
                    "group_size": member_indices.len(),
                });
                items[idx].push_flag(FlagSeverity::Info, REASON_GRID_COUNT_OUTLIER, details);
            }
        }
    }
}
