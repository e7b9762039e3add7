//! Repair recommendations and opt-in auto-repair execution.
//!
//! Recommendations are generated for items below the High tier, one per
//! weak signal, prioritized by tier. Auto-repair mutates only fields whose
//! recommendation is explicitly auto-fixable, records an old/new audit
//! entry per change, and is idempotent.

use serde_json::json;

use crate::semantic::score::{is_name_garbled, score_semantic_confidence};
use crate::semantic::tiers::classify_confidence_tiers;
use crate::types::{
    AutoRepairRecord, AutoRepairResults, ConfidenceTier, MenuItem, ProposedFix, RepairPriority,
    RepairRecommendation, RepairSummary, RepairType,
};

pub const REPAIR_THRESHOLD_NAME_QUALITY: f64 = 0.60;
pub const REPAIR_THRESHOLD_PRICE_SCORE: f64 = 0.50;
pub const REPAIR_THRESHOLD_VARIANT_SCORE: f64 = 0.50;
pub const REPAIR_THRESHOLD_FLAG_PENALTY: f64 = 0.70;
pub const MIN_CATEGORY_SUGGESTION_CONFIDENCE: f64 = 0.40;

fn priority_for_tier(tier: ConfidenceTier) -> RepairPriority {
    match tier {
        ConfidenceTier::Reject => RepairPriority::Critical,
        ConfidenceTier::Low => RepairPriority::Important,
        ConfidenceTier::Medium => RepairPriority::Suggested,
        // High-tier items produce no recommendations; this arm is for
        // completeness of the mapping only.
        ConfidenceTier::High => RepairPriority::Suggested,
    }
}

fn title_case_name(name: &str) -> String {
    name.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn rec(
    rec_type: RepairType,
    priority: RepairPriority,
    message: String,
    auto_fixable: bool,
    source_signal: &str,
    proposed_fix: Option<ProposedFix>,
    details: serde_json::Value,
) -> RepairRecommendation {
    RepairRecommendation {
        rec_type,
        priority,
        message,
        auto_fixable,
        source_signal: source_signal.to_string(),
        proposed_fix,
        applied: false,
        details,
    }
}

fn name_recommendations(item: &MenuItem, priority: RepairPriority, out: &mut Vec<RepairRecommendation>) {
    let name = item.name.trim();

    if name.is_empty() || is_name_garbled(name) {
        out.push(rec(
            RepairType::GarbledName,
            priority,
            if name.is_empty() {
                "Item has no readable name; manual entry required.".to_string()
            } else {
                format!("Name \"{name}\" looks like OCR garble; manual correction required.")
            },
            false,
            "name_quality_score",
            None,
            json!({ "name": name }),
        ));
        return;
    }

    if name.len() < 3 {
        out.push(rec(
            RepairType::NameQuality,
            priority,
            format!("Name \"{name}\" is very short; likely truncated by OCR."),
            false,
            "name_quality_score",
            None,
            json!({ "name": name }),
        ));
        return;
    }

    if name.len() > 2 && name == name.to_uppercase() {
        // Cosmetic fix, safe to automate; priority stays Suggested even on
        // low tiers since nothing is actually wrong with the item.
        out.push(rec(
            RepairType::NameQuality,
            RepairPriority::Suggested,
            format!("Name \"{name}\" is all caps; title case proposed."),
            true,
            "name_quality_score",
            Some(ProposedFix::Name(title_case_name(name))),
            json!({ "name": name }),
        ));
    }
}

const VARIANT_FLAG_MESSAGES: [(&str, &str); 8] = [
    ("variant_price_inversion", "Variant prices are out of order for their sizes."),
    ("duplicate_variant", "Item carries duplicate variants for the same size or option."),
    ("zero_price_variant", "One or more variants are priced at $0.00."),
    ("size_gap", "Size lineup skips an intermediate size."),
    ("grid_incomplete", "Item has fewer variants than its size grid has columns."),
    ("grid_count_outlier", "Variant count differs from other items under the same size grid."),
    ("cross_item_variant_count_outlier", "Variant count differs from the rest of the category."),
    ("cross_item_variant_label_mismatch", "Size labels differ from the category's dominant label set."),
];

fn variant_recommendations(item: &MenuItem, priority: RepairPriority, out: &mut Vec<RepairRecommendation>) {
    let mut emitted = false;
    for (reason, message) in VARIANT_FLAG_MESSAGES {
        if item.flags.iter().any(|f| f.reason == reason) {
            out.push(rec(
                RepairType::VariantStandardization,
                priority,
                message.to_string(),
                false,
                "variant_score",
                None,
                json!({ "flag_reason": reason }),
            ));
            emitted = true;
        }
    }
    if !emitted {
        out.push(rec(
            RepairType::VariantStandardization,
            priority,
            "Variant confidence is low; review labels and prices.".to_string(),
            false,
            "variant_score",
            None,
            serde_json::Value::Null,
        ));
    }
}

/// Generate repair recommendations for every item, sorted by priority.
/// High-tier items get none.
pub fn generate_repair_recommendations(items: &mut [MenuItem]) {
    for item in items.iter_mut() {
        let tier = item.semantic_tier.unwrap_or(ConfidenceTier::Reject);
        item.repair_recommendations.clear();
        if tier == ConfidenceTier::High {
            continue;
        }
        let priority = priority_for_tier(tier);
        let Some(details) = item.semantic_confidence_details.clone() else {
            continue;
        };

        let mut recs = Vec::new();

        if details.name_quality_score < REPAIR_THRESHOLD_NAME_QUALITY {
            name_recommendations(item, priority, &mut recs);
        }

        if details.price_score < REPAIR_THRESHOLD_PRICE_SCORE {
            recs.push(rec(
                RepairType::PriceMissing,
                priority,
                "No price detected; manual price entry required.".to_string(),
                false,
                "price_score",
                None,
                serde_json::Value::Null,
            ));
        }

        // Category suggestions strong enough to act on get promoted to a
        // recommendation; the strongest one wins.
        let best_suggestion = item
            .flags
            .iter()
            .filter(|f| f.reason == "cross_item_category_suggestion")
            .filter_map(|f| {
                let confidence = f.details["suggestion_confidence"].as_f64()?;
                (confidence >= MIN_CATEGORY_SUGGESTION_CONFIDENCE).then_some((confidence, &f.details))
            })
            .max_by(|a, b| a.0.partial_cmp(&b.0).expect("confidence is never NaN"));
        if let Some((confidence, details)) = best_suggestion {
            let current = details["current_category"].as_str().unwrap_or("").to_string();
            let suggested = details["suggested_category"].as_str().unwrap_or("").to_string();
            let signals: Vec<String> = details["signals"]
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default();
            if !suggested.is_empty() {
                recs.push(rec(
                    RepairType::CategoryReassignment,
                    priority,
                    format!(
                        "Category \"{current}\" likely wrong; \"{suggested}\" suggested ({}).",
                        signals.join("; ")
                    ),
                    true,
                    "category_suggestion_flag",
                    Some(ProposedFix::Category(suggested)),
                    json!({ "suggestion_confidence": confidence, "signals": signals }),
                ));
            }
        }

        if details.variant_score < REPAIR_THRESHOLD_VARIANT_SCORE {
            variant_recommendations(item, priority, &mut recs);
        }

        if details.flag_penalty_score < REPAIR_THRESHOLD_FLAG_PENALTY && !item.flags.is_empty() {
            let warn_count = item
                .flags
                .iter()
                .filter(|f| f.severity == crate::types::FlagSeverity::Warn)
                .count();
            let info_count = item
                .flags
                .iter()
                .filter(|f| f.severity == crate::types::FlagSeverity::Info)
                .count();
            let top_reasons: Vec<&str> = item
                .flags
                .iter()
                .filter(|f| f.severity == crate::types::FlagSeverity::Warn)
                .map(|f| f.reason.as_str())
                .take(3)
                .collect();
            recs.push(rec(
                RepairType::FlagAttention,
                priority,
                format!("Item carries {warn_count} warning and {info_count} info flags; review before publishing."),
                false,
                "flag_penalty_score",
                None,
                json!({
                    "warn_count": warn_count,
                    "info_count": info_count,
                    "top_reasons": top_reasons,
                }),
            ));
        }

        recs.sort_by_key(|r| r.priority);
        item.repair_recommendations = recs;
    }
}

/// Aggregate recommendation statistics over the menu.
pub fn compute_repair_summary(items: &[MenuItem]) -> RepairSummary {
    let mut summary = RepairSummary {
        total_items: items.len(),
        ..RepairSummary::default()
    };

    for item in items {
        let recs = &item.repair_recommendations;
        if recs.is_empty() {
            continue;
        }
        summary.items_with_recommendations += 1;
        summary.total_recommendations += recs.len();

        let category = item
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or("Uncategorized");
        *summary.category_breakdown.entry(category.to_string()).or_insert(0) += recs.len();

        for rec in recs {
            let priority = match rec.priority {
                RepairPriority::Critical => "critical",
                RepairPriority::Important => "important",
                RepairPriority::Suggested => "suggested",
            };
            *summary.by_priority.entry(priority.to_string()).or_insert(0) += 1;
            *summary.by_type.entry(rec.rec_type.as_str().to_string()).or_insert(0) += 1;
            if rec.auto_fixable {
                summary.auto_fixable_count += 1;
            }
        }
    }

    summary
}

fn repair_type_bucket(rec_type: RepairType) -> &'static str {
    match rec_type {
        RepairType::GarbledName | RepairType::NameQuality => "name",
        RepairType::CategoryReassignment => "category",
        RepairType::PriceMissing => "price",
        RepairType::VariantStandardization => "variant",
        RepairType::FlagAttention => "flag",
    }
}

/// Execute auto-fixable recommendations in place.
///
/// Only fields explicitly marked auto-fixable mutate; each change records an
/// old/new audit entry and marks its recommendation applied, so reapplying
/// is a no-op. Confidence scoring and tier classification re-run afterward
/// so the final state reflects post-repair quality.
pub fn apply_auto_repairs(items: &mut [MenuItem]) -> AutoRepairResults {
    let mut results = AutoRepairResults::default();

    for item in items.iter_mut() {
        let mut item_repaired = false;
        let mut repairs: Vec<AutoRepairRecord> = Vec::new();
        let mut name_fix: Option<(usize, String)> = None;
        let mut category_fix: Option<(usize, String)> = None;

        for (idx, rec) in item.repair_recommendations.iter().enumerate() {
            if !rec.auto_fixable || rec.applied {
                continue;
            }
            match &rec.proposed_fix {
                Some(ProposedFix::Name(new_name)) if name_fix.is_none() => {
                    name_fix = Some((idx, new_name.clone()));
                }
                Some(ProposedFix::Category(new_category)) if category_fix.is_none() => {
                    category_fix = Some((idx, new_category.clone()));
                }
                _ => {}
            }
        }

        if let Some((idx, new_name)) = name_fix {
            if item.name != new_name {
                repairs.push(AutoRepairRecord {
                    field: "name".to_string(),
                    old_value: item.name.clone(),
                    new_value: new_name.clone(),
                    rec_type: item.repair_recommendations[idx].rec_type,
                });
                item.grammar.parsed_name = new_name.clone();
                item.name = new_name;
                item_repaired = true;
            }
            item.repair_recommendations[idx].applied = true;
        }

        if let Some((idx, new_category)) = category_fix {
            if item.category.as_deref() != Some(new_category.as_str()) {
                repairs.push(AutoRepairRecord {
                    field: "category".to_string(),
                    old_value: item.category.clone().unwrap_or_default(),
                    new_value: new_category.clone(),
                    rec_type: item.repair_recommendations[idx].rec_type,
                });
                item.category = Some(new_category);
                item_repaired = true;
            }
            item.repair_recommendations[idx].applied = true;
        }

        if item_repaired {
            results.total_items_repaired += 1;
        }
        for record in &repairs {
            results.repairs_applied += 1;
            *results
                .by_type
                .entry(repair_type_bucket(record.rec_type).to_string())
                .or_insert(0) += 1;
        }
        item.auto_repairs_applied.extend(repairs);
    }

    // Re-score so the final state reflects post-repair quality.
    score_semantic_confidence(items);
    classify_confidence_tiers(items);

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::tests_support::{bare_item, priced_item};
    use crate::types::{FlagSeverity, ItemFlag, SemanticConfidenceDetails};

    fn details(
        name_quality_score: f64,
        price_score: f64,
        variant_score: f64,
        flag_penalty_score: f64,
    ) -> SemanticConfidenceDetails {
        SemanticConfidenceDetails {
            grammar_score: 0.5,
            grammar_weight: 0.30,
            grammar_weighted: 0.15,
            name_quality_score,
            name_quality_weight: 0.20,
            name_quality_weighted: name_quality_score * 0.20,
            price_score,
            price_weight: 0.20,
            price_weighted: price_score * 0.20,
            variant_score,
            variant_weight: 0.15,
            variant_weighted: variant_score * 0.15,
            flag_penalty_score,
            flag_penalty_weight: 0.15,
            flag_penalty_weighted: flag_penalty_score * 0.15,
            final_score: 0.50,
        }
    }

    fn tiered_item(name: &str, tier: ConfidenceTier, d: SemanticConfidenceDetails) -> MenuItem {
        let mut item = bare_item(name);
        item.semantic_confidence = Some(0.50);
        item.semantic_confidence_details = Some(d);
        item.semantic_tier = Some(tier);
        item.needs_review = tier != ConfidenceTier::High;
        item
    }

    fn rec_types(item: &MenuItem) -> Vec<&'static str> {
        item.repair_recommendations.iter().map(|r| r.rec_type.as_str()).collect()
    }

    #[test]
    fn test_high_tier_no_recommendations() {
        let mut item = tiered_item("Fine Item", ConfidenceTier::High, details(0.3, 0.3, 0.2, 0.4));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        assert!(item.repair_recommendations.is_empty());
    }

    #[test]
    fn test_name_quality_at_threshold_no_rec() {
        let mut item = tiered_item("Decent Name", ConfidenceTier::Low, details(0.60, 1.0, 0.5, 1.0));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        assert!(!rec_types(&item).contains(&"name_quality"));
        assert!(!rec_types(&item).contains(&"garbled_name"));
    }

    #[test]
    fn test_garbled_name_rec() {
        let mut item = tiered_item("eeeecccrrrvvvw", ConfidenceTier::Reject, details(0.20, 1.0, 0.5, 1.0));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let rec = item
            .repair_recommendations
            .iter()
            .find(|r| r.rec_type == RepairType::GarbledName)
            .unwrap();
        assert!(rec.message.contains("eeeecccrrrvvvw"));
        assert!(!rec.auto_fixable);
        assert_eq!(rec.priority, RepairPriority::Critical);
        assert_eq!(rec.source_signal, "name_quality_score");
    }

    #[test]
    fn test_short_name_rec() {
        let mut item = tiered_item("AB", ConfidenceTier::Low, details(0.30, 1.0, 0.5, 1.0));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let rec = item
            .repair_recommendations
            .iter()
            .find(|r| r.rec_type == RepairType::NameQuality)
            .unwrap();
        assert!(rec.message.contains("short"));
        assert_eq!(rec.priority, RepairPriority::Important);
    }

    #[test]
    fn test_all_caps_auto_fixable_title_case() {
        let mut item = tiered_item("CHICKEN WINGS", ConfidenceTier::Medium, details(0.59, 1.0, 0.5, 1.0));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let rec = item
            .repair_recommendations
            .iter()
            .find(|r| r.rec_type == RepairType::NameQuality && r.auto_fixable)
            .unwrap();
        assert_eq!(rec.proposed_fix, Some(ProposedFix::Name("Chicken Wings".to_string())));
        assert_eq!(rec.priority, RepairPriority::Suggested);
    }

    #[test]
    fn test_all_caps_priority_stays_suggested_even_on_reject() {
        let mut item = tiered_item("BUFFALO WINGS", ConfidenceTier::Reject, details(0.50, 1.0, 0.5, 1.0));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let rec = item
            .repair_recommendations
            .iter()
            .find(|r| r.rec_type == RepairType::NameQuality && r.auto_fixable)
            .unwrap();
        assert_eq!(rec.priority, RepairPriority::Suggested);
    }

    #[test]
    fn test_price_missing_rec() {
        let mut item = tiered_item("Good Enough Name", ConfidenceTier::Low, details(1.0, 0.30, 0.5, 1.0));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let rec = item
            .repair_recommendations
            .iter()
            .find(|r| r.rec_type == RepairType::PriceMissing)
            .unwrap();
        assert!(!rec.auto_fixable);
        assert!(rec.message.to_lowercase().contains("price"));
        assert_eq!(rec.source_signal, "price_score");

        // At threshold: no rec.
        let mut item = tiered_item("Good Enough Name", ConfidenceTier::Low, details(1.0, 0.50, 0.5, 1.0));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        assert!(!rec_types(&item).contains(&"price_missing"));
    }

    fn suggestion_flag(suggested: &str, confidence: f64) -> ItemFlag {
        ItemFlag::new(
            FlagSeverity::Info,
            "cross_item_category_suggestion",
            serde_json::json!({
                "current_category": "Sides",
                "suggested_category": suggested,
                "suggestion_confidence": confidence,
                "signals": ["4/6 neighbors are Pizza"],
            }),
        )
    }

    #[test]
    fn test_category_suggestion_promoted() {
        let mut item = tiered_item("Good Enough Name", ConfidenceTier::Low, details(1.0, 1.0, 0.5, 1.0));
        item.flags.push(suggestion_flag("Pizza", 0.72));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let rec = item
            .repair_recommendations
            .iter()
            .find(|r| r.rec_type == RepairType::CategoryReassignment)
            .unwrap();
        assert!(rec.auto_fixable);
        assert_eq!(rec.proposed_fix, Some(ProposedFix::Category("Pizza".to_string())));
        assert!(rec.message.contains("Sides") && rec.message.contains("Pizza"));
        assert!(rec.message.to_lowercase().contains("neighbor"));
        assert_eq!(rec.source_signal, "category_suggestion_flag");
    }

    #[test]
    fn test_weak_suggestion_not_promoted_strong_boundary_is() {
        let mut item = tiered_item("Good Enough Name", ConfidenceTier::Low, details(1.0, 1.0, 0.5, 1.0));
        item.flags.push(suggestion_flag("Pizza", 0.35));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        assert!(!rec_types(&item).contains(&"category_reassignment"));

        let mut item = tiered_item("Good Enough Name", ConfidenceTier::Low, details(1.0, 1.0, 0.5, 1.0));
        item.flags.push(suggestion_flag("Entrees", 0.40));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        assert!(rec_types(&item).contains(&"category_reassignment"));
    }

    #[test]
    fn test_strongest_suggestion_wins() {
        let mut item = tiered_item("Good Enough Name", ConfidenceTier::Low, details(1.0, 1.0, 0.5, 1.0));
        item.flags.push(suggestion_flag("Wings", 0.55));
        item.flags.push(suggestion_flag("Pizza", 0.80));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let rec = item
            .repair_recommendations
            .iter()
            .find(|r| r.rec_type == RepairType::CategoryReassignment)
            .unwrap();
        assert_eq!(rec.proposed_fix, Some(ProposedFix::Category("Pizza".to_string())));
    }

    #[test]
    fn test_variant_recs_one_per_flag_reason() {
        let mut item = tiered_item("Good Enough Name", ConfidenceTier::Low, details(1.0, 1.0, 0.20, 1.0));
        item.flags.push(ItemFlag::new(FlagSeverity::Warn, "duplicate_variant", serde_json::json!({})));
        item.flags.push(ItemFlag::new(FlagSeverity::Warn, "zero_price_variant", serde_json::json!({})));
        item.flags.push(ItemFlag::new(FlagSeverity::Info, "size_gap", serde_json::json!({})));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let variant_recs: Vec<_> = item
            .repair_recommendations
            .iter()
            .filter(|r| r.rec_type == RepairType::VariantStandardization)
            .collect();
        assert_eq!(variant_recs.len(), 3);
        assert!(variant_recs.iter().any(|r| r.message.contains("duplicate")));
        assert!(variant_recs.iter().any(|r| r.message.contains("$0.00")));
        assert!(variant_recs.iter().all(|r| !r.auto_fixable));
    }

    #[test]
    fn test_variant_generic_rec_without_flags() {
        let mut item = tiered_item("Good Enough Name", ConfidenceTier::Low, details(1.0, 1.0, 0.30, 1.0));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let rec = item
            .repair_recommendations
            .iter()
            .find(|r| r.rec_type == RepairType::VariantStandardization)
            .unwrap();
        assert!(rec.message.to_lowercase().contains("low"));
    }

    #[test]
    fn test_flag_attention_counts() {
        let mut item = tiered_item("Good Enough Name", ConfidenceTier::Low, details(1.0, 1.0, 0.5, 0.55));
        item.flags.push(ItemFlag::new(FlagSeverity::Warn, "cross_item_category_price_outlier", serde_json::json!({})));
        item.flags.push(ItemFlag::new(FlagSeverity::Warn, "cross_category_price_above", serde_json::json!({})));
        item.flags.push(ItemFlag::new(FlagSeverity::Info, "some_info_flag", serde_json::json!({})));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let rec = item
            .repair_recommendations
            .iter()
            .find(|r| r.rec_type == RepairType::FlagAttention)
            .unwrap();
        assert!(rec.message.contains("2 warning"));
        assert!(rec.message.contains("1 info"));
        assert_eq!(rec.details["warn_count"], 2);
        assert_eq!(rec.details["info_count"], 1);
        assert_eq!(rec.details["top_reasons"].as_array().unwrap().len(), 2);
        assert!(!rec.auto_fixable);
    }

    #[test]
    fn test_no_flags_no_flag_attention() {
        let mut item = tiered_item("Good Enough Name", ConfidenceTier::Low, details(1.0, 1.0, 0.5, 0.50));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        assert!(!rec_types(&item).contains(&"flag_attention"));
    }

    #[test]
    fn test_recs_sorted_by_priority() {
        let mut item = tiered_item("CHICKEN WINGS", ConfidenceTier::Reject, details(0.50, 0.30, 0.5, 1.0));
        generate_repair_recommendations(std::slice::from_mut(&mut item));
        let priorities: Vec<RepairPriority> = item.repair_recommendations.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn test_repair_summary_shapes() {
        let mut items = vec![
            tiered_item("Fine Item Name", ConfidenceTier::High, details(1.0, 1.0, 0.5, 1.0)),
            tiered_item("Priceless Item", ConfidenceTier::Low, details(1.0, 0.30, 0.5, 1.0)),
            tiered_item("AB", ConfidenceTier::Reject, details(0.30, 0.30, 0.5, 1.0)),
        ];
        generate_repair_recommendations(&mut items);
        let summary = compute_repair_summary(&items);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.items_with_recommendations, 2);
        assert_eq!(summary.by_type.values().sum::<usize>(), summary.total_recommendations);
        assert_eq!(summary.by_priority.values().sum::<usize>(), summary.total_recommendations);
    }

    #[test]
    fn test_auto_repair_applies_name_and_audits() {
        let mut item = priced_item("BUFALO WNIGS", "Wings", 899);
        item.semantic_tier = Some(ConfidenceTier::Reject);
        item.repair_recommendations.push(RepairRecommendation {
            rec_type: RepairType::GarbledName,
            priority: RepairPriority::Critical,
            message: "test".to_string(),
            auto_fixable: true,
            source_signal: "test".to_string(),
            proposed_fix: Some(ProposedFix::Name("Buffalo Wings".to_string())),
            applied: false,
            details: serde_json::Value::Null,
        });
        let results = apply_auto_repairs(std::slice::from_mut(&mut item));
        assert_eq!(item.name, "Buffalo Wings");
        assert_eq!(item.grammar.parsed_name, "Buffalo Wings");
        assert_eq!(item.auto_repairs_applied.len(), 1);
        assert_eq!(item.auto_repairs_applied[0].old_value, "BUFALO WNIGS");
        assert_eq!(item.auto_repairs_applied[0].new_value, "Buffalo Wings");
        assert!(item.repair_recommendations[0].applied);
        assert_eq!(results.repairs_applied, 1);
        assert_eq!(results.by_type.get("name"), Some(&1));
        // Rescoring ran.
        assert!(item.semantic_confidence.is_some());
    }

    #[test]
    fn test_auto_repair_applies_category() {
        let mut item = priced_item("Truffle Fries", "Pizza", 599);
        item.repair_recommendations.push(RepairRecommendation {
            rec_type: RepairType::CategoryReassignment,
            priority: RepairPriority::Important,
            message: "test".to_string(),
            auto_fixable: true,
            source_signal: "test".to_string(),
            proposed_fix: Some(ProposedFix::Category("Sides / Appetizers".to_string())),
            applied: false,
            details: serde_json::Value::Null,
        });
        let results = apply_auto_repairs(std::slice::from_mut(&mut item));
        assert_eq!(item.category.as_deref(), Some("Sides / Appetizers"));
        assert_eq!(item.auto_repairs_applied[0].field, "category");
        assert_eq!(item.auto_repairs_applied[0].old_value, "Pizza");
        assert_eq!(results.by_type.get("category"), Some(&1));
    }

    #[test]
    fn test_auto_repair_skips_non_fixable_and_is_idempotent() {
        let mut item = priced_item("Mystery Item", "Pizza", 599);
        item.repair_recommendations.push(RepairRecommendation {
            rec_type: RepairType::PriceMissing,
            priority: RepairPriority::Important,
            message: "test".to_string(),
            auto_fixable: false,
            source_signal: "test".to_string(),
            proposed_fix: None,
            applied: false,
            details: serde_json::Value::Null,
        });
        item.repair_recommendations.push(RepairRecommendation {
            rec_type: RepairType::NameQuality,
            priority: RepairPriority::Suggested,
            message: "test".to_string(),
            auto_fixable: true,
            source_signal: "test".to_string(),
            proposed_fix: Some(ProposedFix::Name("Mystery Dish".to_string())),
            applied: false,
            details: serde_json::Value::Null,
        });

        let first = apply_auto_repairs(std::slice::from_mut(&mut item));
        assert_eq!(first.repairs_applied, 1);
        assert_eq!(item.name, "Mystery Dish");
        assert!(!item.repair_recommendations[0].applied);

        let second = apply_auto_repairs(std::slice::from_mut(&mut item));
        assert_eq!(second.repairs_applied, 0);
        assert_eq!(item.auto_repairs_applied.len(), 1);
    }

    #[test]
    fn test_auto_repair_same_value_is_noop() {
        let mut item = priced_item("Fries", "Sides / Appetizers", 399);
        item.repair_recommendations.push(RepairRecommendation {
            rec_type: RepairType::CategoryReassignment,
            priority: RepairPriority::Suggested,
            message: "test".to_string(),
            auto_fixable: true,
            source_signal: "test".to_string(),
            proposed_fix: Some(ProposedFix::Category("Sides / Appetizers".to_string())),
            applied: false,
            details: serde_json::Value::Null,
        });
        let results = apply_auto_repairs(std::slice::from_mut(&mut item));
        assert_eq!(results.repairs_applied, 0);
        assert!(item.auto_repairs_applied.is_empty());
        assert!(item.repair_recommendations[0].applied);
    }

    #[test]
    fn test_empty_items_safe() {
        let results = apply_auto_repairs(&mut []);
        assert_eq!(results.repairs_applied, 0);
        generate_repair_recommendations(&mut []);
    }
}
