//! Menu-level quality report: confidence summary, repair summary, pipeline
//! coverage, issue digest, category health ranking, and a human-readable
//! narrative.

use std::collections::BTreeMap;

use crate::semantic::repair::compute_repair_summary;
use crate::semantic::tiers::{compute_menu_confidence_summary, quality_grade, TIER_MEDIUM};
use crate::types::{
    AutoRepairResults, CategoryHealthEntry, CommonFlagEntry, ConfidenceTier, CoverageEntry, IssueDigest,
    MenuItem, SemanticReport, TopIssueEntry, WorstItemEntry,
};

const WORST_ITEMS_LIMIT: usize = 10;
const COMMON_FLAGS_LIMIT: usize = 8;

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn pipeline_coverage(items: &[MenuItem]) -> BTreeMap<String, CoverageEntry> {
    let mut coverage = BTreeMap::new();
    if items.is_empty() {
        return coverage;
    }
    let total = items.len();
    let mut put = |key: &str, count: usize| {
        coverage.insert(
            key.to_string(),
            CoverageEntry {
                count,
                pct: round4(count as f64 / total as f64),
            },
        );
    };
    put("has_grammar", items.iter().filter(|i| !i.grammar.parsed_name.is_empty()).count());
    put("has_semantic_confidence", items.iter().filter(|i| i.semantic_confidence.is_some()).count());
    put("has_semantic_tier", items.iter().filter(|i| i.semantic_tier.is_some()).count());
    put("has_price_flags", items.iter().filter(|i| !i.flags.is_empty()).count());
    put("has_variants", items.iter().filter(|i| !i.variants.is_empty()).count());
    put(
        "has_repair_recommendations",
        items.iter().filter(|i| !i.repair_recommendations.is_empty()).count(),
    );
    put("has_auto_repairs", items.iter().filter(|i| !i.auto_repairs_applied.is_empty()).count());
    coverage
}

fn issue_digest(items: &[MenuItem]) -> IssueDigest {
    if items.is_empty() {
        return IssueDigest::default();
    }
    let total = items.len();

    // Top issues: recommendation types by frequency.
    let mut type_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        for rec in &item.repair_recommendations {
            *type_counts.entry(rec.rec_type.as_str()).or_insert(0) += 1;
        }
    }
    let mut top_issues: Vec<TopIssueEntry> = type_counts
        .into_iter()
        .map(|(rec_type, count)| TopIssueEntry {
            rec_type: rec_type.to_string(),
            count,
            pct: round4(count.min(total) as f64 / total as f64),
        })
        .collect();
    top_issues.sort_by(|a, b| b.count.cmp(&a.count).then(a.rec_type.cmp(&b.rec_type)));

    // Worst items: lowest confidence first, capped.
    let mut ranked: Vec<&MenuItem> = items.iter().collect();
    ranked.sort_by(|a, b| {
        let sa = a.semantic_confidence.unwrap_or(0.0);
        let sb = b.semantic_confidence.unwrap_or(0.0);
        sa.partial_cmp(&sb).expect("confidence is never NaN")
    });
    let worst_items = ranked
        .iter()
        .take(WORST_ITEMS_LIMIT)
        .map(|item| WorstItemEntry {
            name: item.name.clone(),
            confidence: item.semantic_confidence.unwrap_or(0.0),
            tier: item
                .semantic_tier
                .unwrap_or(ConfidenceTier::Reject)
                .as_str()
                .to_string(),
            category: item
                .category
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "Uncategorized".to_string()),
            issue_count: item.repair_recommendations.len() + item.flags.len(),
        })
        .collect();

    // Common flags: reasons by frequency, capped.
    let mut flag_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        for flag in &item.flags {
            *flag_counts.entry(flag.reason.as_str()).or_insert(0) += 1;
        }
    }
    let mut common_flags: Vec<CommonFlagEntry> = flag_counts
        .into_iter()
        .map(|(reason, count)| CommonFlagEntry {
            reason: reason.to_string(),
            count,
        })
        .collect();
    common_flags.sort_by(|a, b| b.count.cmp(&a.count).then(a.reason.cmp(&b.reason)));
    common_flags.truncate(COMMON_FLAGS_LIMIT);

    IssueDigest {
        top_issues,
        worst_items,
        common_flags,
    }
}

fn category_health(items: &[MenuItem]) -> Vec<CategoryHealthEntry> {
    let mut groups: BTreeMap<String, Vec<&MenuItem>> = BTreeMap::new();
    for item in items {
        let category = item
            .category
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Uncategorized".to_string());
        groups.entry(category).or_default().push(item);
    }

    let mut health: Vec<CategoryHealthEntry> = groups
        .into_iter()
        .map(|(category, members)| {
            let count = members.len();
            let mean =
                members.iter().map(|i| i.semantic_confidence.unwrap_or(0.0)).sum::<f64>() / count as f64;
            let high = members
                .iter()
                .filter(|i| i.semantic_tier == Some(ConfidenceTier::High))
                .count();
            let review = members.iter().filter(|i| i.needs_review).count();
            CategoryHealthEntry {
                category,
                count,
                mean_confidence: round4(mean),
                needs_review_pct: round4(review as f64 / count as f64),
                grade: quality_grade(high, count).to_string(),
            }
        })
        .collect();

    // Worst first.
    health.sort_by(|a, b| {
        a.mean_confidence
            .partial_cmp(&b.mean_confidence)
            .expect("confidence is never NaN")
            .then_with(|| a.category.cmp(&b.category))
    });
    health
}

fn quality_narrative(
    items: &[MenuItem],
    summary_grade: &str,
    repair_count: usize,
    auto_repair: &AutoRepairResults,
    health: &[CategoryHealthEntry],
) -> String {
    if items.is_empty() {
        return "No items were extracted from this menu.".to_string();
    }

    let adjective = match summary_grade {
        "A" => "Excellent",
        "B" => "Good",
        "C" => "Fair",
        _ => "Poor",
    };
    let mut narrative = format!(
        "{adjective} extraction quality (grade {summary_grade}) across {} items.",
        items.len()
    );

    let review_count = items.iter().filter(|i| i.needs_review).count();
    if review_count > 0 {
        narrative.push_str(&format!(" {review_count} items need review before publication."));
    }

    if repair_count > 0 {
        narrative.push_str(&format!(" {repair_count} repair recommendations were generated."));
    }
    if auto_repair.repairs_applied > 0 {
        narrative.push_str(&format!(" {} auto-repairs were applied.", auto_repair.repairs_applied));
    }

    if let Some(weakest) = health.first() {
        if weakest.mean_confidence < TIER_MEDIUM && health.len() > 1 {
            narrative.push_str(&format!(
                " Weakest category: {} (mean confidence {:.2}).",
                weakest.category, weakest.mean_confidence
            ));
        }
    }

    narrative
}

/// Build the full menu-level report. Pass the results of an auto-repair run
/// when one was executed; otherwise zeros are reported.
pub fn generate_semantic_report(items: &[MenuItem], repair_results: Option<AutoRepairResults>) -> SemanticReport {
    let menu_confidence = compute_menu_confidence_summary(items);
    let repair_summary = compute_repair_summary(items);
    let auto_repair_results = repair_results.unwrap_or_default();
    let health = category_health(items);

    let narrative = quality_narrative(
        items,
        &menu_confidence.quality_grade,
        repair_summary.total_recommendations,
        &auto_repair_results,
        &health,
    );

    SemanticReport {
        menu_confidence,
        repair_summary,
        auto_repair_results,
        pipeline_coverage: pipeline_coverage(items),
        issue_digest: issue_digest(items),
        category_health: health,
        quality_narrative: narrative,
    }
}
