//! Staged pipeline orchestration: ordered text lines in, validated
//! structured items out.
//!
//! Each stage consumes the complete output of the prior stage; later stages
//! (contextual resolution, cross-item consistency) need full-document
//! context and cannot operate on a prefix. Per-line classification is the
//! only embarrassingly parallel stage and runs on rayon with read-only
//! vocabulary tables.

use rayon::prelude::*;

use crate::classify::{classify_line, resolve};
use crate::consistency::check_cross_item_consistency;
use crate::core::config::PipelineConfig;
use crate::grammar::decompose::{decompose, merge_block};
use crate::grid::GridTracker;
use crate::semantic::{
    apply_auto_repairs, classify_confidence_tiers, generate_repair_recommendations, generate_semantic_report,
    score_semantic_confidence,
};
use crate::types::{
    AutoRepairResults, Line, LineClassification, LineType, MenuItem, ParsedMenuLine, SemanticReport,
};
use crate::variants::{
    build_variants, check_grid_count_consistency, check_variant_consistency, score_variant_confidence,
    validate_variant_prices,
};
use crate::vocab::headings::{category_for_heading, is_known_section_heading};

/// Everything a pipeline run produces: the items, the per-line audit trail,
/// the menu-level report, and the auto-repair results when repairs ran.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub items: Vec<MenuItem>,
    pub lines: Vec<LineClassification>,
    pub report: SemanticReport,
    pub auto_repair_results: Option<AutoRepairResults>,
}

/// Stage 1-2: classify every line independently, then contextually resolve.
pub fn classify_and_resolve(lines: &[Line]) -> Vec<LineClassification> {
    let classified: Vec<LineClassification> = lines.par_iter().map(classify_line).collect();
    resolve(classified)
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
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

fn new_item(grammar: ParsedMenuLine, line_index: usize, category: Option<String>) -> MenuItem {
    MenuItem {
        name: grammar.parsed_name.clone(),
        description: grammar.parsed_description.clone(),
        category,
        category_confidence: None,
        source_line_index: line_index,
        variants: Vec::new(),
        grammar,
        grid: None,
        flags: Vec::new(),
        semantic_confidence: None,
        semantic_confidence_details: None,
        semantic_tier: None,
        needs_review: false,
        repair_recommendations: Vec::new(),
        auto_repairs_applied: Vec::new(),
    }
}

fn is_block_continuation(line_type: LineType) -> bool {
    matches!(line_type, LineType::DescriptionOnly | LineType::PriceOnly)
}

/// Stage 3-5: walk resolved lines left-to-right building items, merging
/// description/orphaned-price continuations into their head item, tracking
/// the active size grid, and constructing variants.
fn build_items(resolved: &[LineClassification], config: &PipelineConfig) -> Vec<MenuItem> {
    let abbreviations = config.abbreviations();
    let mut tracker = GridTracker::new();
    let mut current_category: Option<String> = None;
    let mut items: Vec<MenuItem> = Vec::new();

    let mut i = 0;
    while i < resolved.len() {
        let line = &resolved[i];
        tracker.observe(line);

        match line.line_type {
            LineType::Heading => {
                let heading = line.cleaned_text.trim();
                if is_known_section_heading(heading) {
                    current_category = Some(
                        category_for_heading(heading)
                            .map(str::to_string)
                            .unwrap_or_else(|| title_case(heading)),
                    );
                }
                i += 1;
            }
            LineType::MenuItem => {
                let head = decompose(line, &abbreviations);

                // Merge following continuation lines into this item's block.
                let mut continuations: Vec<ParsedMenuLine> = Vec::new();
                let mut j = i + 1;
                while j < resolved.len() && is_block_continuation(resolved[j].line_type) {
                    continuations.push(decompose(&resolved[j], &abbreviations));
                    j += 1;
                }
                let grammar = if continuations.is_empty() {
                    head
                } else {
                    let refs: Vec<&ParsedMenuLine> = continuations.iter().collect();
                    merge_block(&head, &refs)
                };

                let (variants, grid) = build_variants(&grammar, &line.cleaned_text, &tracker);
                let mut item = new_item(grammar, line.line_index, current_category.clone());
                item.variants = variants;
                item.grid = grid;
                items.push(item);
                i = j;
            }
            LineType::MultiColumn => {
                // Each extracted column segment runs through the same
                // per-segment logic: size headers update the grid, item
                // segments become items.
                if let Some(segments) = &line.column_segments {
                    for segment in segments {
                        let mut synthetic = classify_line(&Line::new(segment.clone(), line.line_index));
                        tracker.observe(&synthetic);

                        if synthetic.line_type == LineType::Heading
                            && is_known_section_heading(synthetic.cleaned_text.trim())
                        {
                            let heading = synthetic.cleaned_text.trim();
                            current_category = Some(
                                category_for_heading(heading)
                                    .map(str::to_string)
                                    .unwrap_or_else(|| title_case(heading)),
                            );
                            continue;
                        }

                        // The columnar context is itself the disambiguation:
                        // a caps pseudo-heading or bare ingredient fragment
                        // sharing a line with other columns is an item name.
                        if matches!(synthetic.line_type, LineType::Heading | LineType::DescriptionOnly) {
                            synthetic.line_type = LineType::MenuItem;
                        }
                        if synthetic.line_type != LineType::MenuItem {
                            continue;
                        }

                        let grammar = decompose(&synthetic, &abbreviations);
                        let (variants, grid) = build_variants(&grammar, &synthetic.cleaned_text, &tracker);
                        let mut item = new_item(grammar, line.line_index, current_category.clone());
                        item.variants = variants;
                        item.grid = grid;
                        items.push(item);
                    }
                }
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    items
}

/// Run the full pipeline over an ordered sequence of raw OCR lines.
pub fn run_pipeline(lines: &[Line], config: &PipelineConfig) -> PipelineOutput {
    let resolved = classify_and_resolve(lines);
    tracing::debug!(lines = lines.len(), "line classification complete");

    let mut items = build_items(&resolved, config);
    tracing::debug!(items = items.len(), "item construction complete");

    // Per-item variant validation and consistency.
    for item in items.iter_mut() {
        validate_variant_prices(item);
        check_variant_consistency(item);
    }
    check_grid_count_consistency(&mut items);
    score_variant_confidence(&mut items);

    // Cross-item checks need the complete list.
    check_cross_item_consistency(&mut items, config);

    // Semantic confidence, tiers, recommendations.
    score_semantic_confidence(&mut items);
    classify_confidence_tiers(&mut items);
    generate_repair_recommendations(&mut items);

    let auto_repair_results = if config.apply_auto_repairs {
        let results = apply_auto_repairs(&mut items);
        tracing::debug!(repairs = results.repairs_applied, "auto-repairs applied");
        Some(results)
    } else {
        None
    };

    let report = generate_semantic_report(&items, auto_repair_results.clone());
    if items.iter().any(|i| i.needs_review) {
        tracing::warn!(
            needs_review = items.iter().filter(|i| i.needs_review).count(),
            grade = %report.menu_confidence.quality_grade,
            "menu requires review before publication"
        );
    }

    PipelineOutput {
        items,
        lines: resolved,
        report,
        auto_repair_results,
    }
}

/// Convenience wrapper: build `Line` records from plain strings and run.
pub fn run_pipeline_on_text<S: AsRef<str>>(texts: &[S], config: &PipelineConfig) -> PipelineOutput {
    let lines: Vec<Line> = texts
        .iter()
        .enumerate()
        .map(|(i, t)| Line::new(t.as_ref(), i))
        .collect();
    run_pipeline(&lines, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VariantKind;

    fn run(texts: &[&str]) -> PipelineOutput {
        run_pipeline_on_text(texts, &PipelineConfig::default())
    }

    #[test]
    fn test_items_inherit_section_category() {
        let output = run(&[
            "SPECIALTY PIZZAS",
            "Margherita 12.99",
            "Hawaiian 13.99",
            "BEVERAGES",
            "Coke 1.99",
        ]);
        assert_eq!(output.items.len(), 3);
        assert_eq!(output.items[0].category.as_deref(), Some("Pizza"));
        assert_eq!(output.items[1].category.as_deref(), Some("Pizza"));
        assert_eq!(output.items[2].category.as_deref(), Some("Beverages"));
    }

    #[test]
    fn test_description_continuation_merges_into_item() {
        let output = run(&["Meat Lovers Pizza 15.99", "pepperoni, sausage, ham, bacon"]);
        assert_eq!(output.items.len(), 1);
        let item = &output.items[0];
        assert_eq!(item.name, "Meat Lovers Pizza");
        assert_eq!(item.description.as_deref(), Some("pepperoni, sausage, ham, bacon"));
        assert!(item.grammar.components.is_some());
    }

    #[test]
    fn test_orphaned_price_merges_into_item() {
        let output = run(&["CURLY FRIES", ". 3.99"]);
        // The pseudo-heading before an orphaned price resolves to an item
        // and the price attaches to it.
        assert_eq!(output.items.len(), 1);
        assert_eq!(output.items[0].name, "CURLY FRIES");
        assert_eq!(output.items[0].primary_price_cents(), Some(399));
    }

    #[test]
    fn test_grid_applies_until_section_change() {
        let output = run(&[
            "GOURMET PIZZA",
            "10\"Mini 12\" Sml 16\"lrg Family Size",
            "CHEESE 8.00 11.50 13.95 22.50",
            "BEVERAGES",
            "SODA 1.99 2.99",
        ]);
        let cheese = &output.items[0];
        assert_eq!(cheese.variants.len(), 4);
        assert_eq!(cheese.variants[0].label, "10\" Mini");
        assert!(cheese.grid.is_some());
        // After the BEVERAGES heading the grid is gone.
        let soda = &output.items[1];
        assert!(soda.grid.is_none());
    }

    #[test]
    fn test_no_stage_deletes_items() {
        let output = run(&[
            "GOURMET PIZZA",
            "MARGARITA Rcccccerccrrrerseessrsessstessesssssrressesrsorsrrsmrcermesees 34.75",
            "ssseeeccc 1.00",
            "Cheese Pizza 12.99",
        ]);
        // The garbled item survives; the all-garble line degrades to an
        // orphaned price that merges into it. Nothing is silently lost.
        assert_eq!(output.items.len(), 2);
        assert!(output.items[0].name.contains("MARGARITA"));
        assert!(output.items[0].grammar.price_mentions.contains(&3475));
        assert!(output.items[0].grammar.price_mentions.contains(&100));
        // Every input line appears in the audit trail.
        assert_eq!(output.lines.len(), 4);
    }

    #[test]
    fn test_unknown_lines_preserved_in_line_output() {
        let output = run(&["***", "Cheese Pizza 12.99"]);
        assert_eq!(output.lines[0].line_type, LineType::Unknown);
        assert_eq!(output.lines[0].confidence, 0.0);
        assert_eq!(output.items.len(), 1);
    }

    #[test]
    fn test_multi_column_segments_become_items() {
        let output = run(&[
            "CLUB SANDWICHES",
            "BLT                         CHEESEBURGER       MANHATTAN CLUB",
        ]);
        assert_eq!(output.items.len(), 3);
        assert!(output.items.iter().all(|i| i.category.as_deref() == Some("Subs / Sandwiches")));
    }

    #[test]
    fn test_pipeline_output_is_fully_scored() {
        let output = run(&[
            "SPECIALTY PIZZAS",
            "Margherita 12.99",
            "Hawaiian - ham, pineapple 13.99",
        ]);
        for item in &output.items {
            assert!(item.semantic_confidence.is_some());
            assert!(item.semantic_tier.is_some());
            assert!(item.semantic_confidence_details.is_some());
            let score = item.semantic_confidence.unwrap();
            assert!((0.0..=1.0).contains(&score));
            for variant in &item.variants {
                assert!((0.0..=1.0).contains(&variant.confidence));
                assert!(variant.confidence_details.is_some());
            }
        }
        assert!(!output.report.quality_narrative.is_empty());
    }

    #[test]
    fn test_auto_repairs_opt_in() {
        let config = PipelineConfig {
            apply_auto_repairs: true,
            ..PipelineConfig::default()
        };
        let output = run_pipeline_on_text(
            &["SPECIALTY PIZZAS", "MARGHERITA SUPREME PIE 12.99", "Hawaiian 13.99"],
            &config,
        );
        assert!(output.auto_repair_results.is_some());
        // The all-caps name is auto-fixed to title case when its tier allows.
        let fixed = output.items.iter().find(|i| !i.auto_repairs_applied.is_empty());
        if let Some(item) = fixed {
            assert_eq!(item.auto_repairs_applied[0].field, "name");
        }
    }

    #[test]
    fn test_combo_line_end_to_end() {
        let output = run(&["CLUB SANDWICHES", "CHICKEN CLUB 9.95 W/FRIES 13.50"]);
        let item = &output.items[0];
        assert_eq!(item.variants.len(), 2);
        assert_eq!(item.variants[1].kind, VariantKind::Combo);
        assert_eq!(item.variants[1].label, "W/Fries");
    }

    #[test]
    fn test_empty_input() {
        let output = run(&[]);
        assert!(output.items.is_empty());
        assert_eq!(output.report.menu_confidence.total_items, 0);
    }
}
