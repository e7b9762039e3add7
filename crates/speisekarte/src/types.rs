use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Input
// ============================================================================

/// One unit of raw OCR text, as produced by the upstream OCR collaborator.
///
/// Immutable once constructed. The optional `gap_hints` carry byte offsets of
/// detected wide-whitespace runs, used for multi-column merge detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub text: String,
    pub line_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap_hints: Option<Vec<usize>>,
}

impl Line {
    pub fn new(text: impl Into<String>, line_index: usize) -> Self {
        Self {
            text: text.into(),
            line_index,
            gap_hints: None,
        }
    }
}

// ============================================================================
// Line classification
// ============================================================================

/// Closed set of line types the classifier can produce.
///
/// Exhaustive matching at every consumer replaces the loosely-typed string
/// dispatch of ad-hoc OCR scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    MenuItem,
    Heading,
    DescriptionOnly,
    ModifierLine,
    SizeHeader,
    ToppingList,
    InfoLine,
    PriceOnly,
    MultiColumn,
    Unknown,
}

/// Classification result for a single line.
///
/// Later contextual passes may overwrite `line_type`; the first independent
/// classification is preserved in `initial_line_type` for debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineClassification {
    pub line_index: usize,
    pub line_type: LineType,
    pub confidence: f64,
    /// Text after OCR typo normalization and garble stripping.
    pub cleaned_text: String,
    /// The raw input text, untouched.
    pub raw_text: String,
    /// Original classification before contextual resolution, if changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_line_type: Option<LineType>,
    /// Ordered text spans when `line_type` is `MultiColumn`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_segments: Option<Vec<String>>,
}

// ============================================================================
// Grammar decomposition
// ============================================================================

/// Decomposition of a menu-item line into name / description / modifiers /
/// size mentions / price mentions.
///
/// Never contains text absent from the source line: garble stripping and typo
/// normalization only remove or restore recognized noise patterns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedMenuLine {
    pub parsed_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub modifiers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub size_mentions: Vec<String>,
    /// Prices in line order, integer cents.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub price_mentions: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ItemComponents>,
    pub parse_confidence: f64,
}

/// Ingredient components tokenized out of an item description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemComponents {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub toppings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sauce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
    /// Populated only when every description token is a known flavor
    /// (choose-one semantics, e.g. "Hot, Mild, BBQ").
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub flavor_options: Vec<String>,
}

// ============================================================================
// Size grid
// ============================================================================

/// One column in a size-grid header, e.g. `10" Mini`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeGridColumn {
    pub raw_label: String,
    pub normalized: String,
    pub position: usize,
}

/// The active size grid parsed from a `SizeHeader` line.
///
/// Lives from the header line until replaced by a new header or invalidated
/// by a known section heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeGridContext {
    pub columns: Vec<SizeGridColumn>,
    pub started_at_line: usize,
}

impl SizeGridContext {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn label_for_position(&self, pos: usize) -> Option<&str> {
        self.columns.get(pos).map(|c| c.normalized.as_str())
    }
}

// ============================================================================
// Variants
// ============================================================================

/// Kind of a priced variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Size,
    Combo,
    Flavor,
    Style,
    Other,
}

/// One priced option of an item. Owned exclusively by its parent item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub kind: VariantKind,
    pub label: String,
    /// Integer minor-currency units (cents). Never floating point.
    pub price_cents: u32,
    /// Canonical size token used for ordinal comparison (`10in`, `S`, `6pc`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_size: Option<String>,
    /// Stable clustering key, e.g. `size:10in` or `combo:w/fries`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_details: Option<VariantConfidenceDetails>,
}

/// Audit record of the additive signal contributions to a variant's
/// confidence. Owned nested value, never a back-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantConfidenceDetails {
    pub base: f64,
    pub label_mod: f64,
    pub grammar_mod: f64,
    pub grid_mod: f64,
    pub flag_penalty: f64,
    pub final_score: f64,
}

// ============================================================================
// Flags
// ============================================================================

/// Severity of an attached anomaly flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagSeverity {
    Info,
    Warn,
    AutoFix,
}

/// Non-destructive annotation describing a detected anomaly.
///
/// Flags are additive-only: checks attach them but never mutate item fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFlag {
    pub severity: FlagSeverity,
    pub reason: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl ItemFlag {
    pub fn new(severity: FlagSeverity, reason: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            severity,
            reason: reason.into(),
            details,
        }
    }
}

// ============================================================================
// Items
// ============================================================================

/// Grid bookkeeping for an item that received grid-derived variant labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridApplication {
    pub source_line: usize,
    pub column_count: usize,
    /// True when fewer prices than columns were right-aligned onto the grid.
    pub right_aligned: bool,
}

/// One structured menu entry.
///
/// Created once per classified menu-item line (or merged block of lines) and
/// mutated in place by each downstream stage. No stage deletes an item:
/// quality issues are flagged, never silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Category assignment confidence on a 0-100 scale, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_confidence: Option<u8>,
    pub source_line_index: usize,
    pub variants: Vec<Variant>,
    /// Grammar decomposition audit trail.
    pub grammar: ParsedMenuLine,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridApplication>,
    /// Per-item and cross-item anomaly flags.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub flags: Vec<ItemFlag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_confidence_details: Option<SemanticConfidenceDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_tier: Option<ConfidenceTier>,
    pub needs_review: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub repair_recommendations: Vec<RepairRecommendation>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub auto_repairs_applied: Vec<AutoRepairRecord>,
}

impl MenuItem {
    /// Lowest positive variant price, used as the item's primary price.
    pub fn primary_price_cents(&self) -> Option<u32> {
        self.variants
            .iter()
            .map(|v| v.price_cents)
            .filter(|&p| p > 0)
            .min()
    }

    pub fn push_flag(&mut self, severity: FlagSeverity, reason: impl Into<String>, details: serde_json::Value) {
        self.flags.push(ItemFlag::new(severity, reason, details));
    }
}

// ============================================================================
// Semantic confidence
// ============================================================================

/// Coarse confidence bucket driving review-necessity decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
    Reject,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
            ConfidenceTier::Reject => "reject",
        }
    }
}

/// Full audit record of the five weighted semantic-confidence signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticConfidenceDetails {
    pub grammar_score: f64,
    pub grammar_weight: f64,
    pub grammar_weighted: f64,
    pub name_quality_score: f64,
    pub name_quality_weight: f64,
    pub name_quality_weighted: f64,
    pub price_score: f64,
    pub price_weight: f64,
    pub price_weighted: f64,
    pub variant_score: f64,
    pub variant_weight: f64,
    pub variant_weighted: f64,
    pub flag_penalty_score: f64,
    pub flag_penalty_weight: f64,
    pub flag_penalty_weighted: f64,
    pub final_score: f64,
}

// ============================================================================
// Repair
// ============================================================================

/// The six repair recommendation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairType {
    GarbledName,
    NameQuality,
    PriceMissing,
    CategoryReassignment,
    VariantStandardization,
    FlagAttention,
}

impl RepairType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepairType::GarbledName => "garbled_name",
            RepairType::NameQuality => "name_quality",
            RepairType::PriceMissing => "price_missing",
            RepairType::CategoryReassignment => "category_reassignment",
            RepairType::VariantStandardization => "variant_standardization",
            RepairType::FlagAttention => "flag_attention",
        }
    }
}

/// Recommendation priority, derived from the item's confidence tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairPriority {
    Critical,
    Important,
    Suggested,
}

/// A concrete fix that `apply_auto_repairs` may execute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ProposedFix {
    Name(String),
    Category(String),
}

/// One typed repair suggestion attached to an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairRecommendation {
    #[serde(rename = "type")]
    pub rec_type: RepairType,
    pub priority: RepairPriority,
    pub message: String,
    pub auto_fixable: bool,
    pub source_signal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_fix: Option<ProposedFix>,
    #[serde(default)]
    pub applied: bool,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

/// Audit entry for one executed auto-repair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoRepairRecord {
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub rec_type: RepairType,
}

// ============================================================================
// Menu-level summaries (derived, read-only)
// ============================================================================

/// Per-tier item counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub reject: usize,
}

impl TierCounts {
    pub fn bump(&mut self, tier: ConfidenceTier) {
        match tier {
            ConfidenceTier::High => self.high += 1,
            ConfidenceTier::Medium => self.medium += 1,
            ConfidenceTier::Low => self.low += 1,
            ConfidenceTier::Reject => self.reject += 1,
        }
    }
}

/// Per-category slice of the confidence summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryConfidenceSummary {
    pub count: usize,
    pub mean: f64,
    pub tier_counts: TierCounts,
    pub needs_review_count: usize,
}

/// Aggregate confidence statistics over a completed item list.
///
/// Computed on demand; never persisted as mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuConfidenceSummary {
    pub total_items: usize,
    pub mean_confidence: f64,
    pub median_confidence: f64,
    pub stdev_confidence: f64,
    pub tier_counts: TierCounts,
    pub needs_review_count: usize,
    /// A/B/C/D by percentage of high-tier items.
    pub quality_grade: String,
    pub category_summary: BTreeMap<String, CategoryConfidenceSummary>,
}

/// Aggregate statistics over repair recommendations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepairSummary {
    pub total_items: usize,
    pub items_with_recommendations: usize,
    pub total_recommendations: usize,
    pub by_priority: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub auto_fixable_count: usize,
    pub category_breakdown: BTreeMap<String, usize>,
}

/// Result of one `apply_auto_repairs` run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoRepairResults {
    pub total_items_repaired: usize,
    pub repairs_applied: usize,
    pub by_type: BTreeMap<String, usize>,
}

/// Stage coverage entry: how many items carry a given pipeline artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub count: usize,
    pub pct: f64,
}

/// One entry in the worst-items digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorstItemEntry {
    pub name: String,
    pub confidence: f64,
    pub tier: String,
    pub category: String,
    pub issue_count: usize,
}

/// One entry in the top-issues digest (recommendation type frequency).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopIssueEntry {
    #[serde(rename = "type")]
    pub rec_type: String,
    pub count: usize,
    pub pct: f64,
}

/// One entry in the common-flags digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonFlagEntry {
    pub reason: String,
    pub count: usize,
}

/// Issue digest: the most actionable problems across the menu.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueDigest {
    pub top_issues: Vec<TopIssueEntry>,
    pub worst_items: Vec<WorstItemEntry>,
    pub common_flags: Vec<CommonFlagEntry>,
}

/// Per-category health ranking entry, worst first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryHealthEntry {
    pub category: String,
    pub count: usize,
    pub mean_confidence: f64,
    pub needs_review_pct: f64,
    pub grade: String,
}

/// The full menu-level quality report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticReport {
    pub menu_confidence: MenuConfidenceSummary,
    pub repair_summary: RepairSummary,
    pub auto_repair_results: AutoRepairResults,
    pub pipeline_coverage: BTreeMap<String, CoverageEntry>,
    pub issue_digest: IssueDigest,
    pub category_health: Vec<CategoryHealthEntry>,
    pub quality_narrative: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_type_serde_snake_case() {
        let json = serde_json::to_string(&LineType::SizeHeader).unwrap();
        assert_eq!(json, "\"size_header\"");
        let back: LineType = serde_json::from_str("\"menu_item\"").unwrap();
        assert_eq!(back, LineType::MenuItem);
    }

    #[test]
    fn test_primary_price_is_lowest_positive() {
        let item = MenuItem {
            name: "Cheese Pizza".into(),
            description: None,
            category: None,
            category_confidence: None,
            source_line_index: 0,
            variants: vec![
                Variant {
                    kind: VariantKind::Size,
                    label: "L".into(),
                    price_cents: 1499,
                    normalized_size: Some("L".into()),
                    group_key: Some("size:L".into()),
                    confidence: 0.85,
                    confidence_details: None,
                },
                Variant {
                    kind: VariantKind::Size,
                    label: "S".into(),
                    price_cents: 999,
                    normalized_size: Some("S".into()),
                    group_key: Some("size:S".into()),
                    confidence: 0.85,
                    confidence_details: None,
                },
            ],
            grammar: ParsedMenuLine::default(),
            grid: None,
            flags: Vec::new(),
            semantic_confidence: None,
            semantic_confidence_details: None,
            semantic_tier: None,
            needs_review: false,
            repair_recommendations: Vec::new(),
            auto_repairs_applied: Vec::new(),
        };
        assert_eq!(item.primary_price_cents(), Some(999));
    }

    #[test]
    fn test_tier_counts_bump() {
        let mut counts = TierCounts::default();
        counts.bump(ConfidenceTier::High);
        counts.bump(ConfidenceTier::High);
        counts.bump(ConfidenceTier::Reject);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.reject, 1);
        assert_eq!(counts.medium, 0);
    }

    #[test]
    fn test_variant_serde_roundtrip_keeps_cents_integral() {
        let v = Variant {
            kind: VariantKind::Size,
            label: "10\"".into(),
            price_cents: 1099,
            normalized_size: Some("10in".into()),
            group_key: Some("size:10in".into()),
            confidence: 0.9,
            confidence_details: None,
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["price_cents"], serde_json::json!(1099));
        assert_eq!(json["kind"], serde_json::json!("size"));
    }
}
