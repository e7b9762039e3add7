//! Semantic confidence scoring, tier classification, repair
//! recommendations, auto-repair, and the menu-level report.

pub mod repair;
pub mod report;
pub mod score;
pub mod tiers;

pub use repair::{apply_auto_repairs, compute_repair_summary, generate_repair_recommendations};
pub use report::generate_semantic_report;
pub use score::score_semantic_confidence;
pub use tiers::{classify_confidence_tiers, compute_menu_confidence_summary, tier_for_score};
