//! # Speisekarte
//!
//! Semantic menu intelligence: turns noisy OCR text extracted from
//! restaurant menus into structured, semantically validated menu data —
//! items with names, descriptions, categories, size variants, integer-cent
//! prices, and confidence-scored quality signals.
//!
//! Input is an ordered list of raw text lines from an upstream OCR engine;
//! image acquisition, OCR invocation, storage, and serving are the caller's
//! concern. The pipeline runs a fixed sequence of stages:
//!
//! 1. per-line classification (typo normalization, garble stripping,
//!    priority-ordered heuristic rules)
//! 2. multi-pass contextual resolution (multi-column merges, pseudo-heading
//!    reclassification)
//! 3. grammar decomposition (name / description / modifiers / sizes /
//!    prices, ingredient components)
//! 4. size-grid context tracking and variant construction
//! 5. per-item variant validation and confidence scoring
//! 6. cross-item consistency checks over the whole menu
//! 7. semantic confidence, tier classification, repair recommendations,
//!    and a menu-level quality report
//!
//! OCR text is adversarial by nature, so no stage fails on malformed input:
//! unclassifiable lines degrade to `Unknown`, unparseable prices are
//! skipped, anomalies are flagged but never auto-corrected unless a repair
//! is explicitly marked auto-fixable. The pipeline never invents text that
//! has no evidence in the input.
//!
//! # Example
//!
//! ```rust
//! use speisekarte::{run_pipeline_on_text, PipelineConfig};
//!
//! let lines = [
//!     "SPECIALTY PIZZAS",
//!     "10\"Mini 12\" Sml 16\"lrg Family Size",
//!     "CHEESE 8.00 11.50 13.95 22.50",
//! ];
//! let output = run_pipeline_on_text(&lines, &PipelineConfig::default());
//! assert_eq!(output.items.len(), 1);
//! assert_eq!(output.items[0].variants.len(), 4);
//! ```

pub mod classify;
pub mod consistency;
pub mod core;
pub mod error;
pub mod grammar;
pub mod grid;
pub mod semantic;
pub mod types;
pub mod variants;
pub mod vocab;

pub use crate::core::config::PipelineConfig;
pub use crate::core::pipeline::{run_pipeline, run_pipeline_on_text, PipelineOutput};
pub use error::{Result, SpeisekarteError};
pub use types::{
    ConfidenceTier, ItemComponents, Line, LineClassification, LineType, MenuConfidenceSummary, MenuItem,
    ParsedMenuLine, SemanticReport, SizeGridContext, Variant, VariantKind,
};
