//! Variant construction, validation, and confidence scoring.

pub mod builder;
pub mod confidence;
pub mod validate;

pub use builder::{build_variants, infer_variant_kind};
pub use confidence::score_variant_confidence;
pub use validate::{check_grid_count_consistency, check_variant_consistency, validate_variant_prices};
