//! Grammar decomposition: prices, name/description splitting, and item
//! component detection.

pub mod components;
pub mod decompose;
pub mod prices;

pub use components::{extract_components, tokenize_description};
pub use decompose::{decompose, merge_block, DEFAULT_CAPS_ABBREVIATIONS};
pub use prices::{extract_price_mentions, parse_price_token};
