//! Combo side-food vocabulary.
//!
//! Combo foods are side items that appear after "w/" or "with" to indicate a
//! combo upgrade: `"9.95 W/FRIES 13.50"` means base $9.95, with-fries $13.50.

use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;

pub static COMBO_FOODS: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    AHashSet::from_iter([
        // Fried sides
        "fries",
        "frie",
        "french fries",
        "curly fries",
        "waffle fries",
        "sweet potato fries",
        "steak fries",
        "seasoned fries",
        "onion rings",
        "onion ring",
        "tater tots",
        "tots",
        "fried pickles",
        "fried mushrooms",
        // Chips
        "chips",
        "chip",
        "potato chips",
        // Salads and slaws
        "coleslaw",
        "cole slaw",
        "slaw",
        "side salad",
        "garden salad",
        "caesar salad",
        "house salad",
        "salad",
        // Vegetables
        "vegetables",
        "veggies",
        "mixed vegetables",
        // Starches
        "rice",
        "fried rice",
        "white rice",
        "brown rice",
        "mashed potatoes",
        "mashed potato",
        "baked potato",
        "potato salad",
        "mac and cheese",
        "macaroni and cheese",
        // Cheese add-ons
        "cheese",
        "extra cheese",
        // Drinks
        "drink",
        "soda",
        "beverage",
        "fountain drink",
        // Soup
        "soup",
        "side soup",
        "cup of soup",
        // Bread
        "garlic bread",
        "breadsticks",
        "bread",
    ])
});

/// `"w/"` or `"with"` followed by a known combo food, longest alternatives
/// first so "french fries" wins over "fries".
pub static COMBO_PATTERN_RE: Lazy<Regex> = Lazy::new(|| {
    let mut foods: Vec<&str> = COMBO_FOODS.iter().copied().collect();
    foods.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alts: Vec<String> = foods.iter().map(|f| regex::escape(f)).collect();
    Regex::new(&format!(r"(?i)\b(?:w/|with)\s+({})\b", alts.join("|")))
        .expect("combo pattern regex is valid and should compile")
});

/// Whether `token` is a known combo side food.
pub fn is_combo_food(token: &str) -> bool {
    COMBO_FOODS.contains(token.trim().to_lowercase().as_str())
}

/// Combo food names found after "w/" or "with", lowercased, in order.
pub fn extract_combo_hints(text: &str) -> Vec<String> {
    COMBO_PATTERN_RE
        .captures_iter(text)
        .map(|c| c[1].trim().to_lowercase())
        .collect()
}
