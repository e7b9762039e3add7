//! Known section headings, category keywords, and category price bands.
//!
//! Section headings drive three behaviors: they stay classified `Heading`
//! through the contextual passes, they expire the active size grid, and they
//! assign the category inherited by subsequent items.

use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use regex::Regex;

/// Closed vocabulary of section headings a real menu uses. Pseudo-headings
/// outside this set are candidates for item reclassification.
pub static KNOWN_SECTION_HEADINGS: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    AHashSet::from_iter([
        "pizza",
        "pizzas",
        "specialty pizzas",
        "specialty pizza",
        "gourmet pizzas",
        "gourmet pizza",
        "appetizers",
        "starters",
        "sides",
        "salads",
        "soups",
        "soup & salad",
        "sandwiches",
        "subs",
        "hoagies",
        "wraps",
        "wraps city",
        "club sandwiches",
        "melt sandwiches",
        "burgers",
        "hamburgers",
        "build your own burger",
        "build your own calzone",
        "build your own pizza",
        "wings",
        "chicken wings",
        "buffalo wings",
        "fresh buffalo wings",
        "pasta",
        "pastas",
        "italian classics",
        "entrees",
        "dinner",
        "lunch",
        "desserts",
        "sweets",
        "beverages",
        "drinks",
        "cold drinks",
        "hot drinks",
        "calzones",
        "stromboli",
        "calzones & stromboli",
        "seafood",
        "fish",
        "kids menu",
        "children's menu",
        "specials",
        "daily specials",
        "toppings",
        "extras",
        "add ons",
        "add-ons",
    ])
});

static HEADING_TRAILING_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[_!.\s]+$").expect("heading trailing noise regex is valid and should compile"));

/// Whether a heading name is a known section heading (grid-expiring).
/// Tolerates trailing OCR punctuation like `WRAPS CITY_`.
pub fn is_known_section_heading(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    if KNOWN_SECTION_HEADINGS.contains(lower.as_str()) {
        return true;
    }
    let clean = HEADING_TRAILING_NOISE_RE.replace(&lower, "").into_owned();
    KNOWN_SECTION_HEADINGS.contains(clean.as_str())
}

/// Canonical category names used by the cross-item stage.
pub mod category {
    pub const PIZZA: &str = "Pizza";
    pub const PASTA: &str = "Pasta";
    pub const SALADS: &str = "Salads";
    pub const WINGS: &str = "Wings";
    pub const BURGERS: &str = "Burgers";
    pub const SUBS: &str = "Subs / Sandwiches";
    pub const SIDES: &str = "Sides / Appetizers";
    pub const BEVERAGES: &str = "Beverages";
    pub const DESSERTS: &str = "Desserts";
    pub const CALZONES: &str = "Calzones / Stromboli";
    pub const WRAPS: &str = "Wraps";
    pub const SEAFOOD: &str = "Seafood";
    pub const ENTREES: &str = "Entrees";
}

/// Map a known section heading to its canonical category.
///
/// Unknown headings yield None; the pipeline then title-cases the heading
/// text itself as the category.
pub fn category_for_heading(name: &str) -> Option<&'static str> {
    let lower = name.trim().to_lowercase();
    let clean = HEADING_TRAILING_NOISE_RE.replace(&lower, "").into_owned();
    let key = clean.as_str();
    let cat = match key {
        "pizza" | "pizzas" | "specialty pizzas" | "specialty pizza" | "gourmet pizzas" | "gourmet pizza"
        | "build your own pizza" => category::PIZZA,
        "pasta" | "pastas" | "italian classics" => category::PASTA,
        "salads" | "soup & salad" => category::SALADS,
        "soups" => category::SIDES,
        "wings" | "chicken wings" | "buffalo wings" | "fresh buffalo wings" => category::WINGS,
        "burgers" | "hamburgers" | "build your own burger" => category::BURGERS,
        "sandwiches" | "subs" | "hoagies" | "club sandwiches" | "melt sandwiches" => category::SUBS,
        "wraps" | "wraps city" => category::WRAPS,
        "appetizers" | "starters" | "sides" => category::SIDES,
        "beverages" | "drinks" | "cold drinks" | "hot drinks" => category::BEVERAGES,
        "desserts" | "sweets" => category::DESSERTS,
        "calzones" | "stromboli" | "calzones & stromboli" | "build your own calzone" => category::CALZONES,
        "seafood" | "fish" => category::SEAFOOD,
        "entrees" | "dinner" | "lunch" => category::ENTREES,
        _ => return None,
    };
    Some(cat)
}

/// Keywords whose presence in an item name argues for a category.
pub static CATEGORY_KEYWORDS: Lazy<AHashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut m: AHashMap<&'static str, &'static [&'static str]> = AHashMap::new();
    m.insert(category::PIZZA, &["pizza", "margherita", "calzone", "sicilian", "stromboli"]);
    m.insert(category::PASTA, &["pasta", "spaghetti", "ziti", "lasagna", "fettuccine", "alfredo", "ravioli"]);
    m.insert(category::SALADS, &["salad", "caesar", "greek salad", "garden"]);
    m.insert(category::WINGS, &["wings", "wing", "buffalo", "boneless", "tenders"]);
    m.insert(category::BURGERS, &["burger", "cheeseburger", "patty"]);
    m.insert(category::SUBS, &["sub", "sandwich", "hoagie", "club", "melt", "blt"]);
    m.insert(category::WRAPS, &["wrap", "pita", "gyro"]);
    m.insert(category::SIDES, &["fries", "rings", "sticks", "knots", "side"]);
    m.insert(
        category::BEVERAGES,
        &["soda", "coke", "pepsi", "sprite", "tea", "coffee", "juice", "water", "lemonade", "drink", "liter"],
    );
    m.insert(category::DESSERTS, &["cake", "brownie", "cannoli", "cookie", "ice cream", "cheesecake"]);
    m.insert(category::CALZONES, &["calzone", "stromboli"]);
    m.insert(category::SEAFOOD, &["shrimp", "fish", "clam", "scallop", "calamari"]);
    m
});

/// How many keywords for `category` occur in `name` as whole words or
/// phrases. Unknown categories count zero.
pub fn keyword_match_count(name: &str, category: &str) -> usize {
    if name.is_empty() {
        return 0;
    }
    let Some(keywords) = CATEGORY_KEYWORDS.get(category) else {
        return 0;
    };
    let lower = name.to_lowercase();
    let words: AHashSet<&str> = lower.split_whitespace().collect();
    keywords
        .iter()
        .filter(|kw| {
            if kw.contains(' ') {
                lower.contains(*kw)
            } else {
                words.contains(*kw)
            }
        })
        .count()
}

/// Typical price band per category, in cents (inclusive).
pub static CATEGORY_PRICE_BANDS: Lazy<AHashMap<&'static str, (u32, u32)>> = Lazy::new(|| {
    AHashMap::from_iter([
        (category::PIZZA, (799, 3999)),
        (category::PASTA, (899, 1999)),
        (category::SALADS, (599, 1499)),
        (category::WINGS, (699, 2499)),
        (category::BURGERS, (599, 1899)),
        (category::SUBS, (699, 1999)),
        (category::WRAPS, (699, 1499)),
        (category::SIDES, (299, 999)),
        (category::BEVERAGES, (99, 699)),
        (category::DESSERTS, (299, 899)),
        (category::CALZONES, (799, 1999)),
        (category::SEAFOOD, (899, 2999)),
    ])
});

/// Whether `price_cents` falls in `category`'s typical band.
/// Unknown categories return None (signal unavailable, not a mismatch).
pub fn in_price_band(price_cents: u32, category: &str) -> Option<bool> {
    CATEGORY_PRICE_BANDS
        .get(category)
        .map(|&(lo, hi)| price_cents >= lo && price_cents <= hi)
}
