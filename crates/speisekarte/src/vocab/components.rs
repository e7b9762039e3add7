//! Closed vocabularies for item component classification: toppings, sauces,
//! preparation methods, flavors, and crust/preparation styles.

use ahash::AHashSet;
use once_cell::sync::Lazy;

/// Common toppings/ingredients used for recognizing description content.
pub static COMMON_TOPPINGS: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    AHashSet::from_iter([
        "pepperoni",
        "sausage",
        "mushroom",
        "mushrooms",
        "onion",
        "onions",
        "pepper",
        "peppers",
        "green pepper",
        "green peppers",
        "hot peppers",
        "banana pepper",
        "banana peppers",
        "olive",
        "olives",
        "black olive",
        "black olives",
        "bacon",
        "ham",
        "salami",
        "meatball",
        "meatballs",
        "pineapple",
        "jalapeno",
        "jalapenos",
        "tomato",
        "tomatoes",
        "spinach",
        "broccoli",
        "artichoke",
        "garlic",
        "basil",
        "oregano",
        "mozzarella",
        "mozzarella cheese",
        "ricotta",
        "provolone",
        "parmesan",
        "cheddar",
        "cheddar cheese",
        "feta",
        "feta cheese",
        "swiss",
        "blue cheese",
        "chicken",
        "steak",
        "philly steak",
        "grilled chicken",
        "buffalo chicken",
        "bbq chicken",
        "gyro meat",
        "turkey",
        "roast beef",
        "tuna",
        "anchovies",
        "shrimp",
        "clam",
        "clams",
        "roasted red pepper",
        "sun dried tomato",
        "fresh mozzarella",
        "lettuce",
        "pickles",
        "pickle",
        "mayo",
        "cucumber",
        "cucumbers",
        "salsa",
        "sour cream",
        "french fries",
        "chips",
        "hamburger",
        "cheese",
    ])
});

/// Sauce phrases, matched longest-first against description tokens.
pub static SAUCES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut v = vec![
        "honey mustard",
        "blue cheese",
        "olive oil",
        "garlic sauce",
        "buffalo sauce",
        "marinara",
        "alfredo",
        "pesto",
        "ranch",
        "bbq",
        "barbecue",
        "teriyaki",
        "tzatziki",
        "mayo",
        "ketchup",
        "mustard",
        "1000 island",
        "thousand island",
    ];
    v.sort_by(|a, b| b.len().cmp(&a.len()));
    v
});

/// Words that mark a token as a sauce/condiment carrier when combined with a
/// sauce phrase (e.g. "Alfredo Sauce", "Ranch Dressing", "Blue Cheese Base").
pub const SAUCE_CARRIER_WORDS: &[&str] = &["sauce", "dressing", "base", "oil", "mayo", "glaze"];

/// Preparation methods recognized as a token's first word.
pub static PREPARATIONS: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    AHashSet::from_iter([
        "grilled",
        "fried",
        "crispy",
        "baked",
        "smoked",
        "roasted",
        "breaded",
        "blackened",
        "steamed",
        "sauteed",
        "toasted",
    ])
});

/// Flavor phrases: sauce/taste indicators rather than geometry.
pub static FLAVOR_TOKENS: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    AHashSet::from_iter([
        "hot",
        "mild",
        "medium",
        "honey",
        "bbq",
        "barbecue",
        "honey bbq",
        "garlic",
        "parm",
        "parmesan",
        "garlic parm",
        "teriyaki",
        "buffalo",
        "spicy",
        "sweet",
        "sour",
        "honey mustard",
        "lemon",
        "pepper",
        "lemon pepper",
        "mango habanero",
        "carolina gold",
        "thai chili",
        "sweet chili",
        "old bay",
        "cajun",
        "ranch",
        "blue cheese",
        "asian zing",
        "korean bbq",
        "sriracha",
        "garlic romano",
        "jack daniels bbq",
        "plain",
        "naked",
        "original",
    ])
});

/// Style/preparation indicators: crust types, bone-in vs boneless, etc.
pub static STYLE_TOKENS: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    AHashSet::from_iter([
        "bone-in",
        "bone in",
        "boneless",
        "thin",
        "thin crust",
        "thick",
        "thick crust",
        "deep dish",
        "stuffed crust",
        "white",
        "red",
        "red sauce",
        "alfredo",
        "pesto",
        "pan",
        "pan crust",
        "hand tossed",
        "hand-tossed",
        "brooklyn",
        "brooklyn style",
        "sicilian",
        "sicilian style",
        "neapolitan",
        "neapolitan style",
        "detroit",
        "detroit style",
        "new york",
        "ny style",
        "flatbread",
        "gluten free",
        "gluten-free",
        "cauliflower crust",
        "crispy",
        "extra crispy",
        "fried",
        "grilled",
        "baked",
        "breaded",
        "naked",
        "dry rub",
        "tossed",
    ])
});

/// Count how many topping phrases occur in `text` (lowercased containment).
pub fn topping_match_count(text: &str) -> usize {
    let lower = text.to_lowercase();
    COMMON_TOPPINGS.iter().filter(|t| lower.contains(*t)).count()
}

/// Whether a description token reads as a flavor choice.
pub fn is_flavorish(token: &str) -> bool {
    let low = token.trim().to_lowercase();
    if FLAVOR_TOKENS.contains(low.as_str()) {
        return true;
    }
    // Compound flavor labels like "BBQ Honey BBQ" or "Jack Daniels BBQ":
    // every word must belong to some flavor phrase.
    let words: Vec<&str> = low.split_whitespace().collect();
    !words.is_empty()
        && words
            .iter()
            .all(|w| FLAVOR_TOKENS.iter().any(|f| f.split_whitespace().any(|fw| fw == *w)))
}
