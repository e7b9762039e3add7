//! Item component detection: tokenizes a description and classifies each
//! token as flavor option, sauce, preparation, or topping.
//!
//! The flavor-list check runs before any per-token classification: a flavor
//! list disguised as a topping list ("Hot, Mild, BBQ") is semantically
//! different (choose-one, not all-included).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::ItemComponents;
use crate::vocab::components::{is_flavorish, COMMON_TOPPINGS, PREPARATIONS, SAUCES, SAUCE_CARRIER_WORDS};

static TOKEN_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*(?:,|;|&|\band\b|\bor\b|\bwith\b)\s*")
        .expect("token separator regex is valid and should compile")
});

/// Split a description into candidate component tokens.
pub fn tokenize_description(description: &str) -> Vec<String> {
    TOKEN_SEPARATOR_RE
        .split(description)
        .map(|t| t.trim().trim_end_matches('.').trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn sauce_phrase_for(token: &str) -> Option<&'static str> {
    let low = token.to_lowercase();
    for phrase in SAUCES.iter() {
        if !low.contains(phrase) {
            continue;
        }
        if low == *phrase {
            return Some(phrase);
        }
        // A longer token only reads as a sauce when it names its carrier
        // ("Alfredo Sauce", "Ranch Dressing"); "BBQ Chicken" is a topping.
        if SAUCE_CARRIER_WORDS.iter().any(|w| low.contains(w)) {
            return Some(phrase);
        }
    }
    None
}

fn preparation_split(token: &str) -> Option<(String, String)> {
    let mut words = token.split_whitespace();
    let first = words.next()?;
    if !PREPARATIONS.contains(first.to_lowercase().as_str()) {
        return None;
    }
    let rest: Vec<&str> = words.collect();
    Some((first.to_lowercase(), rest.join(" ")))
}

/// Classify description tokens into `ItemComponents`.
pub fn extract_components(description: &str) -> ItemComponents {
    let mut components = ItemComponents::default();
    let tokens = tokenize_description(description);
    if tokens.is_empty() {
        return components;
    }

    // Choose-one flavor list: 2+ tokens, every one a known flavor.
    if tokens.len() >= 2 && tokens.iter().all(|t| is_flavorish(t)) {
        components.flavor_options = tokens.iter().map(|t| t.to_lowercase()).collect();
        return components;
    }

    for token in &tokens {
        if components.sauce.is_none() {
            if let Some(phrase) = sauce_phrase_for(token) {
                components.sauce = Some(phrase.to_string());
                continue;
            }
        }

        if components.preparation.is_none() {
            if let Some((prep, rest)) = preparation_split(token) {
                // Bare preparation words from the topping vocabulary (e.g.
                // "grilled chicken") still split; the remainder is the topping.
                if !COMMON_TOPPINGS.contains(token.to_lowercase().as_str()) || !rest.is_empty() {
                    components.preparation = Some(prep);
                    if !rest.is_empty() {
                        components.toppings.push(rest);
                    }
                    continue;
                }
            }
        }

        components.toppings.push(token.clone());
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenization() {
        assert_eq!(
            tokenize_description("Pepperoni, Sausage, Bacon, Ham & Hamburger"),
            vec!["Pepperoni", "Sausage", "Bacon", "Ham", "Hamburger"]
        );
        assert_eq!(
            tokenize_description("Broccoli & Chicken with Alfredo Sauce"),
            vec!["Broccoli", "Chicken", "Alfredo Sauce"]
        );
        assert_eq!(tokenize_description("Hot; Mild; BBQ"), vec!["Hot", "Mild", "BBQ"]);
        assert_eq!(tokenize_description("ham and pineapple"), vec!["ham", "pineapple"]);
        assert_eq!(
            tokenize_description("Pepperoni, Sausage & Mushrooms and Onions"),
            vec!["Pepperoni", "Sausage", "Mushrooms", "Onions"]
        );
        assert_eq!(tokenize_description("with marinara sauce"), vec!["marinara sauce"]);
        assert_eq!(tokenize_description("Hot or Mild"), vec!["Hot", "Mild"]);
        assert_eq!(
            tokenize_description("pepperoni, sausage, bacon."),
            vec!["pepperoni", "sausage", "bacon"]
        );
        assert_eq!(tokenize_description("pepperoni"), vec!["pepperoni"]);
    }

    #[test]
    fn test_flavor_list_takes_priority() {
        let c = extract_components("Hot, Mild, BBQ Honey BBQ");
        assert_eq!(c.flavor_options, vec!["hot", "mild", "bbq honey bbq"]);
        assert!(c.toppings.is_empty());
        assert!(c.sauce.is_none());
    }

    #[test]
    fn test_toppings_not_mistaken_for_flavors() {
        let c = extract_components("Pepperoni, Sausage, Bacon");
        assert!(c.flavor_options.is_empty());
        assert_eq!(c.toppings, vec!["Pepperoni", "Sausage", "Bacon"]);
    }

    #[test]
    fn test_spec_scenario_meat_lovers() {
        let c = extract_components("Pepperoni, Sausage, Bacon, Ham & Hamburger");
        assert_eq!(c.toppings.len(), 5);
        assert!(c.sauce.is_none());
        assert!(c.preparation.is_none());
        assert!(c.flavor_options.is_empty());
    }

    #[test]
    fn test_sauce_detection() {
        for (desc, expected) in [
            ("Broccoli & Chicken with Alfredo Sauce", Some("alfredo")),
            ("Grilled Chicken, Pesto Sauce, Tomato", Some("pesto")),
            ("Pepperoni, Sausage, Mushrooms", None),
            ("BBQ Chicken, Bacon, Cheddar Cheese, BBQ Sauce", Some("bbq")),
            ("Buffalo Chicken, Mozzarella Cheese and Blue Cheese Base", Some("blue cheese")),
            ("Olive Oil, Garlic Sauce, Mozzarella Cheese, Steak", Some("olive oil")),
            ("Lettuce, Tomato, Pickles", None),
            ("Grilled Chicken, Ranch Dressing, Bacon", Some("ranch")),
        ] {
            let c = extract_components(desc);
            assert_eq!(c.sauce.as_deref(), expected, "desc: {desc:?}");
        }
    }

    #[test]
    fn test_only_first_sauce_kept_rest_demoted() {
        let c = extract_components("Olive Oil, Garlic Sauce, Mozzarella Cheese, Steak");
        assert_eq!(c.sauce.as_deref(), Some("olive oil"));
        assert!(c.toppings.iter().any(|t| t == "Garlic Sauce"));
    }

    #[test]
    fn test_preparation_prefix_split() {
        let c = extract_components("Grilled Chicken, Pesto Sauce, Tomato");
        assert_eq!(c.preparation.as_deref(), Some("grilled"));
        assert!(c.toppings.iter().any(|t| t == "Chicken"));
        assert!(c.toppings.iter().any(|t| t == "Tomato"));

        let c = extract_components("Crispy Chicken, Ranch Dressing, Bacon, Lettuce");
        assert_eq!(c.preparation.as_deref(), Some("crispy"));

        let c = extract_components("Pepperoni, Sausage, Bacon");
        assert!(c.preparation.is_none());

        let c = extract_components("Smoked Turkey, Swiss, Lettuce");
        assert_eq!(c.preparation.as_deref(), Some("smoked"));
    }

    #[test]
    fn test_sauce_takes_topping_not_both() {
        let c = extract_components("Broccoli & Chicken with Alfredo Sauce");
        assert!(c.toppings.iter().any(|t| t == "Broccoli"));
        assert!(c.toppings.iter().any(|t| t == "Chicken"));
        assert!(!c.toppings.iter().any(|t| t.to_lowercase().contains("alfredo")));
    }

    #[test]
    fn test_empty_description() {
        let c = extract_components("");
        assert_eq!(c, ItemComponents::default());
    }
}
