//! Grammar decomposition of classified lines into name / description /
//! modifiers / size mentions / price mentions.
//!
//! Never invents text absent from the source line. If no separators are
//! found, the entire line becomes the parsed name with an empty description:
//! graceful degradation, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::grammar::components::extract_components;
use crate::grammar::prices::{extract_price_mentions, strip_all_price_tokens, strip_trailing_price};
use crate::types::{LineClassification, LineType, ParsedMenuLine};
use crate::vocab::size::{NUMERIC_SIZE_RE, SIZE_WORD_RE};

/// Default abbreviation-prefix guard list. A single ALL-CAPS word of 3 or
/// fewer letters from this list does not trigger the caps/mixed-case name
/// split ("BBQ Chicken Pizza" stays whole). Treated as configuration data;
/// `PipelineConfig::caps_abbreviations` can extend it.
pub const DEFAULT_CAPS_ABBREVIATIONS: &[&str] = &["BBQ", "BLT", "PBJ", "NY", "EBLT", "ALT"];

static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+[-–—]\s+|\s*:\s+|\s*[•·]\s*").expect("separator regex is valid and should compile")
});

static MODIFIER_PHRASE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(extra|add|no|without|hold the|sub|substitute|make it)\s+([a-z]+(?:\s+[a-z]+)?)")
        .expect("modifier phrase regex is valid and should compile")
});

static MODIFIER_FLAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(gluten[- ]?free|vegetarian|vegan|dairy[- ]?free|keto|spicy)\b")
        .expect("modifier flag regex is valid and should compile")
});

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex is valid and should compile"));

fn is_caps_token(token: &str) -> bool {
    let mut saw_alpha = false;
    for c in token.chars() {
        if c.is_alphabetic() {
            saw_alpha = true;
            if !c.is_uppercase() {
                return false;
            }
        } else if !(c.is_ascii_digit() || "&/'.,-\"".contains(c)) {
            return false;
        }
    }
    saw_alpha
}

fn has_mixed_case(token: &str) -> bool {
    token.chars().any(|c| c.is_lowercase())
}

fn letter_count(token: &str) -> usize {
    token.chars().filter(|c| c.is_alphabetic()).count()
}

/// Split an ALL-CAPS name prefix from a mixed-case continuation.
///
/// The abbreviation-prefix guard is conservative: a single short caps word
/// like "BBQ" only splits when the remainder starts lowercase or carries an
/// early comma, otherwise "BBQ Chicken Pizza" would lose its name.
pub fn split_caps_name_desc<'a>(text: &str, abbreviations: &[&'a str]) -> Option<(String, String)> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }

    let mut caps_len = 0;
    for token in &tokens {
        if is_caps_token(token) {
            caps_len += 1;
        } else {
            break;
        }
    }
    if caps_len == 0 || caps_len >= tokens.len() {
        return None;
    }
    if !has_mixed_case(tokens[caps_len]) {
        return None;
    }

    let remainder = tokens[caps_len..].join(" ");
    if caps_len == 1 && letter_count(tokens[0]) <= 3 {
        let head = tokens[0].trim_matches(|c: char| !c.is_alphanumeric());
        if abbreviations.iter().any(|a| a.eq_ignore_ascii_case(head)) {
            let starts_lower = remainder.chars().next().is_some_and(|c| c.is_lowercase());
            let early_comma = remainder
                .split_whitespace()
                .take(2)
                .any(|t| t.ends_with(','));
            if !starts_lower && !early_comma {
                return None;
            }
        }
    }

    Some((tokens[..caps_len].join(" "), remainder))
}

/// Whether the caps/mixed-case split would fire on `text` with the default
/// abbreviation guard. Used by the line classifier for shape detection.
pub fn caps_split_applies(text: &str) -> bool {
    split_caps_name_desc(text, DEFAULT_CAPS_ABBREVIATIONS).is_some()
}

fn extract_size_mentions(text: &str) -> Vec<String> {
    let mut sizes: Vec<(usize, String)> = Vec::new();
    for m in SIZE_WORD_RE.find_iter(text) {
        sizes.push((m.start(), m.as_str().to_string()));
    }
    for caps in NUMERIC_SIZE_RE.captures_iter(text) {
        let whole = caps.get(0).expect("capture 0 always present");
        let num = &caps[1];
        let suffix = caps[2].to_lowercase();
        let token = if suffix.starts_with("pc") || suffix.starts_with("piece") || suffix.starts_with("ct") {
            format!("{num}pc")
        } else {
            format!("{num}\"")
        };
        sizes.push((whole.start(), token));
    }
    sizes.sort_by_key(|(pos, _)| *pos);
    sizes.into_iter().map(|(_, s)| s).collect()
}

fn extract_modifiers(text: &str) -> Vec<String> {
    let mut modifiers: Vec<String> = Vec::new();
    for caps in MODIFIER_PHRASE_RE.captures_iter(text) {
        let phrase = format!("{} {}", &caps[1], &caps[2]);
        let phrase = WHITESPACE_RE.replace_all(phrase.trim(), " ").into_owned();
        if !modifiers.iter().any(|m| m.eq_ignore_ascii_case(&phrase)) {
            modifiers.push(phrase);
        }
    }
    for caps in MODIFIER_FLAG_RE.captures_iter(text) {
        let flag = caps[1].to_string();
        if !modifiers
            .iter()
            .any(|m| m.to_lowercase().contains(&flag.to_lowercase()))
        {
            modifiers.push(flag);
        }
    }
    modifiers
}

/// Strip a leading size word from a name ("Large Cheese Pizza" -> "Cheese
/// Pizza") when something remains after it.
fn strip_leading_size_word(name: &str) -> String {
    if let Some(m) = SIZE_WORD_RE.find(name) {
        if m.start() == 0 {
            let rest = name[m.end()..].trim();
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }
    name.to_string()
}

/// Decompose a classified line into structured grammar parts.
///
/// Meaningful for `MenuItem` lines; other line types produce degenerate
/// decompositions used only as block-merge donors.
pub fn decompose(classification: &LineClassification, abbreviations: &[&str]) -> ParsedMenuLine {
    let mut parsed = ParsedMenuLine {
        parse_confidence: classification.confidence,
        ..ParsedMenuLine::default()
    };

    let working = classification.cleaned_text.trim().to_string();
    if working.is_empty() {
        return parsed;
    }

    match classification.line_type {
        LineType::Heading | LineType::SizeHeader | LineType::ToppingList | LineType::InfoLine => {
            parsed.parsed_name = working;
            return parsed;
        }
        LineType::PriceOnly => {
            parsed.price_mentions = extract_price_mentions(&working);
            return parsed;
        }
        LineType::DescriptionOnly => {
            parsed.parsed_description = Some(working.clone());
            parsed.size_mentions = extract_size_mentions(&working);
            parsed.modifiers = extract_modifiers(&working);
            parsed.components = Some(extract_components(&working));
            return parsed;
        }
        LineType::ModifierLine => {
            parsed.parsed_name = working.clone();
            parsed.modifiers = extract_modifiers(&working);
            parsed.price_mentions = extract_price_mentions(&working);
            return parsed;
        }
        LineType::MenuItem | LineType::MultiColumn | LineType::Unknown => {}
    }

    // Step 1: prices. With 2+ prices every token is stripped so grid prices
    // cannot leak into the name; with one, only the trailing token goes.
    parsed.price_mentions = extract_price_mentions(&working);
    let text_no_price = if parsed.price_mentions.len() >= 2 {
        strip_all_price_tokens(&working)
    } else {
        let stripped = strip_trailing_price(&working);
        if stripped.is_empty() { working.clone() } else { stripped }
    };

    // Step 2: size mentions.
    parsed.size_mentions = extract_size_mentions(&text_no_price);

    // Step 3: modifiers.
    parsed.modifiers = extract_modifiers(&text_no_price);

    // Step 4: name vs description.
    if let Some(m) = SEPARATOR_RE.find(&text_no_price) {
        let name_part = text_no_price[..m.start()].trim();
        let desc_part = text_no_price[m.end()..].trim();
        if !name_part.is_empty() && !desc_part.is_empty() {
            parsed.parsed_name = name_part.to_string();
            parsed.parsed_description = Some(desc_part.to_string());
            parsed.parse_confidence = 0.80;
            parsed.components = Some(extract_components(desc_part));
            return parsed;
        }
    }

    if let Some((name, desc)) = split_caps_name_desc(&text_no_price, abbreviations) {
        parsed.parsed_name = name;
        parsed.parsed_description = Some(desc.clone());
        parsed.parse_confidence = 0.80;
        parsed.components = Some(extract_components(&desc));
        return parsed;
    }

    // No separators at all: the whole line is the name, minus a leading
    // size word ("Large Cheese Pizza" -> "Cheese Pizza").
    parsed.parsed_name = strip_leading_size_word(&text_no_price);
    parsed.parse_confidence = if parsed.price_mentions.is_empty() { 0.45 } else { 0.65 };
    parsed
}

/// Merge a menu-item line with its description-continuation lines into one
/// decomposition. Prices, sizes, and modifiers accumulate; descriptions
/// join in order; confidence reflects how much structure was found.
pub fn merge_block(head: &ParsedMenuLine, continuations: &[&ParsedMenuLine]) -> ParsedMenuLine {
    let mut merged = head.clone();
    let mut desc_parts: Vec<String> = Vec::new();
    if let Some(d) = &head.parsed_description {
        desc_parts.push(d.clone());
    }

    for cont in continuations {
        if let Some(d) = &cont.parsed_description {
            desc_parts.push(d.clone());
        }
        for price in &cont.price_mentions {
            merged.price_mentions.push(*price);
        }
        for size in &cont.size_mentions {
            if !merged.size_mentions.contains(size) {
                merged.size_mentions.push(size.clone());
            }
        }
        for modifier in &cont.modifiers {
            if !merged.modifiers.iter().any(|m| m.eq_ignore_ascii_case(modifier)) {
                merged.modifiers.push(modifier.clone());
            }
        }
    }

    if !desc_parts.is_empty() {
        let description = desc_parts.join(", ");
        merged.components = Some(extract_components(&description));
        merged.parsed_description = Some(description);
    }

    let signals = usize::from(!merged.parsed_name.is_empty())
        + usize::from(!merged.price_mentions.is_empty())
        + usize::from(merged.parsed_description.is_some())
        + usize::from(!merged.size_mentions.is_empty());
    merged.parse_confidence = f64::min(0.95, 0.40 + signals as f64 * 0.15);

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::line::classify_line;
    use crate::types::Line;

    fn decompose_text(text: &str) -> ParsedMenuLine {
        let classification = classify_line(&Line::new(text, 0));
        decompose(&classification, DEFAULT_CAPS_ABBREVIATIONS)
    }

    #[test]
    fn test_caps_split_basic() {
        for (text, name, desc_start) in [
            ("MEAT LOVERS Pepperoni, Sausage, Bacon, Ham & Hamburger", "MEAT LOVERS", "Pepperoni"),
            ("BUFFALO CHICKEN Hot, Mild, BBQ Honey BBQ", "BUFFALO CHICKEN", "Hot"),
            ("ALFREDO PIZZA Broccoli & Chicken with Alfredo Sauce", "ALFREDO PIZZA", "Broccoli"),
            ("PESTO CHICKEN Grilled Chicken, Pesto Sauce, Tomato", "PESTO CHICKEN", "Grilled"),
            ("GYRO SPECIAL Gyro Meat, Tomatoes, Onions, Feta Cheese", "GYRO SPECIAL", "Gyro Meat"),
            ("PHILLY STEAK Steak, Onions, Peppers & Mushrooms", "PHILLY STEAK", "Steak"),
            ("BURGER lettuce, tomato, mayo", "BURGER", "lettuce"),
        ] {
            let parsed = decompose_text(text);
            assert_eq!(parsed.parsed_name, name, "input: {text:?}");
            assert!(
                parsed.parsed_description.as_deref().unwrap_or("").starts_with(desc_start),
                "input: {text:?}, desc: {:?}",
                parsed.parsed_description
            );
        }
    }

    #[test]
    fn test_abbreviation_guard_suppresses_split() {
        let parsed = decompose_text("BBQ Chicken Pizza 14.99");
        assert_eq!(parsed.parsed_name, "BBQ Chicken Pizza");
        assert!(parsed.parsed_description.is_none());
        assert_eq!(parsed.price_mentions, vec![1499]);
    }

    #[test]
    fn test_abbreviation_guard_releases_on_lowercase() {
        let parsed = decompose_text("BLT lettuce, tomato, bacon");
        assert_eq!(parsed.parsed_name, "BLT");
        assert!(parsed.parsed_description.is_some());
    }

    #[test]
    fn test_separator_split() {
        let parsed = decompose_text("Meat Lovers - pepperoni, sausage, ham, bacon 15.99");
        assert_eq!(parsed.parsed_name, "Meat Lovers");
        assert_eq!(parsed.parsed_description.as_deref(), Some("pepperoni, sausage, ham, bacon"));
        assert_eq!(parsed.price_mentions, vec![1599]);
    }

    #[test]
    fn test_multi_price_strips_every_token() {
        let parsed = decompose_text("CHEESE 8.00 11.50 13.95 22.50");
        assert_eq!(parsed.parsed_name, "CHEESE");
        assert_eq!(parsed.price_mentions, vec![800, 1150, 1395, 2250]);
        let parsed = decompose_text("HONEY BBQ BACON CHEDDAR PIZZA 17.95 25.50 34.75");
        assert_eq!(parsed.parsed_name, "HONEY BBQ BACON CHEDDAR PIZZA");
        assert_eq!(parsed.price_mentions.len(), 3);
    }

    #[test]
    fn test_single_price_trailing_strip() {
        let parsed = decompose_text("Margherita 12.99");
        assert_eq!(parsed.parsed_name, "Margherita");
        assert_eq!(parsed.price_mentions, vec![1299]);
    }

    #[test]
    fn test_leading_size_word_cleanup() {
        let parsed = decompose_text("Large Cheese Pizza 14.99");
        assert_eq!(parsed.parsed_name, "Cheese Pizza");
        assert!(parsed.size_mentions.iter().any(|s| s == "Large"));
    }

    #[test]
    fn test_size_mentions_numeric_and_piece() {
        let parsed = decompose_text("GARLIC KNOTS 12 Pieces 5.99");
        assert!(parsed.size_mentions.iter().any(|s| s == "12pc"));
    }

    #[test]
    fn test_modifier_extraction() {
        let parsed = decompose_text("Veggie Wrap no onions, extra cheese 8.99");
        assert!(parsed.modifiers.iter().any(|m| m.eq_ignore_ascii_case("no onions")));
        assert!(parsed.modifiers.iter().any(|m| m.eq_ignore_ascii_case("extra cheese")));
    }

    #[test]
    fn test_no_separator_degrades_to_name() {
        let parsed = decompose_text("Chocolate Brownie 4.99");
        assert_eq!(parsed.parsed_name, "Chocolate Brownie");
        assert!(parsed.parsed_description.is_none());
    }

    #[test]
    fn test_merge_block_accumulates() {
        let head = decompose_text("Meat Lovers Pizza 15.99");
        let cont_class = classify_line(&Line::new("pepperoni, sausage, ham, bacon", 1));
        let cont = decompose(&cont_class, DEFAULT_CAPS_ABBREVIATIONS);
        let merged = merge_block(&head, &[&cont]);
        assert_eq!(merged.parsed_name, "Meat Lovers Pizza");
        assert_eq!(merged.parsed_description.as_deref(), Some("pepperoni, sausage, ham, bacon"));
        assert_eq!(merged.price_mentions, vec![1599]);
        // name + price + description = 3 signals
        assert!((merged.parse_confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_non_hallucination_name_traceable_to_input() {
        let input = "MARGARITA Rcccccerccrrrerseessrsessstessesssssrressesrsorsrrsmrcermesees 34.75";
        let parsed = decompose_text(input);
        assert!(input.contains(&parsed.parsed_name));
        assert_eq!(parsed.price_mentions, vec![3475]);
    }
}
