//! Price mention extraction.
//!
//! Supports decimal-point and decimal-comma formats (`12.99`, `34,75`) with
//! an optional dollar sign. Prices are converted to integer cents at the
//! boundary; no floating-point price ever flows through the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;

/// A price mention: optional `$`, 1-3 digit dollar part, exactly two cent
/// digits. The trailing `\b` stops matches inside longer digit runs.
pub static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\s*(\d{1,3})[.,](\d{2})\b").expect("price regex is valid and should compile"));

/// Trailing price with optional dot-leader noise before it.
static TRAILING_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\s.·…]*\$?\s*\d{1,3}[.,]\d{2}\s*$").expect("trailing price regex is valid and should compile")
});

/// Parse a single price token into cents. Returns None for malformed input
/// (the token is then simply excluded from `price_mentions`).
pub fn parse_price_token(token: &str) -> Option<u32> {
    let caps = PRICE_RE.captures(token)?;
    let dollars: u32 = caps[1].parse().ok()?;
    let cents: u32 = caps[2].parse().ok()?;
    Some(dollars * 100 + cents)
}

/// All price mentions in line order, as integer cents.
pub fn extract_price_mentions(text: &str) -> Vec<u32> {
    PRICE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let dollars: u32 = caps[1].parse().ok()?;
            let cents: u32 = caps[2].parse().ok()?;
            Some(dollars * 100 + cents)
        })
        .collect()
}

pub fn count_price_mentions(text: &str) -> usize {
    PRICE_RE.find_iter(text).count()
}

/// Remove every price token. Used when 2+ prices are present so size-grid
/// price columns cannot leak into the item name.
pub fn strip_all_price_tokens(text: &str) -> String {
    let stripped = PRICE_RE.replace_all(text, " ");
    collapse_spaces(&stripped)
}

/// Remove only a trailing price (plus any dot-leader noise before it).
pub fn strip_trailing_price(text: &str) -> String {
    TRAILING_PRICE_RE.replace(text, "").trim().to_string()
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_point_prices() {
        assert_eq!(extract_price_mentions("Margherita 12.99"), vec![1299]);
        assert_eq!(extract_price_mentions("CHEESE 8.00 11.50 13.95 22.50"), vec![800, 1150, 1395, 2250]);
    }

    #[test]
    fn test_decimal_comma_prices() {
        assert_eq!(extract_price_mentions(". 34,75"), vec![3475]);
        assert_eq!(parse_price_token("34,75"), Some(3475));
    }

    #[test]
    fn test_dollar_sign_optional() {
        assert_eq!(extract_price_mentions("-- $4.75"), vec![475]);
    }

    #[test]
    fn test_no_match_inside_longer_digit_runs() {
        assert_eq!(extract_price_mentions("serial 13.955 code"), Vec::<u32>::new());
    }

    #[test]
    fn test_unparseable_token_excluded() {
        assert_eq!(parse_price_token("no price here"), None);
        assert_eq!(extract_price_mentions("Pepperoni, Sausage"), Vec::<u32>::new());
    }

    #[test]
    fn test_strip_all_price_tokens() {
        assert_eq!(strip_all_price_tokens("CHEESE 8.00 11.50 13.95 22.50"), "CHEESE");
        assert_eq!(
            strip_all_price_tokens("HONEY BBQ BACON CHEDDAR PIZZA 17.95 25.50 34.75"),
            "HONEY BBQ BACON CHEDDAR PIZZA"
        );
    }

    #[test]
    fn test_strip_trailing_price_only() {
        assert_eq!(strip_trailing_price("Margherita 12.99"), "Margherita");
        assert_eq!(strip_trailing_price("POTATO BACON PIZZA ......... 47.95"), "POTATO BACON PIZZA");
        // Leading content untouched when no trailing price
        assert_eq!(strip_trailing_price("APPETIZERS"), "APPETIZERS");
    }
}
