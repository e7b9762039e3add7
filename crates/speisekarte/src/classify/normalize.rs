//! OCR typo normalization.
//!
//! Restores recognized noise patterns to known tokens; never introduces menu
//! text that has no corresponding evidence in the input. Two families:
//!
//! - shorthand rewrites: `W/` and the OCR-mangled `Wi` become `with`
//! - digit/letter confusables restored to known tokens (`88Q` -> `BBQ`)

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static W_SLASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[Ww]/\s*").expect("w-slash regex is valid and should compile"));

// "Wi CHEESE" is OCR residue of "W/ CHEESE"; only rewrite when followed by a
// capitalized word so "Wisconsin Cheese" stays intact.
static WI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bWi(\s+[A-Z])").expect("wi regex is valid and should compile"));

/// Digit/letter confusable fixes restoring known menu tokens.
static CONFUSABLE_FIXES: &[(&str, &str)] = &[
    ("88Q", "BBQ"),
    ("8BQ", "BBQ"),
    ("B8Q", "BBQ"),
    ("BB0", "BBQ"),
    ("0NION", "ONION"),
    ("0NIONS", "ONIONS"),
    ("P1ZZA", "PIZZA"),
    ("PIZZ4", "PIZZA"),
];

fn chain_replacements<'a>(mut text: Cow<'a, str>, replacements: &[(&Regex, &str)]) -> Cow<'a, str> {
    for (pattern, replacement) in replacements {
        if pattern.is_match(&text) {
            text = Cow::Owned(pattern.replace_all(&text, *replacement).into_owned());
        }
    }
    text
}

/// Apply the fixed typo-normalization table to a raw OCR line.
pub fn normalize_ocr_typos(text: &str) -> String {
    let cow = chain_replacements(Cow::Borrowed(text), &[(&W_SLASH_RE, "with "), (&WI_RE, "with$1")]);
    let mut out = cow.into_owned();
    for (wrong, right) in CONFUSABLE_FIXES {
        if out.contains(wrong) {
            out = out.replace(wrong, right);
        }
    }
    out
}
