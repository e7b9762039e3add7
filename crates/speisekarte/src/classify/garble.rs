//! Garble-span stripping and post-garble short-noise cleanup.
//!
//! OCR turns dot-leaders and print artifacts into runs like
//! `recssersessetsssnrren...` between an item name and its prices. A span is
//! treated as garble only when it satisfies 2+ of four signals; single-signal
//! matches are rejected to avoid false positives on real words with high
//! incidental repetition ("CHEESE", "LEAVES").
//!
//! Price tokens embedded in garble (`o.sssseees13.95`) are rescued, never
//! dropped.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters OCR hallucinates from dot leaders and smudged print.
const HALLUCINATION_CHARS: &str = "secrnotvw.";

const HALLUCINATION_RATIO_MIN: f64 = 0.55;
const UNIQUE_RATIO_MAX: f64 = 0.45;
const LONG_RUN_MIN: usize = 12;

static PRICE_IN_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\d{1,3}[.,]\d{2}").expect("price-in-token regex is valid and should compile"));

static LETTER_DIGIT_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]\d{2,}$").expect("letter-digit noise regex is valid and should compile"));

static TOKEN_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+").expect("token split regex is valid and should compile"));

fn has_triple_repeat(span: &str) -> bool {
    let chars: Vec<char> = span.chars().map(|c| c.to_ascii_lowercase()).collect();
    chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

// Only lowercase letters count toward the ratio: dot-leader garble reads
// lowercase, while legitimate menu text in this position is usually
// capitalized (CHEESEBURGER must not trip this signal).
fn hallucination_ratio(span: &str) -> f64 {
    let total = span.chars().count();
    if total == 0 {
        return 0.0;
    }
    let hits = span
        .chars()
        .filter(|&c| c == '.' || (c.is_ascii_lowercase() && HALLUCINATION_CHARS.contains(c)))
        .count();
    hits as f64 / total as f64
}

fn unique_ratio(span: &str) -> f64 {
    let total = span.chars().count();
    if total == 0 {
        return 1.0;
    }
    let mut seen: Vec<char> = Vec::new();
    for c in span.chars().map(|c| c.to_ascii_lowercase()) {
        if !seen.contains(&c) {
            seen.push(c);
        }
    }
    seen.len() as f64 / total as f64
}

/// Dual-signal garble test: 2+ of triple-repeat, hallucination ratio,
/// low unique ratio, long contiguous run.
pub fn is_garble_span(span: &str) -> bool {
    if span.is_empty() {
        return false;
    }
    let mut signals = 0;
    if has_triple_repeat(span) {
        signals += 1;
    }
    if hallucination_ratio(span) >= HALLUCINATION_RATIO_MIN {
        signals += 1;
    }
    if unique_ratio(span) <= UNIQUE_RATIO_MAX {
        signals += 1;
    }
    if span.chars().count() >= LONG_RUN_MIN {
        signals += 1;
    }
    signals >= 2
}

enum TokenAction {
    Keep,
    Drop,
    Replace(String),
}

/// Rewrite `text` token by token. Whitespace between kept tokens is
/// preserved so multi-column gap detection still sees the layout; whitespace
/// around dropped tokens collapses to a single space.
fn filter_tokens<F>(text: &str, mut decide: F) -> String
where
    F: FnMut(&str) -> TokenAction,
{
    let mut out = String::with_capacity(text.len());
    let mut last_end = 0usize;
    let mut dropped_prev = false;

    for m in TOKEN_SPLIT_RE.find_iter(text) {
        let gap = &text[last_end..m.start()];
        let token = m.as_str();
        match decide(token) {
            TokenAction::Keep => {
                if dropped_prev && !out.is_empty() {
                    out.push(' ');
                } else {
                    out.push_str(gap);
                }
                out.push_str(token);
                dropped_prev = false;
            }
            TokenAction::Replace(replacement) => {
                if dropped_prev && !out.is_empty() {
                    out.push(' ');
                } else {
                    out.push_str(gap);
                }
                out.push_str(&replacement);
                dropped_prev = false;
            }
            TokenAction::Drop => {
                dropped_prev = true;
            }
        }
        last_end = m.end();
    }
    out.trim().to_string()
}

/// Strip garble spans from a line, rescuing embedded price tokens.
pub fn strip_ocr_garble(text: &str) -> String {
    filter_tokens(text, |token| {
        let prices: Vec<&str> = PRICE_IN_TOKEN_RE.find_iter(token).map(|m| m.as_str()).collect();

        // Residue is the token with price spans removed.
        let residue = PRICE_IN_TOKEN_RE.replace_all(token, "");
        let residue = residue.trim_matches(|c: char| c.is_whitespace());

        if residue.is_empty() {
            return TokenAction::Keep;
        }

        if is_garble_span(residue) {
            if prices.is_empty() {
                return TokenAction::Drop;
            }
            return TokenAction::Replace(prices.join(" "));
        }

        // Short lowercase residue glued to a price ("ne22.50") is OCR noise.
        if !prices.is_empty()
            && residue.chars().count() <= 3
            && residue
                .chars()
                .all(|c| c.is_ascii_lowercase() && HALLUCINATION_CHARS.contains(c))
        {
            return TokenAction::Replace(prices.join(" "));
        }

        TokenAction::Keep
    })
}

/// Drop leftover residue tokens the garble pass is too conservative to take:
/// zero runs (`00`), letter-digit noise (`F590`), repeated-letter runs
/// (`eee`), and mid-length all-hallucination words (`recrevees`).
/// Real words and price tokens are preserved.
pub fn strip_short_noise(text: &str) -> String {
    filter_tokens(text, |token| {
        if PRICE_IN_TOKEN_RE.is_match(token) {
            return TokenAction::Keep;
        }
        if !token.is_empty() && token.chars().all(|c| c == '0') {
            return TokenAction::Drop;
        }
        if LETTER_DIGIT_NOISE_RE.is_match(token) {
            return TokenAction::Drop;
        }
        let alpha: Vec<char> = token.chars().filter(|c| c.is_alphabetic()).collect();
        if alpha.len() == token.chars().count() && alpha.len() >= 2 {
            let first = alpha[0].to_ascii_lowercase();
            if alpha.iter().all(|c| c.to_ascii_lowercase() == first) {
                return TokenAction::Drop;
            }
            if alpha.len() >= 6
                && alpha
                    .iter()
                    .all(|c| HALLUCINATION_CHARS.contains(c.to_ascii_lowercase()))
            {
                return TokenAction::Drop;
            }
        }
        TokenAction::Keep
    })
}

/// Full cleanup: garble strip, then short-noise cleanup.
pub fn clean_line(text: &str) -> String {
    strip_short_noise(&strip_ocr_garble(text))
}
