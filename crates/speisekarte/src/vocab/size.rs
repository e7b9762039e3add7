//! Shared size vocabulary: single source of truth for size/portion word
//! detection, canonicalization, and ordinal ranking.
//!
//! Used by the line classifier (size-header detection), the grammar
//! decomposer (size mention extraction), and the variant builder
//! (normalization + monotonic price validation).

use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical mapping: lowercase token -> normalized display label.
pub static SIZE_WORD_MAP: Lazy<AHashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = AHashMap::new();
    // XS
    m.insert("xs", "XS");
    m.insert("x-small", "XS");
    m.insert("extra small", "XS");
    // S
    m.insert("small", "S");
    m.insert("sm", "S");
    m.insert("sml", "S");
    m.insert("s", "S");
    // M
    m.insert("medium", "M");
    m.insert("med", "M");
    m.insert("md", "M");
    m.insert("m", "M");
    // L
    m.insert("large", "L");
    m.insert("lg", "L");
    m.insert("lrg", "L");
    m.insert("l", "L");
    // XL
    m.insert("x-large", "XL");
    m.insert("xlarge", "XL");
    m.insert("xl", "XL");
    m.insert("extra large", "XL");
    // XXL
    m.insert("xxl", "XXL");
    // Portion
    m.insert("half", "Half");
    m.insert("whole", "Whole");
    m.insert("slice", "Slice");
    m.insert("personal", "Personal");
    m.insert("family", "Family");
    m.insert("party", "Party");
    m.insert("party size", "Party");
    m.insert("family size", "Family");
    m.insert("individual", "Personal");
    // Count
    m.insert("single", "Single");
    m.insert("double", "Double");
    m.insert("triple", "Triple");
    // Section-level size variants (burger/sandwich menus)
    m.insert("regular", "Regular");
    m.insert("deluxe", "Deluxe");
    m.insert("mini", "Mini");
    m
});

/// Regex matching any size word, longest alternatives first.
pub static SIZE_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    let mut words: Vec<&str> = SIZE_WORD_MAP.keys().copied().collect();
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alts: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Regex::new(&format!(r"(?i)\b({})\b", alts.join("|"))).expect("size word regex is valid and should compile")
});

/// Numeric sizes: `10"`, `14 inch`, `16in`, `6pc`, `12 pieces`, `24ct`.
pub static NUMERIC_SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(\d{1,2})\s*(["\u{201d}\u{00b0}]|in(?:ch(?:es)?)?\b|pcs?\b|pieces?\b|ct\b)"#)
        .expect("numeric size regex is valid and should compile")
});

static INCH_ONLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(\d{1,2})\s*["\u{201d}\u{00b0}]"#).expect("inch regex is valid and should compile")
});

static PIECE_ONLY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{1,2})\s*(?:pcs?|pieces?|ct)").expect("piece regex is valid and should compile")
});

static ORDINAL_INCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)in$").expect("ordinal inch regex is valid and should compile"));
static ORDINAL_PIECE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)pc$").expect("ordinal piece regex is valid and should compile"));

/// Normalize a raw size token to its canonical display label.
///
/// `"small"` -> `"S"`, `"sml"` -> `"S"`, `'10"'` -> `'10"'`, `"6pc"` -> `"6pc"`.
/// Unrecognized tokens pass through trimmed.
pub fn normalize_size_token(raw: &str) -> String {
    let trimmed = raw.trim();
    let low = trimmed.to_lowercase();

    if let Some(mapped) = SIZE_WORD_MAP.get(low.as_str()) {
        return (*mapped).to_string();
    }

    if let Some(caps) = INCH_ONLY_RE.captures(trimmed) {
        return format!("{}\"", &caps[1]);
    }

    if let Some(caps) = PIECE_ONLY_RE.captures(trimmed) {
        return format!("{}pc", &caps[1]);
    }

    trimmed.to_string()
}

// ---------------------------------------------------------------------------
// Size ordering
//
// Canonical ordinal positions for normalized_size values, used for monotonic
// price validation. Non-overlapping ranges per track:
//   word sizes 10-55, portions 110-150, multiplicities 210-230,
//   numeric inches use their natural value (6-30), piece counts 300+count.
// ---------------------------------------------------------------------------

static WORD_SIZE_ORDER: Lazy<AHashMap<&'static str, i64>> = Lazy::new(|| {
    AHashMap::from_iter([
        ("XS", 10),
        ("Mini", 15),
        ("S", 20),
        ("Personal", 25),
        ("Regular", 30),
        ("M", 35),
        ("L", 40),
        ("Deluxe", 45),
        ("XL", 50),
        ("XXL", 55),
    ])
});

static PORTION_ORDER: Lazy<AHashMap<&'static str, i64>> = Lazy::new(|| {
    AHashMap::from_iter([("Slice", 110), ("Half", 120), ("Whole", 130), ("Family", 140), ("Party", 150)])
});

static MULTIPLICITY_ORDER: Lazy<AHashMap<&'static str, i64>> =
    Lazy::new(|| AHashMap::from_iter([("Single", 210), ("Double", 220), ("Triple", 230)]));

/// Gap-detection chains per track. The word track splits into two sub-chains:
/// a menu using S/M/L should not be flagged for missing Personal or Regular.
pub const WORD_ABBREVIATED_CHAIN: &[&str] = &["XS", "S", "M", "L", "XL", "XXL"];
pub const WORD_NAMED_CHAIN: &[&str] = &["Mini", "Personal", "Regular", "Deluxe"];
pub const PORTION_CHAIN: &[&str] = &["Slice", "Half", "Whole", "Family", "Party"];
pub const MULTIPLICITY_CHAIN: &[&str] = &["Single", "Double", "Triple"];

/// Size comparison track. Only variants on the same track are compared for
/// price ordering; cross-track comparison is meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeTrack {
    Inch,
    Piece,
    Word,
    Portion,
    Multiplicity,
}

impl SizeTrack {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeTrack::Inch => "inch",
            SizeTrack::Piece => "piece",
            SizeTrack::Word => "word",
            SizeTrack::Portion => "portion",
            SizeTrack::Multiplicity => "multiplicity",
        }
    }
}

/// Ordinal position for a normalized size, or None if unrecognized.
pub fn size_ordinal(normalized_size: &str) -> Option<i64> {
    if normalized_size.is_empty() {
        return None;
    }
    if let Some(caps) = ORDINAL_INCH_RE.captures(normalized_size) {
        return caps[1].parse::<i64>().ok();
    }
    if let Some(caps) = ORDINAL_PIECE_RE.captures(normalized_size) {
        return caps[1].parse::<i64>().ok().map(|n| 300 + n);
    }
    WORD_SIZE_ORDER
        .get(normalized_size)
        .or_else(|| PORTION_ORDER.get(normalized_size))
        .or_else(|| MULTIPLICITY_ORDER.get(normalized_size))
        .copied()
}

/// Which ordering track a normalized size belongs to.
pub fn size_track(normalized_size: &str) -> Option<SizeTrack> {
    if normalized_size.is_empty() {
        return None;
    }
    if ORDINAL_INCH_RE.is_match(normalized_size) {
        return Some(SizeTrack::Inch);
    }
    if ORDINAL_PIECE_RE.is_match(normalized_size) {
        return Some(SizeTrack::Piece);
    }
    if WORD_SIZE_ORDER.contains_key(normalized_size) {
        return Some(SizeTrack::Word);
    }
    if PORTION_ORDER.contains_key(normalized_size) {
        return Some(SizeTrack::Portion);
    }
    if MULTIPLICITY_ORDER.contains_key(normalized_size) {
        return Some(SizeTrack::Multiplicity);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_word_sizes() {
        assert_eq!(normalize_size_token("small"), "S");
        assert_eq!(normalize_size_token("sml"), "S");
        assert_eq!(normalize_size_token("Lrg"), "L");
        assert_eq!(normalize_size_token("family"), "Family");
        assert_eq!(normalize_size_token("FAMILY SIZE"), "Family");
        assert_eq!(normalize_size_token("individual"), "Personal");
    }

    #[test]
    fn test_normalize_numeric_sizes() {
        assert_eq!(normalize_size_token("10\""), "10\"");
        assert_eq!(normalize_size_token("12\u{00b0}"), "12\"");
        assert_eq!(normalize_size_token("6pc"), "6pc");
        assert_eq!(normalize_size_token("24ct"), "24pc");
        assert_eq!(normalize_size_token("12 pieces"), "12pc");
    }

    #[test]
    fn test_normalize_passthrough() {
        assert_eq!(normalize_size_token("  Gigantic  "), "Gigantic");
    }

    #[test]
    fn test_ordinal_tracks_do_not_overlap() {
        assert_eq!(size_ordinal("10in"), Some(10));
        assert_eq!(size_ordinal("6pc"), Some(306));
        assert_eq!(size_ordinal("S"), Some(20));
        assert_eq!(size_ordinal("Family"), Some(140));
        assert_eq!(size_ordinal("Double"), Some(220));
        assert_eq!(size_ordinal("Gigantic"), None);
        assert_eq!(size_ordinal(""), None);
    }

    #[test]
    fn test_word_order_is_monotonic() {
        let chain = ["XS", "Mini", "S", "Personal", "Regular", "M", "L", "Deluxe", "XL", "XXL"];
        let ordinals: Vec<i64> = chain.iter().map(|s| size_ordinal(s).unwrap()).collect();
        let mut sorted = ordinals.clone();
        sorted.sort_unstable();
        assert_eq!(ordinals, sorted);
    }

    #[test]
    fn test_track_assignment() {
        assert_eq!(size_track("10in"), Some(SizeTrack::Inch));
        assert_eq!(size_track("12pc"), Some(SizeTrack::Piece));
        assert_eq!(size_track("XL"), Some(SizeTrack::Word));
        assert_eq!(size_track("Slice"), Some(SizeTrack::Portion));
        assert_eq!(size_track("Triple"), Some(SizeTrack::Multiplicity));
        assert_eq!(size_track("W/Fries"), None);
    }

    #[test]
    fn test_size_word_regex_matches_longest_first() {
        let caps = SIZE_WORD_RE.find("extra large pie").unwrap();
        assert_eq!(caps.as_str(), "extra large");
    }
}
