//! Size-grid context tracking.
//!
//! A size header like `10"Mini 12" Sml 16"lrg Family Size` establishes
//! column labels that apply to subsequent priced lines until a new header
//! replaces them or a known section heading expires them. The tracker is an
//! explicit accumulator driven left-to-right by the pipeline; no hidden
//! state.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{LineClassification, LineType, SizeGridColumn, SizeGridContext};
use crate::vocab::headings::is_known_section_heading;
use crate::vocab::size::normalize_size_token;

// Token scanner for size header text, left-to-right:
//   group 1+2+3: numeric inch with optional glued qualifier (10"Mini)
//   group 4:     standalone size word
//   group 5+6:   count with unit (8 Slices, 6 pcs)
static GRID_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?ix)
        (\d{1,2})\s*(["\u{201d}\u{00b0}])([a-zA-Z]*)
        | \b(mini|small|sml|sm|medium|med|large|lrg|lg|family\ size|family|party\ size|party|personal|regular|deluxe)\b
        | \b(\d{1,2})\s*(slices?|pieces?|pcs?|cuts?)\b
        "#,
    )
    .expect("grid token regex is valid and should compile")
});

/// Words that pair with inch sizes as qualifiers. Standalone size names
/// (family, regular, deluxe) stay as their own columns.
const INCH_QUALIFIERS: &[&str] = &["mini", "sm", "sml", "small", "med", "medium", "lg", "lrg", "large"];

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[derive(Debug)]
enum RawGridToken {
    Numeric { num: String },
    NumericWord { num: String, word: String },
    Word { raw: String },
    Piece { num: String },
}

/// Parse a size header string into ordered columns, coalescing adjacent
/// numeric + qualifier tokens (`12"` + `Sml` -> `12" Sml`).
pub fn parse_size_header_columns(text: &str) -> Vec<SizeGridColumn> {
    let mut raw: Vec<(RawGridToken, usize, usize, String)> = Vec::new();

    for caps in GRID_TOKEN_RE.captures_iter(text) {
        let whole = caps.get(0).expect("capture 0 always present");
        if let Some(num) = caps.get(1) {
            let word = caps.get(3).map(|m| m.as_str()).unwrap_or("");
            let token = if word.is_empty() {
                RawGridToken::Numeric { num: num.as_str().to_string() }
            } else {
                RawGridToken::NumericWord {
                    num: num.as_str().to_string(),
                    word: word.to_string(),
                }
            };
            raw.push((token, whole.start(), whole.end(), whole.as_str().trim().to_string()));
        } else if let Some(word) = caps.get(4) {
            raw.push((
                RawGridToken::Word { raw: word.as_str().to_string() },
                whole.start(),
                whole.end(),
                whole.as_str().trim().to_string(),
            ));
        } else if let Some(num) = caps.get(5) {
            let suffix = caps.get(6).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
            // Slice/cut counts are informational, not columns.
            if suffix.starts_with("slice") || suffix.starts_with("cut") {
                continue;
            }
            raw.push((
                RawGridToken::Piece { num: num.as_str().to_string() },
                whole.start(),
                whole.end(),
                whole.as_str().trim().to_string(),
            ));
        }
    }

    let mut columns: Vec<SizeGridColumn> = Vec::new();
    let mut skip_next = false;

    for i in 0..raw.len() {
        if skip_next {
            skip_next = false;
            continue;
        }
        let (token, _start, end, raw_label) = &raw[i];
        let (normalized, raw_label) = match token {
            RawGridToken::NumericWord { num, word } => {
                (format!("{num}\" {}", title_case(word)), raw_label.clone())
            }
            RawGridToken::Numeric { num } => {
                // Merge with an immediately-following qualifier word.
                let mut merged: Option<(String, String)> = None;
                if let Some((RawGridToken::Word { raw: next_word }, next_start, _, next_raw)) = raw.get(i + 1) {
                    let gap = &text[*end..*next_start];
                    if gap.trim().is_empty() && INCH_QUALIFIERS.contains(&next_word.to_lowercase().as_str()) {
                        merged = Some((
                            format!("{num}\" {}", title_case(next_word)),
                            format!("{raw_label} {next_raw}"),
                        ));
                    }
                }
                match merged {
                    Some(pair) => {
                        skip_next = true;
                        pair
                    }
                    None => (format!("{num}\""), raw_label.clone()),
                }
            }
            RawGridToken::Word { raw: word } => (normalize_size_token(word), raw_label.clone()),
            RawGridToken::Piece { num } => (format!("{num}pc"), raw_label.clone()),
        };
        columns.push(SizeGridColumn {
            raw_label,
            normalized,
            position: columns.len(),
        });
    }

    columns
}

/// Build a grid context from a `SizeHeader` line. A header with fewer than
/// two columns carries no grid information.
pub fn extract_size_grid(classification: &LineClassification) -> Option<SizeGridContext> {
    if classification.line_type != LineType::SizeHeader {
        return None;
    }
    let columns = parse_size_header_columns(&classification.cleaned_text);
    if columns.len() < 2 {
        return None;
    }
    Some(SizeGridContext {
        columns,
        started_at_line: classification.line_index,
    })
}

/// The rolling "active grid" accumulator, driven by the pipeline's
/// left-to-right walk over classified lines.
#[derive(Debug, Default)]
pub struct GridTracker {
    active: Option<SizeGridContext>,
}

impl GridTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update grid state for one line, in sequence order:
    /// - a new size header replaces the current grid
    /// - a known section heading expires it
    /// - every other line type leaves it untouched
    pub fn observe(&mut self, classification: &LineClassification) {
        match classification.line_type {
            LineType::SizeHeader => {
                if let Some(grid) = extract_size_grid(classification) {
                    tracing::debug!(
                        line = classification.line_index,
                        columns = grid.column_count(),
                        "size grid replaced"
                    );
                    self.active = Some(grid);
                }
            }
            LineType::Heading => {
                if is_known_section_heading(classification.cleaned_text.trim()) {
                    self.active = None;
                }
            }
            _ => {}
        }
    }

    pub fn active(&self) -> Option<&SizeGridContext> {
        self.active.as_ref()
    }
}

/// Map `price_count` prices onto the active grid's columns.
///
/// Exact match maps 1:1. Fewer prices than columns right-align onto the
/// largest sizes (gourmet items commonly omit their smallest size) — a
/// heuristic tie-break, reported via the `right_aligned` flag so confidence
/// scoring can see it. More prices than columns means the grid does not
/// apply. Needs 2+ prices.
pub fn grid_labels_for_prices(grid: &SizeGridContext, price_count: usize) -> Option<(Vec<String>, bool)> {
    if price_count < 2 || price_count > grid.column_count() {
        return None;
    }
    let offset = grid.column_count() - price_count;
    let labels = (0..price_count)
        .map(|i| {
            grid.label_for_position(i + offset)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Size {}", i + offset + 1))
        })
        .collect();
    Some((labels, offset > 0))
}
