//! Multi-pass contextual resolution.
//!
//! A single line cannot resolve every ambiguity: "FRENCH FRIES" before a
//! price looks identical to a section title. Three ordered passes over the
//! whole sequence fix what the independent classifier cannot, preserving the
//! original classification in `initial_line_type` for the audit trail.
//!
//! The resolver is idempotent: resolving already-resolved output changes
//! nothing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{LineClassification, LineType};
use crate::vocab::headings::is_known_section_heading;

/// Minimum run of whitespace that indicates a collapsed multi-column layout.
pub const MULTI_COLUMN_MIN_GAP: usize = 5;

static COLUMN_GAP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{5,}").expect("column gap regex is valid and should compile"));

/// Detect a multi-column merge: 5+ consecutive whitespace characters
/// splitting the line into 2+ segments, at least two of which carry letters
/// (price columns alone are dot-leader layout, not merged items).
pub fn detect_column_merge(text: &str) -> Option<Vec<String>> {
    if !COLUMN_GAP_RE.is_match(text) {
        return None;
    }
    let segments: Vec<String> = COLUMN_GAP_RE
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if segments.len() < 2 {
        return None;
    }
    let lettered = segments
        .iter()
        .filter(|s| s.chars().any(|c| c.is_alphabetic()))
        .count();
    if lettered < 2 {
        return None;
    }
    Some(segments)
}

fn record_overwrite(classification: &mut LineClassification, new_type: LineType) {
    if classification.initial_line_type.is_none() {
        classification.initial_line_type = Some(classification.line_type);
    }
    classification.line_type = new_type;
}

// Pass 0: multi-column tagging. Size grids legitimately contain wide gaps
// and must not be overwritten.
fn pass_multi_column(lines: &mut [LineClassification]) {
    for line in lines.iter_mut() {
        if line.line_type == LineType::SizeHeader || line.line_type == LineType::MultiColumn {
            continue;
        }
        if let Some(segments) = detect_column_merge(&line.cleaned_text) {
            record_overwrite(line, LineType::MultiColumn);
            line.column_segments = Some(segments);
        }
    }
}

fn neighbor_index(lines: &[LineClassification], from: usize, step: isize) -> Option<usize> {
    let mut idx = from as isize + step;
    while idx >= 0 && (idx as usize) < lines.len() {
        if !lines[idx as usize].cleaned_text.trim().is_empty() {
            return Some(idx as usize);
        }
        idx += step;
    }
    None
}

// Pass 2: a pseudo-heading whose non-blank neighbor is a description or an
// orphaned price, or which sits between two items, is itself an item.
fn pass_neighbor_headings(lines: &mut [LineClassification]) {
    let n = lines.len();
    for i in 0..n {
        if lines[i].line_type != LineType::Heading {
            continue;
        }
        if is_known_section_heading(lines[i].cleaned_text.trim()) {
            continue;
        }

        let next = neighbor_index(lines, i, 1).map(|j| lines[j].line_type);
        let prev = neighbor_index(lines, i, -1).map(|j| lines[j].line_type);

        let next_is_continuation =
            matches!(next, Some(LineType::DescriptionOnly) | Some(LineType::PriceOnly));
        let sandwiched = prev == Some(LineType::MenuItem) && next == Some(LineType::MenuItem);

        if next_is_continuation || sandwiched {
            record_overwrite(&mut lines[i], LineType::MenuItem);
        }
    }
}

// Pass 3: real section headers appear isolated; runs of 2+ consecutive
// unknown headings are actually unrecognized items. A known section heading
// terminates the run without joining it.
fn pass_heading_clusters(lines: &mut [LineClassification]) {
    let n = lines.len();
    let mut i = 0;
    while i < n {
        let in_cluster = |line: &LineClassification| {
            line.line_type == LineType::Heading && !is_known_section_heading(line.cleaned_text.trim())
        };
        if !in_cluster(&lines[i]) {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = i + 1;
        while end < n && in_cluster(&lines[end]) {
            end += 1;
        }
        if end - start >= 2 {
            for line in &mut lines[start..end] {
                record_overwrite(line, LineType::MenuItem);
            }
        }
        i = end;
    }
}

/// Run all contextual passes in order. Ordering matters: the cluster pass
/// depends on the neighbor pass having already pulled obvious items out of
/// heading runs.
pub fn resolve(mut lines: Vec<LineClassification>) -> Vec<LineClassification> {
    pass_multi_column(&mut lines);
    pass_neighbor_headings(&mut lines);
    pass_heading_clusters(&mut lines);
    lines
}
