//! Turns free-form model output into priced material items.
//!
//! Model replies are not guaranteed to follow the requested format, so the
//! normalizer tries three strategies in order, each assuming less structure
//! than the one before:
//!
//! 1. a fenced ```` ```json ```` block, parsed strictly;
//! 2. the whole text parsed strictly (only when there is no fence at all);
//! 3. line-by-line `label - price` / `label: price` scraping.
//!
//! [`normalize`] never fails. When nothing can be extracted it returns an
//! empty list.

use crate::models::material::{AnalysisResult, MaterialItem};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

const FENCE: &str = "```";
const JSON_FENCE_MARKER: &str = "```json";

/// Leading list marker: `-`, `*`, `+`, `•`, `1.`, `1)`
static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*+•]|[0-9]+[.)])\s+").expect("valid list marker regex"));

/// `<label><sep><rest>` where the label is everything before the first `-` or `:`
static LABELED_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<label>[^-:]+)[-:](?P<rest>.*)$").expect("valid line regex"));

static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digits regex"));

/// Which strategy produced a result, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    FencedBlock,
    WholeText,
    LineHeuristic,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FencedBlock => "fenced_block",
            Self::WholeText => "whole_text",
            Self::LineHeuristic => "line_heuristic",
        }
    }
}

/// Normalize raw model text into an ordered list of items.
pub fn normalize(raw_text: &str) -> AnalysisResult {
    normalize_with_strategy(raw_text).0
}

/// Same as [`normalize`], also reporting which strategy won.
pub fn normalize_with_strategy(raw_text: &str) -> (AnalysisResult, Strategy) {
    match extract_fenced_block(raw_text) {
        Some(block) => {
            if let Some(items) = parse_structured(&strip_line_comments(block)) {
                return (items, Strategy::FencedBlock);
            }
            tracing::debug!("Fenced JSON block did not parse, falling back to line heuristic");
        }
        None => {
            if let Some(items) = parse_structured(raw_text) {
                return (items, Strategy::WholeText);
            }
        }
    }

    (parse_lines(raw_text), Strategy::LineHeuristic)
}

/// Body of the first ```` ```json ```` fence. An unterminated fence runs to end of text.
fn extract_fenced_block(text: &str) -> Option<&str> {
    let start = find_ascii_case_insensitive(text, JSON_FENCE_MARKER)?;
    let body = &text[start + JSON_FENCE_MARKER.len()..];
    match body.find(FENCE) {
        Some(end) => Some(&body[..end]),
        None => Some(body),
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Remove trailing `// ...` comments that sit outside JSON string literals.
fn strip_line_comments(block: &str) -> String {
    block
        .lines()
        .map(|line| {
            let mut in_string = false;
            let mut escaped = false;
            let bytes = line.as_bytes();
            for (i, &b) in bytes.iter().enumerate() {
                if in_string {
                    match b {
                        _ if escaped => escaped = false,
                        b'\\' => escaped = true,
                        b'"' => in_string = false,
                        _ => {}
                    }
                } else if b == b'"' {
                    in_string = true;
                } else if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
                    return line[..i].trim_end();
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Deserialize)]
struct RawItem {
    name: String,
    price: Value,
}

/// Strict parse of a JSON array of `{name, price}` objects.
///
/// The document must be an array of objects carrying both fields; items whose
/// price cannot be coerced or whose name is blank are dropped.
fn parse_structured(text: &str) -> Option<AnalysisResult> {
    let raw: Vec<RawItem> = serde_json::from_str(text.trim()).ok()?;
    Some(
        raw.into_iter()
            .filter_map(|item| {
                let price = coerce_price(&item.price)?;
                MaterialItem::new(&item.name, price)
            })
            .collect(),
    )
}

fn coerce_price(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(float_price)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_price))
        }
        _ => None,
    }
}

fn float_price(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value <= u64::MAX as f64 {
        Some(value.round() as u64)
    } else {
        None
    }
}

fn parse_lines(text: &str) -> AnalysisResult {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<MaterialItem> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with(FENCE) {
        return None;
    }
    // Fragments of JSON that failed to parse carry no usable label
    if line.starts_with(['{', '}', '[', ']', '"']) {
        return None;
    }

    let line = LIST_MARKER_RE.replace(line, "");
    let caps = LABELED_LINE_RE.captures(&line)?;
    let label = clean_label(&caps["label"]);
    let digits = DIGITS_RE.find(&caps["rest"])?;
    let price = digits.as_str().parse::<u64>().ok()?;

    MaterialItem::new(label, price)
}

/// Drop markdown emphasis and code ticks around a label
fn clean_label(label: &str) -> &str {
    label
        .trim()
        .trim_matches(|c: char| c == '*' || c == '_' || c == '`')
        .trim()
}
