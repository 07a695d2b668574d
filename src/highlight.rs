use regex::{Regex, RegexBuilder};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub matched: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            matched: false,
        }
    }
}

/// Joins the active search values (trimmed, blanks dropped) with single spaces.
pub fn generate_highlight_search_query<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    values
        .into_iter()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deduplicated (case-insensitively) terms, longest first so a short term
/// never shadows an overlapping longer one.
pub fn highlight_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for word in query.split_whitespace() {
        let lower = word.to_lowercase();
        if !terms.iter().any(|t| t.to_lowercase() == lower) {
            terms.push(word.to_string());
        }
    }
    terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    terms
}

fn build_pattern(terms: &[String]) -> Option<Regex> {
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&format!("({alternation})"))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Splits `value` into plain and matched segments. Empty input yields no
/// segments; a query without terms returns the value as one plain segment.
pub fn highlight_text(query: &str, value: &str) -> Vec<Segment> {
    if value.is_empty() {
        return Vec::new();
    }
    let terms = highlight_terms(query);
    if terms.is_empty() {
        return vec![Segment::plain(value)];
    }
    let Some(pattern) = build_pattern(&terms) else {
        return vec![Segment::plain(value)];
    };

    let mut segments = Vec::new();
    let mut cursor = 0;
    for m in pattern.find_iter(value) {
        if m.start() > cursor {
            segments.push(Segment::plain(&value[cursor..m.start()]));
        }
        if !m.as_str().is_empty() {
            segments.push(Segment {
                text: m.as_str().to_string(),
                matched: true,
            });
        }
        cursor = m.end();
    }
    if cursor < value.len() {
        segments.push(Segment::plain(&value[cursor..]));
    }
    segments
}

/// Like [`highlight_text`] for arbitrary JSON values: null passes through as
/// nothing, non-strings are stringified first.
pub fn highlight_value(query: &str, value: &Value) -> Vec<Segment> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => highlight_text(query, s),
        other => highlight_text(query, &other.to_string()),
    }
}

/// Renders segments for a terminal, wrapping matches in `open`/`close`.
pub fn mark_segments(segments: &[Segment], open: &str, close: &str) -> String {
    segments
        .iter()
        .map(|s| {
            if s.matched {
                format!("{open}{}{close}", s.text)
            } else {
                s.text.clone()
            }
        })
        .collect()
}
