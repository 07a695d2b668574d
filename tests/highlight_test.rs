use cargodesk::highlight::{
    generate_highlight_search_query, highlight_terms, highlight_text, highlight_value,
    mark_segments, Segment,
};
use serde_json::json;

fn seg(text: &str, matched: bool) -> Segment {
    Segment {
        text: text.into(),
        matched,
    }
}

#[test]
fn splits_into_plain_and_matched_segments() {
    let segments = highlight_text("12345 kjfk", "Invoice 12345 - ICAO KJFK");
    assert_eq!(
        segments,
        vec![
            seg("Invoice ", false),
            seg("12345", true),
            seg(" - ICAO ", false),
            seg("KJFK", true),
        ]
    );
}

#[test]
fn longer_term_wins_over_its_prefix() {
    let segments = highlight_text("JF KJFK", "KJFK/JFK");
    assert_eq!(
        segments,
        vec![seg("KJFK", true), seg("/", false), seg("JF", true), seg("K", false)]
    );
}

#[test]
fn regex_metacharacters_are_literal() {
    let segments = highlight_text("a.b (x)", "a.b axb (x)");
    assert_eq!(
        segments,
        vec![
            seg("a.b", true),
            seg(" axb ", false),
            seg("(x)", true),
        ]
    );
}

#[test]
fn empty_value_gives_no_segments() {
    assert!(highlight_text("anything", "").is_empty());
}

#[test]
fn blank_query_gives_whole_value() {
    assert_eq!(highlight_text("   ", "Helsinki"), vec![seg("Helsinki", false)]);
}

#[test]
fn non_string_values_are_stringified() {
    assert_eq!(
        highlight_value("42", &json!(1425)),
        vec![seg("1", false), seg("42", true), seg("5", false)]
    );
    assert!(highlight_value("x", &json!(null)).is_empty());
}

#[test]
fn terms_are_deduplicated_ignoring_case() {
    assert_eq!(highlight_terms("fra FRA Fra frankfurt"), vec!["frankfurt", "fra"]);
}

#[test]
fn search_query_joins_non_blank_values() {
    assert_eq!(
        generate_highlight_search_query(["  JFK ", "", "lufthansa", "   "]),
        "JFK lufthansa"
    );
}

#[test]
fn marks_wrap_matches() {
    let segments = highlight_text("doe", "John Doe");
    assert_eq!(mark_segments(&segments, "[", "]"), "John [Doe]");
}
