//! Tolerant parsing of the upstream hourly feed.
//!
//! The feed is meant to be a JSON array of `[lat, lon, alt]` triples, but the
//! host has been seen serving HTML error pages and slightly broken JSON. Parsing
//! runs as a chain of stages; each stage either produces records or hands the
//! text on to the next one. Nothing here returns an error: unusable input is
//! simply an empty result.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::value::RawValue;

use crate::feed::PositionRecord;

static NESTED_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\s*\[").unwrap());
static NESTED_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\]\s*\]").unwrap());
static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\],\s*\[").unwrap());
static TRIPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([-\d.]+),([-\d.]+),([-\d.]+)\]").unwrap());

const HTML_MARKERS: [&str; 2] = ["<html", "<!DOCTYPE"];

/// Result of a single parsing stage.
#[derive(Debug, PartialEq)]
enum Stage {
    /// The stage understood the input; these are its records (possibly none).
    Parsed(Vec<PositionRecord>),
    /// The stage could not make sense of the input.
    Unusable,
}

/// Parse a raw feed body into position records.
pub fn parse_feed(raw: &str) -> Vec<PositionRecord> {
    if is_html(raw) {
        log::debug!("Feed body is an HTML document, ignoring");
        return Vec::new();
    }

    let clean = normalize(raw);
    log::debug!("Cleaned feed body: {} bytes", clean.len());

    match parse_strict(&clean) {
        Stage::Parsed(records) => records,
        Stage::Unusable => {
            log::debug!("Feed body is not a JSON array, scanning for triples");
            match parse_fallback(&clean) {
                Stage::Parsed(records) => records,
                Stage::Unusable => Vec::new(),
            }
        }
    }
}

fn is_html(raw: &str) -> bool {
    HTML_MARKERS.iter().any(|marker| raw.contains(marker))
}

fn normalize(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let fixed = NESTED_OPEN.replace(&stripped, "[[");
    let fixed = NESTED_CLOSE.replace(&fixed, "]]");
    SEPARATOR.replace_all(&fixed, "],[").into_owned()
}

/// Elements are kept as raw JSON text so an out-of-range literal such as
/// `1e400` only spoils its own element, not the whole array.
fn parse_strict(clean: &str) -> Stage {
    let Ok(items) = serde_json::from_str::<Vec<&RawValue>>(clean) else {
        return Stage::Unusable;
    };

    let records = items
        .iter()
        .filter_map(|item| {
            let fields = serde_json::from_str::<Vec<&RawValue>>(item.get()).ok()?;
            if fields.len() < 3 {
                return None;
            }
            PositionRecord::new(
                coerce(fields[0])?,
                coerce(fields[1])?,
                coerce(fields[2])?,
            )
        })
        .collect();

    Stage::Parsed(records)
}

fn parse_fallback(clean: &str) -> Stage {
    let mut matched = false;
    let records: Vec<PositionRecord> = TRIPLE
        .captures_iter(clean)
        .filter_map(|caps| {
            matched = true;
            PositionRecord::new(
                caps[1].parse().ok()?,
                caps[2].parse().ok()?,
                caps[3].parse().ok()?,
            )
        })
        .collect();

    if matched {
        Stage::Parsed(records)
    } else {
        Stage::Unusable
    }
}

/// Numbers and numeric strings only; anything else is not a coordinate.
fn coerce(value: &RawValue) -> Option<f64> {
    let text = value.get();
    match text.as_bytes().first()? {
        b'-' | b'0'..=b'9' => text.parse().ok(),
        b'"' => {
            let s: String = serde_json::from_str(text).ok()?;
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse().ok()
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(lat: f64, lon: f64, alt: f64) -> PositionRecord {
        PositionRecord::new(lat, lon, alt).unwrap()
    }

    #[test]
    fn html_error_pages_yield_nothing() {
        assert!(parse_feed("<html><body>502 Bad Gateway</body></html>").is_empty());
        assert!(parse_feed("<!DOCTYPE html><p>[[1,2,3]]</p>").is_empty());
        assert!(parse_feed("[[1,2,3]] <html").is_empty());
    }

    #[test]
    fn html_markers_are_case_sensitive() {
        let records = parse_feed("<HTML>[[1,2,3]]");
        assert_eq!(records, vec![rec(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn well_formed_array_keeps_order_and_values() {
        let body = "[[-12.5, 45.25, 17.1], [0, 0, 0], [89.9, -179.9, 3.333]]";
        assert_eq!(
            parse_feed(body),
            vec![
                rec(-12.5, 45.25, 17.1),
                rec(0.0, 0.0, 0.0),
                rec(89.9, -179.9, 3.333)
            ]
        );
    }

    #[test]
    fn tolerates_whitespace_between_brackets() {
        let body = "[\n  [1.0, 2.0, 3.0] ,\n\t[4.0,5.0,6.0]\n]\n";
        assert_eq!(
            parse_feed(body),
            vec![rec(1.0, 2.0, 3.0), rec(4.0, 5.0, 6.0)]
        );
    }

    #[test]
    fn invalid_elements_are_dropped_siblings_kept() {
        let body = r#"[[1,2,3],[1,"north",3],[null,2,3],[4,5],"junk",[7,8,9]]"#;
        assert_eq!(
            parse_feed(body),
            vec![rec(1.0, 2.0, 3.0), rec(7.0, 8.0, 9.0)]
        );
    }

    #[test]
    fn numeric_strings_are_coerced() {
        let body = r#"[["1.5", " -2 ", "3e2"]]"#;
        assert_eq!(parse_feed(body), vec![rec(1.5, -2.0, 300.0)]);
    }

    #[test]
    fn non_finite_strings_are_dropped() {
        let body = r#"[["NaN",1,2],["inf",1,2],[1,"-Infinity",2],[1,2,3]]"#;
        assert_eq!(parse_feed(body), vec![rec(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn overflowing_number_drops_only_its_element() {
        assert_eq!(
            parse_feed("[[1e5,2,3],[1e400,5,6]]"),
            vec![rec(100000.0, 2.0, 3.0)]
        );
        assert_eq!(
            parse_feed("[[1,-1E+400,3],[2.5e1,-4E-1,6]]"),
            vec![rec(25.0, -0.4, 6.0)]
        );
    }

    #[test]
    fn extra_tuple_entries_are_ignored() {
        assert_eq!(parse_feed("[[1,2,3,4,5]]"), vec![rec(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn array_with_no_valid_entries_does_not_fall_back() {
        assert!(parse_feed(r#"[["a","b","c"]]"#).is_empty());
        assert!(parse_feed("[]").is_empty());
    }

    #[test]
    fn stray_bracket_falls_back_to_scanning() {
        let body = "[[1.0,2.0,3.0],[4.0,5.0,6.0]]]";
        assert_eq!(
            parse_feed(body),
            vec![rec(1.0, 2.0, 3.0), rec(4.0, 5.0, 6.0)]
        );
    }

    #[test]
    fn truncated_body_recovers_complete_triples() {
        let body = "[[10.1,-20.2,5.5],[11.1,-21.2,6.5],[12.1,-2";
        assert_eq!(
            parse_feed(body),
            vec![rec(10.1, -20.2, 5.5), rec(11.1, -21.2, 6.5)]
        );
    }

    #[test]
    fn fallback_drops_unparseable_numbers() {
        let body = "[[1.2.3,4,5],[-,1,2],[6,7,8],";
        assert_eq!(parse_feed(body), vec![rec(6.0, 7.0, 8.0)]);
    }

    #[test]
    fn non_array_json_is_scanned() {
        let body = r#"{"positions":[[1,2,3]]}"#;
        assert_eq!(parse_feed(body), vec![rec(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn garbage_yields_nothing() {
        assert!(parse_feed("").is_empty());
        assert!(parse_feed("not a feed").is_empty());
        assert!(parse_feed("{\"error\": \"rate limited\"}").is_empty());
    }
}
