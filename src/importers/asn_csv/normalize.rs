//! Cleanup of the free-text payee and description fields of a row.

use lazy_static::lazy_static;
use regex::Regex;

use crate::importers::asn_csv::record::RawRow;

/// Separates a payee name from the rest of a description, e.g.
/// `"STORE>BOUGHT GROCERIES"`.
const PAYEE_SEPARATOR: char = '>';

/// Returns the cleaned up `(payee, narration)` for the row.
///
/// When the row has no payee but the description contains `>`, the text
/// before it becomes the payee and the text after it the narration.
pub fn normalize(row: &RawRow) -> (String, String) {
    lazy_static! {
        static ref QUOTED_RX: Regex = Regex::new(r"^'(.*)'$").unwrap();
    }

    let mut payee = capitalize_words(&row.payee);
    let mut narration: &str = &row.description;
    if let Some(captures) = QUOTED_RX.captures(narration) {
        narration = captures.get(1).map_or("", |m| m.as_str());
    }

    if payee.trim().is_empty() {
        if let Some((before, after)) = narration.split_once(PAYEE_SEPARATOR) {
            payee = before.to_string();
            narration = after;
        }
    }

    (collapse_spaces(&payee), collapse_spaces(narration))
}

/// Capitalizes each whitespace separated word: the first character becomes
/// upper case, the rest lower case. Words are rejoined with single spaces.
fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Replaces runs of whitespace and colons with a single space, and trims.
fn collapse_spaces(s: &str) -> String {
    lazy_static! {
        static ref SPACES_RX: Regex = Regex::new(r"[\s:]+").unwrap();
    }
    SPACES_RX.replace_all(s, " ").trim().to_string()
}
