use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Number, Value};

static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+$").expect("valid regex"));

const WORDS: [&str; 13] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve",
];

/// The `sys_number` value of a single normalized token, if it is a number.
pub(crate) fn parse_number(token: &str) -> Option<Value> {
    if let Some(pos) = WORDS.iter().position(|w| *w == token) {
        return Some(json!({ "value": pos }));
    }
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        let n: u64 = token.parse().ok()?;
        return Some(json!({ "value": n }));
    }
    if DECIMAL.is_match(token) {
        let n = Number::from_f64(token.parse().ok()?)?;
        return Some(json!({ "value": Value::Number(n) }));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_words_and_decimals() {
        assert_eq!(parse_number("42"), Some(json!({"value": 42})));
        assert_eq!(parse_number("seven"), Some(json!({"value": 7})));
        assert_eq!(parse_number("3.14"), Some(json!({"value": 3.14})));
    }

    #[test]
    fn non_numbers_rejected() {
        assert_eq!(parse_number("4x4"), None);
        assert_eq!(parse_number("10:30"), None);
        assert_eq!(parse_number("thirteen"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn overflow_is_not_a_number() {
        assert_eq!(parse_number("99999999999999999999999"), None);
    }
}
