//! Field rules: each one is a pure function from a raw JSON value to a
//! normalized value or a single human-readable message.

use chrono::NaiveDate;
use serde_json::Value;
use url::Url;
use uuid::Uuid;

pub fn string(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| "Must be a string".to_string())
}

pub fn non_empty(value: &Value) -> Result<String, String> {
    let s = string(value)?;
    if s.is_empty() {
        return Err("Must not be empty".to_string());
    }
    Ok(s)
}

/// Leading/trailing whitespace is stripped before the length check.
pub fn trimmed_min(value: &Value, min: usize, message: &str) -> Result<String, String> {
    let s = string(value)?;
    let trimmed = s.trim();
    if trimmed.chars().count() < min {
        return Err(message.to_string());
    }
    Ok(trimmed.to_string())
}

pub fn lowercase(value: &Value) -> Result<String, String> {
    Ok(string(value)?.to_lowercase())
}

pub fn email(value: &Value) -> Result<String, String> {
    let s = string(value)?.trim().to_lowercase();
    let parts: Vec<&str> = s.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err("Must be a valid email".to_string());
    }
    Ok(s)
}

pub fn https_url(value: &Value) -> Result<String, String> {
    const MESSAGE: &str = "Must be URL image or a secure version of HTTP";
    let s = string(value)?.trim().to_string();
    let parsed = Url::parse(&s).map_err(|_| MESSAGE.to_string())?;
    if parsed.scheme() != "https" {
        return Err(MESSAGE.to_string());
    }
    Ok(s)
}

/// Rejects zero, negatives, fractions, and anything that is not a number.
pub fn positive_int(value: &Value) -> Result<i32, String> {
    let n = value
        .as_i64()
        .ok_or_else(|| "Must be a positive integer".to_string())?;
    if n <= 0 {
        return Err("Must be a positive integer".to_string());
    }
    i32::try_from(n).map_err(|_| "Must be a positive integer".to_string())
}

pub fn uuid(value: &Value) -> Result<Uuid, String> {
    let s = string(value)?;
    Uuid::parse_str(s.trim()).map_err(|_| "Must be a valid UUID".to_string())
}

pub fn iso_date(value: &Value) -> Result<NaiveDate, String> {
    let s = string(value)?;
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| "Must be an ISO date (YYYY-MM-DD)".to_string())
}

/// Accepts a string or a number; numbers are stringified.
pub fn string_or_number(value: &Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err("Must be a string or a number".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn positive_int_rejects_non_positive_and_fractions() {
        assert!(positive_int(&json!(0)).is_err());
        assert!(positive_int(&json!(-3)).is_err());
        assert!(positive_int(&json!(1.5)).is_err());
        assert!(positive_int(&json!("2")).is_err());
        assert_eq!(positive_int(&json!(45)), Ok(45));
    }

    #[test]
    fn email_is_lowercased_and_checked() {
        assert_eq!(email(&json!("Ana@Example.COM")), Ok("ana@example.com".to_string()));
        assert!(email(&json!("not-an-email")).is_err());
        assert!(email(&json!("a@b")).is_err());
        assert!(email(&json!("@example.com")).is_err());
    }

    #[test]
    fn https_url_rejects_plain_http() {
        assert!(https_url(&json!("http://example.com/a.png")).is_err());
        assert!(https_url(&json!("nonsense")).is_err());
        assert_eq!(
            https_url(&json!("https://example.com/a.png")),
            Ok("https://example.com/a.png".to_string())
        );
    }

    #[test]
    fn trimmed_min_counts_after_trimming() {
        assert!(trimmed_min(&json!("  a  "), 2, "too short").is_err());
        assert_eq!(trimmed_min(&json!("  ab  "), 2, "too short"), Ok("ab".to_string()));
    }

    #[test]
    fn string_or_number_coerces_numbers() {
        assert_eq!(string_or_number(&json!(1122334455)), Ok("1122334455".to_string()));
        assert_eq!(string_or_number(&json!("  221133  ")), Ok("221133".to_string()));
        assert!(string_or_number(&json!(true)).is_err());
    }

    #[test]
    fn iso_date_parses_calendar_dates() {
        assert!(iso_date(&json!("2000-13-01")).is_err());
        assert!(iso_date(&json!("01/02/2000")).is_err());
        assert_eq!(
            iso_date(&json!("2000-01-02")),
            Ok(NaiveDate::from_ymd_opt(2000, 1, 2).unwrap())
        );
    }
}
