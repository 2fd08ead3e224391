//! Validation helpers for DTOs.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::ValidationError;

/// Minimum number of characters in a username once surrounding whitespace is removed.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Validates that a username is at least [`MIN_USERNAME_LENGTH`] characters once trimmed.
///
/// # Examples
///
/// ```ignore
/// validate_username("alice")   // Ok
/// validate_username("  al  ")  // Err - too short after trimming
/// ```
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let length = username.trim().chars().count();
    if length < MIN_USERNAME_LENGTH {
        let mut err = ValidationError::new("username_length");
        err.message = Some(
            format!("Username must be at least {MIN_USERNAME_LENGTH} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Trim a username and check its length, returning the stored form.
pub fn normalize_username(username: &str) -> Result<String, ValidationError> {
    validate_username(username)?;
    Ok(username.trim().to_owned())
}

/// Deserialize a username, turning a missing, null or non-string value into an empty name.
///
/// The empty name then fails [`validate_username`], so clients get a validation error
/// instead of a type error.
pub fn lenient_username<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(username) => username,
        _ => String::new(),
    })
}

/// Deserialize a score, treating anything that is not a number as 0.
pub fn lenient_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(score_from_value(&Value::deserialize(deserializer)?).unwrap_or(0))
}

/// Deserialize an optional score; non-numeric values count as absent.
pub fn lenient_optional_score<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(score_from_value(&Value::deserialize(deserializer)?))
}

/// Whole-number score from a JSON number: fractions truncate, out-of-range values saturate.
fn score_from_value(value: &Value) -> Option<u32> {
    let number = value.as_f64().filter(|number| number.is_finite())?;
    Some(number.clamp(0.0, f64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username_valid() {
        assert!(validate_username("bob").is_ok());
        assert!(validate_username("  alice ").is_ok());
        assert!(validate_username("élan").is_ok());
    }

    #[test]
    fn test_validate_username_too_short() {
        assert!(validate_username("").is_err());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("   ab   ").is_err()); // whitespace does not count
    }

    #[test]
    fn test_normalize_username_trims_but_keeps_case() {
        assert_eq!(normalize_username("  Alice\t").unwrap(), "Alice");
        assert_eq!(normalize_username("ALICE").unwrap(), "ALICE");
    }

    #[derive(Debug, Deserialize)]
    struct Submission {
        #[serde(default, deserialize_with = "lenient_username")]
        username: String,
        #[serde(default, deserialize_with = "lenient_score")]
        score: u32,
        #[serde(default, deserialize_with = "lenient_optional_score")]
        best: Option<u32>,
    }

    fn parse(body: &str) -> Submission {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_missing_or_null_username_becomes_empty() {
        assert_eq!(parse("{}").username, "");
        assert_eq!(parse(r#"{"username": null}"#).username, "");
        assert_eq!(parse(r#"{"username": 42}"#).username, "");
        assert!(validate_username(&parse("{}").username).is_err());
    }

    #[test]
    fn test_non_numeric_scores_become_zero() {
        assert_eq!(parse(r#"{"score": "7"}"#).score, 0);
        assert_eq!(parse(r#"{"score": null}"#).score, 0);
        assert_eq!(parse(r#"{"score": true}"#).score, 0);
        assert_eq!(parse("{}").score, 0);
    }

    #[test]
    fn test_numeric_scores_are_truncated_and_clamped() {
        assert_eq!(parse(r#"{"score": 3.0}"#).score, 3);
        assert_eq!(parse(r#"{"score": 4.9}"#).score, 4);
        assert_eq!(parse(r#"{"score": -5}"#).score, 0);
        assert_eq!(parse(r#"{"score": 1e12}"#).score, u32::MAX);
    }

    #[test]
    fn test_optional_score_distinguishes_absent_values() {
        assert_eq!(parse("{}").best, None);
        assert_eq!(parse(r#"{"best": "x"}"#).best, None);
        assert_eq!(parse(r#"{"best": 6}"#).best, Some(6));
    }
}
