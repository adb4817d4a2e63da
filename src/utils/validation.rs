use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::error::Result;

pub fn validate<T: Validate>(val: &T) -> Result<()> {
    val.validate()?;
    Ok(())
}

/// Lowercased, trimmed email used for account and application lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `None` for absent or whitespace-only text fields.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Serde hook that trims free text before length rules see it.
pub fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(String::deserialize(deserializer)?.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_compare_case_insensitively() {
        assert_eq!(normalize_email("  Crew.Desk@Example.COM "), "crew.desk@example.com");
    }

    #[test]
    fn blank_text_is_dropped() {
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(" Manila ".into())), Some("Manila".into()));
        assert_eq!(non_blank(None), None);
    }
}
