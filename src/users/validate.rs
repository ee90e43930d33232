//! Field rules for user drafts.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::model::UserDraft;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|e| panic!("email pattern: {e}"))
});

/// Allowed name length in UTF-16 code units, the unit browsers and JSON
/// clients count in. Characters outside the BMP count twice.
const NAME_UNITS: std::ops::RangeInclusive<usize> = 2..=50;

/// Why a draft was rejected. The display text is the message sent to the
/// client.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    #[error("Name is required.")]
    NameRequired,
    #[error("Name must be between 2 and 50 characters.")]
    NameLength,
    #[error("Email is required.")]
    EmailRequired,
    #[error("Email is not valid.")]
    EmailInvalid,
}

/// Checks `draft` against the field rules. The first failing rule wins, in
/// the order of the [`ValidationError`] variants.
pub fn validate(draft: &UserDraft) -> Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if !NAME_UNITS.contains(&draft.name.encode_utf16().count()) {
        return Err(ValidationError::NameLength);
    }
    if draft.email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !EMAIL.is_match(&draft.email) {
        return Err(ValidationError::EmailInvalid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(name: &str, email: &str) -> Result<(), ValidationError> {
        validate(&UserDraft::new(name, email))
    }

    #[test]
    fn accepts_well_formed_users() {
        assert_eq!(check("Dana", "dana@x.com"), Ok(()));
        assert_eq!(check("Al", "a.b@sub.example.org"), Ok(()));
        assert_eq!(check(&"n".repeat(50), "n@n.io"), Ok(()));
    }

    #[test]
    fn name_rules() {
        assert_eq!(check("", "a@b.c"), Err(ValidationError::NameRequired));
        assert_eq!(check("   ", "a@b.c"), Err(ValidationError::NameRequired));
        assert_eq!(check("A", "a@b.c"), Err(ValidationError::NameLength));
        assert_eq!(check(&"n".repeat(51), "a@b.c"), Err(ValidationError::NameLength));
    }

    #[test]
    fn name_length_counts_utf16_units() {
        assert_eq!(check(&"é".repeat(50), "a@b.c"), Ok(()));
        assert_eq!(check(&"😀".repeat(25), "a@b.c"), Ok(()));
        assert_eq!(check(&"😀".repeat(26), "a@b.c"), Err(ValidationError::NameLength));
        assert_eq!(check("😀", "a@b.c"), Ok(()));
    }

    #[test]
    fn email_rules() {
        assert_eq!(check("Dana", ""), Err(ValidationError::EmailRequired));
        assert_eq!(check("Dana", " \t"), Err(ValidationError::EmailRequired));
        for bad in ["dana", "dana@x", "@x.com", "dana@.com.", "da na@x.com", "a@b@c.com"] {
            assert_eq!(check("Dana", bad), Err(ValidationError::EmailInvalid), "{bad}");
        }
    }

    #[test]
    fn first_failing_rule_wins() {
        assert_eq!(check("", ""), Err(ValidationError::NameRequired));
        assert_eq!(check("A", "nope"), Err(ValidationError::NameLength));
    }

    #[test]
    fn messages_are_client_facing_text() {
        assert_eq!(ValidationError::NameLength.to_string(), "Name must be between 2 and 50 characters.");
        assert_eq!(ValidationError::EmailInvalid.to_string(), "Email is not valid.");
    }
}
