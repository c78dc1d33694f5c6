//! Display-name helpers.

use crate::Email;

/// Sentinel stored in `users.name` when no human-chosen name exists yet.
pub const PLACEHOLDER_NAME: &str = "NO_NAME";

/// Returns `true` if `name` is the placeholder sentinel.
#[must_use]
pub fn is_placeholder_name(name: &str) -> bool {
    name == PLACEHOLDER_NAME
}

/// Derive a display name from an email address (its local part).
#[must_use]
pub fn display_name_from_email(email: &Email) -> String {
    email.local_part().to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_exact_match() {
        assert!(is_placeholder_name("NO_NAME"));
        assert!(!is_placeholder_name("no_name"));
        assert!(!is_placeholder_name("NO_NAME "));
    }

    #[test]
    fn test_display_name_from_email() {
        let email = Email::parse("marie.laveau@vieuxcarre.app").unwrap();
        assert_eq!(display_name_from_email(&email), "marie.laveau");
    }
}
