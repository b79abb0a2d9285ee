// Helper functions for safe logging and shared checks

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 {
            format!("{}***@{}", &parts[0][..1.min(parts[0].len())], parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

/// Minimal email shape check: one '@' with a dotted domain after it.
/// Deliverability is the SMTP relay's problem, not ours.
pub fn looks_like_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
        assert_eq!(safe_email_log("ab"), "***@***.***");
    }

    #[test]
    fn test_looks_like_email() {
        assert!(looks_like_email("ann@x.com"));
        assert!(!looks_like_email("not-an-email"));
        assert!(!looks_like_email("@x.com"));
        assert!(!looks_like_email("ann@x"));
        assert!(!looks_like_email("ann@.com"));
    }
}
