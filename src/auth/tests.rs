//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - The role field-permission table for update-user
//! - Request validation (signup, password change, reset)
//! - Reset-token hashing
//! - Envelope profile shapes

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::ApiError;

    fn update_request(role: Option<&str>, name: Option<&str>) -> models::UpdateUserRequest {
        models::UpdateUserRequest {
            name: name.map(str::to_string),
            role: role.map(str::to_string),
            ..Default::default()
        }
    }

    // ------------------------------------------------------------------
    // Role field-permission table
    // ------------------------------------------------------------------

    #[test]
    fn test_user_may_update_own_name_and_email() {
        let request = models::UpdateUserRequest {
            name: Some("Ann".to_string()),
            email: Some("ann@x.com".to_string()),
            ..Default::default()
        };

        assert!(validators::authorize_update("user", true, &request).is_ok());
    }

    #[test]
    fn test_user_may_not_submit_role() {
        let request = update_request(Some("admin"), None);

        let result = validators::authorize_update("user", true, &request);
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_user_may_not_update_another_account() {
        let request = update_request(None, Some("Ann"));

        let result = validators::authorize_update("user", false, &request);
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_user_may_change_own_password() {
        let request = models::UpdateUserRequest {
            old_password: Some("secret1".to_string()),
            new_password: Some("secret2".to_string()),
            confirm_password: Some("secret2".to_string()),
            ..Default::default()
        };

        assert!(validators::authorize_update("user", true, &request).is_ok());
    }

    #[test]
    fn test_admin_may_set_role_on_any_account() {
        let request = update_request(Some("admin"), None);

        assert!(validators::authorize_update("admin", false, &request).is_ok());
        assert!(validators::authorize_update("admin", true, &request).is_ok());
    }

    #[test]
    fn test_admin_may_not_submit_other_fields() {
        let request = update_request(Some("admin"), Some("New Name"));

        let result = validators::authorize_update("admin", false, &request);
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    #[test]
    fn test_unknown_role_is_forbidden() {
        let request = update_request(None, Some("Ann"));

        let result = validators::authorize_update("guest", true, &request);
        assert!(matches!(result, Err(ApiError::Forbidden(_))));
    }

    // ------------------------------------------------------------------
    // Signup validation
    // ------------------------------------------------------------------

    #[test]
    fn test_signup_validation_success() {
        let request = models::SignupRequest {
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: "secret1".to_string(),
            role: Some("user".to_string()),
        };

        let result = validators::validate_signup(&request);
        assert!(result.is_valid);
    }

    #[test]
    fn test_signup_validation_collects_all_field_errors() {
        let request = models::SignupRequest {
            name: "".to_string(),
            email: "not-an-email".to_string(),
            password: "abc".to_string(),
            role: Some("superuser".to_string()),
        };

        let result = validators::validate_signup(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "name"));
        assert!(result.errors.iter().any(|e| e.field == "email"));
        assert!(result.errors.iter().any(|e| e.field == "password"));
        assert!(result.errors.iter().any(|e| e.field == "role"));
    }

    // ------------------------------------------------------------------
    // Password-change triplet validation
    // ------------------------------------------------------------------

    #[test]
    fn test_password_change_requires_all_three_fields() {
        let request = models::UpdateUserRequest {
            new_password: Some("secret2".to_string()),
            ..Default::default()
        };

        let result = validators::validate_password_change(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "oldPassword"));
        assert!(result.errors.iter().any(|e| e.field == "confirmPassword"));
    }

    #[test]
    fn test_password_change_rejects_mismatched_confirmation() {
        let request = models::UpdateUserRequest {
            old_password: Some("secret1".to_string()),
            new_password: Some("secret2".to_string()),
            confirm_password: Some("secret3".to_string()),
            ..Default::default()
        };

        let result = validators::validate_password_change(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "confirmPassword"));
    }

    #[test]
    fn test_password_change_absent_triplet_is_valid() {
        // Name-only updates must not trip the password pipeline
        let request = models::UpdateUserRequest {
            name: Some("Ann".to_string()),
            ..Default::default()
        };

        assert!(validators::validate_password_change(&request).is_valid);
    }

    // ------------------------------------------------------------------
    // Reset validation and token hashing
    // ------------------------------------------------------------------

    #[test]
    fn test_reset_validation_rejects_mismatch() {
        let request = models::ResetPasswordRequest {
            token: "abc".to_string(),
            new_password: "secret2".to_string(),
            confirm_password: "secret3".to_string(),
        };

        let result = validators::validate_reset(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "confirmPassword"));
    }

    #[test]
    fn test_reset_validation_rejects_missing_fields() {
        let request = models::ResetPasswordRequest {
            token: "".to_string(),
            new_password: "".to_string(),
            confirm_password: "".to_string(),
        };

        let result = validators::validate_reset(&request);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.field == "token"));
        assert!(result.errors.iter().any(|e| e.field == "newPassword"));
        assert!(result.errors.iter().any(|e| e.field == "confirmPassword"));
    }

    #[test]
    fn test_reset_token_expiry_window() {
        use chrono::{Duration, Utc};

        let future = (Utc::now() + Duration::minutes(5)).to_rfc3339();
        let past = (Utc::now() - Duration::minutes(1)).to_rfc3339();

        assert!(validators::reset_token_still_valid(Some(&future)));
        assert!(!validators::reset_token_still_valid(Some(&past)));
        assert!(!validators::reset_token_still_valid(None));
        assert!(!validators::reset_token_still_valid(Some("not-a-timestamp")));
    }

    #[test]
    fn test_invalid_credentials_error_is_generic() {
        // Unknown email and wrong password surface the identical message,
        // so responses never confirm which half was wrong
        let unknown_email = ApiError::InvalidCredentials;
        let wrong_password = ApiError::InvalidCredentials;

        assert_eq!(unknown_email.to_string(), wrong_password.to_string());
        assert_eq!(unknown_email.to_string(), "Invalid email or password");
    }

    #[test]
    fn test_reset_token_hash_is_deterministic_and_hex() {
        let first = validators::hash_reset_token("raw-token-value");
        let second = validators::hash_reset_token("raw-token-value");
        let other = validators::hash_reset_token("different-token");

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.len(), 64); // SHA-256 hex
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    // ------------------------------------------------------------------
    // Envelope profile shapes
    // ------------------------------------------------------------------

    fn sample_user() -> models::User {
        models::User {
            id: "U_K7NP3X".to_string(),
            name: "Ann".to_string(),
            email: "ann@x.com".to_string(),
            password: Some("$argon2id$...".to_string()),
            role: "user".to_string(),
            login_type: "local".to_string(),
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
            updated_at: Some("2024-01-01T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_signup_profile_omits_id_and_password() {
        let profile = sample_user().signup_profile();

        assert!(profile.get("_id").is_none());
        assert!(profile.get("password").is_none());
        assert_eq!(profile["name"], "Ann");
        assert_eq!(profile["email"], "ann@x.com");
        assert_eq!(profile["role"], "user");
        assert_eq!(profile["loginType"], "local");
    }

    #[test]
    fn test_envelope_profile_carries_id_but_never_password() {
        let profile = sample_user().envelope_profile();

        assert_eq!(profile["_id"], "U_K7NP3X");
        assert!(profile.get("password").is_none());
    }

    #[test]
    fn test_user_serialization_skips_credentials() {
        let user = sample_user();
        let serialized = serde_json::to_value(&user).unwrap();

        assert!(serialized.get("password").is_none());
        assert!(serialized.get("reset_token_hash").is_none());
        assert!(serialized.get("reset_token_expires_at").is_none());
        assert_eq!(serialized["email"], "ann@x.com");
    }
}
