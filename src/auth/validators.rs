//! Auth request validation and the role field-permission table

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::models::{ResetPasswordRequest, SignupRequest, UpdateUserRequest};
use crate::common::{looks_like_email, ApiError, ValidationResult};

const MIN_PASSWORD_LEN: usize = 6;

/// Which body fields each role may submit on update-user, and whether the
/// role is confined to its own record.
///
/// Consulted before any mutation; extending a role or field is a data
/// change here, not a new code path.
pub struct FieldPermission {
    pub role: &'static str,
    pub fields: &'static [&'static str],
    pub own_record_only: bool,
}

pub const ROLE_FIELD_PERMISSIONS: &[FieldPermission] = &[
    FieldPermission {
        role: "admin",
        fields: &["role"],
        own_record_only: false,
    },
    FieldPermission {
        role: "user",
        fields: &["name", "email", "oldPassword", "newPassword", "confirmPassword"],
        own_record_only: true,
    },
];

/// Wire names of the fields actually present in an update request
pub fn submitted_fields(request: &UpdateUserRequest) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if request.name.is_some() {
        fields.push("name");
    }
    if request.email.is_some() {
        fields.push("email");
    }
    if request.role.is_some() {
        fields.push("role");
    }
    if request.old_password.is_some() {
        fields.push("oldPassword");
    }
    if request.new_password.is_some() {
        fields.push("newPassword");
    }
    if request.confirm_password.is_some() {
        fields.push("confirmPassword");
    }
    fields
}

/// Enforce the role permission table for an update request.
///
/// Any field outside the caller's allowlist, or a cross-account attempt by
/// a role confined to its own record, is a Forbidden - not a validation
/// error, since the shape is fine and the authority is not.
pub fn authorize_update(
    caller_role: &str,
    is_own_record: bool,
    request: &UpdateUserRequest,
) -> Result<(), ApiError> {
    let permission = ROLE_FIELD_PERMISSIONS
        .iter()
        .find(|p| p.role == caller_role)
        .ok_or_else(|| ApiError::Forbidden(format!("Role '{}' may not update accounts", caller_role)))?;

    if permission.own_record_only && !is_own_record {
        return Err(ApiError::Forbidden(
            "You may only update your own account".to_string(),
        ));
    }

    for field in submitted_fields(request) {
        if !permission.fields.contains(&field) {
            return Err(ApiError::Forbidden(format!(
                "Role '{}' may not update field '{}'",
                caller_role, field
            )));
        }
    }

    Ok(())
}

pub fn validate_signup(request: &SignupRequest) -> ValidationResult {
    let mut result = ValidationResult::new();

    if request.name.trim().is_empty() {
        result.add_error("name", "Name is required");
    }

    if request.email.trim().is_empty() {
        result.add_error("email", "Email is required");
    } else if !looks_like_email(&request.email) {
        result.add_error("email", "Email is not a valid address");
    }

    if request.password.is_empty() {
        result.add_error("password", "Password is required");
    } else if request.password.len() < MIN_PASSWORD_LEN {
        result.add_error("password", "Password must be at least 6 characters");
    }

    if let Some(role) = &request.role {
        if role != "user" && role != "admin" {
            result.add_error("role", "Role must be 'user' or 'admin'");
        }
    }

    result
}

/// Validate the password-change triplet on an update request.
///
/// Verifying the old password against the stored digest happens in the
/// handler; this only checks shape: all three present together, new long
/// enough, new equal to confirm bit-for-bit.
pub fn validate_password_change(request: &UpdateUserRequest) -> ValidationResult {
    let mut result = ValidationResult::new();

    let any_present = request.old_password.is_some()
        || request.new_password.is_some()
        || request.confirm_password.is_some();
    if !any_present {
        return result;
    }

    if request.old_password.is_none() {
        result.add_error("oldPassword", "Old password is required to change password");
    }

    match &request.new_password {
        None => result.add_error("newPassword", "New password is required to change password"),
        Some(p) if p.len() < MIN_PASSWORD_LEN => {
            result.add_error("newPassword", "Password must be at least 6 characters")
        }
        Some(_) => {}
    }

    match (&request.new_password, &request.confirm_password) {
        (_, None) => result.add_error(
            "confirmPassword",
            "Password confirmation is required to change password",
        ),
        (Some(new), Some(confirm)) if new != confirm => {
            result.add_error("confirmPassword", "Passwords do not match")
        }
        _ => {}
    }

    result
}

pub fn validate_reset(request: &ResetPasswordRequest) -> ValidationResult {
    let mut result = ValidationResult::new();

    if request.token.trim().is_empty() {
        result.add_error("token", "Reset token is required");
    }

    if request.new_password.is_empty() {
        result.add_error("newPassword", "New password is required");
    } else if request.new_password.len() < MIN_PASSWORD_LEN {
        result.add_error("newPassword", "Password must be at least 6 characters");
    }

    if request.confirm_password.is_empty() {
        result.add_error("confirmPassword", "Password confirmation is required");
    } else if request.new_password != request.confirm_password {
        result.add_error("confirmPassword", "Passwords do not match");
    }

    result
}

/// SHA-256 digest of a raw reset token, hex-encoded.
/// Only this digest is ever persisted; the raw value goes out by email.
pub fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Timestamp comparison at read time; no background sweep.
/// A missing or unparseable expiry counts as expired.
pub fn reset_token_still_valid(expires_at: Option<&str>) -> bool {
    expires_at
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|expiry| expiry > Utc::now())
        .unwrap_or(false)
}
