// src/services/tokens.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Access tokens live one day
const ACCESS_TOKEN_TTL_DAYS: i64 = 1;
/// Refresh tokens live a week
const REFRESH_TOKEN_TTL_DAYS: i64 = 7;
/// Guest tokens live three days
const GUEST_TOKEN_TTL_DAYS: i64 = 3;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// JWT claims structure
///
/// Access and refresh tokens carry the user id in `sub`; guest tokens carry
/// no identity, only `role: "guest"`.
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub exp: usize,
}

/// Mints and verifies the service's bearer credentials.
///
/// Expiry is embedded in the token; nothing is tracked server-side, so an
/// issued token stays valid until its own clock runs out.
pub struct TokenIssuer {
    secret: String,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl TokenIssuer {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Short-lived access token for a known user
    pub fn issue_access(&self, user_id: &str) -> Result<String, TokenError> {
        let exp = (Utc::now() + Duration::days(ACCESS_TOKEN_TTL_DAYS)).timestamp() as usize;
        self.sign(&Claims {
            sub: Some(user_id.to_string()),
            role: None,
            exp,
        })
    }

    /// Longer-lived refresh token for a known user
    pub fn issue_refresh(&self, user_id: &str) -> Result<String, TokenError> {
        let exp = (Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS)).timestamp() as usize;
        self.sign(&Claims {
            sub: Some(user_id.to_string()),
            role: None,
            exp,
        })
    }

    /// Identity-less capability token for unauthenticated read access
    pub fn issue_guest(&self) -> Result<String, TokenError> {
        let exp = (Utc::now() + Duration::days(GUEST_TOKEN_TTL_DAYS)).timestamp() as usize;
        self.sign(&Claims {
            sub: None,
            role: Some("guest".to_string()),
            exp,
        })
    }

    /// Decode and verify a token, failing closed.
    ///
    /// Expiry is distinguished from every other failure so a client can
    /// react by requesting a fresh guest token instead of a full re-login.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test_secret_key".to_string())
    }

    #[test]
    fn test_access_token_carries_user_id() {
        let issuer = issuer();
        let token = issuer.issue_access("U_K7NP3X").unwrap();

        let claims = issuer.decode(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("U_K7NP3X"));
        assert!(claims.role.is_none());
    }

    #[test]
    fn test_guest_token_has_role_but_no_subject() {
        let issuer = issuer();
        let token = issuer.issue_guest().unwrap();

        let claims = issuer.decode(&token).unwrap();
        assert!(claims.sub.is_none());
        assert_eq!(claims.role.as_deref(), Some("guest"));
    }

    #[test]
    fn test_decode_fails_with_wrong_secret() {
        let token = issuer().issue_access("U_K7NP3X").unwrap();

        let other = TokenIssuer::new("different_secret".to_string());
        assert!(matches!(other.decode(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_decode_distinguishes_expired_from_invalid() {
        let issuer = issuer();

        // Hand-roll an already-expired token with the same secret
        let expired = encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                sub: Some("U_K7NP3X".to_string()),
                role: None,
                exp: 1_000_000, // 1970s
            },
            &EncodingKey::from_secret("test_secret_key".as_bytes()),
        )
        .unwrap();

        assert!(matches!(issuer.decode(&expired), Err(TokenError::Expired)));
        assert!(matches!(
            issuer.decode("not.a.token"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_refresh_token_outlives_access_token() {
        let issuer = issuer();

        let access = issuer.decode(&issuer.issue_access("U_1").unwrap()).unwrap();
        let refresh = issuer
            .decode(&issuer.issue_refresh("U_1").unwrap())
            .unwrap();

        assert!(refresh.exp > access.exp);
    }
}
