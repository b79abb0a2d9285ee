// src/services/google.rs
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::common::helpers::{safe_email_log, safe_token_log};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Error)]
pub enum GoogleError {
    #[error("Google OAuth not configured")]
    NotConfigured,

    #[error("OAuth flow failed: {0}")]
    OAuthFailed(String),

    #[error("Invalid or malformed id_token")]
    InvalidToken,

    #[error("Expired id_token")]
    ExpiredToken,

    #[error("Token validation service unavailable")]
    ServiceUnavailable,
}

/// Verified identity extracted from a Google ID token
#[derive(Debug, Clone)]
pub struct GoogleProfile {
    pub email: String,
    pub name: Option<String>,
    pub sub: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub id_token: Option<String>,
    pub expires_in: i64,
    pub token_type: String,
}

/// Delegated identity verification against Google's OAuth endpoints
#[derive(Debug, Clone)]
pub struct GoogleOAuthService {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: String,
    client: Client,
}

impl GoogleOAuthService {
    pub fn from_env(client: Client) -> Self {
        let client_id = env::var("GOOGLE_CLIENT_ID").ok().filter(|v| !v.is_empty());
        let client_secret = env::var("GOOGLE_CLIENT_SECRET")
            .ok()
            .filter(|v| !v.is_empty());
        let redirect_uri = env::var("GOOGLE_OAUTH_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:8080/api/auth/google/callback".to_string());

        Self {
            client_id,
            client_secret,
            redirect_uri,
            client,
        }
    }

    fn credentials(&self) -> Result<(&str, &str), GoogleError> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(GoogleError::NotConfigured),
        }
    }

    /// Build the consent-page URL that begins the OAuth handshake
    pub fn authorization_url(&self) -> Result<String, GoogleError> {
        let (client_id, _) = self.credentials()?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=online",
            GOOGLE_AUTH_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode("openid email profile"),
        ))
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleTokenResponse, GoogleError> {
        let (client_id, client_secret) = self.credentials()?;

        let params = [
            ("code", code),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP error contacting Google token endpoint");
                GoogleError::ServiceUnavailable
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(http_status = %status, body = %body, "Google code exchange rejected");
            return Err(GoogleError::OAuthFailed(format!(
                "code exchange failed with status {}",
                status
            )));
        }

        let token_response = response.json::<GoogleTokenResponse>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Google token response");
            GoogleError::OAuthFailed("malformed token response".to_string())
        })?;

        debug!(
            token_type = %token_response.token_type,
            expires_in = token_response.expires_in,
            access_token = %safe_token_log(&token_response.access_token),
            has_id_token = token_response.id_token.is_some(),
            "Google code exchange succeeded"
        );

        Ok(token_response)
    }

    /// Verify an ID token against Google's tokeninfo endpoint and pull out
    /// the identity fields.
    ///
    /// Docs: https://developers.google.com/identity/sign-in/web/backend-auth
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleProfile, GoogleError> {
        let tokeninfo_url = format!("{}?id_token={}", GOOGLE_TOKENINFO_URL, id_token);

        debug!("Initiating Google token validation with tokeninfo endpoint");

        let response = self.client.get(&tokeninfo_url).send().await.map_err(|e| {
            error!(
                error = %e,
                endpoint = GOOGLE_TOKENINFO_URL,
                "HTTP error contacting Google tokeninfo endpoint"
            );
            GoogleError::ServiceUnavailable
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(http_status = %status, "Google tokeninfo rejected the id_token");
            return match status.as_u16() {
                401 => Err(GoogleError::ExpiredToken),
                _ => Err(GoogleError::InvalidToken),
            };
        }

        let body = response.json::<serde_json::Value>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Google tokeninfo JSON response");
            GoogleError::InvalidToken
        })?;

        let email = body
            .get("email")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let sub = body.get("sub").and_then(|v| v.as_str()).map(str::to_string);
        let name = body
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let (email, sub) = match (email, sub) {
            (Some(email), Some(sub)) => (email, sub),
            (email, sub) => {
                warn!(
                    has_email = email.is_some(),
                    has_sub = sub.is_some(),
                    "Google token missing required fields (email/sub)"
                );
                return Err(GoogleError::InvalidToken);
            }
        };

        // Tokeninfo serializes exp as a string; tolerate a bare number too
        let exp = body
            .get("exp")
            .and_then(|v| v.as_str().and_then(|s| s.parse::<i64>().ok()).or_else(|| v.as_i64()));
        if let Some(exp) = exp {
            if exp < Utc::now().timestamp() {
                warn!(token_exp = exp, "Google token has expired");
                return Err(GoogleError::ExpiredToken);
            }
        }

        // Validate audience (client id) when configured
        if let Some(client_id) = &self.client_id {
            match body.get("aud").and_then(|v| v.as_str()) {
                Some(aud) if aud == client_id => {
                    debug!("Google token audience validation successful");
                }
                Some(aud) => {
                    warn!(
                        token_audience = %aud,
                        "Google token audience validation failed - rejecting token"
                    );
                    return Err(GoogleError::InvalidToken);
                }
                None => {
                    warn!("Google token missing audience field - rejecting token");
                    return Err(GoogleError::InvalidToken);
                }
            }
        }

        debug!(
            email = %safe_email_log(&email),
            provider = "google",
            provider_id = %sub,
            "Google token validation successful"
        );

        Ok(GoogleProfile { email, name, sub })
    }
}
