//! Service-account access tokens (OAuth2 JWT bearer grant).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::check_status;
use crate::error::ServiceError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECONDS: i64 = 60 * 60;
/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECONDS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a service-account key file the token flow needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, ServiceError> {
        let raw = std::fs::read(path).map_err(|e| {
            ServiceError::Auth(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_slice(&raw).map_err(|e| {
            ServiceError::Auth(format!("invalid key file {}: {}", path.display(), e))
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Hands out bearer tokens, exchanging a signed assertion when the cached
/// one is missing or about to expire.
pub struct TokenProvider {
    key: ServiceAccountKey,
    scopes: String,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(key: ServiceAccountKey, scopes: &[&str], http: reqwest::Client) -> Self {
        Self {
            key,
            scopes: scopes.join(" "),
            http,
            cached: Mutex::new(None),
        }
    }

    pub async fn access_token(&self) -> Result<String, ServiceError> {
        if let Some(token) = self.cached_token(Utc::now()) {
            return Ok(token);
        }

        let now = Utc::now();
        let assertion = self.signed_assertion(now)?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(ServiceError::transport("oauth2"))?;
        let response = check_status("oauth2", response).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::malformed("oauth2", e))?;

        log::debug!("Obtained access token valid for {}s", token.expires_in);
        *self.cached.lock() = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: now + Duration::seconds(token.expires_in),
        });

        Ok(token.access_token)
    }

    fn cached_token(&self, now: DateTime<Utc>) -> Option<String> {
        let cached = self.cached.lock();
        cached
            .as_ref()
            .filter(|t| t.expires_at - Duration::seconds(EXPIRY_MARGIN_SECONDS) > now)
            .map(|t| t.value.clone())
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, ServiceError> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scopes,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECONDS,
        };

        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| ServiceError::Auth(format!("invalid private key: {}", e)))?;

        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| ServiceError::Auth(format!("failed to sign assertion: {}", e)))
    }
}
