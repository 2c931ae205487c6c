use std::fs;
use std::path::Path;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ExtractError;
use crate::report::ReportError;

pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh this long before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The fields of a Google service-account key file this tool needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, ExtractError> {
        if path.as_os_str().is_empty() {
            return Err(ExtractError::config("credential path is empty"));
        }
        let content = fs::read_to_string(path).map_err(|e| {
            ExtractError::config(format!("cannot read credential file {path:?}: {e}"))
        })?;
        let key: Self = serde_json::from_str(&content).map_err(|e| {
            ExtractError::config(format!("credential file {path:?} is not a service-account key: {e}"))
        })?;
        info!(
            action = "load",
            component = "credentials",
            client_email = %key.client_email,
            file_path = ?path,
            "Loaded service-account key"
        );
        Ok(key)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Unix time at which a token issued at `now` with `expires_in` seconds lapses.
fn token_expiry(now: i64, expires_in: i64) -> Result<i64, ReportError> {
    Duration::try_seconds(expires_in)
        .filter(|lifetime| *lifetime >= Duration::zero())
        .and_then(|lifetime| now.checked_add(lifetime.num_seconds()))
        .ok_or_else(|| {
            ReportError::Decode(format!(
                "token response: expires_in {expires_in} is out of range"
            ))
        })
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Exchanges signed service-account assertions for OAuth2 access tokens.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    agent: ureq::Agent,
    cached: Option<CachedToken>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey, agent: ureq::Agent) -> Result<Self, ExtractError> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| ExtractError::config(format!("invalid service-account private key: {e}")))?;
        Ok(Self {
            key,
            signing_key,
            agent,
            cached: None,
        })
    }

    /// Signed JWT asserting the service account's identity for `now` (unix seconds).
    pub fn assertion(&self, now: i64) -> Result<String, ReportError> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: ANALYTICS_READONLY_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        encode(&header, &claims, &self.signing_key)
            .map_err(|e| ReportError::Authentication(format!("signing assertion: {e}")))
    }

    /// A valid bearer token, fetched again only once the cached one is about to expire.
    pub fn access_token(&mut self) -> Result<String, ReportError> {
        let now = Utc::now().timestamp();
        if let Some(token) = &self.cached {
            if token.expires_at - EXPIRY_MARGIN_SECS > now {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.assertion(now)?;
        let response = self
            .agent
            .post(&self.key.token_uri)
            .send_form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => ReportError::Authentication(format!(
                    "token endpoint returned HTTP {code}: {}",
                    resp.into_string().unwrap_or_default()
                )),
                ureq::Error::Transport(t) => ReportError::Transport(t.to_string()),
            })?;
        let token: TokenResponse = response
            .into_json()
            .map_err(|e| ReportError::Decode(format!("token response: {e}")))?;

        let lifetime = token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        let expires_at = token_expiry(Utc::now().timestamp(), lifetime)?;
        info!(
            action = "refresh",
            component = "credentials",
            expires_in_s = lifetime,
            "Obtained access token"
        );
        self.cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }
}
