use std::{
    path::Path,
    time::{Duration, Instant},
};

use chrono::Utc;
use eyre::{Context as _, Error};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::SheetError;

const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const TOKEN_TTL_SECS: i64 = 3600;
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// The parts of a Google service account key file we need.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
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
    #[serde(default)]
    expires_in: Option<u64>,
}

struct AccessToken {
    token: String,
    refresh_at: Instant,
}

/// Service account credentials exchanged for short lived bearer tokens.
pub struct ServiceAccount {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    token: Mutex<Option<AccessToken>>,
}

impl ServiceAccount {
    pub fn new(key: ServiceAccountKey) -> Result<Self, Error> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|err| SheetError::Credentials(err.to_string()))?;
        Ok(ServiceAccount {
            key,
            encoding_key,
            token: Mutex::new(None),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials {}", path.display()))?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|err| SheetError::Credentials(err.to_string()))?;
        ServiceAccount::new(key)
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn assertion(&self) -> Result<String, Error> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + TOKEN_TTL_SECS,
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .context("Failed to sign service account assertion")
    }

    /// Cached bearer token, refreshed a minute before it runs out.
    pub async fn token(&self, client: &reqwest::Client) -> Result<String, Error> {
        let cached = self
            .token
            .lock()
            .as_ref()
            .filter(|token| Instant::now() < token.refresh_at)
            .map(|token| token.token.clone());
        if let Some(token) = cached {
            return Ok(token);
        }

        log::debug!("Requesting access token for {}", self.key.client_email);
        let assertion = self.assertion()?;
        let response = client
            .post(&self.key.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .context("Failed to request access token")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Api {
                status: status.as_u16(),
                body,
            }
            .into());
        }
        let response: TokenResponse = response
            .json()
            .await
            .context("Failed to decode access token")?;

        let ttl = Duration::from_secs(response.expires_in.unwrap_or(TOKEN_TTL_SECS as u64));
        let refresh_at = Instant::now() + ttl.saturating_sub(REFRESH_MARGIN);
        *self.token.lock() = Some(AccessToken {
            token: response.access_token.clone(),
            refresh_at,
        });
        Ok(response.access_token)
    }
}
