//! Bearer token acquisition for the service client

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::{ApiError, ApiResult};

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

pub struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Source of the `Authorization: Bearer` header
pub enum Authenticator {
    /// A fixed, externally obtained token
    Bearer(String),
    /// An IAM API key exchanged for short-lived access tokens
    IamApiKey {
        api_key: String,
        token_url: Url,
        cache: Mutex<Option<CachedToken>>,
    },
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Authenticator::Bearer(_) => f.write_str("Authenticator::Bearer(..)"),
            Authenticator::IamApiKey { token_url, .. } => f
                .debug_struct("Authenticator::IamApiKey")
                .field("token_url", &token_url.as_str())
                .finish_non_exhaustive(),
        }
    }
}

impl Authenticator {
    pub fn bearer(token: impl Into<String>) -> Self {
        Authenticator::Bearer(token.into())
    }

    /// Exchange `api_key` at `{iam_url}/identity/token`
    pub fn iam(api_key: impl Into<String>, iam_url: &Url) -> ApiResult<Self> {
        Ok(Authenticator::IamApiKey {
            api_key: api_key.into(),
            token_url: iam_url.join("identity/token")?,
            cache: Mutex::new(None),
        })
    }

    /// Current bearer token, fetching a new one when the cached token is about to expire
    pub async fn token(&self, http: &reqwest::Client) -> ApiResult<String> {
        let (api_key, token_url, cache) = match self {
            Authenticator::Bearer(token) => return Ok(token.clone()),
            Authenticator::IamApiKey {
                api_key,
                token_url,
                cache,
            } => (api_key, token_url, cache),
        };

        let mut cached = cache.lock().await;
        if let Some(token) = cached.as_ref()
            && token.expires_at > Instant::now() + REFRESH_MARGIN
        {
            return Ok(token.value.clone());
        }

        log::debug!("Requesting IAM access token from {}", token_url);
        let response = http
            .post(token_url.clone())
            .header("Accept", "application/json")
            .form(&[("grant_type", APIKEY_GRANT_TYPE), ("apikey", api_key.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Auth(format!("IAM returned HTTP {}: {}", status.as_u16(), body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Auth(format!("invalid IAM token response: {}", e)))?;

        let value = token.access_token;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn bearer_token_is_returned_as_is() {
        let auth = Authenticator::bearer("static-token");
        let token = auth.token(&reqwest::Client::new()).await.unwrap();
        assert_eq!(token, "static-token");
        assert_eq!(format!("{:?}", auth), "Authenticator::Bearer(..)");
    }

    #[tokio::test]
    async fn api_key_is_exchanged_once_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .and(body_string_contains("apikey=secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "iam-token",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let iam_url = Url::parse(&server.uri()).unwrap();
        let auth = Authenticator::iam("secret-key", &iam_url).unwrap();
        let http = reqwest::Client::new();

        assert_eq!(auth.token(&http).await.unwrap(), "iam-token");
        assert_eq!(auth.token(&http).await.unwrap(), "iam-token");
    }

    #[tokio::test]
    async fn rejected_api_key_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("BXNIM0415E"))
            .mount(&server)
            .await;

        let iam_url = Url::parse(&server.uri()).unwrap();
        let auth = Authenticator::iam("bad-key", &iam_url).unwrap();
        let err = auth.token(&reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(ref msg) if msg.contains("HTTP 400")));
        assert!(!err.is_not_found());
    }
}
