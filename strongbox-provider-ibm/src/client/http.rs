//! REST implementation of [`SecretsManagerApi`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use super::auth::Authenticator;
use super::{ApiError, ApiResult, ListSecretsOptions, SecretsManagerApi};
use crate::models::{
    RawSecretMetadataPage, Secret, SecretGroup, SecretGroupCollection, SecretGroupPatch,
    SecretGroupPrototype, SecretMetadataPage, SecretPrototype,
};

const MERGE_PATCH_JSON: &str = "application/merge-patch+json";

/// Client for one Secrets Manager instance
#[derive(Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Authenticator,
}

impl HttpClient {
    /// Create a client for the instance at `base_url`
    pub fn new(base_url: Url, auth: Authenticator, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                operation: "BuildClient",
                source,
            })?;

        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base_url}/api/v2/{segments...}` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["api", "v2"])
            .extend(segments);
        Ok(url)
    }

    async fn request(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
    ) -> ApiResult<RequestBuilder> {
        log::debug!("{}: {} {}", operation, method, url);
        let token = self.auth.token(&self.http).await.inspect_err(|e| {
            log::debug!("{} could not obtain a token: {}", operation, e);
        })?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json"))
    }

    /// Send a request, turning transport failures and non-success statuses into errors
    async fn send(&self, operation: &'static str, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|source| {
            log::debug!("{} failed {}", operation, source);
            ApiError::Transport { operation, source }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log::debug!("{} failed HTTP {}\n{}", operation, status.as_u16(), body);
        Err(ApiError::Status {
            operation,
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> ApiResult<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { operation, source })?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode { operation, source })
    }

    async fn decode_secret(operation: &'static str, response: Response) -> ApiResult<Secret> {
        let value: serde_json::Value = Self::decode(operation, response).await?;
        Secret::from_value(value).map_err(|source| ApiError::model(operation, source))
    }
}

#[async_trait]
impl SecretsManagerApi for HttpClient {
    async fn list_secret_groups(&self) -> ApiResult<SecretGroupCollection> {
        const OP: &str = "ListSecretGroups";
        let url = self.endpoint(&["secret_groups"])?;
        let request = self.request(OP, Method::GET, url).await?;
        let response = self.send(OP, request).await?;
        Self::decode(OP, response).await
    }

    async fn get_secret_group(&self, id: &str) -> ApiResult<SecretGroup> {
        const OP: &str = "GetSecretGroup";
        let url = self.endpoint(&["secret_groups", id])?;
        let request = self.request(OP, Method::GET, url).await?;
        let response = self.send(OP, request).await?;
        Self::decode(OP, response).await
    }

    async fn create_secret_group(
        &self,
        prototype: &SecretGroupPrototype,
    ) -> ApiResult<SecretGroup> {
        const OP: &str = "CreateSecretGroup";
        let url = self.endpoint(&["secret_groups"])?;
        let request = self.request(OP, Method::POST, url).await?.json(prototype);
        let response = self.send(OP, request).await?;
        Self::decode(OP, response).await
    }

    async fn update_secret_group(
        &self,
        id: &str,
        patch: &SecretGroupPatch,
    ) -> ApiResult<SecretGroup> {
        const OP: &str = "UpdateSecretGroup";
        let url = self.endpoint(&["secret_groups", id])?;
        let body =
            serde_json::to_vec(patch).map_err(|source| ApiError::Decode { operation: OP, source })?;
        let request = self
            .request(OP, Method::PATCH, url)
            .await?
            .header(CONTENT_TYPE, MERGE_PATCH_JSON)
            .body(body);
        let response = self.send(OP, request).await?;
        Self::decode(OP, response).await
    }

    async fn delete_secret_group(&self, id: &str) -> ApiResult<()> {
        const OP: &str = "DeleteSecretGroup";
        let url = self.endpoint(&["secret_groups", id])?;
        let request = self.request(OP, Method::DELETE, url).await?;
        self.send(OP, request).await?;
        Ok(())
    }

    async fn list_secrets(&self, options: &ListSecretsOptions) -> ApiResult<SecretMetadataPage> {
        const OP: &str = "ListSecrets";
        let mut url = self.endpoint(&["secrets"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(offset) = options.offset {
                query.append_pair("offset", &offset.to_string());
            }
            if let Some(limit) = options.limit {
                query.append_pair("limit", &limit.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let request = self.request(OP, Method::GET, url).await?;
        let response = self.send(OP, request).await?;
        let raw: RawSecretMetadataPage = Self::decode(OP, response).await?;
        SecretMetadataPage::try_from(raw).map_err(|source| ApiError::model(OP, source))
    }

    async fn get_secret(&self, id: &str) -> ApiResult<Secret> {
        const OP: &str = "GetSecret";
        let url = self.endpoint(&["secrets", id])?;
        let request = self.request(OP, Method::GET, url).await?;
        let response = self.send(OP, request).await?;
        Self::decode_secret(OP, response).await
    }

    async fn create_secret(&self, prototype: &SecretPrototype) -> ApiResult<Secret> {
        const OP: &str = "CreateSecret";
        let url = self.endpoint(&["secrets"])?;
        let request = self.request(OP, Method::POST, url).await?.json(prototype);
        let response = self.send(OP, request).await?;
        Self::decode_secret(OP, response).await
    }

    async fn delete_secret(&self, id: &str) -> ApiResult<()> {
        const OP: &str = "DeleteSecret";
        let url = self.endpoint(&["secrets", id])?;
        let request = self.request(OP, Method::DELETE, url).await?;
        self.send(OP, request).await?;
        Ok(())
    }
}
