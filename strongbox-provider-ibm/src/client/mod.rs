//! Secrets Manager service client
//!
//! [`SecretsManagerApi`] is the seam between the provider's handlers and the
//! remote service. [`HttpClient`] talks to the REST API; tests substitute an
//! in-memory implementation.

mod auth;
mod http;
pub mod pager;

pub use auth::Authenticator;
pub use http::HttpClient;
pub use pager::SecretsPager;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    ModelError, Secret, SecretGroup, SecretGroupCollection, SecretGroupPatch,
    SecretGroupPrototype, SecretMetadataPage, SecretPrototype,
};

/// Errors returned by service calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("{operation} failed: HTTP {status}\n{body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    /// The request never produced a response
    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The response body was not the expected JSON
    #[error("{operation} returned an undecodable body: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The response decoded but its contents did not fit the models
    #[error("{operation}: {source}")]
    Model {
        operation: &'static str,
        #[source]
        source: ModelError,
    },

    /// Obtaining a bearer token failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of the failed call, if the service answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_unrecognized_subtype(&self) -> bool {
        matches!(
            self,
            ApiError::Model {
                source: ModelError::UnrecognizedSubtype(_),
                ..
            }
        )
    }

    pub fn model(operation: &'static str, source: ModelError) -> Self {
        ApiError::Model { operation, source }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Query options for listing secrets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListSecretsOptions {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl ListSecretsOptions {
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Operations of the Secrets Manager service used by the provider
#[async_trait]
pub trait SecretsManagerApi: Send + Sync {
    async fn list_secret_groups(&self) -> ApiResult<SecretGroupCollection>;

    async fn get_secret_group(&self, id: &str) -> ApiResult<SecretGroup>;

    async fn create_secret_group(&self, prototype: &SecretGroupPrototype)
    -> ApiResult<SecretGroup>;

    async fn update_secret_group(&self, id: &str, patch: &SecretGroupPatch)
    -> ApiResult<SecretGroup>;

    async fn delete_secret_group(&self, id: &str) -> ApiResult<()>;

    /// Fetch one page of secret metadata
    async fn list_secrets(&self, options: &ListSecretsOptions) -> ApiResult<SecretMetadataPage>;

    async fn get_secret(&self, id: &str) -> ApiResult<Secret>;

    async fn create_secret(&self, prototype: &SecretPrototype) -> ApiResult<Secret>;

    async fn delete_secret(&self, id: &str) -> ApiResult<()>;
}
