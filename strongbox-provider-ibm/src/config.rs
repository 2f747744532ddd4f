//! Provider configuration

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::client::{Authenticator, HttpClient};

pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PAGE_SIZE: i64 = 200;

/// Errors in the provider configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither a service URL nor an instance id and region were given
    #[error("Missing service endpoint: set service_url, or instance_id and region")]
    MissingEndpoint,

    /// Neither an API key nor a bearer token were given
    #[error("Missing credentials: set api_key or bearer_token")]
    MissingCredentials,

    #[error("Invalid endpoint type '{0}': expected 'public' or 'private'")]
    InvalidEndpointType(String),

    #[error("Invalid URL for {field}: {source}")]
    InvalidUrl {
        field: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to build client: {0}")]
    Client(String),
}

/// Whether the instance is reached over the public or the private network
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    #[default]
    Public,
    Private,
}

impl std::str::FromStr for EndpointType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(EndpointType::Public),
            "private" => Ok(EndpointType::Private),
            other => Err(ConfigError::InvalidEndpointType(other.to_string())),
        }
    }
}

/// Connection settings for one Secrets Manager instance
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Full instance URL; takes precedence over instance_id and region
    pub service_url: Option<String>,
    pub instance_id: Option<String>,
    pub region: Option<String>,
    pub endpoint_type: EndpointType,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
    pub iam_url: String,
    pub timeout_secs: u64,
    /// Page size used by the secrets data source
    pub page_size: i64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            service_url: None,
            instance_id: None,
            region: None,
            endpoint_type: EndpointType::Public,
            api_key: None,
            bearer_token: None,
            iam_url: DEFAULT_IAM_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ProviderConfig {
    /// Load a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Base URL of the instance
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        if let Some(url) = non_empty(&self.service_url) {
            return Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
                field: "service_url",
                source,
            });
        }

        let (Some(instance_id), Some(region)) =
            (non_empty(&self.instance_id), non_empty(&self.region))
        else {
            return Err(ConfigError::MissingEndpoint);
        };

        let host = match self.endpoint_type {
            EndpointType::Public => format!("{}.{}", instance_id, region),
            EndpointType::Private => format!("{}.private.{}", instance_id, region),
        };
        Url::parse(&format!("https://{}.secrets-manager.appdomain.cloud", host)).map_err(
            |source| ConfigError::InvalidUrl {
                field: "instance_id",
                source,
            },
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        if non_empty(&self.api_key).is_none() && non_empty(&self.bearer_token).is_none() {
            return Err(ConfigError::MissingCredentials);
        }
        if self.page_size < 1 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                message: format!("must be positive, got {}", self.page_size),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// A bearer token wins over an API key
    pub fn authenticator(&self) -> Result<Authenticator, ConfigError> {
        if let Some(token) = non_empty(&self.bearer_token) {
            return Ok(Authenticator::bearer(token));
        }
        let api_key = non_empty(&self.api_key).ok_or(ConfigError::MissingCredentials)?;
        let iam_url = Url::parse(&self.iam_url).map_err(|source| ConfigError::InvalidUrl {
            field: "iam_url",
            source,
        })?;
        Authenticator::iam(api_key, &iam_url).map_err(|e| ConfigError::Client(e.to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate and build the REST client
    pub fn build_client(&self) -> Result<HttpClient, ConfigError> {
        self.validate()?;
        HttpClient::new(self.endpoint()?, self.authenticator()?, self.timeout())
            .map_err(|e| ConfigError::Client(e.to_string()))
    }
}
