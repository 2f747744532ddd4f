//! Secrets Manager provider implementation
//!
//! This module contains the provider struct, the dispatch from resource type
//! to handler, and the mapping of client and conversion failures onto
//! [`ProviderError`].

use std::collections::HashMap;
use std::sync::Arc;

use strongbox_core::provider::{ProviderError, ProviderErrorKind, ProviderResult};
use strongbox_core::resource::{Resource, ResourceId, State, Value};
use strongbox_core::schema::{ResourceSchema, TypeError};

use crate::client::{ApiError, SecretsManagerApi};
use crate::config::{ConfigError, DEFAULT_PAGE_SIZE, ProviderConfig};
use crate::convert::ConvertError;
use crate::schemas::{sm_secret, sm_secret_group, sm_secret_groups, sm_secrets};

/// IBM Cloud Secrets Manager provider
pub struct IbmSmProvider {
    client: Arc<dyn SecretsManagerApi>,
    page_size: i64,
}

impl IbmSmProvider {
    /// Create a provider talking to the instance described by `config`
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let client = config.build_client().map_err(configuration_error)?;
        log::info!("Using Secrets Manager instance at {}", client.base_url());
        Ok(Self {
            client: Arc::new(client),
            page_size: config.page_size,
        })
    }

    /// Create a provider over an existing client
    pub fn with_client(client: Arc<dyn SecretsManagerApi>) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    pub(crate) fn client(&self) -> &dyn SecretsManagerApi {
        self.client.as_ref()
    }

    pub(crate) fn page_size(&self) -> i64 {
        self.page_size
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    pub async fn read_resource(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> ProviderResult<State> {
        match id.resource_type.as_str() {
            sm_secret::RESOURCE_TYPE => self.read_secret(id, identifier).await,
            sm_secret_group::RESOURCE_TYPE => self.read_secret_group(id, identifier).await,
            _ => Err(unsupported(id)),
        }
    }

    pub async fn create_resource(&self, resource: Resource) -> ProviderResult<State> {
        match resource.id.resource_type.as_str() {
            sm_secret::RESOURCE_TYPE => self.create_secret(resource).await,
            sm_secret_group::RESOURCE_TYPE => self.create_secret_group(resource).await,
            _ => Err(unsupported(&resource.id)),
        }
    }

    pub async fn update_resource(
        &self,
        id: ResourceId,
        identifier: &str,
        from: State,
        to: Resource,
    ) -> ProviderResult<State> {
        match id.resource_type.as_str() {
            sm_secret::RESOURCE_TYPE => self.update_secret(&id, identifier, &from, &to).await,
            sm_secret_group::RESOURCE_TYPE => {
                self.update_secret_group(&id, identifier, &from, &to).await
            }
            _ => Err(unsupported(&id)),
        }
    }

    pub async fn delete_resource(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        match id.resource_type.as_str() {
            sm_secret::RESOURCE_TYPE => self.delete_secret(id, identifier).await,
            sm_secret_group::RESOURCE_TYPE => self.delete_secret_group(id, identifier).await,
            _ => Err(unsupported(id)),
        }
    }

    pub async fn read_data(&self, resource: Resource) -> ProviderResult<State> {
        match resource.id.resource_type.as_str() {
            sm_secrets::RESOURCE_TYPE => self.read_secrets(&resource.id).await,
            sm_secret_groups::RESOURCE_TYPE => self.read_secret_groups(&resource.id).await,
            _ => Err(unsupported(&resource.id)),
        }
    }
}

// =============================================================================
// Error mapping
// =============================================================================

fn unsupported(id: &ResourceId) -> ProviderError {
    ProviderError::new(format!("Unsupported resource type: {}", id.resource_type))
        .for_resource(id.clone())
}

fn configuration_error(err: ConfigError) -> ProviderError {
    ProviderError::new(err.to_string())
        .with_kind(ProviderErrorKind::Configuration)
        .with_cause(err)
}

/// A failed remote call. Unknown secret variants keep their own kind.
pub(crate) fn remote_error(id: &ResourceId, err: ApiError) -> ProviderError {
    let kind = if err.is_unrecognized_subtype() {
        ProviderErrorKind::UnrecognizedSubtype
    } else {
        ProviderErrorKind::Remote
    };
    ProviderError::new(err.to_string())
        .with_kind(kind)
        .for_resource(id.clone())
        .with_cause(err)
}

pub(crate) fn convert_error(id: &ResourceId, err: ConvertError) -> ProviderError {
    ProviderError::new(err.to_string())
        .with_kind(ProviderErrorKind::InvalidAttribute)
        .for_resource(id.clone())
        .with_cause(err)
}

/// A converted value the schema refused to store
pub(crate) fn set_error(id: &ResourceId, err: TypeError) -> ProviderError {
    let message = match &err {
        TypeError::AttributeError { name, inner } => format!("Error setting {}: {}", name, inner),
        other => format!("Error setting {}: {}", other.attribute().unwrap_or("state"), other),
    };
    ProviderError::new(message)
        .with_kind(ProviderErrorKind::InvalidAttribute)
        .for_resource(id.clone())
        .with_cause(err)
}

/// Reject configuration that does not fit the schema
pub(crate) fn validate_config(
    id: &ResourceId,
    schema: &ResourceSchema,
    attributes: &HashMap<String, Value>,
) -> ProviderResult<()> {
    schema.validate(attributes).map_err(|errors| {
        let message = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        ProviderError::new(format!("Invalid configuration: {}", message))
            .with_kind(ProviderErrorKind::InvalidAttribute)
            .for_resource(id.clone())
    })
}

/// The identifier the service returned for a newly created entity
pub(crate) fn created_identifier(
    id: &ResourceId,
    operation: &str,
    identifier: Option<&str>,
) -> ProviderResult<String> {
    identifier.map(str::to_string).ok_or_else(|| {
        ProviderError::new(format!("{} returned no id", operation))
            .with_kind(ProviderErrorKind::Remote)
            .for_resource(id.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelError;
    use crate::testing::FakeSecretsManager;

    fn id() -> ResourceId {
        ResourceId::new("sm_secret", "cert")
    }

    #[test]
    fn remote_errors_keep_status_and_body() {
        let err = remote_error(
            &id(),
            ApiError::Status {
                operation: "GetSecret",
                status: 500,
                body: "boom".to_string(),
            },
        );
        assert_eq!(err.kind, ProviderErrorKind::Remote);
        assert_eq!(err.to_string(), "[sm_secret.cert] GetSecret failed: HTTP 500\nboom");
    }

    #[test]
    fn unknown_subtype_is_its_own_kind() {
        let err = remote_error(
            &id(),
            ApiError::model("GetSecret", ModelError::UnrecognizedSubtype("x".to_string())),
        );
        assert!(err.is_unrecognized_subtype());
    }

    #[test]
    fn set_errors_name_the_attribute() {
        let err = set_error(
            &id(),
            TypeError::AttributeError {
                name: "labels".to_string(),
                inner: Box::new(TypeError::TypeMismatch {
                    expected: "List<String>".to_string(),
                    got: "Int".to_string(),
                }),
            },
        );
        assert_eq!(err.kind, ProviderErrorKind::InvalidAttribute);
        assert_eq!(
            err.message,
            "Error setting labels: Type mismatch: expected List<String>, got Int"
        );
    }

    #[test]
    fn missing_configuration_is_a_configuration_error() {
        let err = IbmSmProvider::new(&ProviderConfig::default()).err().unwrap();
        assert_eq!(err.kind, ProviderErrorKind::Configuration);
    }

    #[tokio::test]
    async fn unknown_resource_types_are_rejected() {
        let provider = IbmSmProvider::with_client(Arc::new(FakeSecretsManager::new()));
        let err = provider
            .read_resource(&ResourceId::new("sm_vault", "x"), Some("id"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Unsupported resource type: sm_vault");

        let err = provider
            .read_resource(&ResourceId::new("sm_secrets", "all"), None)
            .await
            .unwrap_err();
        assert!(err.message.contains("sm_secrets"));
    }
}
