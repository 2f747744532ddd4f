//! Strongbox IBM Cloud Secrets Manager Provider
//!
//! Resources and data sources for secret groups and secrets.
//!
//! ## Module Structure
//!
//! - `client` - REST client, authentication and pagination
//! - `models` - Request and response types of the service
//! - `convert` - Attribute map <-> model conversion
//! - `schemas` - Resource and data source schemas
//! - `resources` - Resource type definitions
//! - `provider` - IbmSmProvider implementation
//! - `handlers` - Lifecycle handlers per resource type

pub mod client;
pub mod config;
pub mod convert;
mod handlers;
pub mod models;
pub mod provider;
pub mod resources;
pub mod schemas;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types
pub use config::ProviderConfig;
pub use provider::IbmSmProvider;

use strongbox_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use strongbox_core::resource::{Resource, ResourceId, State};

use resources::resource_types;

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for IbmSmProvider {
    fn name(&self) -> &'static str {
        "ibm"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn read(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.map(|s| s.to_string());
        Box::pin(async move { self.read_resource(&id, identifier.as_deref()).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(id, &identifier, from, to).await })
    }

    fn delete(&self, id: &ResourceId, identifier: &str) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        Box::pin(async move { self.delete_resource(&id, &identifier).await })
    }

    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.read_data(resource).await })
    }
}
