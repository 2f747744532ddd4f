//! sm_secret_group lifecycle

use strongbox_core::provider::{ProviderError, ProviderErrorKind, ProviderResult};
use strongbox_core::resource::{Resource, ResourceId, State};
use strongbox_core::schema::StateBuilder;

use crate::convert::{group_patch, group_prototype_from_attributes, secret_group_to_map};
use crate::provider::{
    IbmSmProvider, convert_error, created_identifier, remote_error, set_error, validate_config,
};
use crate::schemas::sm_secret_group;

impl IbmSmProvider {
    pub(crate) async fn create_secret_group(&self, resource: Resource) -> ProviderResult<State> {
        let schema = sm_secret_group::schema();
        validate_config(&resource.id, &schema, &resource.attributes)?;

        let prototype = group_prototype_from_attributes(&resource.attributes)
            .map_err(|e| convert_error(&resource.id, e))?;

        log::info!("Creating secret group '{}' for {}", prototype.name, resource.id);
        let group = self
            .client()
            .create_secret_group(&prototype)
            .await
            .map_err(|e| remote_error(&resource.id, e))?;
        let identifier = created_identifier(&resource.id, "CreateSecretGroup", group.id.as_deref())?;

        let state = self.read_secret_group(&resource.id, Some(&identifier)).await?;
        if !state.exists {
            return Err(ProviderError::new(format!(
                "Secret group {} was created but could not be read back",
                identifier
            ))
            .with_kind(ProviderErrorKind::Remote)
            .for_resource(resource.id));
        }
        Ok(state)
    }

    pub(crate) async fn read_secret_group(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> ProviderResult<State> {
        let Some(identifier) = identifier else {
            return Ok(State::not_found(id.clone()));
        };

        let group = match self.client().get_secret_group(identifier).await {
            Ok(group) => group,
            Err(e) if e.is_not_found() => {
                log::debug!("Secret group {} no longer exists, clearing {}", identifier, id);
                return Ok(State::not_found(id.clone()));
            }
            Err(e) => return Err(remote_error(id, e)),
        };

        let schema = sm_secret_group::schema();
        let mut builder = StateBuilder::new(&schema);
        builder
            .merge(secret_group_to_map(&group))
            .map_err(|e| set_error(id, e))?;

        Ok(State::existing(id.clone(), builder.build()).with_identifier(identifier))
    }

    /// Name and description change in place
    pub(crate) async fn update_secret_group(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let schema = sm_secret_group::schema();
        validate_config(id, &schema, &to.attributes)?;

        let patch = group_patch(&from.attributes, &to.attributes).map_err(|e| convert_error(id, e))?;
        if patch.is_empty() {
            log::debug!("No changes for secret group {}", identifier);
        } else {
            log::info!("Updating secret group {} for {}", identifier, id);
            self.client()
                .update_secret_group(identifier, &patch)
                .await
                .map_err(|e| remote_error(id, e))?;
        }

        self.read_secret_group(id, Some(identifier)).await
    }

    pub(crate) async fn delete_secret_group(
        &self,
        id: &ResourceId,
        identifier: &str,
    ) -> ProviderResult<()> {
        log::info!("Deleting secret group {} for {}", identifier, id);
        self.client()
            .delete_secret_group(identifier)
            .await
            .map_err(|e| remote_error(id, e))
    }
}
