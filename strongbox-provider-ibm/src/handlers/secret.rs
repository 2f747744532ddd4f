//! sm_secret lifecycle

use strongbox_core::provider::{ProviderError, ProviderErrorKind, ProviderResult};
use strongbox_core::resource::{Resource, ResourceId, State, Value};
use strongbox_core::schema::StateBuilder;

use crate::convert::{prototype_from_attributes, prototype_to_map, secret_to_map};
use crate::provider::{
    IbmSmProvider, convert_error, created_identifier, remote_error, set_error, validate_config,
};
use crate::schemas::sm_secret;

impl IbmSmProvider {
    pub(crate) async fn create_secret(&self, resource: Resource) -> ProviderResult<State> {
        let schema = sm_secret::schema();
        validate_config(&resource.id, &schema, &resource.attributes)?;

        let mut attributes = resource.attributes;
        schema.apply_defaults(&mut attributes);
        let prototype =
            prototype_from_attributes(&attributes).map_err(|e| convert_error(&resource.id, e))?;

        log::info!(
            "Creating {} secret '{}' for {}",
            prototype.secret_type(),
            prototype.name(),
            resource.id
        );
        let secret = self
            .client()
            .create_secret(&prototype)
            .await
            .map_err(|e| remote_error(&resource.id, e))?;
        let identifier = created_identifier(&resource.id, "CreateSecret", secret.id())?;

        let state = self.read_secret(&resource.id, Some(&identifier)).await?;
        if !state.exists {
            return Err(ProviderError::new(format!(
                "Secret {} was created but could not be read back",
                identifier
            ))
            .with_kind(ProviderErrorKind::Remote)
            .for_resource(resource.id));
        }
        Ok(state)
    }

    pub(crate) async fn read_secret(
        &self,
        id: &ResourceId,
        identifier: Option<&str>,
    ) -> ProviderResult<State> {
        let Some(identifier) = identifier else {
            return Ok(State::not_found(id.clone()));
        };

        let secret = match self.client().get_secret(identifier).await {
            Ok(secret) => secret,
            Err(e) if e.is_not_found() => {
                log::debug!("Secret {} no longer exists, clearing {}", identifier, id);
                return Ok(State::not_found(id.clone()));
            }
            Err(e) => return Err(remote_error(id, e)),
        };

        let schema = sm_secret::schema();
        let mut builder = StateBuilder::new(&schema);
        builder
            .merge(secret_to_map(&secret))
            .map_err(|e| set_error(id, e))?;
        builder
            .set("secret_prototype", Value::block(prototype_to_map(&secret)))
            .map_err(|e| set_error(id, e))?;

        Ok(State::existing(id.clone(), builder.build()).with_identifier(identifier))
    }

    /// Secrets cannot change in place: any difference requires replacement
    pub(crate) async fn update_secret(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let schema = sm_secret::schema();
        validate_config(id, &schema, &to.attributes)?;

        let changed = schema.replacement_attributes(&from.attributes, &to.attributes);
        if !changed.is_empty() {
            return Err(ProviderError::new(format!(
                "Cannot update {} in place; the secret must be replaced",
                changed.join(", ")
            ))
            .with_kind(ProviderErrorKind::RequiresReplacement)
            .for_resource(id.clone()));
        }

        self.read_secret(id, Some(identifier)).await
    }

    pub(crate) async fn delete_secret(&self, id: &ResourceId, identifier: &str) -> ProviderResult<()> {
        log::info!("Deleting secret {} for {}", identifier, id);
        self.client()
            .delete_secret(identifier)
            .await
            .map_err(|e| remote_error(id, e))
    }
}
