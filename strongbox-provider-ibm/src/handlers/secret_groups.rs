//! sm_secret_groups data source

use strongbox_core::provider::{ProviderError, ProviderResult};
use strongbox_core::resource::{ResourceId, State, Value};
use strongbox_core::schema::{StateBuilder, project_object};

use crate::convert::secret_group_to_map;
use crate::provider::{IbmSmProvider, remote_error, set_error};
use crate::schemas::sm_secret_groups;
use crate::utils::data_source_id;

impl IbmSmProvider {
    /// One bounded call; the collection is not paged
    pub(crate) async fn read_secret_groups(&self, id: &ResourceId) -> ProviderResult<State> {
        let collection = self
            .client()
            .list_secret_groups()
            .await
            .map_err(|e| remote_error(id, e))?;

        let schema = sm_secret_groups::schema();
        let members = schema
            .get("secret_groups")
            .and_then(|a| a.attr_type.object_schema())
            .ok_or_else(|| ProviderError::new("secret_groups item schema missing"))?;

        let items = collection
            .secret_groups
            .iter()
            .map(|group| project_object(members, secret_group_to_map(group)).map(Value::Map))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| set_error(id, e))?;
        let total_count = collection.total_count.unwrap_or(items.len() as i64);

        let mut builder = StateBuilder::new(&schema);
        builder
            .set("secret_groups", Value::List(items))
            .map_err(|e| set_error(id, e))?;
        builder
            .set("total_count", Value::Int(total_count))
            .map_err(|e| set_error(id, e))?;

        Ok(State::existing(id.clone(), builder.build()).with_identifier(data_source_id()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::FakeSecretsManager;
    use strongbox_core::provider::ProviderErrorKind;
    use strongbox_core::resource::Resource;

    fn id() -> ResourceId {
        ResourceId::new("sm_secret_groups", "all")
    }

    #[tokio::test]
    async fn created_group_is_listed() {
        let fake = Arc::new(FakeSecretsManager::new());
        let provider = IbmSmProvider::with_client(fake.clone());

        provider
            .create_secret_group(
                Resource::new("sm_secret_group", "g")
                    .with_attribute("name", Value::String("tf_name_42".to_string())),
            )
            .await
            .unwrap();

        let state = provider.read_secret_groups(&id()).await.unwrap();
        assert!(state.identifier.is_some());
        assert_eq!(state.get("total_count"), Some(&Value::Int(1)));

        let groups = state.get("secret_groups").and_then(Value::as_list).unwrap();
        assert_eq!(groups.len(), 1);
        let group = groups[0].as_map().unwrap();
        assert_eq!(group.get("name"), Some(&Value::String("tf_name_42".to_string())));

        let group_id = group.get("id").and_then(Value::as_str).unwrap();
        let uuid = uuid::Uuid::parse_str(group_id).unwrap();
        assert_eq!(uuid.get_version_num(), 4);
    }

    #[tokio::test]
    async fn lists_every_group() {
        let fake = Arc::new(FakeSecretsManager::new());
        for i in 0..4 {
            fake.insert_group(&format!("group-{}", i));
        }
        let provider = IbmSmProvider::with_client(fake);

        let state = provider.read_secret_groups(&id()).await.unwrap();
        assert_eq!(state.get("total_count"), Some(&Value::Int(4)));
        assert_eq!(state.get("secret_groups").and_then(Value::as_list).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn list_failure_is_remote_error() {
        let fake = Arc::new(FakeSecretsManager::new());
        fake.fail_with(401);
        let provider = IbmSmProvider::with_client(fake);
        let err = provider.read_secret_groups(&id()).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::Remote);
    }
}
