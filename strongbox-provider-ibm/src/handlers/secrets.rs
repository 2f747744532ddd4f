//! sm_secrets data source

use strongbox_core::provider::{ProviderError, ProviderResult};
use strongbox_core::resource::{ResourceId, State, Value};
use strongbox_core::schema::{StateBuilder, project_object};

use crate::client::{ListSecretsOptions, SecretsPager};
use crate::convert::secret_to_map;
use crate::provider::{IbmSmProvider, remote_error, set_error};
use crate::schemas::sm_secrets;
use crate::utils::data_source_id;

impl IbmSmProvider {
    /// Walk every page of secret metadata
    pub(crate) async fn read_secrets(&self, id: &ResourceId) -> ProviderResult<State> {
        let options = ListSecretsOptions::default().with_limit(self.page_size());
        let mut pager = SecretsPager::new(self.client(), options);
        let secrets = pager.all().await.map_err(|e| remote_error(id, e))?;

        let schema = sm_secrets::schema();
        let members = schema
            .get("secrets")
            .and_then(|a| a.attr_type.object_schema())
            .ok_or_else(|| ProviderError::new("secrets item schema missing"))?;

        let items = secrets
            .iter()
            .map(|secret| project_object(members, secret_to_map(secret)).map(Value::Map))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| set_error(id, e))?;
        let total_count = items.len() as i64;

        let mut builder = StateBuilder::new(&schema);
        builder
            .set("secrets", Value::List(items))
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

    fn id() -> ResourceId {
        ResourceId::new("sm_secrets", "all")
    }

    #[tokio::test]
    async fn collects_every_page() {
        let fake = Arc::new(FakeSecretsManager::new());
        for i in 0..5 {
            fake.insert_public_certificate(&format!("cert-{}", i));
        }
        let provider = IbmSmProvider::with_client(fake.clone()).with_page_size(2);

        let state = provider.read_secrets(&id()).await.unwrap();
        assert_eq!(state.get("total_count"), Some(&Value::Int(5)));
        let items = state.get("secrets").and_then(Value::as_list).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(fake.list_calls(), 3);

        let first = items[0].as_map().unwrap();
        assert_eq!(first.get("name"), Some(&Value::String("cert-0".to_string())));
        assert_eq!(first.get("bundle_certs"), Some(&Value::Bool(true)));
        assert!(first.get("id").is_some());
        let rotation = first.get("rotation").and_then(Value::first_block).unwrap();
        assert_eq!(rotation.get("auto_rotate"), Some(&Value::Bool(false)));
    }

    #[tokio::test]
    async fn payload_is_not_listed() {
        let fake = Arc::new(FakeSecretsManager::new());
        fake.insert_raw_secret(serde_json::json!({
            "type": "imported_cert",
            "name": "imported",
            "certificate": "-----BEGIN CERTIFICATE-----",
            "intermediate_included": false
        }));
        let provider = IbmSmProvider::with_client(fake);

        let state = provider.read_secrets(&id()).await.unwrap();
        let items = state.get("secrets").and_then(Value::as_list).unwrap();
        let item = items[0].as_map().unwrap();
        assert_eq!(item.get("intermediate_included"), Some(&Value::Bool(false)));
        assert!(item.get("certificate").is_none());
    }

    #[tokio::test]
    async fn empty_instance_lists_nothing() {
        let provider = IbmSmProvider::with_client(Arc::new(FakeSecretsManager::new()));
        let state = provider.read_secrets(&id()).await.unwrap();
        assert_eq!(state.get("total_count"), Some(&Value::Int(0)));
        assert_eq!(state.get("secrets"), Some(&Value::List(vec![])));
    }

    #[tokio::test]
    async fn unknown_item_type_fails_the_read() {
        let fake = Arc::new(FakeSecretsManager::new());
        fake.insert_public_certificate("ok");
        fake.insert_raw_secret(serde_json::json!({"type": "quantum_key"}));
        let provider = IbmSmProvider::with_client(fake);

        let err = provider.read_secrets(&id()).await.unwrap_err();
        assert!(err.is_unrecognized_subtype());
    }
}
