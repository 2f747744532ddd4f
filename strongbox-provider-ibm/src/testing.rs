//! In-memory Secrets Manager used by unit tests

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value as JsonValue, json};

use crate::client::{ApiError, ApiResult, ListSecretsOptions, SecretsManagerApi};
use crate::models::{
    PageLink, Secret, SecretGroup, SecretGroupCollection, SecretGroupPatch, SecretGroupPrototype,
    SecretMetadataPage, SecretPrototype,
};

const DEFAULT_LIMIT: i64 = 200;

#[derive(Default)]
struct Store {
    groups: Vec<SecretGroup>,
    secrets: Vec<JsonValue>,
    list_calls: usize,
    failure: Option<u16>,
    wrap_next_links: bool,
}

#[derive(Default)]
pub struct FakeSecretsManager {
    store: Mutex<Store>,
}

fn not_found(operation: &'static str, what: &str, id: &str) -> ApiError {
    ApiError::Status {
        operation,
        status: 404,
        body: format!("{} {} not found", what, id),
    }
}

impl FakeSecretsManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent call fails with `status`
    pub fn fail_with(&self, status: u16) {
        self.store.lock().unwrap().failure = Some(status);
    }

    /// The last page's `next` link points back to the first page
    pub fn wrap_next_links(&self) {
        self.store.lock().unwrap().wrap_next_links = true;
    }

    pub fn list_calls(&self) -> usize {
        self.store.lock().unwrap().list_calls
    }

    pub fn secret_count(&self) -> usize {
        self.store.lock().unwrap().secrets.len()
    }

    pub fn group_count(&self) -> usize {
        self.store.lock().unwrap().groups.len()
    }

    /// Store a secret exactly as the service would return it
    pub fn insert_raw_secret(&self, mut secret: JsonValue) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        if let Some(object) = secret.as_object_mut() {
            object.entry("id").or_insert_with(|| json!(id));
        }
        let id = secret["id"].as_str().unwrap().to_string();
        self.store.lock().unwrap().secrets.push(secret);
        id
    }

    pub fn insert_public_certificate(&self, name: &str) -> String {
        self.insert_raw_secret(json!({
            "type": "public_cert",
            "name": name,
            "bundle_certs": true,
            "rotation": {"auto_rotate": false, "rotate_keys": false},
            "created_by": "iam-ServiceId-test",
            "creation_date": "2022-11-03T10:00:00Z",
            "versions_total": 1
        }))
    }

    pub fn insert_group(&self, name: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.store.lock().unwrap().groups.push(SecretGroup {
            id: Some(id.clone()),
            name: Some(name.to_string()),
            description: None,
            creation_date: Some(Utc::now()),
            last_update_date: Some(Utc::now()),
        });
        id
    }

    fn check_failure(&self, operation: &'static str) -> ApiResult<()> {
        match self.store.lock().unwrap().failure {
            Some(status) => Err(ApiError::Status {
                operation,
                status,
                body: "injected failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn decode(operation: &'static str, value: JsonValue) -> ApiResult<Secret> {
    Secret::from_value(value).map_err(|source| ApiError::model(operation, source))
}

fn page_link(offset: i64, limit: i64) -> PageLink {
    PageLink {
        href: format!(
            "https://fake.secrets-manager.test/api/v2/secrets?limit={}&offset={}",
            limit, offset
        ),
    }
}

#[async_trait]
impl SecretsManagerApi for FakeSecretsManager {
    async fn list_secret_groups(&self) -> ApiResult<SecretGroupCollection> {
        self.check_failure("ListSecretGroups")?;
        let store = self.store.lock().unwrap();
        Ok(SecretGroupCollection {
            secret_groups: store.groups.clone(),
            total_count: Some(store.groups.len() as i64),
        })
    }

    async fn get_secret_group(&self, id: &str) -> ApiResult<SecretGroup> {
        self.check_failure("GetSecretGroup")?;
        let store = self.store.lock().unwrap();
        store
            .groups
            .iter()
            .find(|g| g.id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| not_found("GetSecretGroup", "Secret group", id))
    }

    async fn create_secret_group(
        &self,
        prototype: &SecretGroupPrototype,
    ) -> ApiResult<SecretGroup> {
        self.check_failure("CreateSecretGroup")?;
        let now = Utc::now();
        let group = SecretGroup {
            id: Some(uuid::Uuid::new_v4().to_string()),
            name: Some(prototype.name.clone()),
            description: prototype.description.clone(),
            creation_date: Some(now),
            last_update_date: Some(now),
        };
        self.store.lock().unwrap().groups.push(group.clone());
        Ok(group)
    }

    async fn update_secret_group(
        &self,
        id: &str,
        patch: &SecretGroupPatch,
    ) -> ApiResult<SecretGroup> {
        self.check_failure("UpdateSecretGroup")?;
        let mut store = self.store.lock().unwrap();
        let group = store
            .groups
            .iter_mut()
            .find(|g| g.id.as_deref() == Some(id))
            .ok_or_else(|| not_found("UpdateSecretGroup", "Secret group", id))?;
        if let Some(name) = &patch.name {
            group.name = Some(name.clone());
        }
        if let Some(description) = &patch.description {
            group.description = Some(description.clone());
        }
        group.last_update_date = Some(Utc::now());
        Ok(group.clone())
    }

    async fn delete_secret_group(&self, id: &str) -> ApiResult<()> {
        self.check_failure("DeleteSecretGroup")?;
        let mut store = self.store.lock().unwrap();
        let before = store.groups.len();
        store.groups.retain(|g| g.id.as_deref() != Some(id));
        if store.groups.len() == before {
            return Err(not_found("DeleteSecretGroup", "Secret group", id));
        }
        Ok(())
    }

    async fn list_secrets(&self, options: &ListSecretsOptions) -> ApiResult<SecretMetadataPage> {
        self.check_failure("ListSecrets")?;
        let (items, total, wrap) = {
            let mut store = self.store.lock().unwrap();
            store.list_calls += 1;
            let offset = options.offset.unwrap_or(0).max(0) as usize;
            let limit = options.limit.unwrap_or(DEFAULT_LIMIT).max(1) as usize;
            let items: Vec<JsonValue> = store
                .secrets
                .iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect();
            (items, store.secrets.len() as i64, store.wrap_next_links)
        };

        let offset = options.offset.unwrap_or(0);
        let limit = options.limit.unwrap_or(DEFAULT_LIMIT);
        let secrets = items
            .into_iter()
            .map(|v| decode("ListSecrets", v))
            .collect::<ApiResult<Vec<_>>>()?;

        Ok(SecretMetadataPage {
            secrets,
            total_count: Some(total),
            limit: Some(limit),
            offset: Some(offset),
            first: Some(page_link(0, limit)),
            previous: (offset > 0).then(|| page_link((offset - limit).max(0), limit)),
            next: if offset + limit < total {
                Some(page_link(offset + limit, limit))
            } else {
                (wrap && total > 0).then(|| page_link(0, limit))
            },
            last: Some(page_link(((total - 1).max(0) / limit) * limit, limit)),
        })
    }

    async fn get_secret(&self, id: &str) -> ApiResult<Secret> {
        self.check_failure("GetSecret")?;
        let found = {
            let store = self.store.lock().unwrap();
            store
                .secrets
                .iter()
                .find(|s| s["id"].as_str() == Some(id))
                .cloned()
        };
        match found {
            Some(value) => decode("GetSecret", value),
            None => Err(not_found("GetSecret", "Secret", id)),
        }
    }

    async fn create_secret(&self, prototype: &SecretPrototype) -> ApiResult<Secret> {
        self.check_failure("CreateSecret")?;
        let mut value = serde_json::to_value(prototype).unwrap();
        let now = Utc::now().to_rfc3339();
        let object = value.as_object_mut().unwrap();
        object.insert("id".into(), json!(uuid::Uuid::new_v4().to_string()));
        object.insert("created_by".into(), json!("iam-ServiceId-test"));
        object.insert("creation_date".into(), json!(now));
        object.insert("last_update_date".into(), json!(now));
        object.insert("versions_total".into(), json!(1));
        object
            .entry("secret_group_id")
            .or_insert_with(|| json!("default"));
        if let SecretPrototype::ImportedCertificate(cert) = prototype {
            object.insert(
                "intermediate_included".into(),
                json!(cert.intermediate.is_some()),
            );
            object.insert(
                "private_key_included".into(),
                json!(cert.private_key.is_some()),
            );
            object.insert("serial_number".into(), json!("01:02:03"));
            object.insert(
                "validity".into(),
                json!({"not_before": "2022-11-03T00:00:00Z", "not_after": "2023-11-03T00:00:00Z"}),
            );
        }
        if let SecretPrototype::PublicCertificate(_) = prototype {
            object.insert(
                "rotation".into(),
                json!({"auto_rotate": false, "rotate_keys": false}),
            );
        }

        self.store.lock().unwrap().secrets.push(value.clone());
        decode("CreateSecret", value)
    }

    async fn delete_secret(&self, id: &str) -> ApiResult<()> {
        self.check_failure("DeleteSecret")?;
        let mut store = self.store.lock().unwrap();
        let before = store.secrets.len();
        store.secrets.retain(|s| s["id"].as_str() != Some(id));
        if store.secrets.len() == before {
            return Err(not_found("DeleteSecret", "Secret", id));
        }
        Ok(())
    }
}
