//! Secrets Manager resource and data source schemas

pub mod sm_secret;
pub mod sm_secret_group;
pub mod sm_secret_groups;
pub mod sm_secrets;

use strongbox_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

/// Schema type names are namespaced by the provider
pub const SCHEMA_PREFIX: &str = "ibm.";

/// Most labels a secret may carry
pub const MAX_LABELS: usize = 30;

pub(crate) const UUID_DESCRIPTION: &str = "A v4 UUID identifier.";
pub(crate) const CREATION_DATE_DESCRIPTION: &str =
    "The date a resource was created. The date format follows RFC 3339.";
pub(crate) const LAST_UPDATE_DATE_DESCRIPTION: &str =
    "The date a resource was recently modified. The date format follows RFC 3339.";
pub(crate) const TOTAL_COUNT_DESCRIPTION: &str = "The total number of resources in a collection.";

/// Returns all schemas of this provider
pub fn all_schemas() -> Vec<ResourceSchema> {
    vec![
        sm_secret::schema(),
        sm_secret_group::schema(),
        sm_secrets::schema(),
        sm_secret_groups::schema(),
    ]
}

/// Look up a schema by resource type name (e.g., "sm_secret")
pub fn get_schema(resource_type: &str) -> Option<ResourceSchema> {
    all_schemas().into_iter().find(|s| {
        s.resource_type
            .strip_prefix(SCHEMA_PREFIX)
            .is_some_and(|t| t == resource_type)
    })
}

/// Secret metadata shared by the secret resource and the secrets data source items
///
/// Every attribute is computed; callers adjust flags where a resource needs to.
pub(crate) fn secret_metadata_attributes() -> Vec<AttributeSchema> {
    vec![
        AttributeSchema::new("type", AttributeType::String)
            .computed()
            .with_description(
                "Secret type. Supported types are Imported Certificate, Public Certificate.",
            ),
        AttributeSchema::new("name", AttributeType::String)
            .computed()
            .with_description(
                "A human-readable name to assign to your secret. To protect your privacy, do not use personal data, such as your name or location, as a name for your secret.",
            ),
        AttributeSchema::new("description", AttributeType::String)
            .computed()
            .with_description("An extended description of your secret."),
        AttributeSchema::new("secret_group_id", AttributeType::String)
            .computed()
            .with_description(UUID_DESCRIPTION),
        AttributeSchema::new("labels", types::string_list())
            .computed()
            .with_description(
                "Labels that you can use to filter for secrets in your instance. Up to 30 labels can be created.",
            ),
        AttributeSchema::new("created_by", AttributeType::String)
            .computed()
            .with_description("The unique identifier for the entity that created the secret."),
        AttributeSchema::new("creation_date", AttributeType::String)
            .computed()
            .with_description(CREATION_DATE_DESCRIPTION),
        AttributeSchema::new("last_update_date", AttributeType::String)
            .computed()
            .with_description(LAST_UPDATE_DATE_DESCRIPTION),
        AttributeSchema::new("versions_total", AttributeType::Int)
            .computed()
            .with_description("The number of versions the secret has."),
        AttributeSchema::new("expiration_date", AttributeType::String)
            .computed()
            .with_description("The date a secret is expired. The date format follows RFC 3339."),
        AttributeSchema::new("intermediate_included", AttributeType::Bool)
            .computed()
            .with_description(
                "Indicates whether the certificate was imported with an associated intermediate certificate.",
            ),
        AttributeSchema::new("private_key_included", AttributeType::Bool)
            .computed()
            .with_description(
                "Indicates whether the certificate was imported with an associated private key.",
            ),
        AttributeSchema::new("serial_number", AttributeType::String)
            .computed()
            .with_description(
                "The unique serial number that was assigned to a certificate by the issuing certificate authority.",
            ),
        AttributeSchema::new("algorithm", AttributeType::String)
            .computed()
            .with_description(
                "The identifier for the cryptographic algorithm that was used by the issuing certificate authority to sign a certificate.",
            ),
        AttributeSchema::new("key_algorithm", AttributeType::String)
            .computed()
            .with_description(
                "The identifier for the cryptographic algorithm that was used to generate the public and private keys that are associated with the certificate.",
            ),
        AttributeSchema::new("issuer", AttributeType::String)
            .computed()
            .with_description(
                "The distinguished name that identifies the entity that signed and issued the certificate.",
            ),
        AttributeSchema::new("validity", validity_type())
            .computed()
            .with_description(
                "The date and time that the certificate validity period begins and ends.",
            ),
        AttributeSchema::new("bundle_certs", AttributeType::Bool)
            .computed()
            .with_description(
                "Determines whether your issued certificate is bundled with intermediate certificates. Set to `false` for the certificate file to contain only the issued certificate.",
            ),
    ]
}

/// `validity` block: `[{ not_before, not_after }]`
pub fn validity_type() -> AttributeType {
    types::block(vec![
        AttributeSchema::new("not_before", AttributeType::String)
            .computed()
            .with_description("Date time format follows RFC 3339."),
        AttributeSchema::new("not_after", AttributeType::String)
            .computed()
            .with_description("Date time format follows RFC 3339."),
    ])
}

/// `rotation` block: `[{ auto_rotate, rotate_keys }]`
pub fn rotation_type() -> AttributeType {
    types::block(vec![
        AttributeSchema::new("auto_rotate", AttributeType::Bool)
            .computed()
            .with_description(
                "Determines whether Secrets Manager rotates your public certificate automatically. Default is `false`.",
            ),
        AttributeSchema::new("rotate_keys", AttributeType::Bool)
            .computed()
            .with_description(
                "Determines whether Secrets Manager rotates the private key for your public certificate automatically. Default is `false`.",
            ),
    ])
}
