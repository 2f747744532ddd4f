//! sm_secrets data source schema definition

use strongbox_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{TOTAL_COUNT_DESCRIPTION, UUID_DESCRIPTION, rotation_type, secret_metadata_attributes};

pub const RESOURCE_TYPE: &str = "sm_secrets";

/// Members of one `secrets` item: metadata only, never payload
pub fn secret_item() -> AttributeType {
    let mut attributes = vec![
        AttributeSchema::new("id", AttributeType::String)
            .computed()
            .with_description(UUID_DESCRIPTION),
        AttributeSchema::new("version_id", AttributeType::String)
            .computed()
            .with_description(UUID_DESCRIPTION),
        AttributeSchema::new("rotation", rotation_type())
            .computed()
            .with_description(
                "Determines whether Secrets Manager rotates your secrets automatically.",
            ),
    ];
    attributes.extend(secret_metadata_attributes());
    types::block(attributes)
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new(format!("{}{}", super::SCHEMA_PREFIX, RESOURCE_TYPE))
        .with_description("Lists the metadata of every secret in the instance.")
        .attribute(
            AttributeSchema::new("secrets", secret_item())
                .computed()
                .with_description("A collection of secrets metadata."),
        )
        .attribute(
            AttributeSchema::new("total_count", AttributeType::Int)
                .computed()
                .with_description(TOTAL_COUNT_DESCRIPTION),
        )
}
