//! sm_secret_groups data source schema definition

use strongbox_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{
    CREATION_DATE_DESCRIPTION, LAST_UPDATE_DATE_DESCRIPTION, TOTAL_COUNT_DESCRIPTION,
    UUID_DESCRIPTION,
};

pub const RESOURCE_TYPE: &str = "sm_secret_groups";

/// Members of one `secret_groups` item
pub fn secret_group_item() -> AttributeType {
    types::block(vec![
        AttributeSchema::new("id", AttributeType::String)
            .computed()
            .with_description(UUID_DESCRIPTION),
        AttributeSchema::new("name", AttributeType::String)
            .computed()
            .with_description("The name of your secret group."),
        AttributeSchema::new("description", AttributeType::String)
            .computed()
            .with_description("An extended description of your secret group."),
        AttributeSchema::new("creation_date", AttributeType::String)
            .computed()
            .with_description(CREATION_DATE_DESCRIPTION),
        AttributeSchema::new("last_update_date", AttributeType::String)
            .computed()
            .with_description(LAST_UPDATE_DATE_DESCRIPTION),
    ])
}

pub fn schema() -> ResourceSchema {
    ResourceSchema::new(format!("{}{}", super::SCHEMA_PREFIX, RESOURCE_TYPE))
        .with_description("Lists the secret groups of the instance.")
        .attribute(
            AttributeSchema::new("secret_groups", secret_group_item())
                .computed()
                .with_description("A collection of secret groups."),
        )
        .attribute(
            AttributeSchema::new("total_count", AttributeType::Int)
                .computed()
                .with_description(TOTAL_COUNT_DESCRIPTION),
        )
}
