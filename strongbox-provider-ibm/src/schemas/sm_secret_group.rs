//! sm_secret_group schema definition

use strongbox_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{CREATION_DATE_DESCRIPTION, LAST_UPDATE_DATE_DESCRIPTION};

pub const RESOURCE_TYPE: &str = "sm_secret_group";

pub fn schema() -> ResourceSchema {
    ResourceSchema::new(format!("{}{}", super::SCHEMA_PREFIX, RESOURCE_TYPE))
        .with_description("Creates and manages a secret group.")
        .attribute(
            AttributeSchema::new("name", types::secret_group_name())
                .required()
                .with_description(
                    "The name of your secret group. To protect your privacy, do not use personal data, such as your name or location, as a name for your secret group.",
                ),
        )
        .attribute(
            AttributeSchema::new("description", AttributeType::String)
                .optional()
                .with_description(
                    "An extended description of your secret group. To protect your privacy, do not use personal data, such as your name or location, as a description for your secret group.",
                ),
        )
        .attribute(
            AttributeSchema::new("creation_date", AttributeType::String)
                .computed()
                .with_description(CREATION_DATE_DESCRIPTION),
        )
        .attribute(
            AttributeSchema::new("last_update_date", AttributeType::String)
                .computed()
                .with_description(LAST_UPDATE_DATE_DESCRIPTION),
        )
}
