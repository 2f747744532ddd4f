//! sm_secret schema definition
//!
//! A secret is created from its `secret_prototype` block and never updated in
//! place; the remaining attributes are read back from the service.

use strongbox_core::resource::Value;
use strongbox_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::{MAX_LABELS, UUID_DESCRIPTION, secret_metadata_attributes};

pub const RESOURCE_TYPE: &str = "sm_secret";

/// `secret_prototype` block members
fn prototype_type() -> AttributeType {
    types::block(vec![
        AttributeSchema::new("type", AttributeType::String)
            .optional()
            .with_description(
                "Secret type. Supported types are Imported Certificate, Public Certificate.",
            ),
        AttributeSchema::new("name", AttributeType::String)
            .optional()
            .with_description("A human-readable name to assign to your secret."),
        AttributeSchema::new("description", AttributeType::String)
            .optional()
            .with_description("An extended description of your secret."),
        AttributeSchema::new("secret_group_id", AttributeType::String)
            .optional()
            .computed()
            .with_description(UUID_DESCRIPTION),
        AttributeSchema::new("labels", types::string_list())
            .optional()
            .with_max_items(MAX_LABELS)
            .with_description(
                "Labels that you can use to filter for secrets in your instance. Up to 30 labels can be created.",
            ),
        AttributeSchema::new("certificate", AttributeType::String)
            .optional()
            .with_description("The PEM encoded contents of your certificate."),
        AttributeSchema::new("intermediate", AttributeType::String)
            .optional()
            .with_description(
                "(Optional) The PEM encoded intermediate certificate to associate with the root certificate.",
            ),
        AttributeSchema::new("private_key", AttributeType::String)
            .optional()
            .with_description(
                "(Optional) The PEM encoded private key to associate with the certificate.",
            ),
        AttributeSchema::new("bundle_certs", AttributeType::Bool)
            .optional()
            .with_default(Value::Bool(true))
            .with_description(
                "Determines whether your issued certificate is bundled with intermediate certificates. Set to `false` for the certificate file to contain only the issued certificate.",
            ),
    ])
}

pub fn schema() -> ResourceSchema {
    let mut schema = ResourceSchema::new(format!("{}{}", super::SCHEMA_PREFIX, RESOURCE_TYPE))
        .with_description("Creates and manages an imported or public certificate secret.")
        .attribute(
            AttributeSchema::new("secret_prototype", prototype_type())
                .required()
                .force_new()
                .with_max_items(1)
                .with_description("Specify the properties for your secret."),
        );

    for attr in secret_metadata_attributes() {
        schema = schema.attribute(attr.force_new());
    }

    schema
        .attribute(
            AttributeSchema::new("certificate", AttributeType::String)
                .computed()
                .force_new()
                .with_description("The PEM encoded contents of your certificate."),
        )
        .attribute(
            AttributeSchema::new("intermediate", AttributeType::String)
                .computed()
                .force_new()
                .with_description(
                    "(Optional) The PEM encoded intermediate certificate to associate with the root certificate.",
                ),
        )
        .attribute(
            AttributeSchema::new("private_key", AttributeType::String)
                .computed()
                .force_new()
                .with_description(
                    "(Optional) The PEM encoded private key to associate with the certificate.",
                ),
        )
}
