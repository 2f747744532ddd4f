//! Resource type and data source definitions

use strongbox_core::provider::ResourceType;
use strongbox_core::schema::ResourceSchema;

use crate::schemas::{sm_secret, sm_secret_group, sm_secret_groups, sm_secrets};

macro_rules! define_resource_type {
    ($name:ident, $module:ident) => {
        define_resource_type!($name, $module, false);
    };
    ($name:ident, $module:ident, $data_source:expr) => {
        pub struct $name;
        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $module::RESOURCE_TYPE
            }
            fn schema(&self) -> ResourceSchema {
                $module::schema()
            }
            fn is_data_source(&self) -> bool {
                $data_source
            }
        }
    };
}

define_resource_type!(SecretResourceType, sm_secret);
define_resource_type!(SecretGroupResourceType, sm_secret_group);
define_resource_type!(SecretsDataSource, sm_secrets, true);
define_resource_type!(SecretGroupsDataSource, sm_secret_groups, true);

/// Returns all resource types and data sources supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![
        Box::new(SecretResourceType),
        Box::new(SecretGroupResourceType),
        Box::new(SecretsDataSource),
        Box::new(SecretGroupsDataSource),
    ]
}

/// Find a resource type or data source by name
pub fn resource_type(name: &str) -> Option<Box<dyn ResourceType>> {
    resource_types().into_iter().find(|t| t.name() == name)
}
