//! Lifecycle handlers, one module per resource type or data source
//!
//! Each handler validates configuration against its schema, makes one remote
//! call, and converts the response into state. Create and update finish with
//! a read so computed attributes are populated.

mod secret;
mod secret_group;
mod secret_groups;
mod secrets;
