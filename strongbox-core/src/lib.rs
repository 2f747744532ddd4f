//! Strongbox Core
//!
//! Attribute values, schemas, diagnostics and the provider trait shared by
//! Strongbox providers and the command-line host

pub mod diagnostic;
pub mod provider;
pub mod resource;
pub mod schema;
