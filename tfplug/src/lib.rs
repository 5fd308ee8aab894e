//! tfplug - Terraform Plugin Framework for Rust
//!
//! The provider side of Terraform's plugin contract: schema declarations,
//! the `ResourceData` field map handed to handlers, the resource, data source
//! and provider traits, and an in-process `ProviderServer` that dispatches
//! operations the way Terraform core does.

// Core modules
pub mod error;
pub mod resource_data;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod builders;
pub mod import;
pub mod logging;
pub mod validator;

pub mod server;

// Re-exports for convenience
pub use data_source::{DataSource, DataSourceFactory, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use import::{import_state_passthrough_attribute, import_state_passthrough_id};
pub use logging::{init_logging, LogLevel};
pub use provider::Provider;
pub use resource::{Resource, ResourceFactory, ResourceWithConfigure};
pub use resource_data::{MarshalErrors, ResourceData};
pub use schema::{Attribute, AttributeBuilder, AttributeType, Block, Schema, SchemaBuilder};
pub use server::{ProviderServer, ResourceState};
pub use types::{Diagnostic, Diagnostics, Dynamic};
