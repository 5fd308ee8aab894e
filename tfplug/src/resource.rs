//! Resource trait and related types
//!
//! Handlers receive a `ResourceData` for the instance being operated on and
//! report failure through `Result`. A handler that finds its remote object gone
//! clears the id instead of returning an error.

use crate::error::Result;
use crate::import::import_state_passthrough_id;
use crate::resource_data::ResourceData;
use crate::schema::Schema;
use crate::types::Diagnostics;
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

/// Base trait for resources - implement CRUD operations
/// Type name should be constant and match the key in Provider.resources()
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name should be constant (e.g., "artifactory_user")
    /// MUST match the key used in Provider.resources()
    fn type_name(&self) -> &str;

    /// Called to get resource schema - cache this in your implementation
    fn schema(&self) -> Arc<Schema>;

    /// Called to create a new resource.
    /// MUST set the id and leave every attribute populated (usually by
    /// finishing with `read`).
    async fn create(&self, data: &mut ResourceData) -> Result<()>;

    /// Called to refresh state and after create/update.
    /// MUST clear the id if the remote object no longer exists.
    async fn read(&self, data: &mut ResourceData) -> Result<()>;

    /// Called to update an existing resource
    async fn update(&self, data: &mut ResourceData) -> Result<()>;

    /// Called to delete a resource
    async fn delete(&self, data: &mut ResourceData) -> Result<()>;

    /// Existence probe run before a refresh. A missing object is `Ok(false)`.
    async fn exists(&self, data: &ResourceData) -> Result<bool>;

    /// Called during "terraform import". The default copies the import id
    /// into the resource id; the server reads the object afterwards.
    async fn import_state(&self, id: &str, data: &mut ResourceData) -> Result<()> {
        import_state_passthrough_id(id, data)
    }
}

/// All resources must implement configure to receive provider data
/// This is called immediately after factory creates the resource
/// Use this to store API clients, credentials, etc. from provider
#[async_trait]
pub trait ResourceWithConfigure: Resource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse;
}

pub struct ConfigureResourceRequest {
    /// Data from ConfigureProviderResponse.provider_data
    /// Downcast to your provider's specific type
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

#[derive(Default)]
pub struct ConfigureResourceResponse {
    pub diagnostics: Diagnostics,
}

/// Creates an unconfigured resource instance
pub type ResourceFactory = fn() -> Box<dyn ResourceWithConfigure>;
