//! DataSource trait and related types
//!
//! This module defines the DataSource trait that data sources must implement.

use crate::error::Result;
use crate::resource_data::ResourceData;
use crate::schema::Schema;
use crate::types::Diagnostics;
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

/// Base trait for data sources - implement read operations
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name should be constant (e.g., "artifactory_group")
    /// MUST match the key used in Provider.data_sources()
    fn type_name(&self) -> &str;

    /// Called to get data source schema - cache this in your implementation
    fn schema(&self) -> Arc<Schema>;

    /// Called to read data - this is the only operation for data sources.
    /// The lookup attributes come from configuration.
    async fn read(&self, data: &mut ResourceData) -> Result<()>;

    /// A missing object is `Ok(false)`
    async fn exists(&self, data: &ResourceData) -> Result<bool>;
}

/// All data sources must implement configure to receive provider data
/// This is called immediately after factory creates the data source
#[async_trait]
pub trait DataSourceWithConfigure: DataSource {
    async fn configure(
        &mut self,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse;
}

pub struct ConfigureDataSourceRequest {
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

#[derive(Default)]
pub struct ConfigureDataSourceResponse {
    pub diagnostics: Diagnostics,
}

/// Creates an unconfigured data source instance
pub type DataSourceFactory = fn() -> Box<dyn DataSourceWithConfigure>;
