use crate::data_source::DataSourceFactory;
use crate::resource::ResourceFactory;
use crate::resource_data::ResourceData;
use crate::schema::Schema;
use crate::types::Diagnostics;
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of resource and data source types plus the provider block itself
#[async_trait]
pub trait Provider: Send + Sync {
    /// Prefix shared by every registered type name (e.g., "artifactory")
    fn type_name(&self) -> &str;

    /// Schema of the provider configuration block
    fn schema(&self) -> Arc<Schema>;

    /// Validates the provider block and builds whatever the handlers share.
    /// Returned `provider_data` is handed to every handler created afterwards.
    async fn configure(&mut self, request: ConfigureProviderRequest) -> ConfigureProviderResponse;

    fn resources(&self) -> HashMap<String, ResourceFactory>;

    fn data_sources(&self) -> HashMap<String, DataSourceFactory>;
}

pub struct ConfigureProviderRequest {
    pub config: ResourceData,
}

#[derive(Default)]
pub struct ConfigureProviderResponse {
    pub diagnostics: Diagnostics,
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}
