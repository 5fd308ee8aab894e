//! `artifactory_local_repository` data source

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tfplug::data_source::{ConfigureDataSourceRequest, ConfigureDataSourceResponse};
use tfplug::{DataSource, DataSourceWithConfigure, Diagnostics, ResourceData, Result, Schema};

use crate::provider_data::{client, ArtifactoryProviderData};
use crate::resources::repository::local::{self as resource, pack_local_repository};
use crate::resources::found;

pub fn schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            let mut schema = resource::schema().data_source_from_resource(&["key"]);
            schema.description = "Reads a local repository by key".to_string();
            Arc::new(schema)
        })
        .clone()
}

#[derive(Default)]
pub struct LocalRepositoryDataSource {
    provider_data: Option<ArtifactoryProviderData>,
}

impl LocalRepositoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for LocalRepositoryDataSource {
    fn type_name(&self) -> &str {
        resource::TYPE_NAME
    }

    fn schema(&self) -> Arc<Schema> {
        schema()
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let key = data.get_string("key").unwrap_or_default();
        tracing::debug!("Reading local repository {}", key);

        match found(client.repositories().get_local(&key).await)? {
            Some(repo) => {
                data.set_id(key);
                pack_local_repository(&repo, data)
            }
            None => {
                tracing::warn!("Local repository {} not found", key);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn exists(&self, data: &ResourceData) -> Result<bool> {
        let client = client(&self.provider_data)?;
        let key = data.get_string("key").unwrap_or_default();
        Ok(found(client.repositories().get_local(&key).await)?.is_some())
    }
}

#[async_trait]
impl DataSourceWithConfigure for LocalRepositoryDataSource {
    async fn configure(
        &mut self,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = Diagnostics::new();
        self.provider_data =
            ArtifactoryProviderData::extract(request.provider_data, &mut diagnostics);
        ConfigureDataSourceResponse { diagnostics }
    }
}
