//! `artifactory_remote_repository` data source

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tfplug::data_source::{ConfigureDataSourceRequest, ConfigureDataSourceResponse};
use tfplug::{DataSource, DataSourceWithConfigure, Diagnostics, ResourceData, Result, Schema};

use crate::provider_data::{client, ArtifactoryProviderData};
use crate::resources::repository::remote::{self as resource, pack_remote_repository};
use crate::resources::found;

pub fn schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            let mut schema = resource::schema().data_source_from_resource(&["key"]);
            schema.description = "Reads a remote repository by key".to_string();
            Arc::new(schema)
        })
        .clone()
}

#[derive(Default)]
pub struct RemoteRepositoryDataSource {
    provider_data: Option<ArtifactoryProviderData>,
}

impl RemoteRepositoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for RemoteRepositoryDataSource {
    fn type_name(&self) -> &str {
        resource::TYPE_NAME
    }

    fn schema(&self) -> Arc<Schema> {
        schema()
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let key = data.get_string("key").unwrap_or_default();
        tracing::debug!("Reading remote repository {}", key);

        match found(client.repositories().get_remote(&key).await)? {
            Some(repo) => {
                data.set_id(key);
                pack_remote_repository(&repo, data)
            }
            None => {
                tracing::warn!("Remote repository {} not found", key);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn exists(&self, data: &ResourceData) -> Result<bool> {
        let client = client(&self.provider_data)?;
        let key = data.get_string("key").unwrap_or_default();
        Ok(found(client.repositories().get_remote(&key).await)?.is_some())
    }
}

#[async_trait]
impl DataSourceWithConfigure for RemoteRepositoryDataSource {
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
