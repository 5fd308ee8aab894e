//! `artifactory_group` data source

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tfplug::data_source::{ConfigureDataSourceRequest, ConfigureDataSourceResponse};
use tfplug::{DataSource, DataSourceWithConfigure, Diagnostics, ResourceData, Result, Schema};

use crate::provider_data::{client, ArtifactoryProviderData};
use crate::resources::security::group::{self as resource, pack_group};
use crate::resources::found;

pub fn schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            let mut schema = resource::schema().data_source_from_resource(&["name"]);
            schema.description = "Reads an Artifactory group by name".to_string();
            Arc::new(schema)
        })
        .clone()
}

#[derive(Default)]
pub struct GroupDataSource {
    provider_data: Option<ArtifactoryProviderData>,
}

impl GroupDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for GroupDataSource {
    fn type_name(&self) -> &str {
        resource::TYPE_NAME
    }

    fn schema(&self) -> Arc<Schema> {
        schema()
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let name = data.get_string("name").unwrap_or_default();
        tracing::debug!("Reading group {}", name);

        match found(client.security().groups().get(&name).await)? {
            Some(group) => {
                data.set_id(name);
                pack_group(&group, data)
            }
            None => {
                tracing::warn!("Group {} not found", name);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn exists(&self, data: &ResourceData) -> Result<bool> {
        let client = client(&self.provider_data)?;
        let name = data.get_string("name").unwrap_or_default();
        Ok(found(client.security().groups().get(&name).await)?.is_some())
    }
}

#[async_trait]
impl DataSourceWithConfigure for GroupDataSource {
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
