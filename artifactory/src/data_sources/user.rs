//! `artifactory_user` data source

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tfplug::data_source::{ConfigureDataSourceRequest, ConfigureDataSourceResponse};
use tfplug::{DataSource, DataSourceWithConfigure, Diagnostics, ResourceData, Result, Schema};

use crate::provider_data::{client, ArtifactoryProviderData};
use crate::resources::security::user::{self as resource, pack_user};
use crate::resources::found;

pub fn schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            let mut schema = resource::schema().data_source_from_resource(&["name"]);
            schema.description = "Reads an Artifactory user by name".to_string();
            Arc::new(schema)
        })
        .clone()
}

#[derive(Default)]
pub struct UserDataSource {
    provider_data: Option<ArtifactoryProviderData>,
}

impl UserDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for UserDataSource {
    fn type_name(&self) -> &str {
        resource::TYPE_NAME
    }

    fn schema(&self) -> Arc<Schema> {
        schema()
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let name = data.get_string("name").unwrap_or_default();
        tracing::debug!("Reading user {}", name);

        match found(client.security().users().get(&name).await)? {
            Some(user) => {
                data.set_id(name);
                pack_user(&user, data)
            }
            None => {
                tracing::warn!("User {} not found", name);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn exists(&self, data: &ResourceData) -> Result<bool> {
        let client = client(&self.provider_data)?;
        let name = data.get_string("name").unwrap_or_default();
        Ok(found(client.security().users().get(&name).await)?.is_some())
    }
}

#[async_trait]
impl DataSourceWithConfigure for UserDataSource {
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
