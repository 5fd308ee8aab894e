//! `artifactory_permission_target` data source

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tfplug::data_source::{ConfigureDataSourceRequest, ConfigureDataSourceResponse};
use tfplug::{DataSource, DataSourceWithConfigure, Diagnostics, ResourceData, Result, Schema};

use crate::provider_data::{client, ArtifactoryProviderData};
use crate::resources::security::permission_target::{self as resource, pack_permission_target};
use crate::resources::found;

pub fn schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            let mut schema = resource::schema().data_source_from_resource(&["name"]);
            schema.description = "Reads a permission target by name".to_string();
            Arc::new(schema)
        })
        .clone()
}

#[derive(Default)]
pub struct PermissionTargetDataSource {
    provider_data: Option<ArtifactoryProviderData>,
}

impl PermissionTargetDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for PermissionTargetDataSource {
    fn type_name(&self) -> &str {
        resource::TYPE_NAME
    }

    fn schema(&self) -> Arc<Schema> {
        schema()
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let name = data.get_string("name").unwrap_or_default();
        tracing::debug!("Reading permission target {}", name);

        match found(client.security().permissions().get(&name).await)? {
            Some(target) => {
                data.set_id(name);
                pack_permission_target(&target, data)
            }
            None => {
                tracing::warn!("Permission target {} not found", name);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn exists(&self, data: &ResourceData) -> Result<bool> {
        let client = client(&self.provider_data)?;
        let name = data.get_string("name").unwrap_or_default();
        Ok(found(client.security().permissions().get(&name).await)?.is_some())
    }
}

#[async_trait]
impl DataSourceWithConfigure for PermissionTargetDataSource {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{map, provider_data};
    use mockito::Server;
    use serde_json::json;

    #[tokio::test]
    async fn missing_target_clears_id() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/security/permissions/nothing")
            .with_status(404)
            .create_async()
            .await;

        let mut data_source = PermissionTargetDataSource::new();
        data_source
            .configure(ConfigureDataSourceRequest {
                provider_data: provider_data(&server.url()),
            })
            .await;

        let mut data = ResourceData::new(schema()).with_config(map(json!({"name": "nothing"})));
        data_source.read(&mut data).await.unwrap();
        assert!(data.id().is_empty());
        assert!(!data_source.exists(&data).await.unwrap());
    }
}
