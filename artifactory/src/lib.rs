//! Terraform provider for JFrog Artifactory
//!
//! Repositories, users, groups and permission targets are exposed both as
//! resources and as data sources under the same type names.

pub mod api;
pub mod data_sources;
pub mod provider_data;
pub mod resources;
pub mod util;

pub use provider_data::ArtifactoryProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tfplug::provider::{ConfigureProviderRequest, ConfigureProviderResponse};
use tfplug::validator::http_url;
use tfplug::{
    AttributeBuilder, DataSourceFactory, DataSourceWithConfigure, Diagnostics, Provider,
    ResourceFactory, ResourceWithConfigure, Schema,
};

use api::{Client, Credentials};
use data_sources::{
    GroupDataSource, LocalRepositoryDataSource, PermissionTargetDataSource,
    RemoteRepositoryDataSource, UserDataSource,
};
use resources::{
    GroupResource, LocalRepositoryResource, PermissionTargetResource, RemoteRepositoryResource,
    UserResource,
};

pub const ENV_URL: &str = "ARTIFACTORY_URL";
pub const ENV_USERNAME: &str = "ARTIFACTORY_USERNAME";
pub const ENV_PASSWORD: &str = "ARTIFACTORY_PASSWORD";
pub const ENV_API_KEY: &str = "ARTIFACTORY_API_KEY";
pub const ENV_ACCESS_TOKEN: &str = "ARTIFACTORY_ACCESS_TOKEN";

#[derive(Default)]
pub struct ArtifactoryProvider;

impl ArtifactoryProvider {
    pub fn new() -> Self {
        Self
    }
}

fn provider_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Arc::new(
                Schema::builder()
                    .description("JFrog Artifactory")
                    .attribute(
                        AttributeBuilder::string("url")
                            .description(
                                "Artifactory base URL, e.g. https://host/artifactory. \
                                 Required here or in ARTIFACTORY_URL",
                            )
                            .optional()
                            .validator(http_url())
                            .build(),
                    )
                    .optional_string("username", "User for basic authentication")
                    .optional_sensitive_string("password", "Password for basic authentication")
                    .optional_sensitive_string("api_key", "API key")
                    .optional_sensitive_string("access_token", "Access token")
                    .build(),
            )
        })
        .clone()
}

#[async_trait]
impl Provider for ArtifactoryProvider {
    fn type_name(&self) -> &str {
        "artifactory"
    }

    fn schema(&self) -> Arc<Schema> {
        provider_schema()
    }

    async fn configure(&mut self, request: ConfigureProviderRequest) -> ConfigureProviderResponse {
        let config = request.config;
        let setting = |key: &str, env: &str| {
            config
                .get_string(key)
                .filter(|v| !v.is_empty())
                .or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
        };

        let url = setting("url", ENV_URL);
        let credentials = Credentials::resolve(
            setting("access_token", ENV_ACCESS_TOKEN),
            setting("api_key", ENV_API_KEY),
            setting("username", ENV_USERNAME),
            setting("password", ENV_PASSWORD),
        );

        let mut diags = Diagnostics::new();
        let mut provider_data = None;

        match (url, credentials) {
            (Some(url), Some(credentials)) => match Client::new(&url, credentials) {
                Ok(client) => {
                    tracing::debug!("Configured Artifactory client for {:?}", client);
                    provider_data = Some(Arc::new(ArtifactoryProviderData::new(client))
                        as Arc<dyn std::any::Any + Send + Sync>);
                }
                Err(e) => {
                    diags.add_error(
                        format!("Failed to create API client: {}", e),
                        None::<String>,
                    );
                }
            },
            (None, _) => {
                diags.add_error(
                    "url is required (set in provider config or ARTIFACTORY_URL env var)",
                    None::<String>,
                );
            }
            (_, None) => {
                diags.add_error(
                    "No credentials supplied",
                    Some("set access_token, api_key, or both username and password"),
                );
            }
        }

        ConfigureProviderResponse {
            diagnostics: diags,
            provider_data,
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            resources::repository::local::TYPE_NAME.to_string(),
            || -> Box<dyn ResourceWithConfigure> { Box::new(LocalRepositoryResource::new()) },
        );
        factories.insert(
            resources::repository::remote::TYPE_NAME.to_string(),
            || -> Box<dyn ResourceWithConfigure> { Box::new(RemoteRepositoryResource::new()) },
        );
        factories.insert(
            resources::security::user::TYPE_NAME.to_string(),
            || -> Box<dyn ResourceWithConfigure> { Box::new(UserResource::new()) },
        );
        factories.insert(
            resources::security::group::TYPE_NAME.to_string(),
            || -> Box<dyn ResourceWithConfigure> { Box::new(GroupResource::new()) },
        );
        factories.insert(
            resources::security::permission_target::TYPE_NAME.to_string(),
            || -> Box<dyn ResourceWithConfigure> { Box::new(PermissionTargetResource::new()) },
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            resources::repository::local::TYPE_NAME.to_string(),
            || -> Box<dyn DataSourceWithConfigure> { Box::new(LocalRepositoryDataSource::new()) },
        );
        factories.insert(
            resources::repository::remote::TYPE_NAME.to_string(),
            || -> Box<dyn DataSourceWithConfigure> { Box::new(RemoteRepositoryDataSource::new()) },
        );
        factories.insert(
            resources::security::user::TYPE_NAME.to_string(),
            || -> Box<dyn DataSourceWithConfigure> { Box::new(UserDataSource::new()) },
        );
        factories.insert(
            resources::security::group::TYPE_NAME.to_string(),
            || -> Box<dyn DataSourceWithConfigure> { Box::new(GroupDataSource::new()) },
        );
        factories.insert(
            resources::security::permission_target::TYPE_NAME.to_string(),
            || -> Box<dyn DataSourceWithConfigure> { Box::new(PermissionTargetDataSource::new()) },
        );
        factories
    }
}
