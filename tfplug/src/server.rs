//! In-process provider server
//!
//! `ProviderServer` drives a `Provider` the way Terraform core does for a
//! single operation: validate configuration against the schema, create a
//! handler from the registry, hand it the provider data, call it and collect
//! the resulting state. The wire transport is not part of this crate; tests
//! and embedders call these methods directly.

use crate::data_source::{ConfigureDataSourceRequest, DataSourceFactory, DataSourceWithConfigure};
use crate::error::TfplugError;
use crate::provider::{ConfigureProviderRequest, Provider};
use crate::resource::{ConfigureResourceRequest, ResourceFactory, ResourceWithConfigure};
use crate::resource_data::ResourceData;
use crate::schema::Schema;
use crate::types::{Diagnostics, Dynamic};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persisted state of one resource instance
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceState {
    pub id: String,
    pub attributes: BTreeMap<String, Dynamic>,
}

impl ResourceState {
    pub fn get(&self, key: &str) -> Option<&Dynamic> {
        self.attributes.get(key)
    }
}

#[derive(Debug, Default)]
pub struct ApplyResourceChangeResponse {
    /// `None` after a successful delete
    pub new_state: Option<ResourceState>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Default)]
pub struct ReadResourceResponse {
    /// `None` when the remote object is gone
    pub new_state: Option<ResourceState>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Default)]
pub struct ReadDataSourceResponse {
    pub state: Option<ResourceState>,
    pub diagnostics: Diagnostics,
}

pub struct ProviderServer<P: Provider> {
    provider: RwLock<P>,
    provider_data: RwLock<Option<Arc<dyn Any + Send + Sync>>>,
    resources: HashMap<String, ResourceFactory>,
    data_sources: HashMap<String, DataSourceFactory>,
}

impl<P: Provider> ProviderServer<P> {
    pub fn new(provider: P) -> Self {
        let resources = provider.resources();
        let data_sources = provider.data_sources();
        Self {
            provider: RwLock::new(provider),
            provider_data: RwLock::new(None),
            resources,
            data_sources,
        }
    }

    pub fn resource_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.resources.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn data_source_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.data_sources.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn resource_schema(&self, type_name: &str) -> Option<Arc<Schema>> {
        self.resources.get(type_name).map(|factory| factory().schema())
    }

    pub fn data_source_schema(&self, type_name: &str) -> Option<Arc<Schema>> {
        self.data_sources
            .get(type_name)
            .map(|factory| factory().schema())
    }

    /// Validates the provider block and stores the resulting provider data
    pub async fn configure_provider(&self, config: Dynamic) -> Diagnostics {
        let mut provider = self.provider.write().await;
        let schema = provider.schema();
        let mut diags = schema.validate(&config);
        if diags.has_errors() {
            return diags;
        }

        let data = ResourceData::new(schema).with_config(into_map(config));
        let response = provider
            .configure(ConfigureProviderRequest { config: data })
            .await;
        diags.extend(response.diagnostics);
        if !diags.has_errors() {
            *self.provider_data.write().await = response.provider_data;
        }
        diags
    }

    pub async fn validate_resource_config(&self, type_name: &str, config: &Dynamic) -> Diagnostics {
        match self.resource_schema(type_name) {
            Some(schema) => schema.validate(config),
            None => TfplugError::ResourceNotFound(type_name.to_string()).into(),
        }
    }

    pub async fn validate_data_source_config(
        &self,
        type_name: &str,
        config: &Dynamic,
    ) -> Diagnostics {
        match self.data_source_schema(type_name) {
            Some(schema) => schema.validate(config),
            None => TfplugError::DataSourceNotFound(type_name.to_string()).into(),
        }
    }

    /// Create, update or delete depending on which of prior state and
    /// configuration are present. A change to a force-new attribute replaces
    /// the object (delete, then create).
    pub async fn apply_resource_change(
        &self,
        type_name: &str,
        prior_state: Option<ResourceState>,
        config: Option<Dynamic>,
    ) -> ApplyResourceChangeResponse {
        let resource = match self.resource(type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ApplyResourceChangeResponse {
                    new_state: prior_state,
                    diagnostics,
                }
            }
        };
        let schema = resource.schema();

        if let Some(config) = &config {
            let diagnostics = schema.validate(config);
            if diagnostics.has_errors() {
                return ApplyResourceChangeResponse {
                    new_state: prior_state,
                    diagnostics,
                };
            }
        }

        match (prior_state, config) {
            (None, None) => ApplyResourceChangeResponse::default(),
            (None, Some(config)) => {
                let mut data = ResourceData::new(schema).with_config(into_map(config));
                tracing::debug!(type_name, "creating resource");
                match resource.create(&mut data).await {
                    Ok(()) if data.id().is_empty() => ApplyResourceChangeResponse {
                        new_state: None,
                        diagnostics: TfplugError::Custom(format!(
                            "{}: create finished without setting an id",
                            type_name
                        ))
                        .into(),
                    },
                    Ok(()) => ApplyResourceChangeResponse {
                        new_state: Some(snapshot(&data)),
                        diagnostics: Diagnostics::new(),
                    },
                    Err(e) => ApplyResourceChangeResponse {
                        new_state: None,
                        diagnostics: e.into(),
                    },
                }
            }
            (Some(prior), None) => {
                let mut data = ResourceData::new(schema)
                    .with_id(prior.id.clone())
                    .with_state(prior.attributes.clone());
                tracing::debug!(type_name, id = %prior.id, "deleting resource");
                match resource.delete(&mut data).await {
                    Ok(()) => ApplyResourceChangeResponse::default(),
                    Err(e) => ApplyResourceChangeResponse {
                        new_state: Some(prior),
                        diagnostics: e.into(),
                    },
                }
            }
            (Some(prior), Some(config)) => {
                let config = into_map(config);
                let mut data = ResourceData::new(schema.clone())
                    .with_id(prior.id.clone())
                    .with_state(prior.attributes.clone())
                    .with_config(config.clone());

                let replace = schema
                    .block
                    .attributes
                    .values()
                    .any(|attr| attr.force_new && data.has_change(&attr.name));

                let mut prior_deleted = false;
                let result = if replace {
                    tracing::debug!(type_name, id = %prior.id, "replacing resource");
                    match resource.delete(&mut data).await {
                        Ok(()) => {
                            prior_deleted = true;
                            data = ResourceData::new(schema).with_config(config);
                            resource.create(&mut data).await
                        }
                        Err(e) => Err(e),
                    }
                } else {
                    tracing::debug!(type_name, id = %prior.id, "updating resource");
                    resource.update(&mut data).await
                };

                match result {
                    Ok(()) => ApplyResourceChangeResponse {
                        new_state: (!data.id().is_empty()).then(|| snapshot(&data)),
                        diagnostics: Diagnostics::new(),
                    },
                    // the old object is gone; keep only what the create left behind
                    Err(e) if prior_deleted => {
                        tracing::warn!(type_name, id = %prior.id, "replacement failed after delete");
                        ApplyResourceChangeResponse {
                            new_state: (!data.id().is_empty()).then(|| snapshot(&data)),
                            diagnostics: e.into(),
                        }
                    }
                    Err(e) => ApplyResourceChangeResponse {
                        new_state: Some(prior),
                        diagnostics: e.into(),
                    },
                }
            }
        }
    }

    /// Refresh: probe existence, then read. An object that disappeared yields
    /// no state and no error.
    pub async fn read_resource(
        &self,
        type_name: &str,
        current_state: ResourceState,
    ) -> ReadResourceResponse {
        let resource = match self.resource(type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ReadResourceResponse {
                    new_state: Some(current_state),
                    diagnostics,
                }
            }
        };

        let mut data = ResourceData::new(resource.schema())
            .with_id(current_state.id.clone())
            .with_state(current_state.attributes.clone());

        match resource.exists(&data).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(type_name, id = %current_state.id, "resource no longer exists, removing from state");
                return ReadResourceResponse::default();
            }
            Err(e) => {
                return ReadResourceResponse {
                    new_state: Some(current_state),
                    diagnostics: e.into(),
                }
            }
        }

        match resource.read(&mut data).await {
            Ok(()) if data.id().is_empty() => ReadResourceResponse::default(),
            Ok(()) => ReadResourceResponse {
                new_state: Some(snapshot(&data)),
                diagnostics: Diagnostics::new(),
            },
            Err(e) => ReadResourceResponse {
                new_state: Some(current_state),
                diagnostics: e.into(),
            },
        }
    }

    /// Runs the resource's importer, then reads the object
    pub async fn import_resource_state(&self, type_name: &str, id: &str) -> ReadResourceResponse {
        let resource = match self.resource(type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
        };

        let mut data = ResourceData::new(resource.schema());
        if let Err(e) = resource.import_state(id, &mut data).await {
            return ReadResourceResponse {
                new_state: None,
                diagnostics: e.into(),
            };
        }

        match resource.read(&mut data).await {
            Ok(()) if data.id().is_empty() => ReadResourceResponse {
                new_state: None,
                diagnostics: TfplugError::ImportFailed(format!(
                    "{} \"{}\" does not exist",
                    type_name, id
                ))
                .into(),
            },
            Ok(()) => ReadResourceResponse {
                new_state: Some(snapshot(&data)),
                diagnostics: Diagnostics::new(),
            },
            Err(e) => ReadResourceResponse {
                new_state: None,
                diagnostics: e.into(),
            },
        }
    }

    pub async fn read_data_source(&self, type_name: &str, config: Dynamic) -> ReadDataSourceResponse {
        let data_source = match self.data_source(type_name).await {
            Ok(data_source) => data_source,
            Err(diagnostics) => {
                return ReadDataSourceResponse {
                    state: None,
                    diagnostics,
                }
            }
        };

        let schema = data_source.schema();
        let diagnostics = schema.validate(&config);
        if diagnostics.has_errors() {
            return ReadDataSourceResponse {
                state: None,
                diagnostics,
            };
        }

        let mut data = ResourceData::new(schema).with_config(into_map(config));
        tracing::debug!(type_name, "reading data source");
        match data_source.read(&mut data).await {
            Ok(()) if data.id().is_empty() => ReadDataSourceResponse {
                state: None,
                diagnostics: TfplugError::Custom(format!("{}: object not found", type_name))
                    .into(),
            },
            Ok(()) => ReadDataSourceResponse {
                state: Some(snapshot(&data)),
                diagnostics,
            },
            Err(e) => ReadDataSourceResponse {
                state: None,
                diagnostics: e.into(),
            },
        }
    }

    async fn resource(
        &self,
        type_name: &str,
    ) -> std::result::Result<Box<dyn ResourceWithConfigure>, Diagnostics> {
        let factory = self
            .resources
            .get(type_name)
            .ok_or_else(|| Diagnostics::from(TfplugError::ResourceNotFound(type_name.to_string())))?;
        let provider_data = self.configured_data().await?;

        let mut resource = factory();
        let response = resource
            .configure(ConfigureResourceRequest {
                provider_data: Some(provider_data),
            })
            .await;
        if response.diagnostics.has_errors() {
            return Err(response.diagnostics);
        }
        Ok(resource)
    }

    async fn data_source(
        &self,
        type_name: &str,
    ) -> std::result::Result<Box<dyn DataSourceWithConfigure>, Diagnostics> {
        let factory = self.data_sources.get(type_name).ok_or_else(|| {
            Diagnostics::from(TfplugError::DataSourceNotFound(type_name.to_string()))
        })?;
        let provider_data = self.configured_data().await?;

        let mut data_source = factory();
        let response = data_source
            .configure(ConfigureDataSourceRequest {
                provider_data: Some(provider_data),
            })
            .await;
        if response.diagnostics.has_errors() {
            return Err(response.diagnostics);
        }
        Ok(data_source)
    }

    async fn configured_data(
        &self,
    ) -> std::result::Result<Arc<dyn Any + Send + Sync>, Diagnostics> {
        self.provider_data
            .read()
            .await
            .clone()
            .ok_or_else(|| Diagnostics::from(TfplugError::ProviderNotConfigured))
    }
}

fn into_map(value: Dynamic) -> BTreeMap<String, Dynamic> {
    match value {
        Dynamic::Map(map) => map,
        _ => BTreeMap::new(),
    }
}

fn snapshot(data: &ResourceData) -> ResourceState {
    ResourceState {
        id: data.id().to_string(),
        attributes: data.state(),
    }
}
