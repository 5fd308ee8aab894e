//! `artifactory_local_repository`

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tfplug::import::import_state_passthrough_attribute;
use tfplug::resource::{ConfigureResourceRequest, ConfigureResourceResponse};
use tfplug::validator::{int_at_least, string_in_slice};
use tfplug::{
    AttributeBuilder, MarshalErrors, Resource, ResourceData, ResourceWithConfigure, Result, Schema,
};

use super::LOCAL_PACKAGE_TYPES;
use crate::api::repositories::LocalRepository;
use crate::provider_data::{client, ArtifactoryProviderData};
use crate::resources::{deleted, found};

pub const TYPE_NAME: &str = "artifactory_local_repository";

pub fn schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Arc::new(
                Schema::builder()
                    .description("Manages a local repository in Artifactory")
                    .required_string_force_new("key", "The repository key")
                    .attribute(
                        AttributeBuilder::string("package_type")
                            .description("Package type; fixed at creation")
                            .optional()
                            .computed()
                            .force_new()
                            .validator(string_in_slice(LOCAL_PACKAGE_TYPES))
                            .build(),
                    )
                    .optional_computed_string("description", "Public description")
                    .optional_computed_string("notes", "Internal notes")
                    .optional_computed_string(
                        "includes_pattern",
                        "Comma separated Ant patterns of artifacts to include",
                    )
                    .optional_computed_string(
                        "excludes_pattern",
                        "Comma separated Ant patterns of artifacts to exclude",
                    )
                    .optional_computed_string("repo_layout_ref", "Repository layout")
                    .optional_computed_bool("handle_releases", "Accept release artifacts")
                    .optional_computed_bool("handle_snapshots", "Accept snapshot artifacts")
                    .attribute(
                        AttributeBuilder::int("max_unique_snapshots")
                            .optional()
                            .computed()
                            .validator(int_at_least(0))
                            .build(),
                    )
                    .optional_bool("debian_trivial_layout", "Use the trivial Debian layout")
                    .attribute(
                        AttributeBuilder::string("checksum_policy_type")
                            .optional()
                            .computed()
                            .validator(string_in_slice(&[
                                "client-checksums",
                                "server-generated-checksums",
                            ]))
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::int("max_unique_tags")
                            .description("Docker tags to keep per image; 0 keeps all")
                            .optional()
                            .computed()
                            .validator(int_at_least(0))
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::string("snapshot_version_behavior")
                            .optional()
                            .computed()
                            .validator(string_in_slice(&["unique", "non-unique", "deployer"]))
                            .build(),
                    )
                    .optional_computed_bool(
                        "suppress_pom_consistency_checks",
                        "Skip POM consistency checks on deploy",
                    )
                    .optional_computed_bool("blacked_out", "Disable the repository")
                    .optional_string_set("property_sets", "Property sets applied to the repository")
                    .optional_bool("archive_browsing_enabled", "Allow browsing inside archives")
                    .optional_bool("calculate_yum_metadata", "Compute YUM metadata")
                    .attribute(
                        AttributeBuilder::int("yum_root_depth")
                            .optional()
                            .validator(int_at_least(0))
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::string("docker_api_version")
                            .optional()
                            .computed()
                            .validator(string_in_slice(&["V1", "V2"]))
                            .build(),
                    )
                    .optional_computed_bool(
                        "enable_file_lists_indexing",
                        "Index RPM file lists",
                    )
                    .optional_computed_bool("xray_index", "Index the repository with Xray")
                    .build(),
            )
        })
        .clone()
}

/// Builds the API body from the field map
pub fn unpack_local_repository(data: &ResourceData) -> LocalRepository {
    LocalRepository {
        key: data.get_string("key").unwrap_or_default(),
        rclass: None,
        package_type: data.get_string("package_type"),
        description: data.get_string("description"),
        notes: data.get_string("notes"),
        includes_pattern: data.get_string("includes_pattern"),
        excludes_pattern: data.get_string("excludes_pattern"),
        repo_layout_ref: data.get_string("repo_layout_ref"),
        handle_releases: data.get_bool("handle_releases"),
        handle_snapshots: data.get_bool("handle_snapshots"),
        max_unique_snapshots: data.get_int("max_unique_snapshots"),
        debian_trivial_layout: data.get_bool("debian_trivial_layout"),
        checksum_policy_type: data.get_string("checksum_policy_type"),
        max_unique_tags: data.get_int("max_unique_tags"),
        snapshot_version_behavior: data.get_string("snapshot_version_behavior"),
        suppress_pom_consistency_checks: data.get_bool("suppress_pom_consistency_checks"),
        blacked_out: data.get_bool("blacked_out"),
        property_sets: data.get_strings("property_sets"),
        archive_browsing_enabled: data.get_bool("archive_browsing_enabled"),
        calculate_yum_metadata: data.get_bool("calculate_yum_metadata"),
        yum_root_depth: data.get_int("yum_root_depth"),
        docker_api_version: data.get_string("docker_api_version"),
        enable_file_lists_indexing: data.get_bool("enable_file_lists_indexing"),
        xray_index: data.get_bool("xray_index"),
    }
}

/// Copies the server's view into the field map. Fields the server left out
/// keep their current value.
pub fn pack_local_repository(repo: &LocalRepository, data: &mut ResourceData) -> Result<()> {
    let mut errors = MarshalErrors::new("local repository");
    errors.record(data.set("key", repo.key.as_str()));
    errors.record(data.set_opt("package_type", repo.package_type.clone()));
    errors.record(data.set_opt("description", repo.description.clone()));
    errors.record(data.set_opt("notes", repo.notes.clone()));
    errors.record(data.set_opt("includes_pattern", repo.includes_pattern.clone()));
    errors.record(data.set_opt("excludes_pattern", repo.excludes_pattern.clone()));
    errors.record(data.set_opt("repo_layout_ref", repo.repo_layout_ref.clone()));
    errors.record(data.set_opt("handle_releases", repo.handle_releases));
    errors.record(data.set_opt("handle_snapshots", repo.handle_snapshots));
    errors.record(data.set_opt("max_unique_snapshots", repo.max_unique_snapshots));
    errors.record(data.set_opt("debian_trivial_layout", repo.debian_trivial_layout));
    errors.record(data.set_opt("checksum_policy_type", repo.checksum_policy_type.clone()));
    errors.record(data.set_opt("max_unique_tags", repo.max_unique_tags));
    errors.record(data.set_opt(
        "snapshot_version_behavior",
        repo.snapshot_version_behavior.clone(),
    ));
    errors.record(data.set_opt(
        "suppress_pom_consistency_checks",
        repo.suppress_pom_consistency_checks,
    ));
    errors.record(data.set_opt("blacked_out", repo.blacked_out));
    errors.record(data.set_opt("property_sets", repo.property_sets.clone()));
    errors.record(data.set_opt("archive_browsing_enabled", repo.archive_browsing_enabled));
    errors.record(data.set_opt("calculate_yum_metadata", repo.calculate_yum_metadata));
    errors.record(data.set_opt("yum_root_depth", repo.yum_root_depth));
    errors.record(data.set_opt("docker_api_version", repo.docker_api_version.clone()));
    errors.record(data.set_opt(
        "enable_file_lists_indexing",
        repo.enable_file_lists_indexing,
    ));
    errors.record(data.set_opt("xray_index", repo.xray_index));
    errors.into_result()
}

#[derive(Default)]
pub struct LocalRepositoryResource {
    provider_data: Option<ArtifactoryProviderData>,
}

impl LocalRepositoryResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for LocalRepositoryResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Arc<Schema> {
        schema()
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let repo = unpack_local_repository(data);
        tracing::debug!("Creating local repository {}", repo.key);

        client.repositories().create_local(&repo).await?;
        data.set_id(repo.key);
        self.read(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let key = data.id().to_string();

        match found(client.repositories().get_local(&key).await)? {
            Some(repo) => pack_local_repository(&repo, data),
            None => {
                tracing::warn!("Local repository {} not found, removing from state", key);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let repo = unpack_local_repository(data);
        tracing::debug!("Updating local repository {}", repo.key);

        client.repositories().update_local(&repo).await?;
        data.set_id(repo.key);
        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        tracing::debug!("Deleting local repository {}", data.id());

        deleted(client.repositories().delete(data.id()).await)?;
        data.clear_id();
        Ok(())
    }

    async fn exists(&self, data: &ResourceData) -> Result<bool> {
        let client = client(&self.provider_data)?;
        Ok(found(client.repositories().get_local(data.id()).await)?.is_some())
    }

    async fn import_state(&self, id: &str, data: &mut ResourceData) -> Result<()> {
        import_state_passthrough_attribute("key", id, data)
    }
}

#[async_trait]
impl ResourceWithConfigure for LocalRepositoryResource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse {
        let mut diagnostics = tfplug::Diagnostics::new();
        self.provider_data =
            ArtifactoryProviderData::extract(request.provider_data, &mut diagnostics);
        ConfigureResourceResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{map, provider_data};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::Dynamic;

    async fn resource(server: &Server) -> LocalRepositoryResource {
        let mut resource = LocalRepositoryResource::new();
        let response = resource
            .configure(ConfigureResourceRequest {
                provider_data: provider_data(&server.url()),
            })
            .await;
        assert!(response.diagnostics.is_empty());
        resource
    }

    #[test]
    fn unpack_pack_round_trip() {
        let config = map(json!({
            "key": "libs-local",
            "package_type": "maven",
            "description": "release libraries",
            "handle_releases": true,
            "handle_snapshots": false,
            "max_unique_snapshots": 5,
            "checksum_policy_type": "client-checksums",
            "property_sets": ["artifactory"],
            "xray_index": true
        }));
        let data = ResourceData::new(schema()).with_config(config);
        let repo = unpack_local_repository(&data);
        assert_eq!(repo.notes, None);

        let mut packed = ResourceData::new(schema());
        pack_local_repository(&repo, &mut packed).unwrap();
        assert_eq!(unpack_local_repository(&packed), repo);
    }

    #[tokio::test]
    async fn read_docker_repository() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/repositories/docker-local")
            .with_body(
                json!({
                    "key": "docker-local",
                    "rclass": "local",
                    "packageType": "docker",
                    "dockerApiVersion": "V2",
                    "maxUniqueTags": 0,
                    "handleReleases": true,
                    "handleSnapshots": true,
                    "blackedOut": false,
                    "xrayIndex": false
                })
                .to_string(),
            )
            .create_async()
            .await;

        let resource = resource(&server).await;
        let mut data = ResourceData::new(schema()).with_id("docker-local");
        resource.read(&mut data).await.unwrap();

        assert_eq!(data.id(), "docker-local");
        assert_eq!(data.get_string("key").as_deref(), Some("docker-local"));
        assert_eq!(data.get_string("package_type").as_deref(), Some("docker"));
        assert_eq!(data.get_bool("handle_releases"), Some(true));
        assert_eq!(data.get_bool("blacked_out"), Some(false));
        assert_eq!(data.get_bool("xray_index"), Some(false));
        assert_eq!(data.get_int("max_unique_tags"), Some(0));
    }

    #[tokio::test]
    async fn read_missing_repository_clears_id() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/repositories/gone")
            .with_status(404)
            .with_body(r#"{"errors":[{"status":404,"message":"Repository gone not found"}]}"#)
            .create_async()
            .await;

        let resource = resource(&server).await;
        let mut data = ResourceData::new(schema()).with_id("gone");
        resource.read(&mut data).await.unwrap();
        assert!(data.id().is_empty());
        assert!(!resource.exists(&data.clone().with_id("gone")).await.unwrap());
    }

    #[tokio::test]
    async fn read_keeps_prior_value_of_omitted_field() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/repositories/libs-local")
            .with_body(json!({"key": "libs-local", "packageType": "maven"}).to_string())
            .create_async()
            .await;

        let resource = resource(&server).await;
        let prior = map(json!({
            "key": "libs-local",
            "package_type": "maven",
            "description": "kept"
        }));
        let mut data = ResourceData::new(schema())
            .with_id("libs-local")
            .with_state(prior);
        resource.read(&mut data).await.unwrap();
        assert_eq!(
            data.state().get("description"),
            Some(&Dynamic::String("kept".to_string()))
        );
    }

    #[tokio::test]
    async fn create_then_reads_back() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("PUT", "/api/repositories/libs-local")
            .match_body(Matcher::PartialJson(json!({
                "key": "libs-local",
                "rclass": "local",
                "packageType": "maven"
            })))
            .create_async()
            .await;
        let read = server
            .mock("GET", "/api/repositories/libs-local")
            .with_body(
                json!({
                    "key": "libs-local",
                    "packageType": "maven",
                    "repoLayoutRef": "maven-2-default"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let resource = resource(&server).await;
        let mut data = ResourceData::new(schema())
            .with_config(map(json!({"key": "libs-local", "package_type": "maven"})));
        resource.create(&mut data).await.unwrap();

        assert_eq!(data.id(), "libs-local");
        assert_eq!(
            data.get_string("repo_layout_ref").as_deref(),
            Some("maven-2-default")
        );
        create.assert_async().await;
        read.assert_async().await;
    }

    #[tokio::test]
    async fn delete_of_missing_repository_succeeds() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/api/repositories/gone")
            .with_status(404)
            .create_async()
            .await;

        let resource = resource(&server).await;
        let mut data = ResourceData::new(schema()).with_id("gone");
        resource.delete(&mut data).await.unwrap();
        assert!(data.id().is_empty());
    }

    #[tokio::test]
    async fn server_errors_propagate() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/repositories/libs-local")
            .with_status(500)
            .with_body(r#"{"errors":[{"status":500,"message":"boom"}]}"#)
            .create_async()
            .await;

        let resource = resource(&server).await;
        let mut data = ResourceData::new(schema()).with_id("libs-local");
        let err = resource.read(&mut data).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(data.id(), "libs-local");
    }

    #[test]
    fn invalid_package_type_is_rejected() {
        let diags = schema().validate(&Dynamic::from(json!({
            "key": "x",
            "package_type": "floppy"
        })));
        assert!(diags.has_errors());
    }
}
