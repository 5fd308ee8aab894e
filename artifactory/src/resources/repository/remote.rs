//! `artifactory_remote_repository`

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tfplug::import::import_state_passthrough_attribute;
use tfplug::resource::{ConfigureResourceRequest, ConfigureResourceResponse};
use tfplug::validator::{http_url, int_at_least, string_in_slice};
use tfplug::{
    AttributeBuilder, Dynamic, MarshalErrors, Resource, ResourceData, ResourceWithConfigure,
    Result, Schema, SchemaBuilder,
};

use super::REMOTE_PACKAGE_TYPES;
use crate::api::repositories::RemoteRepository;
use crate::provider_data::{client, ArtifactoryProviderData};
use crate::resources::{deleted, found};
use crate::util::hash_state;

pub const TYPE_NAME: &str = "artifactory_remote_repository";

const NUGET_FIELDS: [&str; 3] = ["feed_context_path", "download_context_path", "v3_feed_url"];

/// Artifactory appends this to the description of every remote repository
fn suppress_cache_suffix(old: &str, new: &str) -> bool {
    old == format!("{} (local file cache)", new)
}

fn nuget_block() -> tfplug::Block {
    SchemaBuilder::new()
        .attribute(AttributeBuilder::string("feed_context_path").optional().build())
        .attribute(AttributeBuilder::string("download_context_path").optional().build())
        .attribute(AttributeBuilder::string("v3_feed_url").optional().build())
        .build_block()
}

pub fn schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            let mut builder = Schema::builder()
                .description("Manages a remote (proxy) repository in Artifactory")
                .required_string_force_new("key", "The repository key")
                .attribute(
                    AttributeBuilder::string("package_type")
                        .optional()
                        .computed()
                        .force_new()
                        .validator(string_in_slice(REMOTE_PACKAGE_TYPES))
                        .build(),
                )
                .attribute(
                    AttributeBuilder::string("url")
                        .description("URL of the proxied upstream")
                        .required()
                        .validator(http_url())
                        .build(),
                )
                .optional_string("username", "Upstream user")
                .attribute(
                    AttributeBuilder::string("password")
                        .description("Upstream password; only its hash is kept in state")
                        .optional()
                        .sensitive()
                        .state_func(hash_state)
                        .build(),
                )
                .optional_string("proxy", "Network proxy key")
                .attribute(
                    AttributeBuilder::string("description")
                        .optional()
                        .diff_suppress(suppress_cache_suffix)
                        .build(),
                )
                .optional_string("notes", "Internal notes")
                .optional_computed_string(
                    "includes_pattern",
                    "Comma separated Ant patterns of artifacts to include",
                )
                .optional_computed_string(
                    "excludes_pattern",
                    "Comma separated Ant patterns of artifacts to exclude",
                )
                .optional_string("repo_layout_ref", "Repository layout")
                .optional_computed_bool("handle_releases", "Proxy release artifacts")
                .optional_computed_bool("handle_snapshots", "Proxy snapshot artifacts")
                .optional_computed_int(
                    "max_unique_snapshots",
                    "Snapshots to keep per artifact; 0 keeps all",
                )
                .optional_computed_bool(
                    "suppress_pom_consistency_checks",
                    "Skip POM consistency checks",
                )
                .attribute(
                    AttributeBuilder::string("remote_repo_checksum_policy_type")
                        .optional()
                        .computed()
                        .validator(string_in_slice(&[
                            "generate-if-absent",
                            "fail",
                            "ignore-and-generate",
                            "pass-thru",
                        ]))
                        .build(),
                )
                .optional_computed_bool(
                    "hard_fail",
                    "Fail requests on upstream communication errors",
                )
                .optional_computed_bool("offline", "Serve only cached artifacts")
                .optional_computed_bool("blacked_out", "Disable the repository")
                .optional_computed_bool("store_artifacts_locally", "Cache downloaded artifacts")
                .attribute(
                    AttributeBuilder::int("socket_timeout_millis")
                        .optional()
                        .computed()
                        .validator(int_at_least(0))
                        .build(),
                )
                .optional_string("local_address", "Local address to bind to")
                .optional_computed_int(
                    "retrieval_cache_period_seconds",
                    "How long metadata is cached",
                )
                .optional_computed_int("missed_cache_period_seconds", "How long a miss is cached")
                .optional_computed_int(
                    "unused_artifacts_cleanup_period_hours",
                    "Delete cached artifacts unused for this long",
                )
                .optional_computed_bool("fetch_jars_eagerly", "Fetch jars when the POM is fetched")
                .optional_computed_bool(
                    "fetch_sources_eagerly",
                    "Fetch source jars when the POM is fetched",
                )
                .optional_computed_bool(
                    "share_configuration",
                    "Publish this repository's configuration to other instances",
                )
                .optional_computed_bool(
                    "synchronize_properties",
                    "Synchronize properties with the upstream",
                )
                .optional_computed_bool(
                    "block_mismatching_mime_types",
                    "Reject responses whose MIME type does not match",
                )
                .optional_string_set("property_sets", "Property sets applied to the repository")
                .optional_computed_bool(
                    "allow_any_host_auth",
                    "Send credentials on redirects to other hosts",
                )
                .optional_computed_bool(
                    "enable_cookie_management",
                    "Keep upstream cookies between requests",
                )
                .optional_computed_string(
                    "client_tls_certificate",
                    "Client certificate presented to the upstream",
                )
                .optional_computed_string("pypi_registry_url", "PyPI registry URL")
                .optional_computed_string("bower_registry_url", "Bower registry URL")
                .optional_computed_bool("bypass_head_requests", "Send GET instead of HEAD upstream")
                .optional_computed_bool(
                    "enable_token_authentication",
                    "Authenticate upstream with tokens",
                )
                .optional_computed_bool("xray_index", "Index the repository with Xray")
                .optional_computed_string("vcs_type", "VCS type")
                .optional_computed_string("vcs_git_provider", "Git hosting provider")
                .optional_computed_string("vcs_git_download_url", "Custom Git download URL");

            for field in NUGET_FIELDS {
                builder = builder.attribute(
                    AttributeBuilder::string(field)
                        .optional()
                        .computed()
                        .conflicts_with(&["nuget"])
                        .build(),
                );
            }

            Arc::new(
                builder
                    .attribute(
                        AttributeBuilder::block_list("nuget", nuget_block())
                            .optional()
                            .min_items(1)
                            .max_items(1)
                            .deprecated(
                                "Since Artifactory 6.9.0+ (provider 1.6). Use /api/v2 endpoint",
                            )
                            .conflicts_with(&NUGET_FIELDS)
                            .build(),
                    )
                    .build(),
            )
        })
        .clone()
}

pub fn unpack_remote_repository(data: &ResourceData) -> RemoteRepository {
    // The deprecated block wins when present; it conflicts with the flat fields
    let nuget = data.get_blocks("nuget").into_iter().next();
    let nuget_field = |name: &str| match &nuget {
        Some(block) => block
            .get(name)
            .and_then(|v| v.as_string())
            .map(str::to_string),
        None => data.get_string(name),
    };

    RemoteRepository {
        key: data.get_string("key").unwrap_or_default(),
        rclass: None,
        package_type: data.get_string("package_type"),
        url: data.get_string("url"),
        username: data.get_string("username"),
        password: data.get_string("password"),
        proxy: data.get_string("proxy"),
        description: data.get_string("description"),
        notes: data.get_string("notes"),
        includes_pattern: data.get_string("includes_pattern"),
        excludes_pattern: data.get_string("excludes_pattern"),
        repo_layout_ref: data.get_string("repo_layout_ref"),
        handle_releases: data.get_bool("handle_releases"),
        handle_snapshots: data.get_bool("handle_snapshots"),
        max_unique_snapshots: data.get_int("max_unique_snapshots"),
        suppress_pom_consistency_checks: data.get_bool("suppress_pom_consistency_checks"),
        remote_repo_checksum_policy_type: data.get_string("remote_repo_checksum_policy_type"),
        hard_fail: data.get_bool("hard_fail"),
        offline: data.get_bool("offline"),
        blacked_out: data.get_bool("blacked_out"),
        store_artifacts_locally: data.get_bool("store_artifacts_locally"),
        socket_timeout_millis: data.get_int("socket_timeout_millis"),
        local_address: data.get_string("local_address"),
        retrieval_cache_period_secs: data.get_int("retrieval_cache_period_seconds"),
        missed_retrieval_cache_period_secs: data.get_int("missed_cache_period_seconds"),
        unused_artifacts_cleanup_period_hours: data
            .get_int("unused_artifacts_cleanup_period_hours"),
        fetch_jars_eagerly: data.get_bool("fetch_jars_eagerly"),
        fetch_sources_eagerly: data.get_bool("fetch_sources_eagerly"),
        share_configuration: data.get_bool("share_configuration"),
        synchronize_properties: data.get_bool("synchronize_properties"),
        block_mismatching_mime_types: data.get_bool("block_mismatching_mime_types"),
        property_sets: data.get_strings("property_sets"),
        allow_any_host_auth: data.get_bool("allow_any_host_auth"),
        enable_cookie_management: data.get_bool("enable_cookie_management"),
        client_tls_certificate: data.get_string("client_tls_certificate"),
        pypi_registry_url: data.get_string("pypi_registry_url"),
        bower_registry_url: data.get_string("bower_registry_url"),
        bypass_head_requests: data.get_bool("bypass_head_requests"),
        enable_token_authentication: data.get_bool("enable_token_authentication"),
        xray_index: data.get_bool("xray_index"),
        vcs_type: data.get_string("vcs_type"),
        vcs_git_provider: data.get_string("vcs_git_provider"),
        vcs_git_download_url: data.get_string("vcs_git_download_url"),
        feed_context_path: nuget_field("feed_context_path"),
        download_context_path: nuget_field("download_context_path"),
        v3_feed_url: nuget_field("v3_feed_url"),
    }
}

/// The server never returns the password, so it is left as configured
pub fn pack_remote_repository(repo: &RemoteRepository, data: &mut ResourceData) -> Result<()> {
    let mut errors = MarshalErrors::new("remote repository");
    errors.record(data.set("key", repo.key.as_str()));
    errors.record(data.set_opt("package_type", repo.package_type.clone()));
    errors.record(data.set_opt("url", repo.url.clone()));
    errors.record(data.set_opt("username", repo.username.clone()));
    errors.record(data.set_opt("proxy", repo.proxy.clone()));
    errors.record(data.set_opt("description", repo.description.clone()));
    errors.record(data.set_opt("notes", repo.notes.clone()));
    errors.record(data.set_opt("includes_pattern", repo.includes_pattern.clone()));
    errors.record(data.set_opt("excludes_pattern", repo.excludes_pattern.clone()));
    errors.record(data.set_opt("repo_layout_ref", repo.repo_layout_ref.clone()));
    errors.record(data.set_opt("handle_releases", repo.handle_releases));
    errors.record(data.set_opt("handle_snapshots", repo.handle_snapshots));
    errors.record(data.set_opt("max_unique_snapshots", repo.max_unique_snapshots));
    errors.record(data.set_opt(
        "suppress_pom_consistency_checks",
        repo.suppress_pom_consistency_checks,
    ));
    errors.record(data.set_opt(
        "remote_repo_checksum_policy_type",
        repo.remote_repo_checksum_policy_type.clone(),
    ));
    errors.record(data.set_opt("hard_fail", repo.hard_fail));
    errors.record(data.set_opt("offline", repo.offline));
    errors.record(data.set_opt("blacked_out", repo.blacked_out));
    errors.record(data.set_opt("store_artifacts_locally", repo.store_artifacts_locally));
    errors.record(data.set_opt("socket_timeout_millis", repo.socket_timeout_millis));
    errors.record(data.set_opt("local_address", repo.local_address.clone()));
    errors.record(data.set_opt(
        "retrieval_cache_period_seconds",
        repo.retrieval_cache_period_secs,
    ));
    errors.record(data.set_opt(
        "missed_cache_period_seconds",
        repo.missed_retrieval_cache_period_secs,
    ));
    errors.record(data.set_opt(
        "unused_artifacts_cleanup_period_hours",
        repo.unused_artifacts_cleanup_period_hours,
    ));
    errors.record(data.set_opt("fetch_jars_eagerly", repo.fetch_jars_eagerly));
    errors.record(data.set_opt("fetch_sources_eagerly", repo.fetch_sources_eagerly));
    errors.record(data.set_opt("share_configuration", repo.share_configuration));
    errors.record(data.set_opt("synchronize_properties", repo.synchronize_properties));
    errors.record(data.set_opt(
        "block_mismatching_mime_types",
        repo.block_mismatching_mime_types,
    ));
    errors.record(data.set_opt("property_sets", repo.property_sets.clone()));
    errors.record(data.set_opt("allow_any_host_auth", repo.allow_any_host_auth));
    errors.record(data.set_opt("enable_cookie_management", repo.enable_cookie_management));
    errors.record(data.set_opt("client_tls_certificate", repo.client_tls_certificate.clone()));
    errors.record(data.set_opt("pypi_registry_url", repo.pypi_registry_url.clone()));
    errors.record(data.set_opt("bower_registry_url", repo.bower_registry_url.clone()));
    errors.record(data.set_opt("bypass_head_requests", repo.bypass_head_requests));
    errors.record(data.set_opt(
        "enable_token_authentication",
        repo.enable_token_authentication,
    ));
    errors.record(data.set_opt("xray_index", repo.xray_index));
    errors.record(data.set_opt("vcs_type", repo.vcs_type.clone()));
    errors.record(data.set_opt("vcs_git_provider", repo.vcs_git_provider.clone()));
    errors.record(data.set_opt("vcs_git_download_url", repo.vcs_git_download_url.clone()));
    errors.record(data.set_opt("feed_context_path", repo.feed_context_path.clone()));
    errors.record(data.set_opt("download_context_path", repo.download_context_path.clone()));
    errors.record(data.set_opt("v3_feed_url", repo.v3_feed_url.clone()));

    if !data.get_blocks("nuget").is_empty() {
        let mut block = BTreeMap::new();
        for (name, value) in [
            ("feed_context_path", &repo.feed_context_path),
            ("download_context_path", &repo.download_context_path),
            ("v3_feed_url", &repo.v3_feed_url),
        ] {
            if let Some(value) = value {
                block.insert(name.to_string(), Dynamic::String(value.clone()));
            }
        }
        errors.record(data.set("nuget", vec![Dynamic::Map(block)]));
    }
    errors.into_result()
}

#[derive(Default)]
pub struct RemoteRepositoryResource {
    provider_data: Option<ArtifactoryProviderData>,
}

impl RemoteRepositoryResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for RemoteRepositoryResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Arc<Schema> {
        schema()
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let repo = unpack_remote_repository(data);
        tracing::debug!("Creating remote repository {}", repo.key);

        client.repositories().create_remote(&repo).await?;
        data.set_id(repo.key);
        self.read(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let key = data.id().to_string();

        match found(client.repositories().get_remote(&key).await)? {
            Some(repo) => pack_remote_repository(&repo, data),
            None => {
                tracing::warn!("Remote repository {} not found, removing from state", key);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let repo = unpack_remote_repository(data);
        tracing::debug!("Updating remote repository {}", repo.key);

        client.repositories().update_remote(&repo).await?;
        data.set_id(repo.key);
        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        tracing::debug!("Deleting remote repository {}", data.id());

        deleted(client.repositories().delete(data.id()).await)?;
        data.clear_id();
        Ok(())
    }

    async fn exists(&self, data: &ResourceData) -> Result<bool> {
        let client = client(&self.provider_data)?;
        Ok(found(client.repositories().get_remote(data.id()).await)?.is_some())
    }

    async fn import_state(&self, id: &str, data: &mut ResourceData) -> Result<()> {
        import_state_passthrough_attribute("key", id, data)
    }
}

#[async_trait]
impl ResourceWithConfigure for RemoteRepositoryResource {
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
    use crate::util::hash_string;
    use mockito::{Matcher, Server};
    use serde_json::json;

    async fn resource(server: &Server) -> RemoteRepositoryResource {
        let mut resource = RemoteRepositoryResource::new();
        resource
            .configure(ConfigureResourceRequest {
                provider_data: provider_data(&server.url()),
            })
            .await;
        resource
    }

    #[test]
    fn description_suffix_is_suppressed() {
        assert!(suppress_cache_suffix("npm proxy (local file cache)", "npm proxy"));
        assert!(!suppress_cache_suffix("npm proxy", "npm proxy"));
        assert!(!suppress_cache_suffix("other (local file cache)", "npm proxy"));
    }

    #[test]
    fn unpack_pack_round_trip() {
        let config = map(json!({
            "key": "maven-remote",
            "package_type": "maven",
            "url": "https://repo1.maven.org/maven2",
            "username": "proxyuser",
            "retrieval_cache_period_seconds": 7200,
            "missed_cache_period_seconds": 1800,
            "hard_fail": true,
            "remote_repo_checksum_policy_type": "fail",
            "property_sets": ["artifactory"]
        }));
        let data = ResourceData::new(schema()).with_config(config);
        let repo = unpack_remote_repository(&data);
        assert_eq!(repo.retrieval_cache_period_secs, Some(7200));

        let mut packed = ResourceData::new(schema());
        pack_remote_repository(&repo, &mut packed).unwrap();
        assert_eq!(unpack_remote_repository(&packed), repo);
    }

    #[test]
    fn nuget_block_feeds_flat_fields() {
        let config = map(json!({
            "key": "nuget-remote",
            "url": "https://www.nuget.org",
            "nuget": [{
                "feed_context_path": "api/v2",
                "v3_feed_url": "https://api.nuget.org/v3/index.json"
            }]
        }));
        let data = ResourceData::new(schema()).with_config(config);
        let repo = unpack_remote_repository(&data);
        assert_eq!(repo.feed_context_path.as_deref(), Some("api/v2"));
        assert_eq!(repo.download_context_path, None);
    }

    #[test]
    fn nuget_block_conflicts_with_flat_fields() {
        let diags = schema().validate(&Dynamic::from(json!({
            "key": "nuget-remote",
            "url": "https://www.nuget.org",
            "feed_context_path": "api/v2",
            "nuget": [{"feed_context_path": "api/v2"}]
        })));
        assert!(diags.has_errors());
    }

    #[tokio::test]
    async fn create_hashes_password_and_keeps_configured_description() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("PUT", "/api/repositories/npm-remote")
            .match_body(Matcher::PartialJson(json!({
                "rclass": "remote",
                "url": "https://registry.npmjs.org",
                "password": "upstream-secret"
            })))
            .create_async()
            .await;
        let _read = server
            .mock("GET", "/api/repositories/npm-remote")
            .with_body(
                json!({
                    "key": "npm-remote",
                    "rclass": "remote",
                    "packageType": "npm",
                    "url": "https://registry.npmjs.org",
                    "username": "bot",
                    "description": "npm proxy (local file cache)",
                    "storeArtifactsLocally": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let resource = resource(&server).await;
        let mut data = ResourceData::new(schema()).with_config(map(json!({
            "key": "npm-remote",
            "package_type": "npm",
            "url": "https://registry.npmjs.org",
            "username": "bot",
            "password": "upstream-secret",
            "description": "npm proxy"
        })));
        resource.create(&mut data).await.unwrap();
        create.assert_async().await;

        let state = data.state();
        assert_eq!(
            state.get("password"),
            Some(&Dynamic::String(hash_string("upstream-secret")))
        );
        assert_eq!(
            state.get("description"),
            Some(&Dynamic::String("npm proxy".to_string()))
        );
        assert_eq!(state.get("store_artifacts_locally"), Some(&Dynamic::Bool(true)));
    }

    #[tokio::test]
    async fn refresh_keeps_password_hash() {
        let mut server = Server::new_async().await;
        let _read = server
            .mock("GET", "/api/repositories/npm-remote")
            .with_body(
                json!({"key": "npm-remote", "url": "https://registry.npmjs.org"}).to_string(),
            )
            .create_async()
            .await;

        let resource = resource(&server).await;
        let prior = map(json!({
            "key": "npm-remote",
            "url": "https://registry.npmjs.org",
            "password": hash_string("upstream-secret")
        }));
        let mut data = ResourceData::new(schema())
            .with_id("npm-remote")
            .with_state(prior);
        resource.read(&mut data).await.unwrap();
        assert_eq!(
            data.state().get("password"),
            Some(&Dynamic::String(hash_string("upstream-secret")))
        );
    }
}
