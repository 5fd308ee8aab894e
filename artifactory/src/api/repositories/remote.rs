use serde::{Deserialize, Serialize};

/// Remote (proxy) repository configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRepository {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rclass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Write-only; the server returns it encrypted or not at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub includes_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excludes_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_layout_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle_releases: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle_snapshots: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_unique_snapshots: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_pom_consistency_checks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_repo_checksum_policy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hard_fail: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacked_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_artifacts_locally: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_timeout_millis: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_cache_period_secs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missed_retrieval_cache_period_secs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unused_artifacts_cleanup_period_hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_jars_eagerly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_sources_eagerly: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_configuration: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synchronize_properties: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_mismatching_mime_types: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_sets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_any_host_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_cookie_management: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_tls_certificate: Option<String>,
    #[serde(rename = "pyPIRegistryUrl", skip_serializing_if = "Option::is_none")]
    pub pypi_registry_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bower_registry_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bypass_head_requests: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_token_authentication: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xray_index: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_git_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcs_git_download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_context_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_context_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v3_feed_url: Option<String>,
}
