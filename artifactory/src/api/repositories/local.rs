use serde::{Deserialize, Serialize};

/// Local repository configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalRepository {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rclass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,
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
    pub debian_trivial_layout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_policy_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_unique_tags: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_version_behavior: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress_pom_consistency_checks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blacked_out: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_sets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_browsing_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculate_yum_metadata: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yum_root_depth: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_file_lists_indexing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xray_index: Option<bool>,
}
