//! Permission targets, v2 API (`/api/v2/security/permissions/{name}`)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::api::common::ArtifactoryApiResource;
use crate::api::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionTarget {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<PermissionTargetSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<PermissionTargetSection>,
}

/// Scope of a permission target for one kind of resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionTargetSection {
    #[serde(rename = "include-patterns", skip_serializing_if = "Option::is_none")]
    pub include_patterns: Option<Vec<String>>,
    #[serde(rename = "exclude-patterns", skip_serializing_if = "Option::is_none")]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<PrincipalActions>,
}

/// Principal name to granted permissions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrincipalActions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<BTreeMap<String, Vec<String>>>,
}

impl ArtifactoryApiResource for PermissionTarget {
    fn api_path() -> &'static str {
        "/api/v2/security/permissions"
    }
}

pub struct PermissionsApi<'a> {
    client: &'a Client,
}

impl<'a> PermissionsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, name: &str) -> Result<PermissionTarget, ApiError> {
        self.client
            .get(&PermissionTarget::resource_path(name))
            .await
    }

    /// The v2 API creates with POST and replaces with PUT
    pub async fn create(&self, target: &PermissionTarget) -> Result<(), ApiError> {
        self.client
            .post(&PermissionTarget::resource_path(&target.name), target)
            .await
    }

    pub async fn update(&self, target: &PermissionTarget) -> Result<(), ApiError> {
        self.client
            .put(&PermissionTarget::resource_path(&target.name), target)
            .await
    }

    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.client
            .delete(&PermissionTarget::resource_path(name))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Credentials;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn get_permission_target() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/security/permissions/release-readers")
            .with_body(
                json!({
                    "name": "release-readers",
                    "repo": {
                        "include-patterns": ["**"],
                        "exclude-patterns": [],
                        "repositories": ["libs-release-local"],
                        "actions": {
                            "users": {"jane": ["read", "annotate"]},
                            "groups": {"readers": ["read"]}
                        }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), Credentials::ApiKey("k".to_string())).unwrap();
        let target = client
            .security()
            .permissions()
            .get("release-readers")
            .await
            .unwrap();
        let repo = target.repo.unwrap();
        assert_eq!(repo.repositories, vec!["libs-release-local".to_string()]);
        assert_eq!(repo.include_patterns, Some(vec!["**".to_string()]));
        let users = repo.actions.unwrap().users.unwrap();
        assert_eq!(users["jane"], vec!["read".to_string(), "annotate".to_string()]);
        assert!(target.build.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_posts_hyphenated_keys() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/security/permissions/builds")
            .match_body(Matcher::Json(json!({
                "name": "builds",
                "build": {
                    "include-patterns": ["**"],
                    "repositories": ["artifactory-build-info"],
                    "actions": {"groups": {"ci": ["read", "write"]}}
                }
            })))
            .with_status(201)
            .create_async()
            .await;

        let mut groups = BTreeMap::new();
        groups.insert("ci".to_string(), vec!["read".to_string(), "write".to_string()]);
        let target = PermissionTarget {
            name: "builds".to_string(),
            repo: None,
            build: Some(PermissionTargetSection {
                include_patterns: Some(vec!["**".to_string()]),
                exclude_patterns: None,
                repositories: vec!["artifactory-build-info".to_string()],
                actions: Some(PrincipalActions {
                    users: None,
                    groups: Some(groups),
                }),
            }),
        };

        let client = Client::new(&server.url(), Credentials::ApiKey("k".to_string())).unwrap();
        client
            .security()
            .permissions()
            .create(&target)
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
