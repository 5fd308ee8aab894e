//! Groups API (`/api/security/groups/{name}`)

use serde::{Deserialize, Serialize};

use crate::api::common::{ApiQueryParams, ArtifactoryApiResource};
use crate::api::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_join: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_privileges: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm_attributes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_names: Option<Vec<String>>,
}

impl ArtifactoryApiResource for Group {
    fn api_path() -> &'static str {
        "/api/security/groups"
    }
}

pub struct GroupsApi<'a> {
    client: &'a Client,
}

impl<'a> GroupsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Membership is only returned when asked for
    pub async fn get(&self, name: &str) -> Result<Group, ApiError> {
        let params = ApiQueryParams::new().add("includeUsers", true);
        self.client
            .get_with_params(&Group::resource_path(name), &params)
            .await
    }

    pub async fn create(&self, group: &Group) -> Result<(), ApiError> {
        self.client
            .put(&Group::resource_path(&group.name), group)
            .await
    }

    pub async fn update(&self, group: &Group) -> Result<(), ApiError> {
        self.client
            .post(&Group::resource_path(&group.name), group)
            .await
    }

    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.client.delete(&Group::resource_path(name)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Credentials;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn get_group_includes_users() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/security/groups/devs")
            .match_query(Matcher::UrlEncoded(
                "includeUsers".to_string(),
                "true".to_string(),
            ))
            .with_body(
                json!({
                    "name": "devs",
                    "description": "developers",
                    "autoJoin": false,
                    "adminPrivileges": false,
                    "realm": "internal",
                    "userNames": ["jane", "joe"]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), Credentials::ApiKey("k".to_string())).unwrap();
        let group = client.security().groups().get("devs").await.unwrap();
        assert_eq!(group.description.as_deref(), Some("developers"));
        assert_eq!(
            group.user_names,
            Some(vec!["jane".to_string(), "joe".to_string()])
        );
        assert_eq!(group.realm_attributes, None);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn update_group_uses_post() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/security/groups/devs")
            .match_body(Matcher::Json(json!({
                "name": "devs",
                "autoJoin": true
            })))
            .create_async()
            .await;

        let client = Client::new(&server.url(), Credentials::ApiKey("k".to_string())).unwrap();
        let group = Group {
            name: "devs".to_string(),
            auto_join: Some(true),
            ..Default::default()
        };
        client.security().groups().update(&group).await.unwrap();
        mock.assert_async().await;
    }
}
