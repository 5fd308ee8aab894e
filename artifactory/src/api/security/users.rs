//! Users API (`/api/security/users/{name}`)

use serde::{Deserialize, Serialize};

use crate::api::common::ArtifactoryApiResource;
use crate::api::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Only ever sent; GET never returns it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_updatable: Option<bool>,
    #[serde(rename = "disableUIAccess", skip_serializing_if = "Option::is_none")]
    pub disable_ui_access: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_password_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_logged_in: Option<String>,
}

impl ArtifactoryApiResource for User {
    fn api_path() -> &'static str {
        "/api/security/users"
    }
}

pub struct UsersApi<'a> {
    client: &'a Client,
}

impl<'a> UsersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, name: &str) -> Result<User, ApiError> {
        self.client.get(&User::resource_path(name)).await
    }

    /// PUT creates the user
    pub async fn create(&self, user: &User) -> Result<(), ApiError> {
        self.client.put(&User::resource_path(&user.name), user).await
    }

    /// POST replaces the fields present in the body
    pub async fn update(&self, user: &User) -> Result<(), ApiError> {
        self.client.post(&User::resource_path(&user.name), user).await
    }

    pub async fn delete(&self, name: &str) -> Result<(), ApiError> {
        self.client.delete(&User::resource_path(name)).await
    }
}
