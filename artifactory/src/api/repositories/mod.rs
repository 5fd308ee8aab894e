//! Repository configuration API (`/api/repositories/{key}`)
//!
//! Artifactory creates repositories with PUT and updates them with POST; the
//! `rclass` field tells local and remote repositories apart.

pub mod local;
pub mod remote;

pub use local::LocalRepository;
pub use remote::RemoteRepository;

use super::common::ArtifactoryApiResource;
use crate::api::{ApiError, Client};

pub const RCLASS_LOCAL: &str = "local";
pub const RCLASS_REMOTE: &str = "remote";

/// Marker for the shared repository path
pub struct Repository;

impl ArtifactoryApiResource for Repository {
    fn api_path() -> &'static str {
        "/api/repositories"
    }
}

/// Repositories API for repository operations
pub struct RepositoriesApi<'a> {
    client: &'a Client,
}

impl<'a> RepositoriesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/repositories/{key}
    pub async fn get_local(&self, key: &str) -> Result<LocalRepository, ApiError> {
        self.client.get(&Repository::resource_path(key)).await
    }

    /// PUT /api/repositories/{key}
    pub async fn create_local(&self, repo: &LocalRepository) -> Result<(), ApiError> {
        let mut body = repo.clone();
        body.rclass = Some(RCLASS_LOCAL.to_string());
        self.client
            .put(&Repository::resource_path(&repo.key), &body)
            .await
    }

    /// POST /api/repositories/{key}
    pub async fn update_local(&self, repo: &LocalRepository) -> Result<(), ApiError> {
        let mut body = repo.clone();
        body.rclass = Some(RCLASS_LOCAL.to_string());
        self.client
            .post(&Repository::resource_path(&repo.key), &body)
            .await
    }

    /// GET /api/repositories/{key}
    pub async fn get_remote(&self, key: &str) -> Result<RemoteRepository, ApiError> {
        self.client.get(&Repository::resource_path(key)).await
    }

    /// PUT /api/repositories/{key}
    pub async fn create_remote(&self, repo: &RemoteRepository) -> Result<(), ApiError> {
        let mut body = repo.clone();
        body.rclass = Some(RCLASS_REMOTE.to_string());
        self.client
            .put(&Repository::resource_path(&repo.key), &body)
            .await
    }

    /// POST /api/repositories/{key}
    pub async fn update_remote(&self, repo: &RemoteRepository) -> Result<(), ApiError> {
        let mut body = repo.clone();
        body.rclass = Some(RCLASS_REMOTE.to_string());
        self.client
            .post(&Repository::resource_path(&repo.key), &body)
            .await
    }

    /// DELETE /api/repositories/{key}
    pub async fn delete(&self, key: &str) -> Result<(), ApiError> {
        self.client.delete(&Repository::resource_path(key)).await
    }
}
