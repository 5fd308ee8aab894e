//! Common types and utilities for the Artifactory REST API

use serde::Deserialize;

/// Error body: `{"errors":[{"status":404,"message":"..."}]}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEntry {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
#[error("API error details: {}", .errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>().join("; "))]
pub struct ApiErrorDetails {
    pub errors: Vec<ApiErrorEntry>,
}

impl ApiErrorResponse {
    /// First error message, if the body carried any
    pub fn message(&self) -> Option<&str> {
        self.errors
            .iter()
            .map(|e| e.message.as_str())
            .find(|m| !m.is_empty())
    }
}

/// An entity addressed as `{api_path}/{id}`
pub trait ArtifactoryApiResource {
    fn api_path() -> &'static str;

    fn resource_path(id: &str) -> String {
        format!("{}/{}", Self::api_path(), urlencoding::encode(id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}
