//! Resource implementations

pub mod repository;
pub mod security;

pub use repository::{LocalRepositoryResource, RemoteRepositoryResource};
pub use security::{GroupResource, PermissionTargetResource, UserResource};

use crate::api::ApiError;

/// Turns the API's 404 into `None`; every other failure propagates
pub(crate) fn found<T>(result: Result<T, ApiError>) -> tfplug::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Result of a DELETE where an already missing object counts as deleted
pub(crate) fn deleted(result: Result<(), ApiError>) -> tfplug::Result<()> {
    found(result).map(|_| ())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::api::{Client, Credentials};
    use crate::provider_data::ArtifactoryProviderData;
    use std::any::Any;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tfplug::Dynamic;

    pub fn provider_data(url: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        let client = Client::new(url, Credentials::AccessToken("token".to_string())).unwrap();
        Some(Arc::new(ArtifactoryProviderData::new(client)))
    }

    pub fn map(value: serde_json::Value) -> BTreeMap<String, Dynamic> {
        match Dynamic::from(value) {
            Dynamic::Map(fields) => fields,
            other => panic!("expected an object, got {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_becomes_none() {
        let result: Result<u32, ApiError> = Err(ApiError::NotFound("/x".to_string()));
        assert!(found(result).unwrap().is_none());
        assert!(deleted(Err(ApiError::NotFound("/x".to_string()))).is_ok());
    }

    #[test]
    fn other_errors_propagate() {
        let result: Result<u32, ApiError> = Err(ApiError::AuthError(401));
        let err = found(result).unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
