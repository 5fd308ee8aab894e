//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::any::Any;
use std::sync::Arc;
use tfplug::types::Diagnostic;
use tfplug::{Diagnostics, Result, TfplugError};

#[derive(Clone)]
pub struct ArtifactoryProviderData {
    pub client: Arc<Client>,
}

impl ArtifactoryProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Downcasts what `ArtifactoryProvider::configure` handed out. Failures
    /// are reported on `diagnostics`.
    pub fn extract(
        provider_data: Option<Arc<dyn Any + Send + Sync>>,
        diagnostics: &mut Diagnostics,
    ) -> Option<Self> {
        match provider_data {
            Some(data) => match data.downcast_ref::<ArtifactoryProviderData>() {
                Some(provider_data) => Some(provider_data.clone()),
                None => {
                    diagnostics.push(Diagnostic::error(
                        "Invalid provider data",
                        "Failed to extract ArtifactoryProviderData from provider data",
                    ));
                    None
                }
            },
            None => {
                diagnostics.push(Diagnostic::error(
                    "No provider data",
                    "No provider data was provided to the resource",
                ));
                None
            }
        }
    }
}

/// Client of a configured handler
pub(crate) fn client(provider_data: &Option<ArtifactoryProviderData>) -> Result<&Client> {
    provider_data
        .as_ref()
        .map(|data| data.client.as_ref())
        .ok_or(TfplugError::ProviderNotConfigured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Credentials;

    #[test]
    fn extract_rejects_foreign_data() {
        let mut diags = Diagnostics::new();
        let foreign: Arc<dyn Any + Send + Sync> = Arc::new(42u32);
        assert!(ArtifactoryProviderData::extract(Some(foreign), &mut diags).is_none());
        assert!(diags.has_errors());
    }

    #[test]
    fn extract_accepts_provider_data() {
        let client = Client::new(
            "http://localhost:8081/artifactory",
            Credentials::AccessToken("t".to_string()),
        )
        .unwrap();
        let data: Arc<dyn Any + Send + Sync> = Arc::new(ArtifactoryProviderData::new(client));
        let mut diags = Diagnostics::new();
        let extracted = ArtifactoryProviderData::extract(Some(data), &mut diags).unwrap();
        assert!(diags.is_empty());
        assert_eq!(extracted.client.base_url(), "http://localhost:8081/artifactory");
        assert!(super::client(&Some(extracted)).is_ok());
        assert!(matches!(super::client(&None), Err(TfplugError::ProviderNotConfigured)));
    }
}
