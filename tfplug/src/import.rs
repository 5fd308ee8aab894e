//! Import helpers for simplifying resource import implementations

use crate::error::{Result, TfplugError};
use crate::resource_data::ResourceData;

/// Uses the import id as the resource id unchanged.
///
/// This is useful for resources whose remote identifier is the id, e.g.
/// `terraform import artifactory_user.bob bob`.
pub fn import_state_passthrough_id(id: &str, data: &mut ResourceData) -> Result<()> {
    if id.is_empty() {
        return Err(TfplugError::ImportFailed(
            "import id must not be empty".to_string(),
        ));
    }
    data.set_id(id);
    Ok(())
}

/// Passthrough that also copies the id into a named attribute, for resources
/// whose identifier attribute is required in configuration.
pub fn import_state_passthrough_attribute(
    attribute: &str,
    id: &str,
    data: &mut ResourceData,
) -> Result<()> {
    import_state_passthrough_id(id, data)?;
    data.set(attribute, id)
        .map_err(|e| TfplugError::ImportFailed(format!("could not set {}: {}", attribute, e)))
}
