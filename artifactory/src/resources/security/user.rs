//! `artifactory_user`
//!
//! The password is write-only on the server. State keeps its SHA-256 hash,
//! and an update sends the password only when that hash changes.

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tfplug::resource::{ConfigureResourceRequest, ConfigureResourceResponse};
use tfplug::validator::non_empty_string;
use tfplug::{
    AttributeBuilder, MarshalErrors, Resource, ResourceData, ResourceWithConfigure, Result, Schema,
};

use crate::api::security::User;
use crate::provider_data::{client, ArtifactoryProviderData};
use crate::resources::{deleted, found};
use crate::util::{generate_password, hash_state};

pub const TYPE_NAME: &str = "artifactory_user";

pub fn schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Arc::new(
                Schema::builder()
                    .description("Manages an Artifactory user")
                    .required_string_force_new("name", "Username")
                    .attribute(
                        AttributeBuilder::string("email")
                            .description("Email address")
                            .required()
                            .validator(non_empty_string())
                            .build(),
                    )
                    .optional_computed_bool("admin", "Grant administrator privileges")
                    .optional_computed_bool(
                        "profile_updatable",
                        "Allow the user to edit their own profile",
                    )
                    .optional_computed_bool("disable_ui_access", "Deny access to the web UI")
                    .optional_computed_bool(
                        "internal_password_disabled",
                        "Disable the internal password, for externally managed users",
                    )
                    .computed_string("realm", "Authentication realm")
                    .optional_string_set("groups", "Groups the user belongs to")
                    .attribute(
                        AttributeBuilder::string("password")
                            .description(
                                "Password; a random one is generated when omitted. \
                                 Only its hash is kept in state",
                            )
                            .optional()
                            .sensitive()
                            .state_func(hash_state)
                            .build(),
                    )
                    .build(),
            )
        })
        .clone()
}

/// Everything but the password, which the handlers decide on
pub fn unpack_user(data: &ResourceData) -> User {
    User {
        name: data.get_string("name").unwrap_or_default(),
        email: data.get_string("email"),
        password: None,
        admin: data.get_bool("admin"),
        profile_updatable: data.get_bool("profile_updatable"),
        disable_ui_access: data.get_bool("disable_ui_access"),
        internal_password_disabled: data.get_bool("internal_password_disabled"),
        groups: data.get_strings("groups"),
        realm: None,
        last_logged_in: None,
    }
}

pub fn pack_user(user: &User, data: &mut ResourceData) -> Result<()> {
    let mut errors = MarshalErrors::new("user");
    errors.record(data.set("name", user.name.as_str()));
    errors.record(data.set_opt("email", user.email.clone()));
    errors.record(data.set_opt("admin", user.admin));
    errors.record(data.set_opt("profile_updatable", user.profile_updatable));
    errors.record(data.set_opt("disable_ui_access", user.disable_ui_access));
    errors.record(data.set_opt(
        "internal_password_disabled",
        user.internal_password_disabled,
    ));
    errors.record(data.set_opt("realm", user.realm.clone()));
    errors.record(data.set_opt("groups", user.groups.clone()));
    errors.into_result()
}

#[derive(Default)]
pub struct UserResource {
    provider_data: Option<ArtifactoryProviderData>,
}

impl UserResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for UserResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Arc<Schema> {
        schema()
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let mut user = unpack_user(data);
        user.password = Some(
            data.get_string("password")
                .filter(|p| !p.is_empty())
                .unwrap_or_else(generate_password),
        );
        tracing::debug!("Creating user {}", user.name);

        client.security().users().create(&user).await?;
        data.set_id(user.name);
        self.read(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let name = data.id().to_string();

        match found(client.security().users().get(&name).await)? {
            Some(user) => pack_user(&user, data),
            None => {
                tracing::warn!("User {} not found, removing from state", name);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let mut user = unpack_user(data);
        if data.has_change("password") {
            user.password = data.get_string("password").filter(|p| !p.is_empty());
        }
        tracing::debug!(
            "Updating user {} (password changed: {})",
            user.name,
            user.password.is_some()
        );

        client.security().users().update(&user).await?;
        data.set_id(user.name);
        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        tracing::debug!("Deleting user {}", data.id());

        deleted(client.security().users().delete(data.id()).await)?;
        data.clear_id();
        Ok(())
    }

    async fn exists(&self, data: &ResourceData) -> Result<bool> {
        let client = client(&self.provider_data)?;
        Ok(found(client.security().users().get(data.id()).await)?.is_some())
    }
}

#[async_trait]
impl ResourceWithConfigure for UserResource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse {
        let mut diagnostics = tfplug::Diagnostics::new();
        self.provider_data =
            ArtifactoryProviderData::extract(request.provider_data, &mut diagnostics);
        ConfigureResourceResponse { diagnostics }
    }
}
