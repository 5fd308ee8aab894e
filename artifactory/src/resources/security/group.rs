//! `artifactory_group`

use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tfplug::resource::{ConfigureResourceRequest, ConfigureResourceResponse};
use tfplug::validator::lower_case;
use tfplug::{
    AttributeBuilder, MarshalErrors, Resource, ResourceData, ResourceWithConfigure, Result, Schema,
};

use crate::api::security::Group;
use crate::provider_data::{client, ArtifactoryProviderData};
use crate::resources::{deleted, found};

pub const TYPE_NAME: &str = "artifactory_group";

pub fn schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            Arc::new(
                Schema::builder()
                    .description("Manages an Artifactory group")
                    .required_string_force_new("name", "Group name")
                    .optional_computed_string("description", "Group description")
                    .optional_computed_bool("auto_join", "Add new users to this group")
                    .optional_computed_bool("admin_privileges", "Members are administrators")
                    .attribute(
                        AttributeBuilder::string("realm")
                            .description("Realm the group comes from, e.g. internal or ldap")
                            .optional()
                            .computed()
                            .validator(lower_case())
                            .build(),
                    )
                    .optional_computed_string("realm_attributes", "Realm specific attributes")
                    .attribute(
                        AttributeBuilder::string_list("user_names")
                            .description("Members of the group")
                            .optional()
                            .computed()
                            .build(),
                    )
                    .build(),
            )
        })
        .clone()
}

pub fn unpack_group(data: &ResourceData) -> Group {
    Group {
        name: data.get_string("name").unwrap_or_default(),
        description: data.get_string("description"),
        auto_join: data.get_bool("auto_join"),
        admin_privileges: data.get_bool("admin_privileges"),
        realm: data.get_string("realm"),
        realm_attributes: data.get_string("realm_attributes"),
        user_names: data.get_strings("user_names"),
    }
}

pub fn pack_group(group: &Group, data: &mut ResourceData) -> Result<()> {
    let mut errors = MarshalErrors::new("group");
    errors.record(data.set("name", group.name.as_str()));
    errors.record(data.set_opt("description", group.description.clone()));
    errors.record(data.set_opt("auto_join", group.auto_join));
    errors.record(data.set_opt("admin_privileges", group.admin_privileges));
    errors.record(data.set_opt("realm", group.realm.clone()));
    errors.record(data.set_opt("realm_attributes", group.realm_attributes.clone()));
    errors.record(data.set_opt("user_names", group.user_names.clone()));
    errors.into_result()
}

#[derive(Default)]
pub struct GroupResource {
    provider_data: Option<ArtifactoryProviderData>,
}

impl GroupResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for GroupResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Arc<Schema> {
        schema()
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let group = unpack_group(data);
        tracing::debug!("Creating group {}", group.name);

        client.security().groups().create(&group).await?;
        data.set_id(group.name);
        self.read(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let name = data.id().to_string();

        match found(client.security().groups().get(&name).await)? {
            Some(group) => pack_group(&group, data),
            None => {
                tracing::warn!("Group {} not found, removing from state", name);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let group = unpack_group(data);
        tracing::debug!("Updating group {}", group.name);

        client.security().groups().update(&group).await?;
        data.set_id(group.name);
        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        tracing::debug!("Deleting group {}", data.id());

        deleted(client.security().groups().delete(data.id()).await)?;
        data.clear_id();
        Ok(())
    }

    async fn exists(&self, data: &ResourceData) -> Result<bool> {
        let client = client(&self.provider_data)?;
        Ok(found(client.security().groups().get(data.id()).await)?.is_some())
    }
}

#[async_trait]
impl ResourceWithConfigure for GroupResource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse {
        let mut diagnostics = tfplug::Diagnostics::new();
        self.provider_data =
            ArtifactoryProviderData::extract(request.provider_data, &mut diagnostics);
        ConfigureResourceResponse { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::{map, provider_data};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::Dynamic;

    async fn resource(server: &Server) -> GroupResource {
        let mut resource = GroupResource::new();
        resource
            .configure(ConfigureResourceRequest {
                provider_data: provider_data(&server.url()),
            })
            .await;
        resource
    }

    #[test]
    fn unpack_pack_round_trip() {
        let data = ResourceData::new(schema()).with_config(map(json!({
            "name": "devs",
            "description": "developers",
            "auto_join": false,
            "realm": "internal",
            "user_names": ["joe", "jane"]
        })));
        let group = unpack_group(&data);
        // lists keep their order
        assert_eq!(
            group.user_names,
            Some(vec!["joe".to_string(), "jane".to_string()])
        );

        let mut packed = ResourceData::new(schema());
        pack_group(&group, &mut packed).unwrap();
        assert_eq!(unpack_group(&packed), group);
    }

    #[test]
    fn realm_must_be_lower_case() {
        let diags = schema().validate(&Dynamic::from(json!({"name": "devs", "realm": "LDAP"})));
        assert!(diags.has_errors());
    }

    #[tokio::test]
    async fn read_packs_members() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/security/groups/devs")
            .match_query(Matcher::Any)
            .with_body(
                json!({
                    "name": "devs",
                    "description": "developers",
                    "autoJoin": false,
                    "adminPrivileges": true,
                    "realm": "internal",
                    "userNames": ["jane"]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let resource = resource(&server).await;
        let mut data = ResourceData::new(schema()).with_id("devs");
        resource.read(&mut data).await.unwrap();
        assert_eq!(data.get_bool("admin_privileges"), Some(true));
        assert_eq!(data.get_strings("user_names"), Some(vec!["jane".to_string()]));
        assert!(data.state().get("realm_attributes").is_none());
    }

    #[tokio::test]
    async fn missing_group_does_not_exist() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/security/groups/nobody")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let resource = resource(&server).await;
        let data = ResourceData::new(schema()).with_id("nobody");
        assert!(!resource.exists(&data).await.unwrap());
    }
}
