//! `artifactory_permission_target`
//!
//! Targets are written through the v2 API, which scopes permissions
//! separately for repositories (`repo`) and builds (`build`). The older flat
//! attributes are still accepted and are sent as the `repo` section.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use tfplug::resource::{ConfigureResourceRequest, ConfigureResourceResponse};
use tfplug::validator::string_in_slice;
use tfplug::{
    AttributeBuilder, Block, Dynamic, MarshalErrors, Resource, ResourceData,
    ResourceWithConfigure, Result, Schema, SchemaBuilder,
};

use crate::api::security::{PermissionTarget, PermissionTargetSection, PrincipalActions};
use crate::provider_data::{client, ArtifactoryProviderData};
use crate::resources::{deleted, found};

pub const TYPE_NAME: &str = "artifactory_permission_target";

pub const PERMISSIONS: &[&str] = &["read", "annotate", "write", "delete", "manage"];

const LEGACY_DEPRECATION: &str = "Use the repo block instead";

type Principals = BTreeMap<String, Vec<String>>;

fn principal_block() -> Block {
    SchemaBuilder::new()
        .attribute(AttributeBuilder::string("name").required().build())
        .attribute(
            AttributeBuilder::string_set("permissions")
                .required()
                .validator(string_in_slice(PERMISSIONS))
                .build(),
        )
        .build_block()
}

fn target_block() -> Block {
    let actions = SchemaBuilder::new()
        .attribute(
            AttributeBuilder::block_set("users", principal_block())
                .optional()
                .build(),
        )
        .attribute(
            AttributeBuilder::block_set("groups", principal_block())
                .optional()
                .build(),
        )
        .build_block();

    SchemaBuilder::new()
        .attribute(AttributeBuilder::string_set("includes_pattern").optional().build())
        .attribute(AttributeBuilder::string_set("excludes_pattern").optional().build())
        .attribute(AttributeBuilder::string_set("repositories").required().build())
        .attribute(
            AttributeBuilder::block_list("actions", actions)
                .optional()
                .max_items(1)
                .build(),
        )
        .build_block()
}

pub fn schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            let mut builder = Schema::builder()
                .description("Manages an Artifactory permission target")
                .required_string_force_new("name", "Permission target name");

            for section in ["repo", "build"] {
                builder = builder.attribute(
                    AttributeBuilder::block_list(section, target_block())
                        .optional()
                        .min_items(1)
                        .max_items(1)
                        .conflicts_with(&["repositories"])
                        .build(),
                );
            }

            Arc::new(
                builder
                    .attribute(
                        AttributeBuilder::string_set("repositories")
                            .optional()
                            .deprecated(LEGACY_DEPRECATION)
                            .conflicts_with(&["repo", "build"])
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::string("includes_pattern")
                            .description("Comma separated include patterns")
                            .optional()
                            .deprecated(LEGACY_DEPRECATION)
                            .conflicts_with(&["repo", "build"])
                            .required_with(&["repositories"])
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::string("excludes_pattern")
                            .description("Comma separated exclude patterns")
                            .optional()
                            .deprecated(LEGACY_DEPRECATION)
                            .conflicts_with(&["repo", "build"])
                            .required_with(&["repositories"])
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::block_set("users", principal_block())
                            .optional()
                            .deprecated(LEGACY_DEPRECATION)
                            .conflicts_with(&["repo", "build"])
                            .required_with(&["repositories"])
                            .build(),
                    )
                    .attribute(
                        AttributeBuilder::block_set("groups", principal_block())
                            .optional()
                            .deprecated(LEGACY_DEPRECATION)
                            .conflicts_with(&["repo", "build"])
                            .required_with(&["repositories"])
                            .build(),
                    )
                    .build(),
            )
        })
        .clone()
}

fn unpack_principals(value: Option<&Dynamic>) -> Option<Principals> {
    let principals: Principals = value?
        .as_list()?
        .iter()
        .filter_map(|item| {
            let fields = item.as_map()?;
            let name = fields.get("name")?.as_string()?.to_string();
            let permissions = fields
                .get("permissions")
                .and_then(Dynamic::as_string_vec)
                .unwrap_or_default();
            Some((name, permissions))
        })
        .collect();
    (!principals.is_empty()).then_some(principals)
}

fn unpack_actions(users: Option<&Dynamic>, groups: Option<&Dynamic>) -> Option<PrincipalActions> {
    let actions = PrincipalActions {
        users: unpack_principals(users),
        groups: unpack_principals(groups),
    };
    (actions.users.is_some() || actions.groups.is_some()).then_some(actions)
}

fn unpack_section(block: &BTreeMap<String, Dynamic>) -> PermissionTargetSection {
    let actions = block
        .get("actions")
        .and_then(Dynamic::as_list)
        .and_then(|items| items.first())
        .and_then(Dynamic::as_map)
        .and_then(|actions| unpack_actions(actions.get("users"), actions.get("groups")));

    PermissionTargetSection {
        include_patterns: block.get("includes_pattern").and_then(Dynamic::as_string_vec),
        exclude_patterns: block.get("excludes_pattern").and_then(Dynamic::as_string_vec),
        repositories: block
            .get("repositories")
            .and_then(Dynamic::as_string_vec)
            .unwrap_or_default(),
        actions,
    }
}

fn split_patterns(patterns: Option<String>) -> Option<Vec<String>> {
    patterns.map(|p| {
        p.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

/// Whether the instance is written in the flat, pre-v2 form
fn uses_legacy_form(data: &ResourceData) -> bool {
    data.get_blocks("repo").is_empty()
        && data.get_blocks("build").is_empty()
        && data.get_strings("repositories").is_some_and(|r| !r.is_empty())
}

pub fn unpack_permission_target(data: &ResourceData) -> PermissionTarget {
    let section = |name: &str| data.get_blocks(name).first().map(unpack_section);

    let repo = if uses_legacy_form(data) {
        let users = data.get("users");
        let groups = data.get("groups");
        Some(PermissionTargetSection {
            include_patterns: split_patterns(data.get_string("includes_pattern")),
            exclude_patterns: split_patterns(data.get_string("excludes_pattern")),
            repositories: data.get_strings("repositories").unwrap_or_default(),
            actions: unpack_actions(Some(&users), Some(&groups)),
        })
    } else {
        section("repo")
    };

    PermissionTarget {
        name: data.get_string("name").unwrap_or_default(),
        repo,
        build: section("build"),
    }
}

fn pack_principals(principals: &Principals) -> Dynamic {
    Dynamic::List(
        principals
            .iter()
            .map(|(name, permissions)| {
                Dynamic::object([
                    ("name", Dynamic::from(name.as_str())),
                    ("permissions", Dynamic::from(permissions.clone())),
                ])
            })
            .collect(),
    )
}

fn pack_section(section: &PermissionTargetSection) -> Dynamic {
    let mut fields = BTreeMap::new();
    fields.insert(
        "repositories".to_string(),
        Dynamic::from(section.repositories.clone()),
    );
    if let Some(patterns) = &section.include_patterns {
        fields.insert("includes_pattern".to_string(), Dynamic::from(patterns.clone()));
    }
    if let Some(patterns) = &section.exclude_patterns {
        fields.insert("excludes_pattern".to_string(), Dynamic::from(patterns.clone()));
    }
    if let Some(actions) = &section.actions {
        let mut packed = BTreeMap::new();
        if let Some(users) = &actions.users {
            packed.insert("users".to_string(), pack_principals(users));
        }
        if let Some(groups) = &actions.groups {
            packed.insert("groups".to_string(), pack_principals(groups));
        }
        fields.insert("actions".to_string(), Dynamic::List(vec![Dynamic::Map(packed)]));
    }
    Dynamic::Map(fields)
}

pub fn pack_permission_target(target: &PermissionTarget, data: &mut ResourceData) -> Result<()> {
    let mut errors = MarshalErrors::new("permission target");
    errors.record(data.set("name", target.name.as_str()));

    if uses_legacy_form(data) {
        if let Some(repo) = &target.repo {
            errors.record(data.set("repositories", repo.repositories.clone()));
            errors.record(data.set_opt(
                "includes_pattern",
                repo.include_patterns.as_ref().map(|p| p.join(",")),
            ));
            errors.record(data.set_opt(
                "excludes_pattern",
                repo.exclude_patterns.as_ref().map(|p| p.join(",")),
            ));
            let actions = repo.actions.clone().unwrap_or_default();
            errors.record(data.set_opt("users", actions.users.as_ref().map(pack_principals)));
            errors.record(data.set_opt("groups", actions.groups.as_ref().map(pack_principals)));
        }
    } else {
        if let Some(repo) = &target.repo {
            errors.record(data.set("repo", vec![pack_section(repo)]));
        }
        if let Some(build) = &target.build {
            errors.record(data.set("build", vec![pack_section(build)]));
        }
    }
    errors.into_result()
}

#[derive(Default)]
pub struct PermissionTargetResource {
    provider_data: Option<ArtifactoryProviderData>,
}

impl PermissionTargetResource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Resource for PermissionTargetResource {
    fn type_name(&self) -> &str {
        TYPE_NAME
    }

    fn schema(&self) -> Arc<Schema> {
        schema()
    }

    async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let target = unpack_permission_target(data);
        tracing::debug!("Creating permission target {}", target.name);

        client.security().permissions().create(&target).await?;
        data.set_id(target.name);
        self.read(data).await
    }

    async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let name = data.id().to_string();

        match found(client.security().permissions().get(&name).await)? {
            Some(target) => pack_permission_target(&target, data),
            None => {
                tracing::warn!("Permission target {} not found, removing from state", name);
                data.clear_id();
                Ok(())
            }
        }
    }

    async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        let target = unpack_permission_target(data);
        tracing::debug!("Updating permission target {}", target.name);

        client.security().permissions().update(&target).await?;
        data.set_id(target.name);
        self.read(data).await
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let client = client(&self.provider_data)?;
        tracing::debug!("Deleting permission target {}", data.id());

        deleted(client.security().permissions().delete(data.id()).await)?;
        data.clear_id();
        Ok(())
    }

    async fn exists(&self, data: &ResourceData) -> Result<bool> {
        let client = client(&self.provider_data)?;
        Ok(found(client.security().permissions().get(data.id()).await)?.is_some())
    }
}

#[async_trait]
impl ResourceWithConfigure for PermissionTargetResource {
    async fn configure(&mut self, request: ConfigureResourceRequest) -> ConfigureResourceResponse {
        let mut diagnostics = tfplug::Diagnostics::new();
        self.provider_data =
            ArtifactoryProviderData::extract(request.provider_data, &mut diagnostics);
        ConfigureResourceResponse { diagnostics }
    }
}
