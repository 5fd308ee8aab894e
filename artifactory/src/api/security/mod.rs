//! Security API: users, groups and permission targets

pub mod groups;
pub mod permissions;
pub mod users;

pub use groups::{Group, GroupsApi};
pub use permissions::{PermissionTarget, PermissionTargetSection, PermissionsApi, PrincipalActions};
pub use users::{User, UsersApi};

use crate::api::Client;

pub struct SecurityApi<'a> {
    client: &'a Client,
}

impl<'a> SecurityApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn users(&self) -> UsersApi<'a> {
        UsersApi::new(self.client)
    }

    pub fn groups(&self) -> GroupsApi<'a> {
        GroupsApi::new(self.client)
    }

    pub fn permissions(&self) -> PermissionsApi<'a> {
        PermissionsApi::new(self.client)
    }
}
