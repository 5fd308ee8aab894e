//! Users, groups and permission targets

pub mod group;
pub mod permission_target;
pub mod user;

pub use group::GroupResource;
pub use permission_target::PermissionTargetResource;
pub use user::UserResource;
