//! Data source implementations
//!
//! Each data source reuses its resource's schema with the lookup key
//! required and every other attribute computed.

pub mod group;
pub mod local_repository;
pub mod permission_target;
pub mod remote_repository;
pub mod user;

pub use group::GroupDataSource;
pub use local_repository::LocalRepositoryDataSource;
pub use permission_target::PermissionTargetDataSource;
pub use remote_repository::RemoteRepositoryDataSource;
pub use user::UserDataSource;
