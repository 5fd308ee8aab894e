//! Local and remote repository resources

pub mod local;
pub mod remote;

pub use local::LocalRepositoryResource;
pub use remote::RemoteRepositoryResource;

/// Package types a local repository can hold
pub const LOCAL_PACKAGE_TYPES: &[&str] = &[
    "alpine", "bower", "cargo", "chef", "cocoapods", "composer", "conan", "conda", "cran",
    "debian", "docker", "gems", "generic", "gitlfs", "go", "gradle", "helm", "ivy", "maven",
    "npm", "nuget", "opkg", "puppet", "pypi", "rpm", "sbt", "vagrant", "yum",
];

/// Remote repositories can additionally proxy p2 and VCS sources
pub const REMOTE_PACKAGE_TYPES: &[&str] = &[
    "alpine", "bower", "cargo", "chef", "cocoapods", "composer", "conan", "conda", "cran",
    "debian", "docker", "gems", "generic", "gitlfs", "go", "gradle", "helm", "ivy", "maven",
    "npm", "nuget", "opkg", "p2", "puppet", "pypi", "rpm", "sbt", "vagrant", "vcs", "yum",
];
