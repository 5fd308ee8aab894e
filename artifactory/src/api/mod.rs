//! Artifactory REST API client

pub mod client;
pub mod common;
pub mod error;
pub mod pool;
pub mod repositories;
pub mod security;

pub use client::{Client, Credentials};
pub use error::ApiError;
