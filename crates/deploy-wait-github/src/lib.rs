//! deploy-wait GitHub integration
//!
//! Reads deployments and deployment statuses from the GitHub REST API and
//! exposes them to the resolver as a [`deploy_wait_core::DeploymentDirectory`].

mod client;
mod error;

pub use client::{GithubClient, GithubConfig, API_VERSION, DEFAULT_API_URL, PER_PAGE};
pub use error::GithubError;
