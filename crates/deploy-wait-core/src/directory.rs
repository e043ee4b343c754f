//! Deployment directory abstraction.
//!
//! The resolver reads deployments and their status histories through this
//! trait. `deploy-wait-github` provides the REST-backed implementation and
//! [`crate::fakes::MemoryDirectory`] an in-memory one for tests.

use async_trait::async_trait;

use crate::domain::{Deployment, DeploymentQuery, DeploymentStatus, RepositoryRef};
use crate::error::DirectoryResult;

/// Read-only view of a remote deployment directory.
///
/// Implementations report transport and API faults as
/// [`crate::DirectoryError`]; callers do not retry them.
#[async_trait]
pub trait DeploymentDirectory: Send + Sync {
    /// List deployments recorded for a commit.
    async fn list_deployments(&self, query: &DeploymentQuery) -> DirectoryResult<Vec<Deployment>>;

    /// List the status history of one deployment, in directory order.
    async fn list_deployment_statuses(
        &self,
        repository: &RepositoryRef,
        deployment_id: u64,
    ) -> DirectoryResult<Vec<DeploymentStatus>>;
}
