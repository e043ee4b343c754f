//! End-to-end wait: event interpretation followed by resolution.

use std::time::Duration;

use serde_json::Value;
use tracing::info;

use crate::directory::DeploymentDirectory;
use crate::domain::{RepositoryRef, ResolutionRequest};
use crate::error::Result;
use crate::event::{commit_sha_for_event, EventKind};
use crate::outcome::ResolutionOutcome;
use crate::resolver::DeploymentResolver;

/// Inputs for one run, as read from the automation environment.
#[derive(Debug, Clone)]
pub struct WaitInputs {
    pub event: EventKind,
    pub payload: Value,
    pub repository: RepositoryRef,
    pub app: Option<String>,
    pub environment: Option<String>,
    pub timeout: Duration,
}

impl WaitInputs {
    /// Build the resolution request. Fails before any directory call when
    /// the event cannot name a commit.
    pub fn request(&self) -> Result<ResolutionRequest> {
        let sha = commit_sha_for_event(&self.event, &self.payload)?;
        Ok(ResolutionRequest::new(self.repository.clone(), sha, self.timeout)
            .with_app(self.app.clone())
            .with_environment(self.environment.clone()))
    }
}

/// Wait for the deployment of the commit named by the triggering event.
pub async fn wait_for_deployment(
    directory: &dyn DeploymentDirectory,
    inputs: &WaitInputs,
) -> Result<ResolutionOutcome> {
    let request = inputs.request()?;
    info!(
        repository = %request.repository,
        sha = %request.commit_sha,
        app = request.app.as_deref().unwrap_or("-"),
        environment = request.environment.as_deref().unwrap_or("-"),
        timeout_secs = request.timeout.as_secs(),
        "waiting for deployment"
    );

    let outcome = DeploymentResolver::new(directory).resolve(&request).await?;
    Ok(outcome)
}
