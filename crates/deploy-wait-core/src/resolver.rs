//! Deployment resolver.
//!
//! Polls the deployment directory for the requested commit until one of its
//! deployments reports success or failure, or the deadline passes.
//!
//! Each poll runs the fatal checks (multiple deployments, failure status)
//! before the loop looks at the deadline again, so a terminal state observed
//! on the last attempt always wins over the timeout. The wait between polls
//! is a fixed [`POLL_INTERVAL`] and is not shortened by the deadline.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::directory::DeploymentDirectory;
use crate::domain::{DeploymentState, DeploymentStatus, ResolutionRequest};
use crate::error::DirectoryResult;
use crate::filter::relevant_deployments;
use crate::outcome::ResolutionOutcome;

/// Fixed wait between polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Resolver state. `Polling` carries the attempt number, which is only
/// reported, never used for control flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolverState {
    Polling { attempt: u32 },
    Terminal(ResolutionOutcome),
}

/// Resolves a [`ResolutionRequest`] against a [`DeploymentDirectory`].
pub struct DeploymentResolver<'a> {
    directory: &'a dyn DeploymentDirectory,
}

impl<'a> DeploymentResolver<'a> {
    pub fn new(directory: &'a dyn DeploymentDirectory) -> Self {
        DeploymentResolver { directory }
    }

    /// Poll until a terminal outcome.
    ///
    /// Directory errors are returned as-is and end the resolution at once.
    /// A timeout too large to represent as an instant means no deadline.
    pub async fn resolve(&self, request: &ResolutionRequest) -> DirectoryResult<ResolutionOutcome> {
        let deadline = Instant::now().checked_add(request.timeout);
        let mut state = ResolverState::Polling { attempt: 1 };

        loop {
            state = match state {
                ResolverState::Terminal(outcome) => return Ok(outcome),
                ResolverState::Polling { attempt } => {
                    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                        ResolverState::Terminal(ResolutionOutcome::timed_out(&request.commit_sha))
                    } else if let Some(outcome) = self.poll_once(request).await? {
                        ResolverState::Terminal(outcome)
                    } else {
                        info!(attempt, "Url unavailable. Attempt {}.", attempt);
                        sleep(POLL_INTERVAL).await;
                        ResolverState::Polling {
                            attempt: attempt + 1,
                        }
                    }
                }
            };
        }
    }

    /// Run a single poll. `None` means nothing terminal was observed.
    pub async fn poll_once(
        &self,
        request: &ResolutionRequest,
    ) -> DirectoryResult<Option<ResolutionOutcome>> {
        let sha = request.commit_sha.as_str();
        let deployments = self.directory.list_deployments(&request.query()).await?;
        let listed = deployments.len();
        let relevant = relevant_deployments(deployments, request.app.as_deref());
        debug!(sha, listed, relevant = relevant.len(), "listed deployments");

        if relevant.len() > 1 {
            return Ok(Some(ResolutionOutcome::multiple_deployments(
                sha,
                relevant.len(),
            )));
        }

        for deployment in &relevant {
            let statuses = self
                .directory
                .list_deployment_statuses(&request.repository, deployment.id)
                .await?;
            debug!(
                deployment_id = deployment.id,
                statuses = statuses.len(),
                "listed deployment statuses"
            );

            if let Some(outcome) = evaluate_statuses(sha, &statuses) {
                return Ok(Some(outcome));
            }
        }

        Ok(None)
    }
}

/// Decide a deployment's outcome from its status history.
///
/// A `success` anywhere in the list wins, taking the first one in directory
/// order; otherwise the first `failure`. Anything else, including an empty
/// history, is still pending.
pub fn evaluate_statuses(sha: &str, statuses: &[DeploymentStatus]) -> Option<ResolutionOutcome> {
    if let Some(success) = first_in_state(statuses, DeploymentState::Success) {
        return Some(ResolutionOutcome::success(target_url(success, sha)));
    }

    first_in_state(statuses, DeploymentState::Failure)
        .map(|failure| ResolutionOutcome::deployment_failed(sha, target_url(failure, sha)))
}

fn first_in_state(statuses: &[DeploymentStatus], state: DeploymentState) -> Option<&DeploymentStatus> {
    statuses.iter().find(|status| status.state == state)
}

fn target_url(status: &DeploymentStatus, sha: &str) -> String {
    match &status.target_url {
        Some(url) => url.clone(),
        None => {
            warn!(sha, state = %status.state, "deployment status has no target_url");
            String::new()
        }
    }
}
