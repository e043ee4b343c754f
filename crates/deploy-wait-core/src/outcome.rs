//! Terminal outcomes of a resolution.

use serde::Serialize;
use thiserror::Error;

/// Why a resolution ended in failure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    #[error("There should be only one deployment for {sha} but found {count} instead.")]
    MultipleDeploymentsFound { sha: String, count: usize },

    #[error("Deployment failed for {sha}. {target_url}")]
    DeploymentFailed { sha: String, target_url: String },

    #[error("Timeout reached before deployment for {sha} was found.")]
    Timeout { sha: String },
}

/// The single result a resolution produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Success { url: String },
    Failed { reason: FailureReason },
    TimedOut { reason: FailureReason },
}

impl ResolutionOutcome {
    pub fn success(url: impl Into<String>) -> Self {
        ResolutionOutcome::Success { url: url.into() }
    }

    pub fn multiple_deployments(sha: &str, count: usize) -> Self {
        ResolutionOutcome::Failed {
            reason: FailureReason::MultipleDeploymentsFound {
                sha: sha.to_string(),
                count,
            },
        }
    }

    pub fn deployment_failed(sha: &str, target_url: impl Into<String>) -> Self {
        ResolutionOutcome::Failed {
            reason: FailureReason::DeploymentFailed {
                sha: sha.to_string(),
                target_url: target_url.into(),
            },
        }
    }

    pub fn timed_out(sha: &str) -> Self {
        ResolutionOutcome::TimedOut {
            reason: FailureReason::Timeout {
                sha: sha.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResolutionOutcome::Success { .. })
    }

    /// The deployment URL, for successful outcomes.
    pub fn url(&self) -> Option<&str> {
        match self {
            ResolutionOutcome::Success { url } => Some(url),
            _ => None,
        }
    }

    /// The failure reason, for unsuccessful outcomes.
    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            ResolutionOutcome::Success { .. } => None,
            ResolutionOutcome::Failed { reason } | ResolutionOutcome::TimedOut { reason } => {
                Some(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_messages_name_the_commit() {
        let outcome = ResolutionOutcome::multiple_deployments("abc123", 2);
        assert_eq!(
            outcome.failure().unwrap().to_string(),
            "There should be only one deployment for abc123 but found 2 instead."
        );

        let outcome = ResolutionOutcome::deployment_failed("abc123", "https://logs.test/1");
        assert_eq!(
            outcome.failure().unwrap().to_string(),
            "Deployment failed for abc123. https://logs.test/1"
        );

        let outcome = ResolutionOutcome::timed_out("abc123");
        assert_eq!(
            outcome.failure().unwrap().to_string(),
            "Timeout reached before deployment for abc123 was found."
        );
    }

    #[test]
    fn success_has_url_and_no_failure() {
        let outcome = ResolutionOutcome::success("https://preview.test");
        assert!(outcome.is_success());
        assert_eq!(outcome.url(), Some("https://preview.test"));
        assert!(outcome.failure().is_none());
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(ResolutionOutcome::timed_out("abc")).unwrap();
        assert_eq!(json["outcome"], "timed_out");
        assert_eq!(json["reason"]["kind"], "timeout");
        assert_eq!(json["reason"]["sha"], "abc");
    }
}
