//! Deployment domain model.
//!
//! These types mirror the subset of the deployment directory's records the
//! resolver reads. The directory owns them; nothing here mutates remote state.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RepositoryParseError;

/// Repository coordinate (`owner/name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepositoryRef {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl std::str::FromStr for RepositoryRef {
    type Err = RepositoryParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepositoryRef::new(owner, name))
            }
            _ => Err(RepositoryParseError(s.to_string())),
        }
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Everything the resolver needs for one run. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub repository: RepositoryRef,
    pub commit_sha: String,
    /// Only deployments whose payload carries this `app` are considered.
    pub app: Option<String>,
    /// Forwarded to the directory as a server-side narrowing.
    pub environment: Option<String>,
    pub timeout: Duration,
}

impl ResolutionRequest {
    pub fn new(repository: RepositoryRef, commit_sha: impl Into<String>, timeout: Duration) -> Self {
        ResolutionRequest {
            repository,
            commit_sha: commit_sha.into(),
            app: None,
            environment: None,
            timeout,
        }
    }

    /// Set the application filter. Empty strings leave the filter unset.
    pub fn with_app(mut self, app: Option<String>) -> Self {
        self.app = app.filter(|a| !a.is_empty());
        self
    }

    /// Set the environment. Empty strings leave it unset.
    pub fn with_environment(mut self, environment: Option<String>) -> Self {
        self.environment = environment.filter(|e| !e.is_empty());
        self
    }

    /// Directory query for deployments of this request's commit.
    pub fn query(&self) -> DeploymentQuery {
        DeploymentQuery {
            repository: self.repository.clone(),
            sha: self.commit_sha.clone(),
            environment: self.environment.clone(),
        }
    }
}

/// Parameters for listing deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentQuery {
    pub repository: RepositoryRef,
    pub sha: String,
    pub environment: Option<String>,
}

/// A deployment record: one attempt to release a commit to an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: u64,
    pub sha: String,
    #[serde(default)]
    pub environment: Option<String>,
    /// Opaque payload. Either a JSON object or a JSON-encoded string.
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Deployment {
    pub fn new(id: u64, sha: impl Into<String>, payload: serde_json::Value) -> Self {
        Deployment {
            id,
            sha: sha.into(),
            environment: None,
            payload,
            created_at: None,
        }
    }
}

/// Deployment status state. States the resolver does not act on collapse
/// into `Other` (`error`, `queued`, `in_progress`, `inactive`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Pending,
    Success,
    Failure,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeploymentState::Pending => "pending",
            DeploymentState::Success => "success",
            DeploymentState::Failure => "failure",
            DeploymentState::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// One entry of a deployment's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentStatus {
    pub state: DeploymentState,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DeploymentStatus {
    pub fn new(state: DeploymentState, target_url: Option<&str>) -> Self {
        DeploymentStatus {
            state,
            target_url: target_url.map(str::to_string),
            description: None,
        }
    }

    pub fn pending() -> Self {
        Self::new(DeploymentState::Pending, None)
    }

    pub fn success(target_url: &str) -> Self {
        Self::new(DeploymentState::Success, Some(target_url))
    }

    pub fn failure(target_url: &str) -> Self {
        Self::new(DeploymentState::Failure, Some(target_url))
    }
}
