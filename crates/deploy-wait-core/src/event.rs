//! Triggering-event interpretation.
//!
//! Maps the automation event that started the run to the commit whose
//! deployment we wait on. Pure: no I/O, no network.

use serde::Deserialize;
use serde_json::Value;

use crate::error::EventError;

/// Kind of the triggering event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PullRequest,
    Push,
    Other(String),
}

impl EventKind {
    pub fn is_supported(&self) -> bool {
        !matches!(self, EventKind::Other(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::PullRequest => "pull_request",
            EventKind::Push => "push",
            EventKind::Other(name) => name,
        }
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "pull_request" => EventKind::PullRequest,
            "push" => EventKind::Push,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
struct PullRequestEvent {
    pull_request: Option<PullRequest>,
}

#[derive(Deserialize)]
struct PullRequest {
    head: Option<PullRequestHead>,
}

#[derive(Deserialize)]
struct PullRequestHead {
    sha: Option<String>,
}

#[derive(Deserialize)]
struct PushEvent {
    head_commit: Option<HeadCommit>,
}

#[derive(Deserialize)]
struct HeadCommit {
    id: Option<String>,
}

/// Derive the commit SHA for `kind` from its event `payload`.
///
/// Unsupported kinds fail without inspecting the payload.
pub fn commit_sha_for_event(kind: &EventKind, payload: &Value) -> Result<String, EventError> {
    let sha = match kind {
        EventKind::PullRequest => {
            let event = PullRequestEvent::deserialize(payload)
                .map_err(|e| EventError::InvalidPayload(e.to_string()))?;
            event
                .pull_request
                .and_then(|pr| pr.head)
                .and_then(|head| head.sha)
                .ok_or_else(|| missing(kind, "pull_request.head.sha"))?
        }
        EventKind::Push => {
            let event = PushEvent::deserialize(payload)
                .map_err(|e| EventError::InvalidPayload(e.to_string()))?;
            event
                .head_commit
                .and_then(|commit| commit.id)
                .ok_or_else(|| missing(kind, "head_commit.id"))?
        }
        EventKind::Other(name) => return Err(EventError::UnsupportedEvent(name.clone())),
    };

    if sha.is_empty() {
        return Err(missing(kind, field_for(kind)));
    }
    Ok(sha)
}

fn field_for(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::PullRequest => "pull_request.head.sha",
        _ => "head_commit.id",
    }
}

fn missing(kind: &EventKind, field: &'static str) -> EventError {
    EventError::MissingCommitSha {
        event: kind.to_string(),
        field,
    }
}
