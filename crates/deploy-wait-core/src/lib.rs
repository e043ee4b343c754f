//! deploy-wait core
//!
//! Waits for a remote deployment of a commit to reach a terminal state.
//!
//! ## Flow
//!
//! 1. [`commit_sha_for_event`] derives the commit from the triggering event.
//! 2. [`DeploymentResolver`] polls a [`DeploymentDirectory`] for that commit,
//!    narrowing by application payload, until success, failure or timeout.
//! 3. [`report`] hands the single [`ResolutionOutcome`] to a [`ResultSink`].

pub mod directory;
pub mod domain;
pub mod error;
pub mod event;
pub mod fakes;
pub mod filter;
pub mod outcome;
pub mod resolver;
pub mod sink;
pub mod telemetry;
pub mod wait;

pub use directory::DeploymentDirectory;
pub use domain::{
    Deployment, DeploymentQuery, DeploymentState, DeploymentStatus, RepositoryRef,
    ResolutionRequest,
};
pub use error::{
    DirectoryError, DirectoryResult, EventError, RepositoryParseError, Result, WaitError,
};
pub use event::{commit_sha_for_event, EventKind};
pub use filter::relevant_deployments;
pub use outcome::{FailureReason, ResolutionOutcome};
pub use resolver::{evaluate_statuses, DeploymentResolver, ResolverState, POLL_INTERVAL};
pub use sink::{report, report_error, ResultSink, URL_OUTPUT};
pub use telemetry::init_tracing;
pub use wait::{wait_for_deployment, WaitInputs};
