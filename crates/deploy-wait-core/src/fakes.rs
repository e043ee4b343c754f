//! In-memory fakes (testing only)
//!
//! `MemoryDirectory` serves scripted deployments and status histories and
//! records every call; `MemorySink` records what a run reported.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::directory::DeploymentDirectory;
use crate::domain::{Deployment, DeploymentQuery, DeploymentStatus, RepositoryRef};
use crate::error::{DirectoryError, DirectoryResult};
use crate::sink::{ResultSink, URL_OUTPUT};

// ---------------------------------------------------------------------------
// MemoryDirectory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct DirectoryState {
    deployments: Vec<Deployment>,
    /// Status histories per deployment. Each call takes the front entry; the
    /// last entry keeps being served.
    statuses: HashMap<u64, VecDeque<Vec<DeploymentStatus>>>,
    failure: Option<DirectoryError>,
    queries: Vec<DeploymentQuery>,
    status_requests: Vec<u64>,
}

/// In-memory deployment directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    state: Mutex<DirectoryState>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_deployment(&self, deployment: Deployment) {
        self.state.lock().unwrap().deployments.push(deployment);
    }

    /// Serve `statuses` for every subsequent status request of `deployment_id`.
    pub fn set_statuses(&self, deployment_id: u64, statuses: Vec<DeploymentStatus>) {
        self.script_statuses(deployment_id, vec![statuses]);
    }

    /// Serve one history per request, repeating the last one.
    pub fn script_statuses(&self, deployment_id: u64, histories: Vec<Vec<DeploymentStatus>>) {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(deployment_id, histories.into());
    }

    /// Fail every subsequent call with `err`.
    pub fn fail_with(&self, err: DirectoryError) {
        self.state.lock().unwrap().failure = Some(err);
    }

    pub fn queries(&self) -> Vec<DeploymentQuery> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn deployment_calls(&self) -> usize {
        self.state.lock().unwrap().queries.len()
    }

    /// Deployment ids whose statuses were requested, in call order.
    pub fn status_requests(&self) -> Vec<u64> {
        self.state.lock().unwrap().status_requests.clone()
    }
}

#[async_trait]
impl DeploymentDirectory for MemoryDirectory {
    async fn list_deployments(&self, query: &DeploymentQuery) -> DirectoryResult<Vec<Deployment>> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(query.clone());
        if let Some(err) = &state.failure {
            return Err(err.clone());
        }
        Ok(state
            .deployments
            .iter()
            .filter(|d| d.sha == query.sha)
            .filter(|d| match &query.environment {
                Some(env) => d.environment.as_deref() == Some(env.as_str()),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn list_deployment_statuses(
        &self,
        _repository: &RepositoryRef,
        deployment_id: u64,
    ) -> DirectoryResult<Vec<DeploymentStatus>> {
        let mut state = self.state.lock().unwrap();
        state.status_requests.push(deployment_id);
        if let Some(err) = &state.failure {
            return Err(err.clone());
        }
        let histories = match state.statuses.get_mut(&deployment_id) {
            Some(histories) => histories,
            None => return Ok(Vec::new()),
        };
        let statuses = if histories.len() > 1 {
            histories.pop_front().unwrap_or_default()
        } else {
            histories.front().cloned().unwrap_or_default()
        };
        Ok(statuses)
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Something a run reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Output { name: String, value: String },
    Failed(String),
}

/// Result sink that records emissions.
#[derive(Debug, Default)]
pub struct MemorySink {
    emissions: Vec<Emission>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emissions(&self) -> &[Emission] {
        &self.emissions
    }
}

impl ResultSink for MemorySink {
    fn succeed(&mut self, url: &str) -> std::io::Result<()> {
        self.emissions.push(Emission::Output {
            name: URL_OUTPUT.to_string(),
            value: url.to_string(),
        });
        Ok(())
    }

    fn fail(&mut self, message: &str) -> std::io::Result<()> {
        self.emissions.push(Emission::Failed(message.to_string()));
        Ok(())
    }
}
