//! Application filtering over deployment payloads.
//!
//! Payload decoding is best-effort: anything that does not decode to an
//! object with a string `app` field simply does not match.

use serde_json::Value;

use crate::domain::Deployment;

impl Deployment {
    /// The `app` named in this deployment's payload, if it can be decoded.
    ///
    /// Accepts both an object payload and a JSON-encoded string payload.
    pub fn app_name(&self) -> Option<String> {
        let decoded;
        let object = match &self.payload {
            Value::Object(_) => &self.payload,
            Value::String(raw) => {
                decoded = serde_json::from_str::<Value>(raw).ok()?;
                &decoded
            }
            _ => return None,
        };
        object.get("app")?.as_str().map(str::to_string)
    }

    /// Whether this deployment belongs to `app`.
    pub fn matches_app(&self, app: &str) -> bool {
        self.app_name().as_deref() == Some(app)
    }
}

/// Keep the deployments relevant to `app`. With no filter every deployment is
/// relevant.
pub fn relevant_deployments(deployments: Vec<Deployment>, app: Option<&str>) -> Vec<Deployment> {
    match app {
        Some(app) => deployments
            .into_iter()
            .filter(|deployment| deployment.matches_app(app))
            .collect(),
        None => deployments,
    }
}
