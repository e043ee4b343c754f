//! Result reporting.

use tracing::{error, info};

use crate::outcome::ResolutionOutcome;

/// Output name the deployment URL is published under.
pub const URL_OUTPUT: &str = "url";

/// Destination for the single result of a run.
pub trait ResultSink {
    /// Publish the deployment URL.
    fn succeed(&mut self, url: &str) -> std::io::Result<()>;

    /// Mark the run failed with `message`.
    fn fail(&mut self, message: &str) -> std::io::Result<()>;
}

/// Report `outcome` to `sink`. Returns whether the run succeeded.
pub fn report(sink: &mut dyn ResultSink, outcome: &ResolutionOutcome) -> std::io::Result<bool> {
    match outcome {
        ResolutionOutcome::Success { url } => {
            info!(url = %url, "deployment ready");
            sink.succeed(url)?;
            Ok(true)
        }
        ResolutionOutcome::Failed { reason } | ResolutionOutcome::TimedOut { reason } => {
            report_error(sink, reason)?;
            Ok(false)
        }
    }
}

/// Report any error that ended the run early.
pub fn report_error(
    sink: &mut dyn ResultSink,
    err: &dyn std::fmt::Display,
) -> std::io::Result<()> {
    let message = err.to_string();
    error!("{}", message);
    sink.fail(&message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{Emission, MemorySink};

    #[test]
    fn success_emits_url_only() {
        let mut sink = MemorySink::new();
        let ok = report(&mut sink, &ResolutionOutcome::success("https://preview.test")).unwrap();
        assert!(ok);
        assert_eq!(
            sink.emissions(),
            &[Emission::Output {
                name: URL_OUTPUT.to_string(),
                value: "https://preview.test".to_string(),
            }]
        );
    }

    #[test]
    fn timeout_emits_reason_and_fails() {
        let mut sink = MemorySink::new();
        let ok = report(&mut sink, &ResolutionOutcome::timed_out("abc123")).unwrap();
        assert!(!ok);
        assert_eq!(
            sink.emissions(),
            &[Emission::Failed(
                "Timeout reached before deployment for abc123 was found.".to_string()
            )]
        );
    }
}
