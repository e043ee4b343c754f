//! GitHub Actions result sink.
//!
//! Success appends `url=<url>` to the file named by `GITHUB_OUTPUT`; failure
//! prints an `::error::` workflow command. The process exit code carries the
//! failed-run signal.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use deploy_wait_core::{ResultSink, URL_OUTPUT};

const MULTILINE_DELIMITER: &str = "DEPLOY_WAIT_EOF";

pub struct ActionsSink<W: Write> {
    output_file: Option<PathBuf>,
    out: W,
}

impl ActionsSink<std::io::Stdout> {
    pub fn new(output_file: Option<PathBuf>) -> Self {
        ActionsSink {
            output_file,
            out: std::io::stdout(),
        }
    }
}

impl<W: Write> ActionsSink<W> {
    pub fn with_writer(output_file: Option<PathBuf>, out: W) -> Self {
        ActionsSink { output_file, out }
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    fn set_output(&mut self, name: &str, value: &str) -> std::io::Result<()> {
        let line = output_line(name, value);
        match &self.output_file {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(line.as_bytes())
            }
            // Outside Actions there is no output file; print for the caller.
            None => self.out.write_all(line.as_bytes()),
        }
    }
}

impl<W: Write> ResultSink for ActionsSink<W> {
    fn succeed(&mut self, url: &str) -> std::io::Result<()> {
        self.set_output(URL_OUTPUT, url)
    }

    fn fail(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.out, "::error::{}", escape_data(message))?;
        self.out.flush()
    }
}

fn output_line(name: &str, value: &str) -> String {
    if value.contains('\n') || value.contains('\r') {
        format!(
            "{name}<<{delim}\n{value}\n{delim}\n",
            delim = MULTILINE_DELIMITER
        )
    } else {
        format!("{name}={value}\n")
    }
}

/// Escape a workflow-command message.
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
