//! External code formatter.
//!
//! Runs a configured command (for example `black` or `dart format`) over the
//! files a run touched. A formatter failure is reported to the caller and
//! never rolls back what was already written.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error)]
pub enum FormatterError {
    #[error("formatter command is empty")]
    EmptyCommand,

    #[error("failed to start '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("'{program}' exited with status {code}: {stderr}")]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },
}

impl FormatterError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptyCommand => vec![
                "Set [format] server / mobile in stitch.toml, e.g. server = \"black\"".into(),
            ],
            Self::Spawn { program, .. } => vec![
                format!("Check that '{program}' is installed and on PATH"),
                "Or drop --format to skip formatting".into(),
            ],
            Self::Failed { .. } => vec![
                "Generated files were written; fix the reported syntax and re-run the formatter"
                    .into(),
            ],
        }
    }
}

/// A formatter command line, split on whitespace. The target files are
/// appended as trailing arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFormatter {
    program: String,
    args: Vec<String>,
    extensions: Vec<String>,
}

impl ExternalFormatter {
    pub fn parse(command: &str) -> Result<Self, FormatterError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(FormatterError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
            extensions: Vec::new(),
        })
    }

    /// Restrict formatting to files with one of these extensions.
    pub fn only_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|x| x == ext))
    }

    /// Format `files`; returns the files handed to the formatter.
    #[instrument(skip_all, fields(program = %self.program, files = files.len()))]
    pub fn format(&self, files: &[PathBuf]) -> Result<Vec<PathBuf>, FormatterError> {
        let targets: Vec<PathBuf> = files.iter().filter(|p| self.accepts(p)).cloned().collect();
        if targets.is_empty() {
            debug!("nothing to format");
            return Ok(targets);
        }

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(&targets)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| FormatterError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = ?output.status.code(), "formatter failed");
            return Err(FormatterError::Failed {
                program: self.program.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        debug!(count = targets.len(), "files formatted");
        Ok(targets)
    }
}
