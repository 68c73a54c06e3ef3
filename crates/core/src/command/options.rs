//! Options forwarded to every process launch

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::runner::Primitive;

/// Process options shared by every line of a block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Run each line through a shell as one quoted string
    pub shell: bool,
    /// Working directory for the children
    pub cwd: Option<PathBuf>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// Start from an empty environment instead of inheriting ours
    pub env_clear: bool,
    /// Program to execute instead of `argv[0]` (or instead of the default shell)
    pub executable: Option<PathBuf>,
    /// Text written to each child's standard input
    pub stdin: Option<String>,
    /// Capture stdout and stderr (`run` only)
    pub capture_output: bool,
    /// Fail on nonzero exit status (`run` only)
    pub check: bool,
    /// Kill a child that runs longer than this
    pub timeout: Option<Duration>,
}

impl ProcessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn with_env_clear(mut self, env_clear: bool) -> Self {
        self.env_clear = env_clear;
        self
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn with_capture_output(mut self, capture_output: bool) -> Self {
        self.capture_output = capture_output;
        self
    }

    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Reject option combinations the primitive cannot honour.
    pub fn validate(&self, primitive: Primitive) -> Result<()> {
        if primitive != Primitive::Run {
            if self.capture_output {
                return Err(Error::Misuse(format!(
                    "capture_output is only supported by run, not {primitive}"
                )));
            }
            if self.check {
                return Err(Error::Misuse(format!(
                    "check is only supported by run, not {primitive}"
                )));
            }
        }

        if let Some(executable) = &self.executable {
            if executable.as_os_str().is_empty() {
                return Err(Error::Misuse("executable must not be empty".to_string()));
            }
        }

        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(Error::Misuse("timeout must be greater than zero".to_string()));
        }

        if let Some((key, _)) = self
            .env
            .iter()
            .find(|(key, _)| key.is_empty() || key.contains(['=', '\0']))
        {
            return Err(Error::Misuse(format!(
                "invalid environment variable name: {key:?}"
            )));
        }

        Ok(())
    }
}
