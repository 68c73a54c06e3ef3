//! The four process-execution primitives

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::str::FromStr;

use crate::command::{Capture, Captured, Encoding, Invocation, Launcher, ProcessOptions};
use crate::error::{Error, InvocationError};

/// Selects how each line is launched and what counts as failure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    /// Wait and return the status code; never fails on nonzero exit
    Call,
    /// Wait and fail on nonzero exit
    CheckCall,
    /// Wait, fail on nonzero exit, return captured stdout
    CheckOutput,
    /// Wait and return a [`CompletedProcess`]
    #[default]
    Run,
}

impl Primitive {
    pub const ALL: [Primitive; 4] = [
        Primitive::Call,
        Primitive::CheckCall,
        Primitive::CheckOutput,
        Primitive::Run,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Call => "call",
            Primitive::CheckCall => "check_call",
            Primitive::CheckOutput => "check_output",
            Primitive::Run => "run",
        }
    }

    fn capture(self, options: &ProcessOptions) -> Capture {
        match self {
            Primitive::Call | Primitive::CheckCall => Capture::NONE,
            Primitive::CheckOutput => Capture::STDOUT,
            Primitive::Run if options.capture_output => Capture::ALL,
            Primitive::Run => Capture::NONE,
        }
    }

    fn checks_status(self, options: &ProcessOptions) -> bool {
        match self {
            Primitive::Call => false,
            Primitive::CheckCall | Primitive::CheckOutput => true,
            Primitive::Run => options.check,
        }
    }

    /// Launch one invocation and shape its outcome.
    pub fn invoke(
        self,
        launcher: &dyn Launcher,
        invocation: &Invocation,
        options: &ProcessOptions,
        encoding: Encoding,
    ) -> Result<Completion, InvocationError> {
        let raw = launcher
            .launch(invocation, options, self.capture(options))
            .map_err(|source| {
                let program = invocation.program().to_string();
                match options.timeout {
                    Some(timeout) if source.kind() == io::ErrorKind::TimedOut => {
                        InvocationError::Timeout { program, timeout }
                    }
                    _ => InvocationError::Launch { program, source },
                }
            })?;

        if raw.code != 0 && self.checks_status(options) {
            return Err(InvocationError::NonZeroExit {
                code: raw.code,
                stderr: raw
                    .stderr
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()),
            });
        }

        match self {
            Primitive::Call | Primitive::CheckCall => Ok(Completion::Status(raw.code)),
            Primitive::CheckOutput => Ok(Completion::Output(
                encoding.decode(raw.stdout.unwrap_or_default())?,
            )),
            Primitive::Run => Ok(Completion::Completed(CompletedProcess {
                args: invocation.clone(),
                returncode: raw.code,
                stdout: raw.stdout.map(|b| encoding.decode(b)).transpose()?,
                stderr: raw.stderr.map(|b| encoding.decode(b)).transpose()?,
            })),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Primitive {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "call" => Ok(Primitive::Call),
            "check_call" => Ok(Primitive::CheckCall),
            "check_output" => Ok(Primitive::CheckOutput),
            "run" => Ok(Primitive::Run),
            _ => Err(Error::Misuse(format!("unknown primitive: {s}"))),
        }
    }
}

/// Result of `run`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedProcess {
    pub args: Invocation,
    pub returncode: i32,
    pub stdout: Option<Captured>,
    pub stderr: Option<Captured>,
}

/// What one successful line produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Completion {
    Status(i32),
    Output(Captured),
    Completed(CompletedProcess),
}

impl Completion {
    /// Exit status, when the primitive reports one
    pub fn code(&self) -> Option<i32> {
        match self {
            Completion::Status(code) => Some(*code),
            Completion::Completed(process) => Some(process.returncode),
            Completion::Output(_) => None,
        }
    }

    /// Captured standard output, when there is any
    pub fn stdout(&self) -> Option<&Captured> {
        match self {
            Completion::Output(output) => Some(output),
            Completion::Completed(process) => process.stdout.as_ref(),
            Completion::Status(_) => None,
        }
    }
}
