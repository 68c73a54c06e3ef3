//! The execution driver.
//!
//! [`Runs`] holds one primitive plus its configuration and runs whole command
//! blocks with it, either eagerly ([`Runs::execute`]) or one line per pull
//! ([`Runs::iter`]).

pub mod policy;
pub mod primitive;
pub mod results;

pub use policy::{Echo, FailureHandler, Observer, OnException, ECHO_MARKER};
pub use primitive::{CompletedProcess, Completion, Primitive};
pub use results::Results;

use std::fmt;
use std::sync::Arc;

use crate::command::{Encoding, Invocation, Launcher, ProcessOptions, SystemLauncher};
use crate::error::Result;
use crate::parser::{quote_join, tokenize, CommandBlock, Splitter};

/// A configured primitive that runs command blocks line by line
#[derive(Clone)]
pub struct Runs {
    primitive: Primitive,
    echo: Echo,
    on_exception: OnException,
    encoding: Encoding,
    options: ProcessOptions,
    launcher: Arc<dyn Launcher>,
}

impl Default for Runs {
    fn default() -> Self {
        Self::new(Primitive::Run)
    }
}

impl Runs {
    pub fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            echo: Echo::Disabled,
            on_exception: OnException::Propagate,
            encoding: Encoding::Utf8,
            options: ProcessOptions::default(),
            launcher: Arc::new(SystemLauncher),
        }
    }

    pub fn call() -> Self {
        Self::new(Primitive::Call)
    }

    pub fn check_call() -> Self {
        Self::new(Primitive::CheckCall)
    }

    pub fn check_output() -> Self {
        Self::new(Primitive::CheckOutput)
    }

    pub fn run() -> Self {
        Self::new(Primitive::Run)
    }

    pub fn echo(mut self, echo: impl Into<Echo>) -> Self {
        self.echo = echo.into();
        self
    }

    pub fn on_exception(mut self, policy: impl Into<OnException>) -> Self {
        self.on_exception = policy.into();
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn options(mut self, options: ProcessOptions) -> Self {
        self.options = options;
        self
    }

    pub fn shell(mut self, shell: bool) -> Self {
        self.options.shell = shell;
        self
    }

    pub fn launcher(mut self, launcher: impl Launcher + 'static) -> Self {
        self.launcher = Arc::new(launcher);
        self
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn process_options(&self) -> &ProcessOptions {
        &self.options
    }

    pub fn encoding_kind(&self) -> Encoding {
        self.encoding
    }

    /// Run every line of `block` and collect the results in order.
    ///
    /// Stops at the first failure unless the failure policy suppresses it.
    pub fn execute<'b>(&self, block: impl Into<CommandBlock<'b>>) -> Result<Vec<Completion>> {
        self.iter(block)?.collect()
    }

    /// Lazily run `block`, one line per call to `next`.
    ///
    /// Configuration and block shape are checked here, before anything runs.
    pub fn iter<'r, 'b>(
        &'r self,
        block: impl Into<CommandBlock<'b>>,
    ) -> Result<Results<'r, 'b>> {
        let mut lines = Splitter::new(block)?;
        self.options.validate(self.primitive)?;
        if let Some(observer) = self.echo.observer() {
            lines = lines.with_observer(move |line: &str| observer(line));
        }
        Ok(Results::new(self, lines))
    }

    /// Logical lines of `block` with what each would launch; runs nothing.
    pub fn plan<'b>(
        &self,
        block: impl Into<CommandBlock<'b>>,
    ) -> Result<Vec<(String, Invocation)>> {
        let lines = Splitter::new(block)?;
        self.options.validate(self.primitive)?;

        let mut planned = Vec::new();
        for line in lines {
            let line = line?;
            if let Some(invocation) = self.invocation_for(&line)? {
                planned.push((line, invocation));
            }
        }
        Ok(planned)
    }

    /// Tokenize one logical line; `None` for a line that is only a comment.
    pub fn invocation_for(&self, line: &str) -> Result<Option<Invocation>> {
        let tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Ok(None);
        }
        if self.options.shell {
            Ok(Some(Invocation::Shell(quote_join(line, &tokens)?)))
        } else {
            Ok(Some(Invocation::Argv(tokens)))
        }
    }
}

impl fmt::Debug for Runs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runs")
            .field("primitive", &self.primitive)
            .field("echo", &self.echo)
            .field("on_exception", &self.on_exception)
            .field("encoding", &self.encoding)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Run each line with `call`, default options.
pub fn call<'b>(block: impl Into<CommandBlock<'b>>) -> Result<Vec<Completion>> {
    Runs::call().execute(block)
}

/// Run each line with `check_call`, default options.
pub fn check_call<'b>(block: impl Into<CommandBlock<'b>>) -> Result<Vec<Completion>> {
    Runs::check_call().execute(block)
}

/// Run each line with `check_output`, default options.
pub fn check_output<'b>(block: impl Into<CommandBlock<'b>>) -> Result<Vec<Completion>> {
    Runs::check_output().execute(block)
}

/// Run each line with `run`, default options.
pub fn run<'b>(block: impl Into<CommandBlock<'b>>) -> Result<Vec<Completion>> {
    Runs::run().execute(block)
}
