use tracing::{debug, warn};

use super::policy::FailureHandler;
use super::Runs;
use crate::error::{Error, Result};
use crate::parser::Splitter;
use crate::Completion;

/// Lazy sequence of per-line results.
///
/// Nothing is launched until `next` is called, and each call launches at most
/// one process. Dropping the iterator stops the block. The first fatal error
/// is yielded once and then the iterator is exhausted.
pub struct Results<'r, 'b> {
    runs: &'r Runs,
    lines: Splitter<'b>,
    on_failure: Option<FailureHandler>,
    finished: bool,
}

impl<'r, 'b> Results<'r, 'b> {
    pub(crate) fn new(runs: &'r Runs, lines: Splitter<'b>) -> Self {
        Self {
            runs,
            lines,
            on_failure: runs.on_exception.handler(),
            finished: false,
        }
    }

    fn fail(&mut self, error: Error) -> Option<Result<Completion>> {
        self.finished = true;
        Some(Err(error))
    }
}

impl Iterator for Results<'_, '_> {
    type Item = Result<Completion>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return self.fail(e),
            };

            let invocation = match self.runs.invocation_for(&line) {
                Ok(Some(invocation)) => invocation,
                Ok(None) => {
                    debug!("Skipping comment-only line: {}", line);
                    continue;
                }
                Err(e) => return self.fail(e),
            };

            debug!("{}: {}", self.runs.primitive, invocation);
            let outcome = self.runs.primitive.invoke(
                self.runs.launcher.as_ref(),
                &invocation,
                &self.runs.options,
                self.runs.encoding,
            );

            match outcome {
                Ok(completion) => return Some(Ok(completion)),
                Err(source) => match &self.on_failure {
                    Some(handler) => {
                        warn!("Ignoring failure of `{}`: {}", line, source);
                        handler(&line, &source);
                    }
                    None => return self.fail(Error::Invocation { line, source }),
                },
            }
        }
    }
}
