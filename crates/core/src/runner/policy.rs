//! Echo and failure policies.
//!
//! Both are tagged values resolved once per call into a single callback, so
//! the per-line loop never branches on how the policy was configured.

use std::fmt;
use std::sync::Arc;

use crate::error::InvocationError;

/// Prefix printed before each echoed physical line by [`Echo::Marker`]
pub const ECHO_MARKER: &str = "$";

/// Observer of raw physical lines
pub type Observer = Arc<dyn Fn(&str) + Send + Sync>;

/// Receives the logical line whose invocation failed
pub type FailureHandler = Arc<dyn Fn(&str, &InvocationError) + Send + Sync>;

/// What to do with each physical line as it is read
#[derive(Clone, Default)]
pub enum Echo {
    #[default]
    Disabled,
    /// Print to stdout prefixed with [`ECHO_MARKER`]
    Marker,
    /// Print to stdout prefixed with the given string
    Prefix(String),
    Callback(Observer),
}

impl Echo {
    pub fn callback(f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Echo::Callback(Arc::new(f))
    }

    pub(crate) fn observer(&self) -> Option<Observer> {
        match self {
            Echo::Disabled => None,
            Echo::Marker => Some(print_prefixed(ECHO_MARKER.to_string())),
            Echo::Prefix(prefix) => Some(print_prefixed(prefix.clone())),
            Echo::Callback(observer) => Some(Arc::clone(observer)),
        }
    }
}

fn print_prefixed(prefix: String) -> Observer {
    Arc::new(move |line: &str| println!("{prefix} {line}"))
}

impl From<bool> for Echo {
    fn from(enabled: bool) -> Self {
        if enabled { Echo::Marker } else { Echo::Disabled }
    }
}

impl From<&str> for Echo {
    fn from(prefix: &str) -> Self {
        Echo::Prefix(prefix.to_string())
    }
}

impl From<String> for Echo {
    fn from(prefix: String) -> Self {
        Echo::Prefix(prefix)
    }
}

impl fmt::Debug for Echo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Echo::Disabled => f.write_str("Disabled"),
            Echo::Marker => f.write_str("Marker"),
            Echo::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Echo::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// What to do when one invocation fails
#[derive(Clone, Default)]
pub enum OnException {
    /// Return the error and run nothing further
    #[default]
    Propagate,
    /// Skip the failed line silently
    Ignore,
    /// Print the failed line to stderr prefixed with the given string
    Prefix(String),
    Callback(FailureHandler),
}

impl OnException {
    pub fn callback(f: impl Fn(&str, &InvocationError) + Send + Sync + 'static) -> Self {
        OnException::Callback(Arc::new(f))
    }

    /// `None` means failures propagate.
    pub(crate) fn handler(&self) -> Option<FailureHandler> {
        match self {
            OnException::Propagate => None,
            OnException::Ignore => Some(Arc::new(|_: &str, _: &InvocationError| {})),
            OnException::Prefix(prefix) => {
                let prefix = prefix.clone();
                Some(Arc::new(move |line: &str, _: &InvocationError| {
                    eprintln!("{prefix} {line}")
                }))
            }
            OnException::Callback(handler) => Some(Arc::clone(handler)),
        }
    }
}

impl From<bool> for OnException {
    fn from(suppress: bool) -> Self {
        if suppress { OnException::Ignore } else { OnException::Propagate }
    }
}

impl From<&str> for OnException {
    fn from(prefix: &str) -> Self {
        OnException::Prefix(prefix.to_string())
    }
}

impl From<String> for OnException {
    fn from(prefix: String) -> Self {
        OnException::Prefix(prefix)
    }
}

impl fmt::Debug for OnException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnException::Propagate => f.write_str("Propagate"),
            OnException::Ignore => f.write_str("Ignore"),
            OnException::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            OnException::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}
