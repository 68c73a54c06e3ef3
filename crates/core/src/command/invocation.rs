use serde::Serialize;
use std::fmt;

/// What gets handed to a launcher for one logical line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Invocation {
    /// Program followed by its arguments, run without a shell
    Argv(Vec<String>),
    /// One pre-quoted string for a shell to parse
    Shell(String),
}

impl Invocation {
    /// Program name for diagnostics: `argv[0]`, or the whole shell string
    pub fn program(&self) -> &str {
        match self {
            Invocation::Argv(argv) => argv.first().map(String::as_str).unwrap_or(""),
            Invocation::Shell(script) => script,
        }
    }

    pub fn is_shell(&self) -> bool {
        matches!(self, Invocation::Shell(_))
    }

    pub fn to_shell_command(&self) -> String {
        match self {
            Invocation::Shell(script) => script.clone(),
            Invocation::Argv(argv) => shlex::try_join(argv.iter().map(String::as_str))
                .unwrap_or_else(|_| argv.join(" ")),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell_command())
    }
}
