//! Shell-word tokenization and re-quoting

use crate::error::{Error, Result};

/// Split a logical line into shell words.
///
/// Quoting and escaping follow POSIX shell-word rules. A `#` that starts a
/// word outside quotes begins a comment and everything after it is dropped.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    shlex::split(line).ok_or_else(|| Error::Tokenize {
        line: line.to_string(),
        reason: "unbalanced quotes or trailing escape".to_string(),
    })
}

/// Join tokens into one string a POSIX shell parses back into the same words.
pub fn quote_join(line: &str, tokens: &[String]) -> Result<String> {
    shlex::try_join(tokens.iter().map(String::as_str)).map_err(|e| Error::Tokenize {
        line: line.to_string(),
        reason: e.to_string(),
    })
}

/// Number of `#` characters that survive comment stripping
pub(crate) fn surviving_hashes(tokens: &[String]) -> usize {
    tokens.join(" ").matches('#').count()
}
