//! Splits a command block into logical lines.
//!
//! Physical lines ending in a backslash are glued to the following line with
//! no separator, the way a shell treats backslash-newline. Blank results are
//! dropped and each logical line is trimmed.

use tracing::debug;

use super::tokenize::{surviving_hashes, tokenize};
use crate::error::{Error, Result};

/// Trailing marker that joins a physical line to the next one
pub const CONTINUATION: char = '\\';

/// Characters that end a physical line. `\r\n` counts as one break.
pub const LINE_BREAKS: [char; 10] = [
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

/// Raw input: one string with embedded line breaks, or a sequence of lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandBlock<'a> {
    Text(&'a str),
    Lines(Vec<&'a str>),
}

impl<'a> CommandBlock<'a> {
    /// Reject blocks that cannot be split into physical lines unambiguously.
    pub fn validate(&self) -> Result<()> {
        if let CommandBlock::Lines(lines) = self {
            if let Some(line) = lines.iter().find(|l| l.contains(LINE_BREAKS)) {
                return Err(Error::Misuse(format!(
                    "line sequence element contains a line break: {line:?}"
                )));
            }
        }
        Ok(())
    }

    /// The physical lines of this block, in order
    pub fn physical_lines(&self) -> Vec<&'a str> {
        match self {
            CommandBlock::Text(text) => break_lines(text),
            CommandBlock::Lines(lines) => lines.clone(),
        }
    }
}

impl<'a> From<&'a str> for CommandBlock<'a> {
    fn from(text: &'a str) -> Self {
        CommandBlock::Text(text)
    }
}

impl<'a> From<&'a String> for CommandBlock<'a> {
    fn from(text: &'a String) -> Self {
        CommandBlock::Text(text)
    }
}

impl<'a> From<&'a [&'a str]> for CommandBlock<'a> {
    fn from(lines: &'a [&'a str]) -> Self {
        CommandBlock::Lines(lines.to_vec())
    }
}

impl<'a, const N: usize> From<&'a [&'a str; N]> for CommandBlock<'a> {
    fn from(lines: &'a [&'a str; N]) -> Self {
        CommandBlock::Lines(lines.to_vec())
    }
}

impl<'a> From<&'a [String]> for CommandBlock<'a> {
    fn from(lines: &'a [String]) -> Self {
        CommandBlock::Lines(lines.iter().map(String::as_str).collect())
    }
}

impl<'a> From<&'a Vec<String>> for CommandBlock<'a> {
    fn from(lines: &'a Vec<String>) -> Self {
        CommandBlock::from(lines.as_slice())
    }
}

/// Split `text` on every line break; a final break does not add an empty line.
fn break_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !LINE_BREAKS.contains(&c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' && chars.next_if(|&(_, next)| next == '\n').is_some() {
            start += 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Lazy iterator of logical lines.
///
/// Each call to `next` consumes physical lines until one logical line is
/// complete. After an error the iterator is exhausted.
pub struct Splitter<'a> {
    lines: std::vec::IntoIter<&'a str>,
    observer: Option<Box<dyn FnMut(&str) + 'a>>,
    buffer: String,
    done: bool,
}

impl<'a> Splitter<'a> {
    /// Fails with `Misuse` when a line sequence element holds a line break.
    pub fn new(block: impl Into<CommandBlock<'a>>) -> Result<Self> {
        let block = block.into();
        block.validate()?;
        Ok(Self {
            lines: block.physical_lines().into_iter(),
            observer: None,
            buffer: String::new(),
            done: false,
        })
    }

    /// Call `observer` with every raw physical line as it is read.
    pub fn with_observer(mut self, observer: impl FnMut(&str) + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn flush(&mut self) -> Option<String> {
        let logical = self.buffer.trim().to_string();
        self.buffer.clear();
        if logical.is_empty() {
            None
        } else {
            debug!("Logical line: {}", logical);
            Some(logical)
        }
    }
}

impl Iterator for Splitter<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while let Some(line) = self.lines.next() {
            if let Some(observer) = self.observer.as_mut() {
                observer(line);
            }

            if let Some(fragment) = line.strip_suffix(CONTINUATION) {
                if let Err(e) = check_continuation(line, fragment) {
                    self.done = true;
                    return Some(Err(e));
                }
                self.buffer.push_str(fragment);
                continue;
            }

            self.buffer.push_str(line);
            if let Some(logical) = self.flush() {
                return Some(Ok(logical));
            }
        }

        // A block may end on a continuation with nothing after it
        self.done = true;
        self.flush().map(Ok)
    }
}

/// A continuation is malformed when a comment would swallow it.
fn check_continuation(line: &str, fragment: &str) -> Result<()> {
    let malformed = || Error::MalformedContinuation {
        line: line.to_string(),
    };
    let tokens = tokenize(fragment).map_err(|_| malformed())?;
    if surviving_hashes(&tokens) != fragment.matches('#').count() {
        return Err(malformed());
    }
    Ok(())
}

/// Split a block into logical lines.
pub fn split_lines<'a>(block: impl Into<CommandBlock<'a>>) -> Result<Vec<String>> {
    Splitter::new(block)?.collect()
}
