use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvocationError};

/// Which standard streams a launch should capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capture {
    pub stdout: bool,
    pub stderr: bool,
}

impl Capture {
    pub const NONE: Capture = Capture {
        stdout: false,
        stderr: false,
    };
    pub const STDOUT: Capture = Capture {
        stdout: true,
        stderr: false,
    };
    pub const ALL: Capture = Capture {
        stdout: true,
        stderr: true,
    };
}

/// What a launcher reports back for one finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    pub code: i32,
    pub stdout: Option<Vec<u8>>,
    pub stderr: Option<Vec<u8>>,
}

/// Contents of a captured stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Captured {
    Text(String),
    Bytes(Vec<u8>),
}

impl Captured {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Captured::Text(text) => Some(text),
            Captured::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Captured::Text(text) => text.as_bytes(),
            Captured::Bytes(bytes) => bytes,
        }
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        match self {
            Captured::Text(text) => Cow::Borrowed(text),
            Captured::Bytes(bytes) => String::from_utf8_lossy(bytes),
        }
    }
}

/// How captured bytes are turned into results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Strict UTF-8; invalid output fails the invocation
    #[default]
    Utf8,
    /// UTF-8 with invalid sequences replaced
    Utf8Lossy,
    /// No decoding
    Bytes,
}

impl Encoding {
    pub fn decode(self, bytes: Vec<u8>) -> Result<Captured, InvocationError> {
        match self {
            Encoding::Utf8 => Ok(Captured::Text(String::from_utf8(bytes)?)),
            Encoding::Utf8Lossy => Ok(Captured::Text(
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
            Encoding::Bytes => Ok(Captured::Bytes(bytes)),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Utf8Lossy => "utf8-lossy",
            Encoding::Bytes => "bytes",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "utf8-lossy" | "utf-8-lossy" | "lossy" => Ok(Encoding::Utf8Lossy),
            "bytes" | "binary" | "none" => Ok(Encoding::Bytes),
            _ => Err(Error::Misuse(format!("unknown encoding: {s}"))),
        }
    }
}
