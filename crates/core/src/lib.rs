//! runs - run a block of text as a sequence of subprocesses
//!
//! This crate provides functionality to:
//! - Split a command block into logical lines (blank lines, comments, backslash continuations)
//! - Tokenize each line into shell words, or re-quote it for shell mode
//! - Launch every line with one of four primitives and apply a failure policy
pub mod command;
pub mod config;
pub mod error;
pub mod parser;
pub mod runner;

// Re-export commonly used types and traits
pub use error::{Error, InvocationError, Result};

// Re-export main API components
pub use command::{
    Captured, Encoding, Invocation, Launcher, ProcessOptions, SystemLauncher,
};
pub use config::RunsConfig;
pub use parser::{split_lines, tokenize, CommandBlock, Splitter};
pub use runner::{
    call, check_call, check_output, run, CompletedProcess, Completion, Echo, OnException,
    Primitive, Results, Runs,
};
