//! Command block parsing: logical line splitting and shell-word tokenization

pub mod splitter;
pub mod tokenize;

pub use splitter::{split_lines, CommandBlock, Splitter, CONTINUATION};
pub use tokenize::{quote_join, tokenize};
