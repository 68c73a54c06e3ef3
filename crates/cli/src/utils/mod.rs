pub mod file;

pub use file::{read_block, source_name};
