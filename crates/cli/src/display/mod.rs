pub mod formatter;

pub use formatter::{write_completion, write_plan};
