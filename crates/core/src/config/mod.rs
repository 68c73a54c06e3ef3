//! Configuration file support

pub mod settings;

pub use settings::{RunsConfig, Toggle, CONFIG_FILE_NAMES};
