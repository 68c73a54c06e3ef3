//! Process invocation: what to launch, with which options, and how

pub mod invocation;
pub mod launcher;
pub mod options;
pub mod output;

// Re-export commonly used types
pub use invocation::Invocation;
pub use launcher::{Launcher, SystemLauncher};
pub use options::ProcessOptions;
pub use output::{Capture, Captured, Encoding, RawOutput};
