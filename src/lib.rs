//! Run a block of text as a sequence of subprocesses.
//!
//! Each non-blank line of the block is one command. Lines ending in a
//! backslash continue on the next line, and `#` starts a comment. Every
//! command is launched with one of four primitives:
//!
//! - [`call`]: return each exit status
//! - [`check_call`]: stop at the first nonzero exit
//! - [`check_output`]: return each command's standard output
//! - [`run`]: return a [`CompletedProcess`] per command
//!
//! ```no_run
//! let results = runs::check_output(
//!     "echo BEGIN   # marker
//!      ls -a -1
//!      echo END",
//! )?;
//! assert_eq!(results.len(), 3);
//! # Ok::<(), runs::Error>(())
//! ```
//!
//! For anything beyond defaults configure a [`Runs`]:
//!
//! ```no_run
//! use runs::{Primitive, Runs};
//!
//! let runs = Runs::new(Primitive::CheckCall).echo(true).on_exception("!");
//! for result in runs.iter("make build\nmake test")? {
//!     println!("{:?}", result?);
//! }
//! # Ok::<(), runs::Error>(())
//! ```
pub use runs_core::*;
