//! Line-oriented front end.
//!
//! A line is either an administrative verb (`procs`, `info`, `priority`,
//! `quit`), a file-tree verb (`mkdir`, `ls`, `tree`, ...), or a shell command
//! that is queued as a job. [`Dispatcher`] routes all three; [`run_batch`]
//! and [`run_interactive`] feed it from a file or from a reader.

pub mod batch;
pub mod command;
pub mod dispatcher;
pub mod interactive;

pub use batch::{run_batch, BatchReport};
pub use command::{Command, FsCommand};
pub use dispatcher::{Dispatcher, Reply};
pub use interactive::{run_interactive, PROMPT};
