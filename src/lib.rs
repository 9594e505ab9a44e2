pub mod config;
pub mod error;
pub mod fs;
pub mod scheduler;
pub mod shell;
pub mod shutdown;
pub mod worker;

pub use error::{Result, ShellError};
