use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

/// Configuration for the round-robin scheduler loop.
///
/// Each dispatched job runs for one quantum, is stopped, and the loop then
/// sleeps for the inter-job delay before pulling the next job.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Length of one time slice
    pub quantum_ms: u64,
    /// Pause between two dispatches
    pub delay_ms: u64,
    /// Command interpreter used to run job command lines (`<shell> -c <command>`)
    pub shell: PathBuf,
    /// Let children write to this process's stdout/stderr.
    /// When false, job output is discarded.
    pub inherit_output: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            quantum_ms: 2000,
            delay_ms: 5000,
            shell: PathBuf::from("/bin/sh"),
            inherit_output: true,
        }
    }
}

impl SchedulerConfig {
    pub fn new(quantum_ms: u64, delay_ms: u64) -> Self {
        Self {
            quantum_ms,
            delay_ms,
            ..Default::default()
        }
    }

    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_inherit_output(mut self, inherit_output: bool) -> Self {
        self.inherit_output = inherit_output;
        self
    }

    pub fn quantum(&self) -> Duration {
        Duration::from_millis(self.quantum_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Behaviour switches for the in-memory file tree.
///
/// The default is the literal behaviour:
/// - renaming a directory leaves descendant paths untouched
/// - siblings may share a name
/// - `rmdir` only reaches direct children of `/`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FsConfig {
    /// Rewrite every descendant path when a directory is renamed.
    pub cascade_rename: bool,
    /// Reject a new directory or file whose name is already taken in the same directory.
    pub unique_names: bool,
    /// Allow deleting a directory at any depth, not only under `/`.
    pub deep_delete: bool,
}

impl FsConfig {
    /// All corrections enabled.
    pub fn strict() -> Self {
        Self {
            cascade_rename: true,
            unique_names: true,
            deep_delete: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Default)]
pub struct ShellConfig {
    pub scheduler: SchedulerConfig,
    pub fs: FsConfig,
    pub output: OutputFormat,
}

impl ShellConfig {
    pub fn new(scheduler: SchedulerConfig) -> Self {
        Self {
            scheduler,
            ..Default::default()
        }
    }

    pub fn with_fs(mut self, fs: FsConfig) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }
}
