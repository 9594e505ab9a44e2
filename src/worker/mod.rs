//! Process control for scheduled jobs.
//!
//! The scheduler loop never touches OS processes directly; it goes through
//! [`JobExecutor`]:
//!
//! 1. [`JobExecutor::spawn`] starts `sh -c <command>` in its own process group
//! 2. [`JobExecutor::run_quantum`] lets it run for one time slice, then sends SIGSTOP
//! 3. [`JobExecutor::resume`] sends SIGCONT when the job's next slice comes up
//! 4. [`JobExecutor::terminate`] kills and reaps a stopped job at shutdown
//!
//! Unix only: suspension relies on process groups and job-control signals.

pub mod executor;

pub use executor::{JobExecutor, QuantumOutcome};
