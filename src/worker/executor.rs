use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, Command};

use crate::config::SchedulerConfig;
use crate::error::{Result, ShellError};
use crate::scheduler::Job;

/// How a single time slice ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantumOutcome {
    /// The child exited or was killed by a signal; it has been reaped.
    Exited(ExitStatus),
    /// The slice elapsed; the child's process group is now stopped.
    Preempted,
}

impl QuantumOutcome {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            QuantumOutcome::Exited(status) => status.code(),
            QuantumOutcome::Preempted => None,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match self {
            QuantumOutcome::Exited(status) => status.signal(),
            QuantumOutcome::Preempted => None,
        }
    }
}

/// Runs job command lines as child processes, one time slice at a time.
///
/// Every job gets its own process group so that stopping, continuing and
/// killing reach the whole `sh -c` pipeline, not just the shell.
#[derive(Debug, Clone)]
pub struct JobExecutor {
    shell: PathBuf,
    quantum: Duration,
    inherit_output: bool,
}

impl JobExecutor {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            shell: config.shell.clone(),
            quantum: config.quantum(),
            inherit_output: config.inherit_output,
        }
    }

    pub fn quantum(&self) -> Duration {
        self.quantum
    }

    /// Start `<shell> -c <command>` in a new process group.
    pub fn spawn(&self, job: &Job) -> Result<Child> {
        tracing::debug!(job_id = job.id, shell = %self.shell.display(), "Spawning job");

        let mut command = Command::new(&self.shell);
        command
            .arg("-c")
            .arg(&job.command)
            .stdin(Stdio::null())
            .process_group(0)
            .kill_on_drop(true);

        if !self.inherit_output {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        command.spawn().map_err(|source| ShellError::SpawnFailure {
            job_id: job.id,
            source,
        })
    }

    /// Let the child run for one quantum, then stop it.
    ///
    /// Returns early if the child exits before the slice is over.
    pub async fn run_quantum(&self, child: &mut Child) -> Result<QuantumOutcome> {
        tokio::select! {
            status = child.wait() => {
                return Ok(QuantumOutcome::Exited(status?));
            }
            _ = tokio::time::sleep(self.quantum) => {}
        }

        self.suspend(child)?;

        // The child may have exited between the timer firing and the stop.
        match child.try_wait()? {
            Some(status) => Ok(QuantumOutcome::Exited(status)),
            None => Ok(QuantumOutcome::Preempted),
        }
    }

    /// Stop the child's process group (SIGSTOP).
    pub fn suspend(&self, child: &Child) -> Result<()> {
        signal_group(child, Signal::SIGSTOP)
    }

    /// Continue a previously stopped process group (SIGCONT).
    pub fn resume(&self, child: &Child) -> Result<()> {
        signal_group(child, Signal::SIGCONT)
    }

    /// Kill the child's process group and reap the child.
    ///
    /// SIGKILL also ends stopped processes, so no SIGCONT is needed first.
    pub async fn terminate(&self, child: &mut Child) -> Result<ExitStatus> {
        signal_group(child, Signal::SIGKILL)?;
        Ok(child.wait().await?)
    }
}

/// Deliver `signal` to the process group led by `child`.
///
/// A child that has already been reaped has no pid; a group that no longer
/// exists yields ESRCH. Both are treated as delivered.
fn signal_group(child: &Child, signal: Signal) -> Result<()> {
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = pid as i32;

    match killpg(Pid::from_raw(pid), signal) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(source) => Err(ShellError::Signal { pid, source }),
    }
}
