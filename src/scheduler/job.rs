use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Finished,
    Failed,
}

impl JobStatus {
    /// Finished and failed jobs never run again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Finished => write!(f, "finished"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A run-queue entry: what the scheduler needs to dispatch one quantum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: u64,
    pub command: String,
    pub priority: i32,
    pub completed: bool,
}

impl Job {
    pub fn new(id: u64, command: String, priority: i32) -> Self {
        Self {
            id,
            command,
            priority,
            completed: false,
        }
    }
}

/// Snapshot of a submitted job as kept in the job table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    pub id: u64,
    pub command: String,
    pub priority: i32,
    pub status: JobStatus,
    /// Number of time slices the job has been dispatched for
    pub quanta: u32,
    pub exit_code: Option<i32>,
    /// Terminating signal, when the job was killed by one
    pub signal: Option<i32>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobInfo {
    pub fn new(id: u64, command: String, priority: i32) -> Self {
        Self {
            id,
            command,
            priority,
            status: JobStatus::Queued,
            quanta: 0,
            exit_code: None,
            signal: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// One-line rendering used by `procs` and `info`.
    pub fn describe(&self, detailed: bool) -> String {
        if detailed {
            format!(
                "Process ID: {}, Command: {}, Priority: {}, Completed: {}",
                self.id,
                self.command,
                self.priority,
                if self.completed() { "Yes" } else { "No" }
            )
        } else {
            format!("Process ID: {}, Command: {}", self.id, self.command)
        }
    }
}
