use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Directory not found: {0}")]
    NotFound(String),

    #[error("File not found: {dir}/{name}")]
    FileNotFound { dir: String, name: String },

    #[error("Directory not empty: {0}")]
    NotEmpty(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Process ID {0} not found")]
    JobNotFound(u64),

    #[error("Failed to spawn job {job_id}: {source}")]
    SpawnFailure {
        job_id: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to signal process group {pid}: {source}")]
    Signal {
        pid: i32,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("Usage: {0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;
