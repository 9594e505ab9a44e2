pub mod job;
pub mod queue;
pub mod round_robin;
pub mod table;

pub use job::{Job, JobInfo, JobStatus};
pub use queue::JobQueue;
pub use round_robin::RoundRobin;
pub use table::JobTable;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::error::{Result, ShellError};

/// Handle to the job-scheduling core.
///
/// Cheap to clone; all clones share the same run queue and job table. The
/// command handler submits and inspects jobs through it while the
/// [`RoundRobin`] loop, started with [`Scheduler::start`], executes them.
#[derive(Debug, Clone)]
pub struct Scheduler {
    pub config: SchedulerConfig,
    pub queue: Arc<JobQueue>,
    pub table: Arc<RwLock<JobTable>>,
    next_id: Arc<AtomicU64>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            queue: Arc::new(JobQueue::new()),
            table: Arc::new(RwLock::new(JobTable::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Spawn the round-robin loop on the tokio runtime.
    ///
    /// The loop runs until `token` is cancelled; the returned handle resolves
    /// once every stopped child has been killed and reaped.
    pub fn start(&self, token: CancellationToken) -> JoinHandle<()> {
        let round_robin = RoundRobin::new(self.clone());
        tokio::spawn(round_robin.run(token))
    }

    /// Submit a command line as a new job with the default priority.
    ///
    /// Ids are assigned sequentially from 1.
    pub async fn submit(&self, command: impl Into<String>) -> u64 {
        let command = command.into();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        // Record first so the loop always finds the job in the table.
        self.table
            .write()
            .await
            .insert(JobInfo::new(id, command.clone(), 0));
        self.queue.enqueue(id, command, 0);

        tracing::debug!(job_id = id, "Job submitted");
        id
    }

    /// Snapshots of every submitted job, in submission order.
    pub async fn list_jobs(&self) -> Vec<JobInfo> {
        self.table
            .read()
            .await
            .all_jobs()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn get_job(&self, id: u64) -> Result<JobInfo> {
        self.table
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(ShellError::JobNotFound(id))
    }

    /// Change a job's advisory priority. Ordering stays FIFO.
    pub async fn set_priority(&self, id: u64, priority: i32) -> Result<()> {
        let mut table = self.table.write().await;
        if !table.set_priority(id, priority) {
            return Err(ShellError::JobNotFound(id));
        }
        // A job that is mid-slice is not in the queue; it picks the new
        // value up from the table when it is requeued.
        self.queue.set_priority(id, priority);
        tracing::debug!(job_id = id, priority, "Job priority changed");
        Ok(())
    }

    /// Number of jobs not yet finished or failed
    pub async fn outstanding(&self) -> usize {
        self.table.read().await.outstanding()
    }

    /// Wait until every submitted job has finished or failed.
    pub async fn wait_for_all(&self) {
        let mut rx = self.table.read().await.subscribe();
        loop {
            if *rx.borrow_and_update() == 0 {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}
