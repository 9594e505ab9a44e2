use std::collections::HashMap;

use tokio::process::Child;
use tokio_util::sync::CancellationToken;

use crate::scheduler::{Job, Scheduler};
use crate::worker::{JobExecutor, QuantumOutcome};

/// The single worker loop that time-slices queued jobs.
///
/// Each iteration takes the head of the run queue, gives it one quantum,
/// and either records it as finished or stops it and appends it to the
/// tail again. Only one child runs at a time. Stopped children stay here,
/// keyed by job id, until their next slice.
pub struct RoundRobin {
    scheduler: Scheduler,
    executor: JobExecutor,
    suspended: HashMap<u64, Child>,
}

impl RoundRobin {
    pub fn new(scheduler: Scheduler) -> Self {
        let executor = JobExecutor::new(&scheduler.config);
        Self {
            scheduler,
            executor,
            suspended: HashMap::new(),
        }
    }

    /// Run until `token` is cancelled, then kill every stopped child.
    ///
    /// Cancellation is observed while waiting for work and during the
    /// inter-job delay; a slice that has started always runs to its end.
    pub async fn run(mut self, token: CancellationToken) {
        let delay = self.scheduler.config.delay();
        tracing::info!(
            quantum_ms = self.scheduler.config.quantum_ms,
            delay_ms = self.scheduler.config.delay_ms,
            "Scheduler started"
        );

        loop {
            let job = tokio::select! {
                _ = token.cancelled() => break,
                job = self.scheduler.queue.dequeue() => job,
            };

            self.run_slice(job).await;

            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.shutdown().await;
        tracing::info!("Scheduler stopped");
    }

    /// Give `job` one quantum and route it to its next state.
    pub async fn run_slice(&mut self, mut job: Job) {
        if job.completed {
            tracing::warn!(job_id = job.id, "Dequeued a job that already completed, dropping it");
            self.suspended.remove(&job.id);
            return;
        }

        tracing::info!(job_id = job.id, command = %job.command, "Running job");
        self.scheduler.table.write().await.mark_running(job.id);

        let mut child = match self.suspended.remove(&job.id) {
            Some(child) => {
                if let Err(e) = self.executor.resume(&child) {
                    tracing::warn!(job_id = job.id, error = %e, "Failed to resume job");
                }
                child
            }
            None => match self.executor.spawn(&job) {
                Ok(child) => child,
                Err(e) => {
                    tracing::error!(job_id = job.id, error = %e, "Job spawn failed, dropping job");
                    self.scheduler
                        .table
                        .write()
                        .await
                        .mark_failed(job.id, e.to_string());
                    return;
                }
            },
        };

        match self.executor.run_quantum(&mut child).await {
            Ok(QuantumOutcome::Preempted) => {
                let mut table = self.scheduler.table.write().await;
                if let Some(priority) = table.priority(job.id) {
                    job.priority = priority;
                }
                table.mark_queued(job.id);
                drop(table);

                tracing::debug!(job_id = job.id, "Quantum expired, requeueing job");
                self.suspended.insert(job.id, child);
                self.scheduler.queue.push(job);
            }
            Ok(outcome) => {
                job.completed = true;
                tracing::info!(
                    job_id = job.id,
                    exit_code = ?outcome.exit_code(),
                    signal = ?outcome.signal(),
                    "Job finished"
                );
                self.scheduler.table.write().await.mark_finished(
                    job.id,
                    outcome.exit_code(),
                    outcome.signal(),
                );
            }
            Err(e) => {
                tracing::error!(job_id = job.id, error = %e, "Lost control of job process");
                if let Err(e) = self.executor.terminate(&mut child).await {
                    tracing::warn!(job_id = job.id, error = %e, "Failed to kill job process");
                }
                self.scheduler
                    .table
                    .write()
                    .await
                    .mark_failed(job.id, e.to_string());
            }
        }
    }

    /// Number of jobs whose process is currently stopped between slices
    pub fn suspended_count(&self) -> usize {
        self.suspended.len()
    }

    /// Kill and reap every stopped child; their jobs are recorded as failed.
    pub async fn shutdown(&mut self) {
        if self.suspended.is_empty() {
            return;
        }
        tracing::info!(count = self.suspended.len(), "Terminating suspended jobs");

        let mut table = self.scheduler.table.write().await;
        for (id, mut child) in self.suspended.drain() {
            match self.executor.terminate(&mut child).await {
                Ok(status) => tracing::debug!(job_id = id, ?status, "Suspended job terminated"),
                Err(e) => tracing::warn!(job_id = id, error = %e, "Failed to terminate job"),
            }
            table.mark_failed(id, "terminated at shutdown".to_string());
        }
    }
}
