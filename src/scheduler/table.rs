use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::watch;

use crate::scheduler::job::{JobInfo, JobStatus};

/// Record of every submitted job, keyed by id.
///
/// The run queue only holds jobs waiting for their next slice; the table keeps
/// all of them, including the one currently running and those that finished,
/// so listings and the completion barrier see the whole picture.
#[derive(Debug)]
pub struct JobTable {
    jobs: BTreeMap<u64, JobInfo>,
    outstanding: watch::Sender<usize>,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    pub fn new() -> Self {
        let (outstanding, _) = watch::channel(0);
        Self {
            jobs: BTreeMap::new(),
            outstanding,
        }
    }

    pub fn insert(&mut self, job: JobInfo) {
        self.jobs.insert(job.id, job);
        self.publish();
    }

    pub fn get(&self, id: u64) -> Option<&JobInfo> {
        self.jobs.get(&id)
    }

    /// All jobs in submission order
    pub fn all_jobs(&self) -> Vec<&JobInfo> {
        self.jobs.values().collect()
    }

    pub fn set_priority(&mut self, id: u64, priority: i32) -> bool {
        match self.jobs.get_mut(&id) {
            Some(job) => {
                job.priority = priority;
                true
            }
            None => false,
        }
    }

    pub fn priority(&self, id: u64) -> Option<i32> {
        self.jobs.get(&id).map(|j| j.priority)
    }

    /// Job was handed a time slice.
    pub fn mark_running(&mut self, id: u64) -> bool {
        match self.jobs.get_mut(&id) {
            Some(job) => {
                job.status = JobStatus::Running;
                job.quanta += 1;
                true
            }
            None => false,
        }
    }

    /// Job was preempted and put back in the run queue.
    pub fn mark_queued(&mut self, id: u64) -> bool {
        match self.jobs.get_mut(&id) {
            Some(job) => {
                job.status = JobStatus::Queued;
                true
            }
            None => false,
        }
    }

    pub fn mark_finished(&mut self, id: u64, exit_code: Option<i32>, signal: Option<i32>) -> bool {
        let updated = match self.jobs.get_mut(&id) {
            Some(job) => {
                job.status = JobStatus::Finished;
                job.exit_code = exit_code;
                job.signal = signal;
                job.completed_at = Some(Utc::now());
                true
            }
            None => false,
        };
        self.publish();
        updated
    }

    pub fn mark_failed(&mut self, id: u64, error: String) -> bool {
        let updated = match self.jobs.get_mut(&id) {
            Some(job) => {
                job.status = JobStatus::Failed;
                job.error = Some(error);
                job.completed_at = Some(Utc::now());
                true
            }
            None => false,
        };
        self.publish();
        updated
    }

    /// Number of jobs that have not reached a terminal status
    pub fn outstanding(&self) -> usize {
        self.jobs.values().filter(|j| !j.completed()).count()
    }

    /// Receiver that observes the outstanding count after every change.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.outstanding.subscribe()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn publish(&self) {
        self.outstanding.send_replace(self.outstanding());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(ids: &[u64]) -> JobTable {
        let mut table = JobTable::new();
        for &id in ids {
            table.insert(JobInfo::new(id, format!("echo {}", id), 0));
        }
        table
    }

    #[test]
    fn jobs_listed_in_id_order() {
        let table = table_with(&[3, 1, 2]);
        let ids: Vec<u64> = table.all_jobs().iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn running_counts_quanta() {
        let mut table = table_with(&[1]);
        table.mark_running(1);
        table.mark_queued(1);
        table.mark_running(1);
        let job = table.get(1).unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.quanta, 2);
    }

    #[test]
    fn outstanding_tracks_terminal_jobs() {
        let mut table = table_with(&[1, 2, 3]);
        let rx = table.subscribe();
        assert_eq!(*rx.borrow(), 3);

        table.mark_finished(1, Some(0), None);
        table.mark_failed(2, "boom".to_string());
        assert_eq!(table.outstanding(), 1);
        assert_eq!(*rx.borrow(), 1);

        let failed = table.get(2).unwrap();
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert!(failed.completed_at.is_some());
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut table = JobTable::new();
        assert!(!table.set_priority(9, 1));
        assert!(!table.mark_running(9));
        assert!(!table.mark_finished(9, None, None));
        assert!(table.priority(9).is_none());
    }
}
