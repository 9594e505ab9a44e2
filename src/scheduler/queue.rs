use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::scheduler::job::Job;

/// FIFO run queue shared between the submitting side and the scheduler loop.
///
/// The lock only guards the push/pop of a single entry; it is never held
/// across an await point. A dequeuer waiting on an empty queue parks on a
/// [`Notify`] and is woken by the next enqueue.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
    available: Notify,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh job and append it at the tail.
    pub fn enqueue(&self, id: u64, command: String, priority: i32) {
        self.push(Job::new(id, command, priority));
    }

    /// Append an existing job at the tail and wake one waiting dequeuer.
    pub fn push(&self, job: Job) {
        self.jobs.lock().push_back(job);
        self.available.notify_one();
    }

    /// Remove and return the head, waiting while the queue is empty.
    pub async fn dequeue(&self) -> Job {
        loop {
            let head = self.jobs.lock().pop_front();
            if let Some(job) = head {
                return job;
            }
            // notify_one stores a permit when nobody is parked yet, so an
            // enqueue between the pop above and this await is not lost.
            self.available.notified().await;
        }
    }

    /// Remove and return the head without waiting.
    pub fn try_dequeue(&self) -> Option<Job> {
        self.jobs.lock().pop_front()
    }

    /// Update the priority of a queued job. Returns false if the job is not queued.
    pub fn set_priority(&self, id: u64, priority: i32) -> bool {
        let mut jobs = self.jobs.lock();
        match jobs.iter_mut().find(|j| j.id == id) {
            Some(job) => {
                job.priority = priority;
                true
            }
            None => false,
        }
    }

    /// Copy of the queued jobs, head first
    pub fn snapshot(&self) -> Vec<Job> {
        self.jobs.lock().iter().cloned().collect()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.jobs.lock().iter().any(|j| j.id == id)
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}
