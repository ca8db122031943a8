//! Shared job queue.
//!
//! The batch is known up front, so the queue never waits for new work: `pop`
//! either hands out the next task or reports that the batch is drained.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use cookiescope_types::SiteTask;

#[derive(Debug)]
pub struct JobQueue {
    tasks: Mutex<VecDeque<SiteTask>>,
    total: usize,
}

impl JobQueue {
    #[must_use]
    pub fn new(tasks: Vec<SiteTask>) -> Self {
        let total = tasks.len();
        Self {
            tasks: Mutex::new(tasks.into()),
            total,
        }
    }

    /// Number of tasks the queue was created with.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Next task in input order, or `None` once the batch is drained.
    pub fn pop(&self) -> Option<SiteTask> {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    #[cfg(test)]
    pub(crate) fn remaining(&self) -> usize {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
