//! Cooperative one-shot timers
//!
//! Recurring behavior (terrain advance, spawns) is expressed as one-shot tasks
//! that the owning component re-arms when it handles them. Nothing runs
//! concurrently: the frame tick advances the clock and drains due tasks one
//! at a time, each to completion.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::entity::EntityKind;

/// Handle for a scheduled task; never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

/// What a task does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskKind {
    AdvanceTerrain,
    Spawn(EntityKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub due: Duration,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    pending: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated time since the scheduler was created
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn schedule(&mut self, kind: TaskKind, delay: Duration) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.pending.push(Task {
            id,
            kind,
            due: self.now + delay,
        });
        id
    }

    /// Remove a pending task. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.pending.iter().position(|t| t.id == id) {
            Some(index) => {
                self.pending.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn advance(&mut self, step: Duration) {
        self.now += step;
    }

    /// Take the next due task: earliest deadline first, ties by creation order
    pub fn pop_due(&mut self) -> Option<Task> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= self.now)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;
        Some(self.pending.swap_remove(index))
    }
}
