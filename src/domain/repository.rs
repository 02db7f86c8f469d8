use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::StoreError;
use super::task::{Task, TaskId};

/// Everything the store persists: the task list plus the bookkeeping needed to
/// keep ids unique and to detect a day change across restarts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub next_id: u64,
    #[serde(default)]
    pub current_day: Option<NaiveDate>,
    pub tasks: Vec<Task>,
}

impl Default for Snapshot {
    fn default() -> Self { Self { next_id: 1, current_day: None, tasks: Vec::new() } }
}

impl Snapshot {
    /// Builds a snapshot from a bare task list, deriving the id counter from it.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks.iter().map(|t| t.id.0).max().map_or(1, |max| max + 1);
        Self { next_id, current_day: None, tasks }
    }

    /// First id that appears twice, if any.
    pub fn duplicate_id(&self) -> Option<TaskId> {
        let mut seen = std::collections::HashSet::new();
        self.tasks.iter().map(|t| t.id).find(|id| !seen.insert(*id))
    }
}

pub trait TaskStore {
    /// Returns the persisted snapshot, or an empty one when nothing was saved yet.
    fn load(&self) -> Result<Snapshot, StoreError>;
    /// Replaces the whole persisted snapshot.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;
}
