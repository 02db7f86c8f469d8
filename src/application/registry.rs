use chrono::NaiveDate;

use crate::domain::{
    clock::{Clock, SystemClock},
    error::{StoreError, TaskError, TaskResult},
    repository::{Snapshot, TaskStore},
    task::{NewTask, Task, TaskFilter, TaskId},
};

/// In-memory task collection for the running session.
///
/// Every successful mutation writes the whole collection back through the
/// store before returning, so the file always matches the last intent.
pub struct TaskRegistry<S: TaskStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    state: Snapshot,
}

impl<S: TaskStore, C: Clock> TaskRegistry<S, C> {
    pub fn open(store: S, clock: C) -> Result<Self, StoreError> {
        let state = store.load()?;
        Ok(Self { store, clock, state })
    }

    pub fn tasks(&self) -> &[Task] { &self.state.tasks }

    pub fn get(&self, id: TaskId) -> Option<&Task> { self.state.tasks.iter().find(|t| t.id == id) }

    pub fn len(&self) -> usize { self.state.tasks.len() }

    pub fn is_empty(&self) -> bool { self.state.tasks.is_empty() }

    pub fn current_day(&self) -> Option<NaiveDate> { self.state.current_day }

    pub fn clock(&self) -> &C { &self.clock }

    /// Appends a task. A blank title is refused with `Ok(None)`.
    pub fn add(&mut self, input: NewTask) -> TaskResult<Option<Task>> {
        let title = input.title.trim();
        if title.is_empty() {
            tracing::warn!("refusing to add task with empty title");
            return Ok(None);
        }

        let task = Task {
            id: TaskId(self.state.next_id),
            title: title.to_string(),
            done: false,
            department: input.department,
            date: input.date,
            time_done: None,
        };
        self.state.next_id += 1;
        self.state.tasks.push(task.clone());
        tracing::debug!(id = %task.id, department = %task.department, date = ?task.date, "task added");
        self.persist()?;
        Ok(Some(task))
    }

    pub fn set_title(&mut self, id: TaskId, title: &str) -> TaskResult<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let task = self.find_mut(id)?;
        if task.done {
            tracing::warn!(%id, "edit of a done task refused");
            return Err(TaskError::Locked(id));
        }
        if task.title == title {
            return Ok(());
        }
        task.title = title.to_string();
        tracing::debug!(%id, "task retitled");
        self.persist()?;
        Ok(())
    }

    /// Sets completion. Only a real transition touches `time_done` or the file.
    pub fn toggle_done(&mut self, id: TaskId, done: bool) -> TaskResult<()> {
        let now = self.clock.now();
        let task = self.find_mut(id)?;
        if task.done == done {
            return Ok(());
        }
        if done { task.mark_done(now) } else { task.mark_pending() }
        tracing::debug!(%id, done, "task toggled");
        self.persist()?;
        Ok(())
    }

    /// Removes a task. Returns whether anything was removed; unknown ids are a no-op.
    pub fn delete(&mut self, id: TaskId) -> TaskResult<bool> {
        let before = self.state.tasks.len();
        self.state.tasks.retain(|t| t.id != id);
        if self.state.tasks.len() == before {
            return Ok(false);
        }
        tracing::debug!(%id, "task deleted");
        self.persist()?;
        Ok(true)
    }

    pub fn filter(&self, filter: TaskFilter) -> Vec<&Task> {
        self.state.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Re-arms every daily task and records `today` as the current day.
    /// Returns how many tasks were reset.
    pub fn reset_daily(&mut self, today: NaiveDate) -> TaskResult<usize> {
        let mut reset = 0;
        for task in self.state.tasks.iter_mut().filter(|t| t.is_daily() && t.done) {
            task.mark_pending();
            reset += 1;
        }
        self.state.current_day = Some(today);
        tracing::info!(%today, reset, "day rolled over");
        self.persist()?;
        Ok(reset)
    }

    /// Records `today` without touching any task.
    pub fn remember_day(&mut self, today: NaiveDate) -> TaskResult<()> {
        if self.state.current_day == Some(today) {
            return Ok(());
        }
        self.state.current_day = Some(today);
        self.persist()?;
        Ok(())
    }

    fn find_mut(&mut self, id: TaskId) -> TaskResult<&mut Task> {
        self.state.tasks.iter_mut().find(|t| t.id == id).ok_or(TaskError::NotFound(id))
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save(&self.state)
    }
}
