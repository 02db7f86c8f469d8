use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::{
    error::StoreError,
    repository::{Snapshot, TaskStore},
    task::{Task, TaskId},
};

/// Task store backed by a single pretty-printed JSON document.
///
/// Besides the current `{ next_id, current_day, tasks }` object, a bare array
/// of task records (the layout of early builds) is accepted on load.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "tasks.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }

    fn corrupt(&self, source: serde_json::Error) -> StoreError {
        StoreError::CorruptData { path: self.path.clone(), source }
    }

    fn parse(&self, raw: &str) -> Result<Snapshot, StoreError> {
        let value: Value = serde_json::from_str(raw).map_err(|e| self.corrupt(e))?;
        let mut snapshot = match value {
            Value::Array(_) => {
                let mut tasks: Vec<Task> = serde_json::from_value(value).map_err(|e| self.corrupt(e))?;
                tracing::info!(path = %self.path.display(), "migrating legacy task list");
                for (old, new) in renumber_duplicates(&mut tasks) {
                    tracing::warn!(path = %self.path.display(), %old, %new, "legacy task id reused, renumbered");
                }
                Snapshot::from_tasks(tasks)
            }
            other => serde_json::from_value(other).map_err(|e| self.corrupt(e))?,
        };

        if let Some(id) = snapshot.duplicate_id() {
            return Err(StoreError::DuplicateId { path: self.path.clone(), id });
        }
        snapshot.tasks.iter_mut().for_each(Task::normalize);
        // never hand out an id that is already taken
        let floor = snapshot.tasks.iter().map(|t| t.id.0 + 1).max().unwrap_or(1);
        snapshot.next_id = snapshot.next_id.max(floor);
        Ok(snapshot)
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no task file yet, starting empty");
                return Ok(Snapshot::default());
            }
            Err(e) => return Err(self.io_err(e)),
        };
        let snapshot = self.parse(&raw)?;
        tracing::info!(path = %self.path.display(), tasks = snapshot.tasks.len(), "loaded tasks");
        Ok(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let tmp = self.tmp_path();
        let written = write_pretty(&tmp, snapshot).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_err(e));
        }

        tracing::debug!(path = %self.path.display(), tasks = snapshot.tasks.len(), "saved tasks");
        Ok(())
    }
}

fn write_pretty(path: &Path, snapshot: &Snapshot) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Early builds derived ids from the list length, so a delete followed by an add
/// could repeat one. Later repeats get fresh ids above the highest, order kept.
fn renumber_duplicates(tasks: &mut [Task]) -> Vec<(TaskId, TaskId)> {
    let mut next = tasks.iter().map(|t| t.id.0).max().map_or(1, |max| max + 1);
    let mut seen = HashSet::new();
    let mut changed = Vec::new();
    for task in tasks.iter_mut() {
        if !seen.insert(task.id) {
            let new = TaskId(next);
            next += 1;
            changed.push((task.id, new));
            task.id = new;
            seen.insert(new);
        }
    }
    changed
}
