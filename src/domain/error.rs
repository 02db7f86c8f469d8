use std::path::PathBuf;

use super::task::TaskId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("task file `{}` is corrupt: {source}", path.display())]
    CorruptData { path: PathBuf, #[source] source: serde_json::Error },
    #[error("task file `{}` holds duplicate id {id}", path.display())]
    DuplicateId { path: PathBuf, id: TaskId },
    #[error("i/o error on `{}`: {source}", path.display())]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task {0} not found")]
    NotFound(TaskId),
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("task {0} is done and can no longer be edited")]
    Locked(TaskId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type TaskResult<T> = Result<T, TaskError>;
