use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Department { Odoo, Home }

impl Department {
    pub const ALL: [Department; 2] = [Department::Odoo, Department::Home];

    pub fn as_str(&self) -> &'static str {
        match self { Department::Odoo => "Odoo", Department::Home => "Home" }
    }

    /// Cycles through `ALL`, wrapping at the end.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown department `{0}`")]
pub struct UnknownDepartment(pub String);

impl FromStr for Department {
    type Err = UnknownDepartment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDepartment(s.to_string()))
    }
}

/// A single to-do item.
///
/// `date == None` marks a daily task: it belongs to every day and its completion
/// is re-armed by the day rollover. `time_done` is set exactly when `done` is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub done: bool,
    pub department: Department,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time_done: Option<NaiveTime>,
}

impl Task {
    pub fn is_daily(&self) -> bool { self.date.is_none() }

    pub(crate) fn mark_done(&mut self, at: NaiveTime) {
        self.done = true;
        self.time_done = Some(at);
    }

    pub(crate) fn mark_pending(&mut self) {
        self.done = false;
        self.time_done = None;
    }

    /// Restores the `done`/`time_done` pairing on records written by older builds.
    pub(crate) fn normalize(&mut self) {
        match (self.done, self.time_done) {
            (true, None) => self.time_done = Some(NaiveTime::MIN),
            (false, Some(_)) => self.time_done = None,
            _ => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub department: Department,
    pub date: Option<NaiveDate>,
}

/// Read-side criteria; `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub department: Option<Department>,
    pub date: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn department(department: Department) -> Self { Self { department: Some(department), date: None } }

    pub fn date(date: NaiveDate) -> Self { Self { department: None, date: Some(date) } }

    pub fn matches(&self, task: &Task) -> bool {
        self.department.is_none_or(|d| task.department == d)
            && self.date.is_none_or(|d| task.date == Some(d))
    }
}
