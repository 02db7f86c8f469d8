use chrono::{Datelike, Duration, NaiveDate};

use super::registry::TaskRegistry;
use crate::domain::{
    clock::Clock,
    repository::TaskStore,
    task::{Department, Task, TaskFilter},
};

/// Session-scoped "which day am I looking at". Selecting never touches tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSelector {
    selected: NaiveDate,
}

impl DateSelector {
    pub fn new(today: NaiveDate) -> Self { Self { selected: today } }

    pub fn selected(&self) -> NaiveDate { self.selected }

    pub fn select(&mut self, date: NaiveDate) { self.selected = date; }

    /// Moves the selection by `days`; stays put if that leaves chrono's range.
    pub fn shift_days(&mut self, days: i64) {
        if let Some(date) = self.selected.checked_add_signed(Duration::days(days)) {
            self.selected = date;
        }
    }

    /// Tasks dated on the selected day, followed by daily tasks when the
    /// selected day is `today`.
    pub fn view<'r, S: TaskStore, C: Clock>(
        &self,
        registry: &'r TaskRegistry<S, C>,
        department: Option<Department>,
        today: NaiveDate,
    ) -> Vec<&'r Task> {
        let mut tasks = registry.filter(TaskFilter { department, date: Some(self.selected) });
        if self.selected == today {
            tasks.extend(registry.filter(TaskFilter { department, date: None }).into_iter().filter(|t| t.is_daily()));
        }
        tasks
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total: usize,
    pub done: usize,
}

impl DaySummary {
    /// A day is complete when it has at least one task and all of them are done.
    pub fn is_complete(&self) -> bool { self.total > 0 && self.done == self.total }
}

/// Completion counts for the tasks dated on `date`.
pub fn day_summary<'a>(tasks: impl IntoIterator<Item = &'a Task>, date: NaiveDate) -> DaySummary {
    let (total, done) = tasks
        .into_iter()
        .filter(|t| t.date == Some(date))
        .fold((0, 0), |(total, done), t| (total + 1, done + usize::from(t.done)));
    DaySummary { date, total, done }
}

/// One summary per day of the given month, for calendar rendering.
/// Empty for an invalid year/month.
pub fn month_summary<S: TaskStore, C: Clock>(registry: &TaskRegistry<S, C>, year: i32, month: u32) -> Vec<DaySummary> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else { return Vec::new() };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|d| day_summary(registry.tasks(), d))
        .collect()
}
