//! The context object a front end drives: one intent per call, with the
//! registry, the selected date and the day-rollover bookkeeping in one place.

use chrono::NaiveDate;

use super::date_selector::{month_summary, DateSelector, DaySummary};
use super::registry::TaskRegistry;
use crate::domain::{
    clock::Clock,
    error::TaskResult,
    repository::TaskStore,
    rollover::{self, Rollover},
    task::{Department, NewTask, Task, TaskId},
};

pub struct Session<S: TaskStore, C: Clock> {
    registry: TaskRegistry<S, C>,
    selector: DateSelector,
}

impl<S: TaskStore, C: Clock> Session<S, C> {
    /// Loads the store and runs the day-rollover check once.
    pub fn open(store: S, clock: C) -> TaskResult<Self> {
        let today = clock.today();
        let registry = TaskRegistry::open(store, clock)?;
        let mut session = Self { registry, selector: DateSelector::new(today) };
        session.check_rollover()?;
        Ok(session)
    }

    /// Re-runs the rollover check, e.g. when a long-lived front end comes back
    /// to the foreground. A selection sitting on the old day follows to the new one.
    pub fn resume(&mut self) -> TaskResult<Rollover> {
        let previous = self.registry.current_day();
        let outcome = self.check_rollover()?;
        if let Rollover::RolledOver { today } = outcome {
            if previous == Some(self.selector.selected()) {
                self.selector.select(today);
            }
        }
        Ok(outcome)
    }

    fn check_rollover(&mut self) -> TaskResult<Rollover> {
        let today = self.today();
        let Some(remembered) = self.registry.current_day() else {
            self.registry.remember_day(today)?;
            return Ok(Rollover::SameDay);
        };
        let outcome = rollover::evaluate(remembered, today);
        if let Rollover::RolledOver { today } = outcome {
            self.registry.reset_daily(today)?;
        }
        Ok(outcome)
    }

    pub fn today(&self) -> NaiveDate { self.registry.clock().today() }

    pub fn registry(&self) -> &TaskRegistry<S, C> { &self.registry }

    pub fn selected(&self) -> NaiveDate { self.selector.selected() }

    pub fn select(&mut self, date: NaiveDate) { self.selector.select(date); }

    pub fn shift_selected(&mut self, days: i64) { self.selector.shift_days(days); }

    /// Adds a task to the selected day.
    pub fn add(&mut self, title: &str, department: Department) -> TaskResult<Option<Task>> {
        let date = Some(self.selector.selected());
        self.registry.add(NewTask { title: title.to_string(), department, date })
    }

    /// Adds a task that recurs every day and is re-armed by the rollover.
    pub fn add_daily(&mut self, title: &str, department: Department) -> TaskResult<Option<Task>> {
        self.registry.add(NewTask { title: title.to_string(), department, date: None })
    }

    pub fn set_title(&mut self, id: TaskId, title: &str) -> TaskResult<()> { self.registry.set_title(id, title) }

    pub fn toggle_done(&mut self, id: TaskId, done: bool) -> TaskResult<()> { self.registry.toggle_done(id, done) }

    pub fn delete(&mut self, id: TaskId) -> TaskResult<bool> { self.registry.delete(id) }

    /// What the main view shows for the selected day.
    pub fn visible(&self, department: Option<Department>) -> Vec<&Task> {
        self.selector.view(&self.registry, department, self.today())
    }

    pub fn selected_month(&self) -> Vec<DaySummary> {
        use chrono::Datelike;
        let selected = self.selector.selected();
        month_summary(&self.registry, selected.year(), selected.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        clock::ManualClock,
        error::StoreError,
        repository::Snapshot,
    };
    use std::{cell::RefCell, rc::Rc};

    #[derive(Clone, Default)]
    struct SharedStore(Rc<RefCell<Snapshot>>);

    impl TaskStore for SharedStore {
        fn load(&self) -> Result<Snapshot, StoreError> { Ok(self.0.borrow().clone()) }
        fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
            *self.0.borrow_mut() = snapshot.clone();
            Ok(())
        }
    }

    fn d(day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, day).unwrap() }

    fn clock_at(day: u32) -> ManualClock { ManualClock::new(d(day).and_hms_opt(8, 0, 0).unwrap()) }

    #[test]
    fn first_open_records_today_without_reset() {
        let store = SharedStore::default();
        let session = Session::open(store.clone(), clock_at(1)).unwrap();
        assert_eq!(session.selected(), d(1));
        assert_eq!(store.0.borrow().current_day, Some(d(1)));
    }

    #[test]
    fn reopening_next_day_rearms_daily_tasks() {
        let store = SharedStore::default();
        let clock = clock_at(1);
        {
            let mut session = Session::open(store.clone(), clock.clone()).unwrap();
            let id = session.add_daily("Check mail", Department::Odoo).unwrap().unwrap().id;
            session.toggle_done(id, true).unwrap();
        }

        clock.advance_days(1);
        let session = Session::open(store.clone(), clock).unwrap();
        let task = &session.registry().tasks()[0];
        assert!(!task.done);
        assert_eq!(task.time_done, None);
        assert_eq!(session.registry().current_day(), Some(d(2)));
    }

    #[test]
    fn rollover_does_not_rerun_within_a_day() {
        let store = SharedStore::default();
        let mut session = Session::open(store, clock_at(1)).unwrap();
        let id = session.add_daily("Check mail", Department::Odoo).unwrap().unwrap().id;
        session.toggle_done(id, true).unwrap();

        assert_eq!(session.resume().unwrap(), Rollover::SameDay);
        assert!(session.registry().get(id).unwrap().done);
    }

    #[test]
    fn resume_after_midnight_moves_selection_along() {
        let clock = clock_at(1);
        let mut session = Session::open(SharedStore::default(), clock.clone()).unwrap();
        let id = session.add_daily("Check mail", Department::Odoo).unwrap().unwrap().id;
        session.toggle_done(id, true).unwrap();

        clock.advance_days(1);
        assert_eq!(session.resume().unwrap(), Rollover::RolledOver { today: d(2) });
        assert_eq!(session.selected(), d(2));
        assert!(!session.registry().get(id).unwrap().done);
    }

    #[test]
    fn resume_keeps_a_selection_on_another_day() {
        let clock = clock_at(1);
        let mut session = Session::open(SharedStore::default(), clock.clone()).unwrap();
        session.select(d(20));
        clock.advance_days(1);
        session.resume().unwrap();
        assert_eq!(session.selected(), d(20));
    }

    #[test]
    fn add_uses_selected_date_and_visible_follows_selection() {
        let mut session = Session::open(SharedStore::default(), clock_at(1)).unwrap();
        session.add("Today home", Department::Home).unwrap();
        session.add_daily("Every day", Department::Home).unwrap();
        session.select(d(2));
        session.add("Tomorrow odoo", Department::Odoo).unwrap();

        let titles = |s: &Session<SharedStore, ManualClock>, dept: Option<Department>| -> Vec<String> {
            s.visible(dept).into_iter().map(|t| t.title.clone()).collect()
        };
        assert_eq!(titles(&session, None), ["Tomorrow odoo"]);
        assert_eq!(titles(&session, Some(Department::Home)), Vec::<String>::new());

        session.select(d(1));
        assert_eq!(titles(&session, None), ["Today home", "Every day"]);
        assert_eq!(titles(&session, Some(Department::Odoo)), Vec::<String>::new());
    }

    #[test]
    fn selected_month_marks_complete_days() {
        let mut session = Session::open(SharedStore::default(), clock_at(1)).unwrap();
        let id = session.add("Pay rent", Department::Home).unwrap().unwrap().id;
        session.toggle_done(id, true).unwrap();
        session.select(d(3));
        session.add("Gym", Department::Home).unwrap();

        let month = session.selected_month();
        assert_eq!(month.len(), 31);
        assert!(month[0].is_complete());
        assert!(!month[1].is_complete());
        assert!(!month[2].is_complete());
        assert_eq!(month[2].total, 1);
    }
}
