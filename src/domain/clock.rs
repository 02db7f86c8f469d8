use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub trait Clock {
    fn today(&self) -> NaiveDate;
    /// Current local time of day, truncated to whole seconds.
    fn now(&self) -> NaiveTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate { Local::now().date_naive() }

    fn now(&self) -> NaiveTime {
        let t = Local::now().time();
        t.with_nanosecond(0).unwrap_or(t)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate { (**self).today() }
    fn now(&self) -> NaiveTime { (**self).now() }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    at: std::rc::Rc<std::cell::Cell<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(at: NaiveDateTime) -> Self { Self { at: std::rc::Rc::new(std::cell::Cell::new(at)) } }

    pub fn set(&self, at: NaiveDateTime) { self.at.set(at); }

    pub fn advance_days(&self, days: i64) { self.at.set(self.at.get() + chrono::Duration::days(days)); }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate { self.at.get().date() }
    fn now(&self) -> NaiveTime { self.at.get().time() }
}
