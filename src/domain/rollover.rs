//! Day rollover: daily tasks lose their completion once the calendar day changes.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    SameDay,
    RolledOver { today: NaiveDate },
}

/// Level-triggered check of the remembered day against today.
pub fn evaluate(remembered: NaiveDate, today: NaiveDate) -> Rollover {
    if remembered == today { Rollover::SameDay } else { Rollover::RolledOver { today } }
}
