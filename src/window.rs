use chrono::{Duration, NaiveDate};

use crate::error::ExtractError;

/// Inclusive range of calendar days processed by one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    lower: NaiveDate,
    upper: NaiveDate,
}

impl DateWindow {
    pub fn new(lower: NaiveDate, upper: NaiveDate) -> Self {
        Self { lower, upper }
    }

    /// Window relative to `today`, e.g. `trailing(today, 3, 1)` covers three days ago through yesterday.
    pub fn trailing(
        today: NaiveDate,
        lower_days_ago: u32,
        upper_days_ago: u32,
    ) -> Result<Self, ExtractError> {
        let shift = |days: u32| {
            today
                .checked_sub_signed(Duration::days(i64::from(days)))
                .ok_or_else(|| {
                    ExtractError::config(format!("{days} days before {today} is out of range"))
                })
        };
        Ok(Self::new(shift(lower_days_ago)?, shift(upper_days_ago)?))
    }

    pub fn lower(&self) -> NaiveDate {
        self.lower
    }

    pub fn upper(&self) -> NaiveDate {
        self.upper
    }

    /// Number of days the window yields; zero when the bounds are inverted.
    pub fn len(&self) -> usize {
        let span = (self.upper - self.lower).num_days();
        if span < 0 {
            0
        } else {
            span as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every day in the window, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let upper = self.upper;
        self.lower.iter_days().take_while(move |day| *day <= upper)
    }
}
