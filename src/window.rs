//! Rolling release window

use chrono::{Days, NaiveDate, Utc};

/// Inclusive `[from, to]` range of calendar dates a release must fall into
///
/// Computed once per catalog build and never modified afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateWindow {
    /// Window of `lookback_days` days ending on `today`
    ///
    /// A lookback reaching before the earliest representable date is clamped to it.
    pub fn ending_on(today: NaiveDate, lookback_days: u32) -> Self {
        let from = today
            .checked_sub_days(Days::new(u64::from(lookback_days)))
            .unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    /// Window ending on the current UTC date
    pub fn current(lookback_days: u32) -> Self {
        Self::ending_on(Utc::now().date_naive(), lookback_days)
    }

    /// Explicit window; the bounds are swapped if given in the wrong order
    pub fn between(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { from: a, to: b }
        } else {
            Self { from: b, to: a }
        }
    }

    /// First day of the window
    pub fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last day of the window
    pub fn to(&self) -> NaiveDate {
        self.to
    }

    /// Whether `date` lies inside the window (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}
