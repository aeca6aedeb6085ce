//! Date navigation and grid construction for the on-call calendar views.
//!
//! All functions work on civil dates (`NaiveDate`); time of day never enters
//! the picture. Weeks start on Monday regardless of locale.

use std::collections::HashSet;

use chrono::{Datelike, Duration, Local, Months, NaiveDate};

/// Calendar view granularity. Determines the step size of [`ViewCursor::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Day,
    Week,
    Month,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(ViewMode::Day),
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            other => Err(format!(
                "unknown view mode '{other}'; expected day, week, or month"
            )),
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewMode::Day => write!(f, "day"),
            ViewMode::Week => write!(f, "week"),
            ViewMode::Month => write!(f, "month"),
        }
    }
}

/// Navigation direction for [`ViewCursor::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// A reference date plus the active view granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewCursor {
    pub date: NaiveDate,
    pub mode: ViewMode,
}

impl ViewCursor {
    #[must_use]
    pub fn new(date: NaiveDate, mode: ViewMode) -> Self {
        Self { date, mode }
    }

    /// Shift the cursor one unit of its mode in the given direction.
    ///
    /// Day mode steps ±1 day, week mode ±7 days. Month mode steps one
    /// calendar month with the day-of-month clamped to the target month's
    /// length (Jan 31 → Feb 28), so a next/prev pair lands in the original
    /// month but not necessarily on the original day. Dates saturate at the
    /// edge of chrono's supported range.
    #[must_use]
    pub fn advance(self, direction: Direction) -> Self {
        let date = match (self.mode, direction) {
            (ViewMode::Day, Direction::Next) => self.date.checked_add_signed(Duration::days(1)),
            (ViewMode::Day, Direction::Prev) => self.date.checked_sub_signed(Duration::days(1)),
            (ViewMode::Week, Direction::Next) => self.date.checked_add_signed(Duration::days(7)),
            (ViewMode::Week, Direction::Prev) => self.date.checked_sub_signed(Duration::days(7)),
            (ViewMode::Month, Direction::Next) => self.date.checked_add_months(Months::new(1)),
            (ViewMode::Month, Direction::Prev) => self.date.checked_sub_months(Months::new(1)),
        };
        Self {
            date: date.unwrap_or(self.date),
            mode: self.mode,
        }
    }

    /// Inclusive date span covered by this cursor's view.
    ///
    /// Day: the date itself. Week: Monday through Sunday of the containing
    /// week. Month: first through last day of the containing month.
    #[must_use]
    pub fn range(self) -> (NaiveDate, NaiveDate) {
        match self.mode {
            ViewMode::Day => (self.date, self.date),
            ViewMode::Week => {
                let start = start_of_week(self.date);
                (start, start + Duration::days(6))
            }
            ViewMode::Month => {
                let first = first_of_month(self.date);
                (first, last_of_month(self.date))
            }
        }
    }
}

/// Monday of the ISO week containing `date`.
#[must_use]
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let offset = i64::from(date.weekday().num_days_from_monday());
    date - Duration::days(offset)
}

/// Current local civil date, time of day truncated.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The seven dates of the week starting at `start`.
#[must_use]
pub fn week_days(start: NaiveDate) -> [NaiveDate; 7] {
    std::array::from_fn(|i| start + Duration::days(i as i64))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(date)
}

/// One day cell in the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub is_today: bool,
    pub has_on_call: bool,
}

/// A 7-column month grid: `None` cells are the leading blanks that align the
/// first of the month under its weekday column.
#[derive(Debug, Clone)]
pub struct MonthGrid {
    /// First day of the rendered month.
    pub first: NaiveDate,
    pub cells: Vec<Option<DayCell>>,
}

impl MonthGrid {
    /// Number of leading blank cells (Monday-based weekday index of the 1st).
    #[must_use]
    pub fn leading_blanks(&self) -> usize {
        self.cells.iter().take_while(|c| c.is_none()).count()
    }
}

/// Build the month grid for the month containing `reference`.
///
/// The grid is left-padded so day 1 sits under its weekday column (week
/// starts Monday) and ends exactly at the last day of the month — no
/// trailing padding. `on_call_dates` drives each cell's `has_on_call` flag;
/// `today` drives `is_today`.
#[must_use]
pub fn month_grid(
    reference: NaiveDate,
    today: NaiveDate,
    on_call_dates: &HashSet<NaiveDate>,
) -> MonthGrid {
    let first = first_of_month(reference);
    let last = last_of_month(reference);
    let blanks = first.weekday().num_days_from_monday() as usize;

    let mut cells: Vec<Option<DayCell>> = Vec::with_capacity(blanks + 31);
    cells.resize(blanks, None);

    let mut date = first;
    while date <= last {
        cells.push(Some(DayCell {
            date,
            is_today: date == today,
            has_on_call: on_call_dates.contains(&date),
        }));
        date += Duration::days(1);
    }

    MonthGrid { first, cells }
}
