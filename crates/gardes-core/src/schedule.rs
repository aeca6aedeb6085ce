//! On-call schedule projection.
//!
//! Which pharmacies serve on a given date is a per-date assignment, not a
//! property of the pharmacy itself: the static `is_on_call` flag only backs
//! the directory filter. The schedule holds the date → pharmacy-id mapping
//! and projects it over a cursor's range.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::calendar::ViewCursor;
use crate::Pharmacy;

/// Mapping from calendar date to the set of assigned pharmacy ids.
#[derive(Debug, Clone, Default)]
pub struct OnCallSchedule {
    assignments: BTreeMap<NaiveDate, BTreeSet<Uuid>>,
}

/// Pharmacies assigned to a single date, in input order.
#[derive(Debug, Clone)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub pharmacies: Vec<Pharmacy>,
}

impl OnCallSchedule {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schedule from (date, pharmacy id) pairs.
    #[must_use]
    pub fn from_assignments<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, Uuid)>,
    {
        let mut schedule = Self::new();
        for (date, id) in assignments {
            schedule.assign(date, id);
        }
        schedule
    }

    pub fn assign(&mut self, date: NaiveDate, pharmacy_id: Uuid) {
        self.assignments.entry(date).or_default().insert(pharmacy_id);
    }

    /// Dates within the inclusive range that have at least one assignment.
    #[must_use]
    pub fn covered_dates(&self, from: NaiveDate, to: NaiveDate) -> HashSet<NaiveDate> {
        self.assignments
            .range(from..=to)
            .map(|(date, _)| *date)
            .collect()
    }

    /// Project the schedule over the cursor's range: one [`DaySchedule`] per
    /// date, listing the subset of `pharmacies` assigned to that date.
    /// Dates without assignments project to an empty list.
    #[must_use]
    pub fn project(&self, pharmacies: &[Pharmacy], cursor: ViewCursor) -> Vec<DaySchedule> {
        let (from, to) = cursor.range();
        let mut days = Vec::new();
        let mut date = from;
        while date <= to {
            let assigned = self.assignments.get(&date);
            let pharmacies = pharmacies
                .iter()
                .filter(|p| assigned.is_some_and(|ids| ids.contains(&p.id)))
                .cloned()
                .collect();
            days.push(DaySchedule { date, pharmacies });
            date += Duration::days(1);
        }
        days
    }
}
