//! Weekly opening hours.
//!
//! Fixed structure over the seven weekdays rather than a free-form map:
//! a missing day means the pharmacy publishes no hours for it (closed or
//! unknown). Values stay free text — source data mixes ranges ("08:00 -
//! 20:00") with phrases ("24h/24").

use chrono::Weekday;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningHours {
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
    pub friday: Option<String>,
    pub saturday: Option<String>,
    pub sunday: Option<String>,
}

impl OpeningHours {
    /// Hours string for a weekday, if published.
    #[must_use]
    pub fn for_weekday(&self, weekday: Weekday) -> Option<&str> {
        let slot = match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        };
        slot.as_deref()
    }

    /// True when no day has published hours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [
            &self.monday,
            &self.tuesday,
            &self.wednesday,
            &self.thursday,
            &self.friday,
            &self.saturday,
            &self.sunday,
        ]
        .iter()
        .all(|d| d.is_none())
    }
}
