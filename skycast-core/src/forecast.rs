//! Hourly windowing and day grouping over normalized hourly records.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::HourlyForecast;

/// Maximum number of hours in an hourly window.
pub const WINDOW_HOURS: usize = 12;

/// Maximum number of days in the summary view.
pub const SUMMARY_DAYS: usize = 5;

/// Result of windowing today's hours.
///
/// `Hours(vec![])` means the reference hour is past the last record of the
/// day, which is a normal outcome; `Unavailable` means there was nothing to
/// window in the first place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "hours", rename_all = "snake_case")]
pub enum HourlyWindow {
    Hours(Vec<HourlyForecast>),
    Unavailable,
}

impl HourlyWindow {
    pub fn hours(&self) -> &[HourlyForecast] {
        match self {
            HourlyWindow::Hours(hours) => hours,
            HourlyWindow::Unavailable => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, HourlyWindow::Unavailable)
    }
}

/// Records whose hour-of-day is at or after `reference_hour`, in order,
/// truncated to [`WINDOW_HOURS`]. No padding and no wrap into the next day.
pub fn window_hours(hours: &[HourlyForecast], reference_hour: u32) -> Vec<HourlyForecast> {
    hours
        .iter()
        .filter(|h| h.hour() >= reference_hour)
        .take(WINDOW_HOURS)
        .cloned()
        .collect()
}

/// All records of one local calendar day, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub entries: Vec<HourlyForecast>,
}

impl DayBucket {
    /// First record seen for this day.
    pub fn representative(&self) -> Option<&HourlyForecast> {
        self.entries.first()
    }
}

/// Group a flat multi-day list by local date. Days keep first-seen order and
/// every entry stays in its day's bucket.
pub fn group_by_day(records: impl IntoIterator<Item = HourlyForecast>) -> Vec<DayBucket> {
    let mut days: IndexMap<NaiveDate, Vec<HourlyForecast>> = IndexMap::new();
    for record in records {
        days.entry(record.date()).or_default().push(record);
    }

    days.into_iter().map(|(date, entries)| DayBucket { date, entries }).collect()
}

/// The leading [`SUMMARY_DAYS`] days of an ordered day list. Each day keeps
/// all of its records.
pub fn summary_days<T>(days: &[T]) -> &[T] {
    &days[..days.len().min(SUMMARY_DAYS)]
}
