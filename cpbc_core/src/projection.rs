//! Read-only views over a road's collection events.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::event::{Category, CollectionEvent};

/// The earliest event starting at or after `now`.
pub fn next_event(events: &[CollectionEvent], now: DateTime<Utc>) -> Option<&CollectionEvent> {
    events
        .iter()
        .filter(|event| event.start >= now)
        .min_by_key(|event| event.start)
}

/// Events starting within `[start, end)`, in chronological order.
pub fn events_between(
    events: &[CollectionEvent],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&CollectionEvent> {
    let mut window: Vec<&CollectionEvent> = events
        .iter()
        .filter(|event| start <= event.start && event.start < end)
        .collect();
    window.sort_by_key(|event| event.start);
    window
}

/// State of the "next collection" sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextCollection {
    pub category: Category,
    pub collection_date: NaiveDate,
    pub days_until: i64,
}

/// The next collection on or after today, today being taken in `timezone`.
///
/// A collection later today still counts as upcoming.
pub fn next_collection(
    events: &[CollectionEvent],
    now: DateTime<Utc>,
    timezone: Tz,
) -> Option<NextCollection> {
    let today = now.with_timezone(&timezone).date_naive();
    events
        .iter()
        .map(|event| (event, event.local_date(timezone)))
        .filter(|(_, date)| *date >= today)
        .min_by_key(|(_, date)| *date)
        .map(|(event, collection_date)| NextCollection {
            category: event.category,
            collection_date,
            days_until: (collection_date - today).num_days(),
        })
}
