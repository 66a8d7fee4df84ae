//! The collection events produced by a refresh.

use std::{fmt, str::FromStr};

use bitmask_enum::bitmask;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::UnknownCategory;

/// The kind of collection, taken from the CSS class of the calendar cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Pink,
    Normal,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Pink, Category::Normal];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Pink => "pink",
            Category::Normal => "normal",
        }
    }

    pub fn bitmask(&self) -> CategoryBitmask {
        match self {
            Category::Pink => CategoryBitmask::Pink,
            Category::Normal => CategoryBitmask::Normal,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.label() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Categories to leave out of an export.
#[bitmask]
pub enum CategoryBitmask {
    Pink,
    Normal,
}

/// One all-day collection for the configured road.
///
/// `start` and `end` are local midnights converted to UTC, `end` being the
/// midnight of the following day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionEvent {
    pub category: Category,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CollectionEvent {
    /// The calendar date of the collection in the given time zone.
    pub fn local_date(&self, timezone: Tz) -> NaiveDate {
        self.start.with_timezone(&timezone).date_naive()
    }
}

/// Drop every event whose category is in `excluded`.
pub fn filter_events(
    events: &[CollectionEvent],
    excluded: CategoryBitmask,
) -> Vec<CollectionEvent> {
    events
        .iter()
        .filter(|event| !excluded.contains(event.category.bitmask()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn event(category: Category, day: u32) -> CollectionEvent {
        CollectionEvent {
            category,
            start: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 1, day + 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("pink".parse(), Ok(Category::Pink));
        assert_eq!("normal".parse(), Ok(Category::Normal));
        assert_eq!(
            "Pink".parse::<Category>(),
            Err(UnknownCategory("Pink".to_string()))
        );
        assert_eq!(
            "blue".parse::<Category>(),
            Err(UnknownCategory("blue".to_string()))
        );
    }

    #[test]
    fn test_filter_events() {
        let events = vec![
            event(Category::Pink, 3),
            event(Category::Normal, 10),
            event(Category::Pink, 17),
        ];
        assert_eq!(filter_events(&events, CategoryBitmask::none()), events);
        let filtered = filter_events(&events, CategoryBitmask::Pink);
        assert_eq!(filtered, vec![event(Category::Normal, 10)]);
        let filtered = filter_events(&events, CategoryBitmask::Pink | CategoryBitmask::Normal);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_local_date() {
        // 23:00 UTC on 31 March is midnight 1 April in London (BST).
        let event = CollectionEvent {
            category: Category::Normal,
            start: Utc.with_ymd_and_hms(2024, 3, 31, 23, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 4, 1, 23, 0, 0).unwrap(),
        };
        assert_eq!(
            event.local_date(chrono_tz::Europe::London),
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
        );
    }
}
