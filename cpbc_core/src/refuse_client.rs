//! This client fetches the council's pages and turns them into collection data.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use ical::{
    generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, IcalEventBuilder, Property},
    ical_property,
};
use log::debug;
use regex::Regex;
use reqwest::StatusCode;

use crate::{
    directory::{parse_roads, Road},
    error::FetchError,
    event::{filter_events, Category, CategoryBitmask, CollectionEvent},
    extractor,
};

static URL: &str = "https://apps.castlepoint.gov.uk/cpapps/index.cfm";
static FA_DIRECTORY: &str = "wastecalendar";
static FA_SCHEDULE: &str = "wastecalendar.displayDetails";
static PROD_ID: [&str; 2] = ["Refuse Collection Calendar", "castlepoint.gov.uk"];
static FORMAT: &str = "%Y%m%d";

pub static DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::London;
pub static DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the council's waste calendar pages.
#[derive(Debug, Clone)]
pub struct RefuseClient {
    client: reqwest::Client,
    timezone: Tz,
}

impl RefuseClient {
    pub fn new(timeout: Duration, timezone: Tz) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Request {
                url: URL.to_string(),
                source,
            })?;
        Ok(Self { client, timezone })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Get the collection events of a road.
    pub async fn get_events(&self, road_id: &str) -> Result<Vec<CollectionEvent>, FetchError> {
        let html = self.get_schedule_html(road_id).await?;
        Ok(extractor::extract(&html, self.timezone))
    }

    /// Get the raw schedule page of a road.
    pub async fn get_schedule_html(&self, road_id: &str) -> Result<String, FetchError> {
        self.get_page(&[("fa", FA_SCHEDULE), ("roadID", road_id)])
            .await
    }

    /// Get all roads the council lists.
    pub async fn get_roads(&self) -> Result<Vec<Road>, FetchError> {
        let html = self.get_page(&[("fa", FA_DIRECTORY)]).await?;
        Ok(parse_roads(&html)?)
    }

    async fn get_page(&self, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let request = self
            .client
            .get(URL)
            .query(query)
            .build()
            .map_err(|source| FetchError::Request {
                url: URL.to_string(),
                source,
            })?;
        let url = request.url().to_string();
        debug!("fetching {url}");
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                url,
                status: response.status(),
            });
        }
        response
            .text()
            .await
            .map_err(|source| FetchError::Body { url, source })
    }
}

/// Build the calendar from the collection events of a road.
pub fn get_calendar(
    road_id: &str,
    road_name: Option<&str>,
    events: &[CollectionEvent],
    excluded_categories: CategoryBitmask,
    timezone: Tz,
) -> IcalCalendar {
    let changed = Utc::now()
        .with_timezone(&timezone)
        .format("%Y%m%dT%H%M%S")
        .to_string();
    let included: Vec<Category> = Category::ALL
        .into_iter()
        .filter(|category| !excluded_categories.contains(category.bitmask()))
        .collect();
    let prod_id_label = match included.as_slice() {
        [category] => Some(category.label()),
        _ => None,
    };
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(prod_id(prod_id_label))
        .build();
    for event in filter_events(events, excluded_categories) {
        calendar
            .events
            .push(get_event(road_id, road_name, &event, &changed, timezone));
    }
    calendar
}

/// Build an all-day event for a single collection.
fn get_event(
    road_id: &str,
    road_name: Option<&str>,
    event: &CollectionEvent,
    changed: &str,
    timezone: Tz,
) -> IcalEvent {
    let date = event.local_date(timezone);
    let mut ical_event = IcalEventBuilder::tzid(timezone.name())
        .uid(uid(road_id, event.category, &date))
        .changed(changed)
        .one_day(date.format(FORMAT).to_string())
        .set(ical_property!("SUMMARY", event.category.label()))
        .set(ical_property!("DESCRIPTION", schedule_url(road_id)))
        .set(ical_property!("TRANSP", "TRANSPARENT"))
        .build();
    if let Some(road_name) = road_name {
        ical_event.properties.push(ical_property!(
            "LOCATION",
            format!("{road_name}, Castle Point")
        ));
    }
    ical_event
}

/// The address of the page a road's events are read from.
pub fn schedule_url(road_id: &str) -> String {
    format!("{URL}?fa={FA_SCHEDULE}&roadID={road_id}")
}

fn prod_id(label: Option<&str>) -> String {
    let mut strings: Vec<String> = Vec::from(PROD_ID).into_iter().map(String::from).collect();
    if let Some(label) = label {
        strings.splice(0..0, [String::from(label)]);
    }
    strings.splice(0..0, [String::from("-")]);
    strings.join("//")
}

/// Get a unique id for a collection of a specific category on a specific date.
///
/// Changing this function is a breaking change!
fn uid(road_id: &str, category: Category, date: &NaiveDate) -> String {
    let whitespace_regex = Regex::new(r"\s+").unwrap();
    let road_id = whitespace_regex.replace_all(road_id.trim(), "-");
    format!(
        "RefuseCollection_{road_id}_{category}_{}@castlepoint.gov.uk",
        date.format(FORMAT)
    )
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone};
    use ical::generator::{IcalCalendar, IcalEvent};

    use super::*;

    fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
        DEFAULT_TIMEZONE
            .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
            .unwrap()
            .with_timezone(&Utc)
    }

    fn event(category: Category, date: &str) -> CollectionEvent {
        let date: NaiveDate = date.parse().unwrap();
        CollectionEvent {
            category,
            start: local_midnight(date),
            end: local_midnight(date.succ_opt().unwrap()),
        }
    }

    fn get_test_events() -> Vec<CollectionEvent> {
        vec![
            event(Category::Pink, "2024-07-01"),
            event(Category::Normal, "2024-07-08"),
            event(Category::Pink, "2024-07-15"),
            event(Category::Normal, "2024-07-22"),
            event(Category::Pink, "2024-07-29"),
        ]
    }

    fn get_property_values<'a>(calendar: &'a IcalCalendar, property_name: &str) -> Vec<&'a str> {
        calendar
            .events
            .iter()
            .filter_map(|event| get_property_value(event, property_name))
            .collect()
    }

    fn get_property_value<'a>(event: &'a IcalEvent, property_name: &str) -> Option<&'a str> {
        event
            .properties
            .iter()
            .find(|property| property.name == property_name)
            .and_then(|property| property.value.as_deref())
    }

    /// Test whether requests can be sent and the resulting events contain something.
    ///
    /// This is an online test!
    #[tokio::test]
    #[ignore = "online"]
    async fn test_get_events() {
        let client = RefuseClient::new(DEFAULT_TIMEOUT, DEFAULT_TIMEZONE).unwrap();
        let roads = client.get_roads().await.unwrap();
        assert!(!roads.is_empty());
        let events = client.get_events(&roads[0].id).await.unwrap();
        assert!(!events.is_empty());
    }

    #[test]
    fn test_get_calendar_all() {
        let events = get_test_events();
        let calendar = get_calendar(
            "101",
            Some("Main Street"),
            &events,
            CategoryBitmask::none(),
            DEFAULT_TIMEZONE,
        );
        assert_eq!(calendar.events.len(), 5);
        assert_eq!(
            get_property_values(&calendar, "DTSTART"),
            vec!["20240701", "20240708", "20240715", "20240722", "20240729"]
        );
        assert_eq!(
            get_property_values(&calendar, "SUMMARY"),
            vec!["pink", "normal", "pink", "normal", "pink"]
        );
        assert_eq!(
            get_property_value(&calendar.events[0], "UID"),
            Some("RefuseCollection_101_pink_20240701@castlepoint.gov.uk")
        );
        assert_eq!(
            get_property_value(&calendar.events[0], "LOCATION"),
            Some("Main Street, Castle Point")
        );
    }

    #[test]
    fn test_get_calendar_exclusion() {
        let events = get_test_events();
        let calendar = get_calendar(
            "101",
            None,
            &events,
            CategoryBitmask::Pink,
            DEFAULT_TIMEZONE,
        );
        assert_eq!(calendar.events.len(), 2);
        assert_eq!(
            get_property_values(&calendar, "SUMMARY"),
            vec!["normal", "normal"]
        );
        assert!(get_property_values(&calendar, "LOCATION").is_empty());

        let calendar = get_calendar(
            "101",
            None,
            &events,
            CategoryBitmask::Pink | CategoryBitmask::Normal,
            DEFAULT_TIMEZONE,
        );
        assert!(calendar.events.is_empty());
    }

    #[test]
    fn test_prod_id() {
        assert_eq!(
            prod_id(None),
            "-//Refuse Collection Calendar//castlepoint.gov.uk"
        );
        assert_eq!(
            prod_id(Some("pink")),
            "-//pink//Refuse Collection Calendar//castlepoint.gov.uk"
        );
    }

    #[test]
    fn test_uid() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(
            uid(" 12 34 ", Category::Normal, &date),
            "RefuseCollection_12-34_normal_20240605@castlepoint.gov.uk"
        );
    }

    #[test]
    fn test_schedule_url() {
        assert_eq!(
            schedule_url("101"),
            "https://apps.castlepoint.gov.uk/cpapps/index.cfm?fa=wastecalendar.displayDetails&roadID=101"
        );
    }
}
