//! Turn the council's calendar page into collection events.
//!
//! The page renders every month more than once (a mobile and a desktop
//! layout) and adds single preview months which carry no usable dates.
//! Only months that appear at least twice are read, each of them once.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{
    error::ParseError,
    event::{Category, CollectionEvent},
};

static MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Month and year of a calendar block, as given by its heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthHeading {
    pub month: u32,
    pub year: i32,
}

/// Extract all collection events from a schedule page.
///
/// Broken month blocks, cells and dates are logged and skipped.
pub fn extract(html: &str, timezone: Tz) -> Vec<CollectionEvent> {
    let dom = Html::parse_document(html);
    let cell_selector = Selector::parse(".pink, .normal").unwrap();
    let mut events: Vec<CollectionEvent> = vec![];
    for block in month_blocks(&dom) {
        let heading = match heading_text(block)
            .ok_or(ParseError::MissingHeading)
            .and_then(|text| parse_heading(&text))
        {
            Ok(heading) => heading,
            Err(err) => {
                warn!("skipping month block: {err}");
                continue;
            }
        };
        for cell in block.select(&cell_selector) {
            let event = parse_cell(&cell.html())
                .and_then(|(category, day)| assemble(category, heading, day, timezone));
            match event {
                Ok(event) => events.push(event),
                Err(err) => warn!("skipping day cell in {heading:?}: {err}"),
            }
        }
    }
    debug!("extracted {} collection events", events.len());
    events
}

/// Find the month containers worth reading.
///
/// Containers are grouped by heading text. Each group with at least two
/// members is represented by its last member; groups keep the order of
/// their first appearance. Singletons and containers without a heading
/// are dropped.
fn month_blocks(dom: &Html) -> Vec<ElementRef<'_>> {
    let container_selector = Selector::parse(".calendarContainer").unwrap();
    let containers: Vec<ElementRef> = dom.select(&container_selector).collect();
    let headings: Vec<Option<String>> = containers.iter().map(|c| heading_text(*c)).collect();
    let mut blocks = vec![];
    for (outer, outer_heading) in headings.iter().enumerate() {
        let Some(outer_heading) = outer_heading else {
            warn!("calendar container {outer} has no heading, skipping it");
            continue;
        };
        if headings[..outer]
            .iter()
            .any(|heading| heading.as_ref() == Some(outer_heading))
        {
            continue;
        }
        let duplicate = (outer + 1..containers.len())
            .filter(|inner| headings[*inner].as_ref() == Some(outer_heading))
            .last();
        match duplicate {
            Some(inner) => blocks.push(containers[inner]),
            None => debug!("dropping single calendar container {outer_heading:?}"),
        }
    }
    blocks
}

/// The whitespace-normalized text of the first `<h2>` in a container.
fn heading_text(container: ElementRef) -> Option<String> {
    let heading_selector = Selector::parse("h2").unwrap();
    let heading = container.select(&heading_selector).next()?;
    let text = heading
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<&str>>()
        .join(" ");
    Some(text)
}

fn heading_regex() -> &'static Regex {
    static HEADING_REGEX: OnceLock<Regex> = OnceLock::new();
    HEADING_REGEX
        .get_or_init(|| Regex::new(r"^\s*(?P<month>\S+)\s+(?P<year>\d{4})\s*$").unwrap())
}

fn cell_regex() -> &'static Regex {
    static CELL_REGEX: OnceLock<Regex> = OnceLock::new();
    CELL_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?s)^<td\b[^>]*?\sclass="(?P<class>[^"]*)"[^>]*>(?:\s|&nbsp;|<[^>]*>)*(?P<day>\d+)"#,
        )
        .unwrap()
    })
}

/// Parse a heading like `June 2024`.
///
/// Month names are matched case-sensitively against their English names.
pub fn parse_heading(text: &str) -> Result<MonthHeading, ParseError> {
    let captures = heading_regex()
        .captures(text)
        .ok_or_else(|| ParseError::Heading(text.to_string()))?;
    let month_name = &captures["month"];
    let month = MONTH_NAMES
        .iter()
        .position(|name| *name == month_name)
        .ok_or_else(|| ParseError::MonthName(month_name.to_string()))?;
    let year = captures["year"]
        .parse()
        .map_err(|_| ParseError::Heading(text.to_string()))?;
    Ok(MonthHeading {
        month: month as u32 + 1,
        year,
    })
}

/// Read category and day of month from the markup of a single day cell.
///
/// Tags and whitespace between the opening `<td>` and the day number are
/// skipped.
pub fn parse_cell(html: &str) -> Result<(Category, u32), ParseError> {
    let captures = cell_regex()
        .captures(html)
        .ok_or_else(|| ParseError::Cell(html.to_string()))?;
    let category = captures["class"]
        .split_whitespace()
        .find_map(|class| class.parse::<Category>().ok())
        .ok_or_else(|| ParseError::Cell(html.to_string()))?;
    let day: u32 = captures["day"]
        .parse()
        .map_err(|_| ParseError::Cell(html.to_string()))?;
    if !(1..=31).contains(&day) {
        return Err(ParseError::DayOutOfRange(day));
    }
    Ok((category, day))
}

/// Build the all-day event for a collection day.
///
/// Days that do not exist in the month are rejected; the end is the next
/// calendar day, rolling over into the next month or year.
pub fn assemble(
    category: Category,
    heading: MonthHeading,
    day: u32,
    timezone: Tz,
) -> Result<CollectionEvent, ParseError> {
    let invalid = || ParseError::InvalidDate {
        year: heading.year,
        month: heading.month,
        day,
    };
    let date = NaiveDate::from_ymd_opt(heading.year, heading.month, day).ok_or_else(invalid)?;
    let next_date = date.succ_opt().ok_or_else(invalid)?;
    Ok(CollectionEvent {
        category,
        start: start_of_local_day(date, timezone)?,
        end: start_of_local_day(next_date, timezone)?,
    })
}

/// Local midnight of `date` as a UTC instant.
fn start_of_local_day(date: NaiveDate, timezone: Tz) -> Result<DateTime<Utc>, ParseError> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|midnight| timezone.from_local_datetime(&midnight).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or(ParseError::LocalMidnight(date))
}
