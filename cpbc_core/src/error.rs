//! Errors raised while fetching and parsing the council's pages.

use thiserror::Error;

/// A refresh cycle could not get a usable page from the council's server.
///
/// This is fatal to the cycle, the caller keeps whatever data it had before.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("could not read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A single month block, day cell or date could not be parsed.
///
/// These never abort a refresh; the offending piece is logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("calendar container has no month heading")]
    MissingHeading,
    #[error("heading {0:?} is not of the form \"<Month> <Year>\"")]
    Heading(String),
    #[error("unknown month name {0:?}")]
    MonthName(String),
    #[error("day cell {0:?} does not match the expected markup")]
    Cell(String),
    #[error("day {0} is outside of 1-31")]
    DayOutOfRange(u32),
    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("local midnight of {0} does not exist in the configured time zone")]
    LocalMidnight(chrono::NaiveDate),
    #[error("road directory has no road selection")]
    MissingRoadSelect,
}

/// A CSS class that names no collection category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown collection category {0:?}")]
pub struct UnknownCategory(pub String);
