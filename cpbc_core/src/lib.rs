//! This crate reads Castle Point Borough Council's refuse collection calendar
//! and turns it into collection events for a single road.
//!
//! The dates are read from <https://apps.castlepoint.gov.uk/cpapps/index.cfm?fa=wastecalendar>.

pub use chrono_tz;
pub use ical;

pub mod directory;
pub mod error;
pub mod event;
pub mod extractor;
pub mod projection;
pub mod refresh;
pub mod refuse_client;
