//! The council's road directory, used to check the configured road.

use log::debug;
use scraper::{Html, Selector};
use thiserror::Error;

use crate::error::ParseError;

/// An entry of the road selection on the council's calendar page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Road {
    pub name: String,
    pub id: String,
}

impl Road {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// How the configured road differs from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationMismatch {
    #[error("road id {0} is not listed by the council")]
    UnknownRoadId(String),
    #[error("road id {road_id} belongs to {actual:?}, not {expected:?}")]
    NameMismatch {
        road_id: String,
        expected: String,
        actual: String,
    },
}

/// Result of checking the configured road against the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValidationState {
    /// No validation has run yet.
    #[default]
    Unknown,
    Pass,
    Fail(ValidationMismatch),
}

impl ValidationState {
    pub fn label(&self) -> &'static str {
        match self {
            ValidationState::Unknown => "unknown",
            ValidationState::Pass => "pass",
            ValidationState::Fail(_) => "fail",
        }
    }
}

/// Parse the options of the `roadID` selection.
///
/// Placeholder options without a value are left out.
pub fn parse_roads(html: &str) -> Result<Vec<Road>, ParseError> {
    let dom = Html::parse_document(html);
    let select_selector = Selector::parse(r#"select[name="roadID"]"#).unwrap();
    let option_selector = Selector::parse("option").unwrap();
    let select = dom
        .select(&select_selector)
        .next()
        .ok_or(ParseError::MissingRoadSelect)?;
    let roads: Vec<Road> = select
        .select(&option_selector)
        .filter_map(|option| {
            let id = option.value().attr("value")?.trim();
            if id.is_empty() {
                return None;
            }
            let name = option
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<&str>>()
                .join(" ");
            Some(Road::new(name, id))
        })
        .collect();
    debug!("road directory lists {} roads", roads.len());
    Ok(roads)
}

pub fn find_by_id<'a>(roads: &'a [Road], road_id: &str) -> Option<&'a Road> {
    roads.iter().find(|road| road.id == road_id)
}

/// Look a road up by its exact name as listed by the council, to learn its id.
pub fn find_by_name<'a>(roads: &'a [Road], road_name: &str) -> Option<&'a Road> {
    roads.iter().find(|road| road.name == road_name)
}

/// Check a configured road id, and its name if one is given, against the directory.
pub fn validate(roads: &[Road], road_id: &str, road_name: Option<&str>) -> ValidationState {
    let Some(road) = find_by_id(roads, road_id) else {
        return ValidationState::Fail(ValidationMismatch::UnknownRoadId(road_id.to_string()));
    };
    match road_name {
        Some(expected) if expected != road.name => {
            ValidationState::Fail(ValidationMismatch::NameMismatch {
                road_id: road_id.to_string(),
                expected: expected.to_string(),
                actual: road.name.clone(),
            })
        }
        _ => ValidationState::Pass,
    }
}
