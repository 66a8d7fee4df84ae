use std::{path::PathBuf, process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use cpbc_core::{
    chrono_tz::Tz,
    directory::{find_by_id, find_by_name, validate, Road, ValidationState},
    event::CategoryBitmask,
    ical::generator::Emitter,
    projection::next_collection,
    refuse_client::{get_calendar, RefuseClient},
};
use log::info;

#[derive(Debug, Parser)]
#[command(about = "Castle Point refuse collection calendar")]
pub struct Arguments {
    /// time zone collection days are local to
    #[arg(long, global = true, default_value = "Europe/London")]
    pub timezone: Tz,
    /// request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// write the collection dates of a road to an iCalendar file
    Calendar {
        #[command(flatten)]
        args: CalendarArgs,
    },
    /// show the next collection of a road
    Next {
        /// the road id
        #[arg(required_unless_present = "road_name")]
        road_id: Option<String>,
        /// look the road id up by the road's name instead
        #[arg(long, conflicts_with = "road_id")]
        road_name: Option<String>,
    },
    /// list all roads with their ids
    Roads,
    /// check a road id, and optionally its name, against the council's road list
    Validate {
        /// the road id
        road_id: String,
        /// the road name the id should belong to
        road_name: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CalendarArgs {
    /// the road id
    pub road_id: String,
    /// the road name, used as event location
    #[arg(long)]
    pub road_name: Option<String>,
    /// where to write the calendar
    #[arg(long, default_value = "calendar.ics")]
    pub output: PathBuf,
    /// exclude pink collection dates
    #[arg(long)]
    pub exclude_pink: bool,
    /// exclude normal collection dates
    #[arg(long)]
    pub exclude_normal: bool,
}

impl From<&CalendarArgs> for CategoryBitmask {
    fn from(value: &CalendarArgs) -> Self {
        let mut category_bitmask = CategoryBitmask::none();
        if value.exclude_pink {
            category_bitmask |= CategoryBitmask::Pink;
        }
        if value.exclude_normal {
            category_bitmask |= CategoryBitmask::Normal;
        }
        category_bitmask
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Arguments::parse();
    let client = RefuseClient::new(Duration::from_secs(args.timeout), args.timezone)?;
    match args.command {
        Command::Calendar { args: calendar_args } => run_calendar(&client, calendar_args).await,
        Command::Next { road_id, road_name } => {
            let road_id = match (road_id, road_name) {
                (Some(road_id), _) => road_id,
                (None, road_name) => {
                    let roads = client.get_roads().await?;
                    resolve_road_id(&roads, road_name.as_deref().unwrap_or_default())?
                }
            };
            run_next(&client, &road_id).await
        }
        Command::Roads => run_roads(&client).await,
        Command::Validate { road_id, road_name } => {
            run_validate(&client, &road_id, road_name.as_deref()).await
        }
    }
}

async fn run_calendar(client: &RefuseClient, calendar_args: CalendarArgs) -> Result<ExitCode> {
    let events = client.get_events(&calendar_args.road_id).await?;
    let calendar = get_calendar(
        &calendar_args.road_id,
        calendar_args.road_name.as_deref(),
        &events,
        CategoryBitmask::from(&calendar_args),
        client.timezone(),
    );
    std::fs::write(&calendar_args.output, calendar.generate())?;
    info!(
        "wrote {} events to {}",
        calendar.events.len(),
        calendar_args.output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn resolve_road_id(roads: &[Road], road_name: &str) -> Result<String> {
    let road = find_by_name(roads, road_name)
        .with_context(|| format!("no road named {road_name:?}, see `cpbc_cli roads`"))?;
    info!("road {road_name:?} has id {}", road.id);
    Ok(road.id.clone())
}

async fn run_next(client: &RefuseClient, road_id: &str) -> Result<ExitCode> {
    let events = client.get_events(road_id).await?;
    match next_collection(&events, Utc::now(), client.timezone()) {
        Some(next) => println!(
            "{}\t{}\tin {} days",
            next.collection_date, next.category, next.days_until
        ),
        None => println!("no upcoming collection"),
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_roads(client: &RefuseClient) -> Result<ExitCode> {
    for road in client.get_roads().await? {
        println!("{}\t{}", road.id, road.name);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_validate(
    client: &RefuseClient,
    road_id: &str,
    road_name: Option<&str>,
) -> Result<ExitCode> {
    let roads = client.get_roads().await?;
    let state = validate(&roads, road_id, road_name);
    match &state {
        ValidationState::Fail(mismatch) => println!("{}: {mismatch}", state.label()),
        _ => {
            let name = find_by_id(&roads, road_id).map_or("", |road| road.name.as_str());
            println!("{}: {road_id} is {name}", state.label());
        }
    }
    Ok(match state {
        ValidationState::Pass => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
