use std::{net::SocketAddr, path::Path, time::Duration};

use anyhow::{Context, Result};
use cpbc_core::chrono_tz::Tz;
use serde::Deserialize;

/// One year. Longer periods would overflow the scheduler's deadline arithmetic.
const MAX_REFRESH_INTERVAL_HOURS: u64 = 366 * 24;

fn default_timezone() -> Tz {
    cpbc_core::refuse_client::DEFAULT_TIMEZONE
}

fn default_refresh_interval_hours() -> u64 {
    24
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8008))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// The council's id of the road, see `cpbc_cli roads`.
    pub road_id: String,
    /// Checked against the council's road list on every refresh when given.
    pub road_name: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default = "default_refresh_interval_hours")]
    pub refresh_interval_hours: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_hours.saturating_mul(60 * 60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

pub fn init(path: &Path) -> Result<Config> {
    let string = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    parse(&string).with_context(|| format!("invalid configuration in {}", path.display()))
}

fn parse(string: &str) -> Result<Config> {
    let config: Config = toml::from_str(string)?;
    if config.road_id.trim().is_empty() {
        anyhow::bail!("road_id must not be empty");
    }
    if config.refresh_interval_hours == 0 {
        anyhow::bail!("refresh_interval_hours must be at least 1");
    }
    if config.refresh_interval_hours > MAX_REFRESH_INTERVAL_HOURS {
        anyhow::bail!("refresh_interval_hours must be at most {MAX_REFRESH_INTERVAL_HOURS}");
    }
    Ok(config)
}
