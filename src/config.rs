use std::{env, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub maps_api_key: Option<String>,
    /// Country filter for place autocomplete.
    pub country: String,
    pub directions_timeout: Duration,
    pub zones_path: PathBuf,
    pub port: u16,
    /// Zone events kept per session before the oldest are dropped.
    pub event_capacity: usize,
    /// Sessions with no client activity for this long are stopped.
    pub session_idle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            maps_api_key: None,
            country: "ph".into(),
            directions_timeout: Duration::from_secs(10),
            zones_path: "zones.csv".into(),
            port: 3000,
            event_capacity: 256,
            session_idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Default::default()
    }

    /// Defaults overridden by environment variables.
    pub fn from_env() -> Result<Self, self::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, self::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup("GOOGLE_MAPS_API_KEY").filter(|key| !key.is_empty()) {
            config.maps_api_key = Some(value);
        }
        if let Some(value) = lookup("SERENWALK_COUNTRY") {
            config.country = value.to_ascii_lowercase();
        }
        if let Some(value) = lookup("SERENWALK_DIRECTIONS_TIMEOUT_SECS") {
            config.directions_timeout =
                Duration::from_secs(parse("SERENWALK_DIRECTIONS_TIMEOUT_SECS", &value)?);
        }
        if let Some(value) = lookup("SERENWALK_ZONES") {
            config.zones_path = value.into();
        }
        if let Some(value) = lookup("SERENWALK_PORT") {
            config.port = parse("SERENWALK_PORT", &value)?;
        }
        if let Some(value) = lookup("SERENWALK_EVENT_CAPACITY") {
            config.event_capacity = parse("SERENWALK_EVENT_CAPACITY", &value)?;
        }
        if let Some(value) = lookup("SERENWALK_SESSION_IDLE_SECS") {
            config.session_idle_timeout =
                Duration::from_secs(parse("SERENWALK_SESSION_IDLE_SECS", &value)?);
        }
        Ok(config)
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, self::Error> {
    value.trim().parse().map_err(|_| Error::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
