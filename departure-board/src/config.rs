//! Application configuration from environment variables.
//!
//! Everything is read through a lookup function so tests can supply their
//! own environment. Empty values count as unset.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::display::{DisplayConfig, MatrixGeometry};
use crate::resrobot::{ResRobotConfig, StopRef};
use crate::select::{
    CriteriaError, MissingLinePolicy, PlatformRule, SelectionCriteria, TimePolicy,
};
use crate::service::{CacheConfig, ServiceConfig};
use crate::sl::{SiteRef, SlConfig};
use crate::source::SourceConfig;

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value `{value}` for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid selection criteria: {0}")]
    Criteria(#[from] CriteriaError),
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

/// Everything the binary needs to run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub criteria: SelectionCriteria,
    pub service: ServiceConfig,
    pub server: ServerConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let timeout_secs: u64 = env.parse_or("REQUEST_TIMEOUT_SECS", 10)?;
        let source = source_config(&env, timeout_secs)?;
        let criteria = criteria(&env)?;

        let fetch_limit: u32 = env.parse_or("MAX_DEPARTURES_TO_FETCH", 20)?;
        if fetch_limit == 0 {
            return Err(invalid("MAX_DEPARTURES_TO_FETCH", "0", "must be positive"));
        }
        let cache_ttl: u64 = env.parse_or("CACHE_TTL_SECS", 30)?;
        if cache_ttl == 0 {
            return Err(invalid("CACHE_TTL_SECS", "0", "must be positive"));
        }
        let service = ServiceConfig {
            fetch_limit,
            cache: CacheConfig {
                ttl: Duration::from_secs(cache_ttl),
                ..CacheConfig::default()
            },
            ..ServiceConfig::default()
        };

        let server = ServerConfig {
            bind_addr: env.parse_or("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
        };

        let cascaded: usize = env.parse_or("MATRIX_CASCADED", 4)?;
        if cascaded == 0 {
            return Err(invalid("MATRIX_CASCADED", "0", "must be positive"));
        }
        let defaults = DisplayConfig::default();
        let display = DisplayConfig {
            geometry: MatrixGeometry {
                cascaded,
                scroll_delay: Duration::from_millis(env.parse_or("SCROLL_DELAY_MS", 100)?),
            },
            refresh_interval: Duration::from_secs(env.parse_or("DISPLAY_REFRESH_SECS", 60)?),
            driver_command: env
                .get("MATRIX_DRIVER_CMD")
                .unwrap_or(defaults.driver_command),
        };

        Ok(Self {
            source,
            criteria,
            service,
            server,
            display,
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key).ok_or(ConfigError::Missing(key))
    }

    fn parse<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|value| {
                value
                    .parse()
                    .map_err(|e: T::Err| invalid(key, &value, e))
            })
            .transpose()
    }

    fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        Ok(self.parse(key)?.unwrap_or(default))
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|value| match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(invalid(key, &value, "expected true or false")),
            })
            .transpose()
    }
}

fn invalid(key: &'static str, value: &str, reason: impl Display) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn source_config<F>(env: &Env<F>, timeout_secs: u64) -> Result<SourceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let kind = env.get("TRANSIT_SOURCE").unwrap_or_else(|| "sl".to_string());

    match kind.to_ascii_lowercase().as_str() {
        "sl" => {
            let site = match (env.get("SL_SITE_ID"), env.get("SL_SITE_NAME")) {
                (Some(id), _) => SiteRef::Id(id),
                (None, Some(name)) => SiteRef::Name(name),
                (None, None) => return Err(ConfigError::Missing("SL_SITE_ID")),
            };
            Ok(SourceConfig::Sl(SlConfig::new(site).with_timeout(timeout_secs)))
        }
        "resrobot" => {
            let access_id = env.require("RESROBOT_ACCESS_ID")?;
            let stop = match (env.get("RESROBOT_STOP_ID"), env.get("STATION_NAME")) {
                (Some(id), _) => StopRef::Id(id),
                (None, Some(name)) => StopRef::Name(name),
                (None, None) => return Err(ConfigError::Missing("RESROBOT_STOP_ID")),
            };
            Ok(SourceConfig::ResRobot(
                ResRobotConfig::new(access_id, stop).with_timeout(timeout_secs),
            ))
        }
        "mock" => Ok(SourceConfig::Mock {
            path: PathBuf::from(env.require("MOCK_DEPARTURES_FILE")?),
        }),
        _ => Err(invalid("TRANSIT_SOURCE", &kind, "expected sl, resrobot or mock")),
    }
}

fn criteria<F>(env: &Env<F>) -> Result<SelectionCriteria, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let destination = env.require("TARGET_DESTINATION")?;
    let max_results: i64 = env.parse_or("MAX_DEPARTURES_TO_SHOW", 3)?;

    let mut criteria = SelectionCriteria::new(destination, max_results)?
        .with_platform_rule(env.parse_or("PLATFORM_RULE", PlatformRule::default())?)
        .with_time_policy(env.parse_or("TIME_POLICY", TimePolicy::default())?)
        .with_zone(env.parse_or::<Tz>("TIME_ZONE", crate::select::DEFAULT_ZONE)?);

    if let Some(line) = env.get("TARGET_LINE") {
        criteria = criteria.with_line(line);
    }
    if let Some(policy) = env.parse::<MissingLinePolicy>("MISSING_LINE")? {
        criteria = criteria.with_missing_line(policy);
    }
    if let Some(dedup) = env.flag("DEDUP_JOURNEYS")? {
        criteria = criteria.with_dedup_journeys(dedup);
    }

    Ok(criteria)
}
