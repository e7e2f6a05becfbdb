//! Server configuration from environment variables.
//!
//! Every variable is optional; unset variables fall back to defaults.
//! Set-but-invalid variables are an error naming the variable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveTime;

use crate::board::{
    BoardLimits, Collation, DEFAULT_LOCALE, LineOrder, PollerConfig, TransformOptions,
};
use crate::mvg::{ApiVersion, MvgConfig};
use crate::stations::DEFAULT_ZDM_BASE_URL;

const DEFAULT_STATION: &str = "Forstenrieder Allee";
const DEFAULT_DEPARTURE_LIMIT: u16 = 20;
const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
const DEFAULT_RELOAD_HOUR: u32 = 3;
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// A configuration variable was set to an unusable value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value {value:?} for {var}: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub mvg: MvgConfig,
    pub zdm_base_url: String,
    /// Serve fixtures from this directory instead of the live API.
    pub mock_dir: Option<PathBuf>,
    /// Station shown when a request selects none.
    pub default_station: String,
    pub departure_limit: u16,
    pub refresh_interval: Duration,
    /// Local time of the daily full page reload.
    pub daily_reload_at: NaiveTime,
    pub collation_locale: String,
    pub hide_cancelled: bool,
    pub line_order: LineOrder,
    pub static_dir: PathBuf,
    /// Bounds on the per-station boards.
    pub board_limits: BoardLimits,
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`, which returns the value of
    /// a variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let defaults = Self::default();

        let version = env.parse_with("MVG_API_VERSION", ApiVersion::V2, parse_api_version)?;
        let timeout_secs = env.parse("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        let base_url = env.string("MVG_API_BASE_URL", version.default_base_url());
        let mvg = MvgConfig::new(version)
            .with_base_url(base_url)
            .with_timeout(timeout_secs);

        let collation_locale = env.string("COLLATION_LOCALE", DEFAULT_LOCALE);
        if !Collation::is_valid_locale(&collation_locale) {
            return Err(ConfigError {
                var: "COLLATION_LOCALE",
                value: collation_locale,
                reason: "not a valid locale identifier".to_string(),
            });
        }

        let departure_limit: u16 = env.parse("DEPARTURE_LIMIT", DEFAULT_DEPARTURE_LIMIT)?;
        if departure_limit == 0 {
            return Err(ConfigError {
                var: "DEPARTURE_LIMIT",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let refresh_secs: u64 = env.parse("REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS)?;
        if refresh_secs == 0 {
            return Err(ConfigError {
                var: "REFRESH_INTERVAL_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let default_station = env.string("DEFAULT_STATION", DEFAULT_STATION);
        if default_station.trim().is_empty() {
            return Err(ConfigError {
                var: "DEFAULT_STATION",
                value: default_station,
                reason: "must not be blank".to_string(),
            });
        }

        let max_boards: usize = env.parse("MAX_BOARDS", defaults.board_limits.max_boards)?;
        if max_boards == 0 {
            return Err(ConfigError {
                var: "MAX_BOARDS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let idle_secs: u64 = env.parse(
            "BOARD_IDLE_SECS",
            defaults.board_limits.idle_timeout.as_secs(),
        )?;
        if idle_secs == 0 {
            return Err(ConfigError {
                var: "BOARD_IDLE_SECS",
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            bind_addr: env.parse("BIND_ADDR", defaults.bind_addr)?,
            mvg,
            zdm_base_url: env.string("MVG_ZDM_BASE_URL", DEFAULT_ZDM_BASE_URL),
            mock_dir: env.get("MVG_MOCK_DIR").map(PathBuf::from),
            default_station,
            departure_limit,
            refresh_interval: Duration::from_secs(refresh_secs),
            daily_reload_at: env.parse_with(
                "DAILY_RELOAD_AT",
                defaults.daily_reload_at,
                parse_reload_time,
            )?,
            collation_locale,
            hide_cancelled: env.parse_with("HIDE_CANCELLED", false, parse_bool)?,
            line_order: env.parse_with("LINE_ORDER", LineOrder::FirstSeen, parse_line_order)?,
            static_dir: PathBuf::from(env.string("STATIC_DIR", DEFAULT_STATIC_DIR)),
            board_limits: BoardLimits {
                max_boards,
                idle_timeout: Duration::from_secs(idle_secs),
            },
        })
    }

    /// Poller settings derived from this configuration.
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: self.refresh_interval,
            limit: self.departure_limit,
            hide_cancelled: self.hide_cancelled,
            transform: TransformOptions {
                line_order: self.line_order,
                locale: self.collation_locale.clone(),
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            mvg: MvgConfig::default(),
            zdm_base_url: DEFAULT_ZDM_BASE_URL.to_string(),
            mock_dir: None,
            default_station: DEFAULT_STATION.to_string(),
            departure_limit: DEFAULT_DEPARTURE_LIMIT,
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            daily_reload_at: NaiveTime::from_hms_opt(DEFAULT_RELOAD_HOUR, 0, 0)
                .unwrap_or(NaiveTime::MIN),
            collation_locale: DEFAULT_LOCALE.to_string(),
            hide_cancelled: false,
            line_order: LineOrder::FirstSeen,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            board_limits: BoardLimits::default(),
        }
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// A set, non-blank variable.
    fn get(&self, var: &str) -> Option<String> {
        (self.lookup)(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, var: &'static str, default: &str) -> String {
        self.get(var).unwrap_or_else(|| {
            tracing::debug!("{var} not set, using default: {default}");
            default.to_string()
        })
    }

    fn parse<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.parse_with(var, default, |s| s.parse::<T>().map_err(|e| e.to_string()))
    }

    fn parse_with<T>(
        &self,
        var: &'static str,
        default: T,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<T, ConfigError> {
        match self.get(var) {
            Some(value) => parse(&value).map_err(|reason| ConfigError { var, value, reason }),
            None => {
                tracing::debug!("{var} not set, using default");
                Ok(default)
            }
        }
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

fn parse_api_version(s: &str) -> Result<ApiVersion, String> {
    match s.to_ascii_lowercase().as_str() {
        "v2" => Ok(ApiVersion::V2),
        "v3" => Ok(ApiVersion::V3),
        _ => Err("expected v2 or v3".to_string()),
    }
}

fn parse_line_order(s: &str) -> Result<LineOrder, String> {
    match s.to_ascii_lowercase().as_str() {
        "first-seen" => Ok(LineOrder::FirstSeen),
        "label" => Ok(LineOrder::Label),
        _ => Err("expected first-seen or label".to_string()),
    }
}

fn parse_reload_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM ({e})"))
}
