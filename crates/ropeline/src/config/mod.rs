use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::safety::csr::ScoringPolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub rating: RatingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cache_ttl_secs = read_number("CSR_CACHE_TTL_SECS", 300)?;
        let cache_max_entries = usize::try_from(read_number("CSR_CACHE_MAX_ENTRIES", 512)?)
            .map_err(|_| ConfigError::InvalidNumber {
                key: "CSR_CACHE_MAX_ENTRIES",
            })?;
        let toolbox_window_days = u32::try_from(read_number("CSR_TOOLBOX_WINDOW_DAYS", 7)?)
            .map_err(|_| ConfigError::InvalidNumber {
                key: "CSR_TOOLBOX_WINDOW_DAYS",
            })?;
        if toolbox_window_days == 0 || toolbox_window_days % 2 == 0 {
            return Err(ConfigError::InvalidWindow(toolbox_window_days));
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            rating: RatingConfig {
                cache_ttl: Duration::from_secs(cache_ttl_secs),
                cache_max_entries,
                toolbox_window_days,
            },
        })
    }
}

fn read_number(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the rating service wrapped around the CSR engine.
#[derive(Debug, Clone)]
pub struct RatingConfig {
    pub cache_ttl: Duration,
    /// Zero disables the rating cache.
    pub cache_max_entries: usize,
    pub toolbox_window_days: u32,
}

impl RatingConfig {
    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy::new(self.toolbox_window_days)
    }
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            cache_max_entries: 512,
            toolbox_window_days: 7,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    InvalidWindow(u32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative integer")
            }
            ConfigError::InvalidWindow(days) => write!(
                f,
                "CSR_TOOLBOX_WINDOW_DAYS must be an odd number of days, found {days}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidWindow(_) => None,
        }
    }
}
