use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::listings::Coordinate;

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

/// Canonical downtown Calgary reference point.
pub const DEFAULT_DOWNTOWN: Coordinate = Coordinate {
    latitude: 51.04782,
    longitude: -114.05920,
};

pub const DEFAULT_NAMESPACE: &str = "house-search";

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub provider: ProviderConfig,
    pub downtown: Coordinate,
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

        let namespace = env::var("HOUSE_SEARCH_NAMESPACE")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let db_path = env::var("HOUSE_SEARCH_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("house-search.db"));

        let here_api_key = env::var("HERE_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let downtown = Coordinate {
            latitude: coordinate_var("DOWNTOWN_LATITUDE", DEFAULT_DOWNTOWN.latitude)?,
            longitude: coordinate_var("DOWNTOWN_LONGITUDE", DEFAULT_DOWNTOWN.longitude)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            store: StoreConfig { namespace, db_path },
            provider: ProviderConfig { here_api_key },
            downtown,
        })
    }
}

fn coordinate_var(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidCoordinate { variable: name }),
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

/// Where listing data lives and which key namespace it is filed under.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub namespace: String,
    pub db_path: PathBuf,
}

/// Credentials for the external routing and geocoding provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub here_api_key: Option<String>,
}

impl ProviderConfig {
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.here_api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCoordinate { variable: &'static str },
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCoordinate { variable } => {
                write!(f, "{variable} must be a finite decimal degree value")
            }
            ConfigError::MissingApiKey => {
                write!(f, "HERE_API_KEY must be set to query routes or geocode addresses")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidCoordinate { .. }
            | ConfigError::MissingApiKey => None,
        }
    }
}
