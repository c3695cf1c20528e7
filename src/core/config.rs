use crate::auth::JwtConfig;
use crate::orders::CountedStatuses;
use chrono_tz::Tz;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | DATABASE_URL | postgres://localhost/pizzaria | PostgreSQL connection string |
/// | HTTP_PORT | 3001 | HTTP API port |
/// | TIMEZONE | America/Sao_Paulo | Business timezone for date bucketing |
/// | COUNTED_STATUSES | delivered,picked_up | Statuses counted as revenue |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | JWT_SECRET | (generated in dev) | HS256 signing key, min 32 bytes |
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string
    pub database_url: String,
    /// HTTP API port
    pub http_port: u16,
    /// Business timezone: every order is bucketed to exactly one calendar
    /// date under this zone
    pub timezone: Tz,
    /// Revenue counting policy
    pub counted_statuses: CountedStatuses,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults.
    ///
    /// Invalid TIMEZONE or COUNTED_STATUSES values fall back to the default
    /// with a warning rather than aborting startup.
    pub fn from_env() -> Self {
        let timezone = std::env::var("TIMEZONE")
            .ok()
            .and_then(|v| {
                v.parse::<Tz>()
                    .map_err(|_| tracing::warn!("Invalid TIMEZONE '{}', using America/Sao_Paulo", v))
                    .ok()
            })
            .unwrap_or(chrono_tz::America::Sao_Paulo);

        let counted_statuses = std::env::var("COUNTED_STATUSES")
            .ok()
            .and_then(|v| {
                CountedStatuses::parse(&v)
                    .map_err(|e| tracing::warn!("Invalid COUNTED_STATUSES '{}': {}", v, e))
                    .ok()
            })
            .unwrap_or_default();

        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/pizzaria".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            timezone,
            counted_statuses,
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
