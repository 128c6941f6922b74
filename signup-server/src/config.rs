//! Signup server configuration

use sqlx::postgres::PgConnectOptions;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Where to find PostgreSQL: a full URL or the individual parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

/// Signup server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseTarget,
    /// HTTP listen port
    pub port: u16,
    /// Upper bound on pooled connections
    pub db_max_connections: u32,
    /// How long a request waits for a pooled connection
    pub db_acquire_timeout: Duration,
    /// Budget for one signup write (begin through commit)
    pub signup_timeout: Duration,
    /// Budget for the background welcome and staff emails of one signup
    pub notify_timeout: Duration,
    /// Sender address for notifications; notifications are off when unset
    pub notify_from_email: Option<String>,
    /// Staff inbox for new-signup notices
    pub staff_email: Option<String>,
    /// SES region override
    pub ses_region: Option<String>,
    /// Environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| var(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database = match non_empty("DATABASE_URL") {
            Some(url) => DatabaseTarget::Url(url),
            None => DatabaseTarget::Parts {
                host: non_empty("DB_HOST").unwrap_or_else(|| "localhost".into()),
                port: parse_or("DB_PORT", non_empty("DB_PORT"), 5432)?,
                user: non_empty("DB_USER").unwrap_or_else(|| "root".into()),
                password: var("DB_PASSWORD").unwrap_or_default(),
                database: non_empty("DB_NAME").unwrap_or_else(|| "church_signup".into()),
            },
        };

        let config = Self {
            database,
            port: parse_or("PORT", non_empty("PORT"), 3000)?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", non_empty("DB_MAX_CONNECTIONS"), 10)?,
            db_acquire_timeout: Duration::from_secs(parse_or(
                "DB_ACQUIRE_TIMEOUT_SECS",
                non_empty("DB_ACQUIRE_TIMEOUT_SECS"),
                5,
            )?),
            signup_timeout: Duration::from_secs(parse_or(
                "SIGNUP_TIMEOUT_SECS",
                non_empty("SIGNUP_TIMEOUT_SECS"),
                10,
            )?),
            notify_timeout: Duration::from_secs(parse_or(
                "NOTIFY_TIMEOUT_SECS",
                non_empty("NOTIFY_TIMEOUT_SECS"),
                30,
            )?),
            notify_from_email: non_empty("NOTIFY_FROM_EMAIL"),
            staff_email: non_empty("STAFF_EMAIL"),
            ses_region: non_empty("SES_REGION"),
            environment: non_empty("ENVIRONMENT").unwrap_or_else(|| "development".into()),
        };

        if config.db_max_connections == 0 {
            return Err("DB_MAX_CONNECTIONS must be at least 1".into());
        }
        if config.signup_timeout.is_zero() {
            return Err("SIGNUP_TIMEOUT_SECS must be at least 1".into());
        }
        if config.notify_timeout.is_zero() {
            return Err("NOTIFY_TIMEOUT_SECS must be at least 1".into());
        }
        Ok(config)
    }

    /// PostgreSQL connect options for the configured target
    pub fn connect_options(&self) -> Result<PgConnectOptions, BoxError> {
        Ok(match &self.database {
            DatabaseTarget::Url(url) => url.parse()?,
            DatabaseTarget::Parts {
                host,
                port,
                user,
                password,
                database,
            } => PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(database),
        })
    }

    /// Whether outgoing notifications are configured
    pub fn notifications_enabled(&self) -> bool {
        self.notify_from_email.is_some()
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, BoxError>
where
    T: std::str::FromStr,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("{name} must be a number, got {raw:?}").into()),
    }
}
