//! Application state for signup-server

use aws_sdk_sesv2::Client as SesClient;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::MemberStore;
use crate::db::postgres::PgStore;
use crate::notify::{DisabledNotifier, Notifier, SesNotifier};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Idle pooled connections are closed after this long
const DB_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

/// Default budget for the background notifications of one signup
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Member storage (PostgreSQL in production)
    pub store: Arc<dyn MemberStore>,
    /// Post-signup email sender
    pub notifier: Arc<dyn Notifier>,
    /// Budget for one signup write
    pub signup_timeout: Duration,
    /// Budget for the background notifications of one signup
    pub notify_timeout: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MemberStore>,
        notifier: Arc<dyn Notifier>,
        signup_timeout: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            signup_timeout,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
        }
    }

    pub fn with_notify_timeout(mut self, notify_timeout: Duration) -> Self {
        self.notify_timeout = notify_timeout;
        self
    }

    /// Connect to PostgreSQL, run migrations and pick a notifier
    pub async fn from_config(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .idle_timeout(DB_IDLE_TIMEOUT)
            .connect_with(config.connect_options()?)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database ready");

        let notifier: Arc<dyn Notifier> = match &config.notify_from_email {
            Some(from) => {
                let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let ses = if let Some(region) = &config.ses_region {
                    let ses_config = aws_config
                        .to_builder()
                        .region(aws_config::Region::new(region.clone()))
                        .build();
                    SesClient::new(&ses_config)
                } else {
                    SesClient::new(&aws_config)
                };
                tracing::info!(from = %from, staff = ?config.staff_email, "Email notifications enabled");
                Arc::new(SesNotifier::new(ses, from.clone(), config.staff_email.clone()))
            }
            None => {
                tracing::info!("NOTIFY_FROM_EMAIL not set, email notifications disabled");
                Arc::new(DisabledNotifier)
            }
        };

        Ok(Self::new(
            Arc::new(PgStore::new(pool)),
            notifier,
            config.signup_timeout,
        )
        .with_notify_timeout(config.notify_timeout))
    }
}
