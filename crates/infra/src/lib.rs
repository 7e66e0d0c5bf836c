mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, SmtpConfig, SmtpTls};
pub use repos::{CertificationFilter, DueQuery, LockCondition, ReminderLock, Repos};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::info;

#[derive(Clone)]
pub struct CertwatchContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub mailer: Arc<dyn IMailer>,
    pub templates: Arc<ReminderTemplates>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl CertwatchContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let repos = Repos::create_postgres(&params.postgres_connection_string).await?;
        let config = Config::new();
        Ok(Self {
            repos,
            mailer: Arc::new(SmtpMailer::new(config.smtp.as_ref())),
            config,
            sys: Arc::new(RealSys {}),
            templates: Arc::new(ReminderTemplates::new()?),
        })
    }

    /// Context backed by inmemory repositories and an `InMemoryMailer`
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            mailer: Arc::new(InMemoryMailer::new()),
            templates: Arc::new(
                ReminderTemplates::new().expect("Reminder templates to be valid"),
            ),
        }
    }
}

const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<CertwatchContext> {
    match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(postgres_connection_string) => {
            info!(
                "{} env var was provided. Going to use postgres.",
                PSQL_CONNECTION_STRING
            );
            CertwatchContext::create(ContextParams {
                postgres_connection_string,
            })
            .await
        }
        Err(_) => {
            info!(
                "{} env var was not provided. Going to use inmemory repositories.",
                PSQL_CONNECTION_STRING
            );
            let config = Config::new();
            Ok(CertwatchContext {
                repos: Repos::create_inmemory(),
                mailer: Arc::new(SmtpMailer::new(config.smtp.as_ref())),
                config,
                sys: Arc::new(RealSys {}),
                templates: Arc::new(ReminderTemplates::new()?),
            })
        }
    }
}

/// Runs the embedded migrations when postgres is configured
pub async fn run_migration() -> Result<(), MigrateError> {
    let connection_string = match std::env::var(PSQL_CONNECTION_STRING) {
        Ok(connection_string) => connection_string,
        Err(_) => return Ok(()),
    };
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await?;

    sqlx::migrate!().run(&pool).await
}
