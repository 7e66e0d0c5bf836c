mod achievement;
mod certification_reminder;
mod course;
mod customer;
mod shared;
mod tenant;

use achievement::{IAchievementRepo, InMemoryAchievementRepo, PostgresAchievementRepo};
use certification_reminder::{
    ICertificationReminderRepo, InMemoryCertificationReminderRepo,
    PostgresCertificationReminderRepo,
};
use course::{ICourseRepo, InMemoryCourseRepo, PostgresCourseRepo};
use customer::{ICustomerRepo, InMemoryCustomerRepo, PostgresCustomerRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tenant::{ITenantRepo, InMemoryTenantRepo, PostgresTenantRepo};
use tracing::info;

pub use shared::query_structs::*;

#[derive(Clone)]
pub struct Repos {
    pub tenants: Arc<dyn ITenantRepo>,
    pub customers: Arc<dyn ICustomerRepo>,
    pub courses: Arc<dyn ICourseRepo>,
    pub achievements: Arc<dyn IAchievementRepo>,
    pub reminders: Arc<dyn ICertificationReminderRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        Ok(Self {
            tenants: Arc::new(PostgresTenantRepo::new(pool.clone())),
            customers: Arc::new(PostgresCustomerRepo::new(pool.clone())),
            courses: Arc::new(PostgresCourseRepo::new(pool.clone())),
            achievements: Arc::new(PostgresAchievementRepo::new(pool.clone())),
            reminders: Arc::new(PostgresCertificationReminderRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        let customers: Arc<dyn ICustomerRepo> = Arc::new(InMemoryCustomerRepo::new());
        let courses: Arc<dyn ICourseRepo> = Arc::new(InMemoryCourseRepo::new());
        Self {
            tenants: Arc::new(InMemoryTenantRepo::new()),
            achievements: Arc::new(InMemoryAchievementRepo::new(
                customers.clone(),
                courses.clone(),
            )),
            customers,
            courses,
            reminders: Arc::new(InMemoryCertificationReminderRepo::new()),
        }
    }
}
