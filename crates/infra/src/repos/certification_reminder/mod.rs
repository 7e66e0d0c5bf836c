mod inmemory;
mod postgres;

pub use inmemory::InMemoryCertificationReminderRepo;
pub use postgres::PostgresCertificationReminderRepo;

use certwatch_domain::{CertificationReminder, ID};

#[async_trait::async_trait]
pub trait ICertificationReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &CertificationReminder) -> anyhow::Result<()>;
    /// Reminders sent for the achievement, oldest first
    async fn find_by_achievement(
        &self,
        achievement_id: &ID,
    ) -> anyhow::Result<Vec<CertificationReminder>>;
}
