mod inmemory;
mod postgres;

pub use inmemory::InMemoryAchievementRepo;
pub use postgres::PostgresAchievementRepo;

use crate::repos::shared::query_structs::{CertificationFilter, DueQuery, ReminderLock};
use certwatch_domain::{Achievement, Certification, ID};

#[async_trait::async_trait]
pub trait IAchievementRepo: Send + Sync {
    async fn insert(&self, achievement: &Achievement) -> anyhow::Result<()>;
    /// Persists the achievement and releases a reminder lock held on it.
    /// `reminders_sent` is never lowered by a save.
    async fn save(&self, achievement: &Achievement) -> anyhow::Result<()>;
    async fn find(&self, achievement_id: &ID) -> Option<Achievement>;
    async fn find_certification(&self, achievement_id: &ID) -> Option<Certification>;
    async fn find_due(&self, query: &DueQuery) -> anyhow::Result<Vec<Certification>>;
    /// Ordered by `is_expired` and then by expiry date, certifications
    /// without expiry date last
    async fn find_by_filter(
        &self,
        filter: &CertificationFilter,
    ) -> anyhow::Result<Vec<Certification>>;
    /// Atomically claims the achievement for a reminder run. Returns `None`
    /// when another run holds the lock or the lock condition does not hold.
    async fn lock_for_reminder(&self, lock: &ReminderLock) -> anyhow::Result<Option<Achievement>>;
    async fn unlock(&self, achievement_id: &ID) -> anyhow::Result<()>;
}
