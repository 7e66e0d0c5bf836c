use super::ICertificationReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use certwatch_domain::{CertificationReminder, ID};

pub struct InMemoryCertificationReminderRepo {
    reminders: std::sync::Mutex<Vec<CertificationReminder>>,
}

impl InMemoryCertificationReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ICertificationReminderRepo for InMemoryCertificationReminderRepo {
    async fn insert(&self, reminder: &CertificationReminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find_by_achievement(
        &self,
        achievement_id: &ID,
    ) -> anyhow::Result<Vec<CertificationReminder>> {
        let mut reminders = find_by(&self.reminders, |r| r.achievement_id == *achievement_id);
        reminders.sort_by_key(|r| r.sent_at);
        Ok(reminders)
    }
}
