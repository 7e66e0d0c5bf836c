use super::ICertificationReminderRepo;
use certwatch_domain::{CertificationReminder, ReminderType, ID};
use chrono::{DateTime, Utc};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::{error, warn};

pub struct PostgresCertificationReminderRepo {
    pool: PgPool,
}

impl PostgresCertificationReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CertificationReminderRaw {
    reminder_uid: Uuid,
    tenant_uid: Uuid,
    achievement_uid: Uuid,
    reminder_type: String,
    scheduled_for: DateTime<Utc>,
    sent_at: DateTime<Utc>,
    email_sent: bool,
    email_subject: String,
    email_content: String,
}

impl From<CertificationReminderRaw> for CertificationReminder {
    fn from(e: CertificationReminderRaw) -> Self {
        let reminder_type = e.reminder_type.parse().unwrap_or_else(|_| {
            warn!(
                "Certification reminder {} has an unknown type: {}",
                e.reminder_uid, e.reminder_type
            );
            ReminderType::Custom
        });
        Self {
            id: e.reminder_uid.into(),
            tenant_id: e.tenant_uid.into(),
            achievement_id: e.achievement_uid.into(),
            reminder_type,
            scheduled_for: e.scheduled_for,
            sent_at: e.sent_at,
            email_sent: e.email_sent,
            email_subject: e.email_subject,
            email_content: e.email_content,
        }
    }
}

#[async_trait::async_trait]
impl ICertificationReminderRepo for PostgresCertificationReminderRepo {
    async fn insert(&self, reminder: &CertificationReminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO certification_reminders(
                reminder_uid, tenant_uid, achievement_uid, reminder_type,
                scheduled_for, sent_at, email_sent, email_subject, email_content
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.tenant_id.inner_ref())
        .bind(reminder.achievement_id.inner_ref())
        .bind(reminder.reminder_type.as_str())
        .bind(reminder.scheduled_for)
        .bind(reminder.sent_at)
        .bind(reminder.email_sent)
        .bind(&reminder.email_subject)
        .bind(&reminder.email_content)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert certification reminder: {:?}. DB returned error: {:?}",
                reminder, e
            );
            e
        })?;
        Ok(())
    }

    async fn find_by_achievement(
        &self,
        achievement_id: &ID,
    ) -> anyhow::Result<Vec<CertificationReminder>> {
        let reminders: Vec<CertificationReminderRaw> = sqlx::query_as(
            r#"
            SELECT * FROM certification_reminders
            WHERE achievement_uid = $1
            ORDER BY sent_at ASC, reminder_seq ASC
            "#,
        )
        .bind(achievement_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find certification reminders for achievement: {:?} failed. DB returned error: {:?}",
                achievement_id, e
            );
            e
        })?;
        Ok(reminders.into_iter().map(|r| r.into()).collect())
    }
}
