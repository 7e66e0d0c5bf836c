use certwatch_domain::{
    AttachedFile, Certification, CertificationReminder, CertificationState, Classification,
    ExpiryPolicy, ReminderType, ID,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDTO {
    pub id: ID,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CourseDTO {
    pub id: ID,
    pub title: String,
    pub category: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CertificationDTO {
    pub id: ID,
    pub tenant_id: ID,
    pub customer: CustomerDTO,
    pub course: CourseDTO,
    pub certification_date: DateTime<Utc>,
    /// The expiry date the certification is evaluated against
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_expired: bool,
    pub reminders_sent: i64,
    pub next_reminder_date: Option<DateTime<Utc>>,
    pub certificate_number: Option<String>,
    pub attached_file: Option<AttachedFile>,
    pub status: CertificationState,
    pub days_until_expiry: Option<i64>,
}

impl CertificationDTO {
    pub fn new(
        certification: Certification,
        classification: &Classification,
        policy: &ExpiryPolicy,
    ) -> Self {
        let expiry_date = certification.achievement.effective_expiry(policy);
        let achievement = certification.achievement;
        Self {
            id: achievement.id,
            tenant_id: achievement.tenant_id,
            customer: CustomerDTO {
                id: certification.customer.id,
                name: certification.customer.name,
                email: certification.customer.email,
            },
            course: CourseDTO {
                id: certification.course.id,
                title: certification.course.title,
                category: certification.course.category,
            },
            certification_date: achievement.certification_date,
            expiry_date,
            is_expired: achievement.is_expired,
            reminders_sent: achievement.reminders_sent,
            next_reminder_date: achievement.next_reminder_date,
            certificate_number: achievement.certificate_number,
            attached_file: achievement.attached_file,
            status: classification.state,
            days_until_expiry: classification.days_until_expiry,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CertificationReminderDTO {
    pub id: ID,
    pub achievement_id: ID,
    pub reminder_type: ReminderType,
    pub scheduled_for: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
    pub email_sent: bool,
    pub email_subject: String,
    pub email_content: String,
}

impl CertificationReminderDTO {
    pub fn new(reminder: CertificationReminder) -> Self {
        Self {
            id: reminder.id,
            achievement_id: reminder.achievement_id,
            reminder_type: reminder.reminder_type,
            scheduled_for: reminder.scheduled_for,
            sent_at: reminder.sent_at,
            email_sent: reminder.email_sent,
            email_subject: reminder.email_subject,
            email_content: reminder.email_content,
        }
    }
}
