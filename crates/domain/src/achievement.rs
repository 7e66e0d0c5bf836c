use crate::{
    certification::{classify, Classification, ExpiryPolicy},
    reminder::next_reminder_date,
    shared::entity::{Entity, TenantScoped, ID},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about an uploaded certificate document. The file itself lives
/// in whatever blob storage handled the upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedFile {
    pub path: String,
    pub original_name: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// An `Achievement` is the certification a `Customer` earns by completing a `Course`.
///
/// It is created elsewhere when the course is completed. This service only
/// keeps its expiry bookkeeping up to date: `is_expired`, `reminders_sent`
/// and `next_reminder_date`.
#[derive(Debug, Clone, PartialEq)]
pub struct Achievement {
    pub id: ID,
    pub tenant_id: ID,
    pub customer_id: ID,
    pub course_id: ID,
    pub certification_date: DateTime<Utc>,
    /// `None` for certifications that do not carry an expiry date
    pub expiry_date: Option<DateTime<Utc>>,
    /// Cached result of the classifier, kept in sync by the reminder flows
    pub is_expired: bool,
    /// Never decreases
    pub reminders_sent: i64,
    /// When set and the certification expires this is never after the expiry date
    pub next_reminder_date: Option<DateTime<Utc>>,
    pub certificate_number: Option<String>,
    pub attached_file: Option<AttachedFile>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Achievement {
    pub fn new(
        tenant_id: ID,
        customer_id: ID,
        course_id: ID,
        certification_date: DateTime<Utc>,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: Default::default(),
            tenant_id,
            customer_id,
            course_id,
            certification_date,
            expiry_date,
            is_expired: false,
            reminders_sent: 0,
            next_reminder_date: None,
            certificate_number: None,
            attached_file: None,
            created: certification_date,
            updated: certification_date,
        }
    }

    pub fn effective_expiry(&self, policy: &ExpiryPolicy) -> Option<DateTime<Utc>> {
        policy.effective_expiry(self.certification_date, self.expiry_date)
    }

    pub fn classify(&self, now: DateTime<Utc>, policy: &ExpiryPolicy) -> Classification {
        classify(
            self.certification_date,
            self.expiry_date,
            self.is_expired,
            now,
            policy,
        )
    }

    /// Flags the achievement as expired if its expiry date has passed.
    /// Returns true when the flag changed.
    pub fn sync_expired_flag(&mut self, now: DateTime<Utc>, policy: &ExpiryPolicy) -> bool {
        if self.is_expired {
            return false;
        }
        match self.effective_expiry(policy) {
            Some(expiry) if expiry < now => {
                self.is_expired = true;
                true
            }
            _ => false,
        }
    }

    /// Bookkeeping after a reminder email was delivered
    pub fn record_reminder_sent(
        &mut self,
        classification: &Classification,
        now: DateTime<Utc>,
        policy: &ExpiryPolicy,
    ) {
        self.reminders_sent += 1;
        self.next_reminder_date =
            next_reminder_date(classification, self.effective_expiry(policy), now);
        if classification.is_expired() {
            self.is_expired = true;
        }
        self.updated = now;
    }

    pub fn attach_certificate(
        &mut self,
        certificate_number: Option<String>,
        attached_file: Option<AttachedFile>,
        now: DateTime<Utc>,
    ) {
        if certificate_number.is_some() {
            self.certificate_number = certificate_number;
        }
        if attached_file.is_some() {
            self.attached_file = attached_file;
        }
        self.updated = now;
    }
}

impl Entity<ID> for Achievement {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

impl TenantScoped for Achievement {
    fn tenant_id(&self) -> &ID {
        &self.tenant_id
    }
}
