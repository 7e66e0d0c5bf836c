use crate::{
    achievement::Achievement,
    certification::{CertificationState, Classification, ExpiryPolicy},
    shared::entity::{Entity, TenantScoped, ID},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Which threshold a reminder was sent for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderType {
    SixMonths,
    ThreeMonths,
    OneMonth,
    Expired,
    /// Sent manually by an admin, or for certifications without expiry
    Custom,
}

impl ReminderType {
    pub fn for_classification(classification: &Classification) -> Self {
        if classification.state == CertificationState::Expired {
            return Self::Expired;
        }
        match classification.days_until_expiry {
            None => Self::Custom,
            Some(days) if days <= 30 => Self::OneMonth,
            Some(days) if days <= 90 => Self::ThreeMonths,
            Some(_) => Self::SixMonths,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SixMonths => "SIX_MONTHS",
            Self::ThreeMonths => "THREE_MONTHS",
            Self::OneMonth => "ONE_MONTH",
            Self::Expired => "EXPIRED",
            Self::Custom => "CUSTOM",
        }
    }
}

impl Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("Unknown reminder type: {0}")]
pub struct InvalidReminderType(String);

impl FromStr for ReminderType {
    type Err = InvalidReminderType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SIX_MONTHS" => Ok(Self::SixMonths),
            "THREE_MONTHS" => Ok(Self::ThreeMonths),
            "ONE_MONTH" => Ok(Self::OneMonth),
            "EXPIRED" => Ok(Self::Expired),
            "CUSTOM" => Ok(Self::Custom),
            _ => Err(InvalidReminderType(s.to_string())),
        }
    }
}

/// Append only audit record of one reminder send attempt
#[derive(Debug, Clone, PartialEq)]
pub struct CertificationReminder {
    pub id: ID,
    pub tenant_id: ID,
    pub achievement_id: ID,
    pub reminder_type: ReminderType,
    /// When the reminder was scheduled to go out
    pub scheduled_for: DateTime<Utc>,
    pub sent_at: DateTime<Utc>,
    /// False when the transport failed, the row is written either way
    pub email_sent: bool,
    pub email_subject: String,
    pub email_content: String,
}

impl Entity<ID> for CertificationReminder {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

impl TenantScoped for CertificationReminder {
    fn tenant_id(&self) -> &ID {
        &self.tenant_id
    }
}

/// Reminder cadence, evaluated from the largest window down
const CADENCE: [(i64, i64); 3] = [
    // (more than this many days left, remind again in this many days)
    (90, 30),
    (30, 14),
    (0, 7),
];

/// Computes the next `next_reminder_date` for a certification.
///
/// Expired certifications and certifications without expiry get `None`:
/// from then on only manual reminders apply. The result is capped at the
/// expiry date.
pub fn next_reminder_date(
    classification: &Classification,
    expiry: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if classification.is_expired() {
        return None;
    }
    let days_left = classification.days_until_expiry?;
    let expiry = expiry?;

    let interval_days = CADENCE
        .iter()
        .find(|(threshold, _)| days_left > *threshold)
        .map(|(_, interval)| *interval)?;

    let next = now + Duration::days(interval_days);
    Some(std::cmp::min(next, expiry))
}

/// A certification is due for the reminder sweep when its scheduled reminder
/// date has been reached, or when it has expired without being flagged yet.
pub fn is_due(achievement: &Achievement, now: DateTime<Utc>, policy: &ExpiryPolicy) -> bool {
    let scheduled = matches!(achievement.next_reminder_date, Some(date) if date <= now);
    let newly_expired = !achievement.is_expired
        && matches!(achievement.effective_expiry(policy), Some(expiry) if expiry < now);
    scheduled || newly_expired
}
