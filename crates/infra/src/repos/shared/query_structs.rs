use certwatch_domain::{
    is_due, Achievement, Certification, CertificationState, ExpiryPolicy, ID,
};
use chrono::{DateTime, Utc};

/// Selects the certifications a reminder sweep has to process:
/// those whose reminder date has been reached and those that expired
/// without being flagged yet.
#[derive(Debug, Clone)]
pub struct DueQuery {
    pub now: DateTime<Utc>,
    pub policy: ExpiryPolicy,
    /// `None` sweeps every tenant
    pub tenant_id: Option<ID>,
}

impl DueQuery {
    pub fn matches(&self, achievement: &Achievement) -> bool {
        if let Some(tenant_id) = &self.tenant_id {
            if achievement.tenant_id != *tenant_id {
                return false;
            }
        }
        is_due(achievement, self.now, &self.policy)
    }
}

/// Filter for listing the certifications of one tenant. The tenant is
/// mandatory, the other filters narrow it down.
#[derive(Debug, Clone)]
pub struct CertificationFilter {
    pub tenant_id: ID,
    pub status: Option<CertificationState>,
    pub category: Option<String>,
    pub now: DateTime<Utc>,
    pub policy: ExpiryPolicy,
}

impl CertificationFilter {
    pub fn new(tenant_id: ID, now: DateTime<Utc>, policy: ExpiryPolicy) -> Self {
        Self {
            tenant_id,
            status: None,
            category: None,
            now,
            policy,
        }
    }

    pub fn matches(&self, certification: &Certification) -> bool {
        if certification.achievement.tenant_id != self.tenant_id {
            return false;
        }
        if let Some(category) = &self.category {
            if certification.course.category != *category {
                return false;
            }
        }
        match self.status {
            Some(status) => certification.classify(self.now, &self.policy).state == status,
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum LockCondition {
    /// Lock regardless of the reminder bookkeeping
    Any,
    /// Lock only when the achievement is still due at lock time
    Due(DueQuery),
}

/// Claims one achievement for a reminder run until `until`
#[derive(Debug, Clone)]
pub struct ReminderLock {
    pub achievement_id: ID,
    pub now: DateTime<Utc>,
    pub until: DateTime<Utc>,
    pub condition: LockCondition,
}
