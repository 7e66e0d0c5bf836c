use crate::{achievement::Achievement, course::Course, customer::Customer};
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Certifications expiring within this many days are `Expiring`
pub const EXPIRING_WINDOW_DAYS: i64 = 90;

const MILLIS_PER_DAY: i64 = 1000 * 60 * 60 * 24;

/// Decides what happens to certifications stored without an expiry date.
///
/// With `default_validity_years` set to `None` such certifications never
/// expire and are always `Active`. With `Some(years)` they expire `years`
/// after the certification date. The same policy is applied by the
/// classifier, the reminder due query and the certification listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpiryPolicy {
    pub default_validity_years: Option<u32>,
}

impl ExpiryPolicy {
    pub fn never_expiring() -> Self {
        Self {
            default_validity_years: None,
        }
    }

    pub fn with_default_validity(years: u32) -> Self {
        Self {
            default_validity_years: Some(years),
        }
    }

    pub fn effective_expiry(
        &self,
        certification_date: DateTime<Utc>,
        expiry_date: Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        if expiry_date.is_some() {
            return expiry_date;
        }
        self.default_validity_years
            .and_then(|years| years.checked_mul(12))
            .and_then(|months| certification_date.checked_add_months(Months::new(months)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificationState {
    Active,
    Expiring,
    Expired,
}

impl CertificationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expiring => "expiring",
            Self::Expired => "expired",
        }
    }
}

#[derive(Error, Debug)]
#[error("Invalid certification status: {0}. Expected one of: active, expiring, expired")]
pub struct InvalidCertificationState(String);

impl FromStr for CertificationState {
    type Err = InvalidCertificationState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expiring" => Ok(Self::Expiring),
            "expired" => Ok(Self::Expired),
            _ => Err(InvalidCertificationState(s.to_string())),
        }
    }
}

/// The derived state of a certification at a given point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub state: CertificationState,
    /// Whole days left until expiry, rounded up. Negative once expired.
    /// `None` when the certification never expires.
    pub days_until_expiry: Option<i64>,
}

impl Classification {
    pub fn is_expired(&self) -> bool {
        self.state == CertificationState::Expired
    }
}

/// `ceil((expiry - now) / 1 day)`
pub fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (expiry - now).num_milliseconds();
    let days = millis / MILLIS_PER_DAY;
    if millis % MILLIS_PER_DAY > 0 {
        days + 1
    } else {
        days
    }
}

pub fn classify(
    certification_date: DateTime<Utc>,
    expiry_date: Option<DateTime<Utc>>,
    is_expired: bool,
    now: DateTime<Utc>,
    policy: &ExpiryPolicy,
) -> Classification {
    let expiry = policy.effective_expiry(certification_date, expiry_date);
    let days_until_expiry = expiry.map(|expiry| days_until(expiry, now));

    let past_expiry = matches!(expiry, Some(expiry) if expiry < now);
    let state = if is_expired || past_expiry || matches!(days_until_expiry, Some(d) if d < 0) {
        CertificationState::Expired
    } else if matches!(days_until_expiry, Some(d) if d <= EXPIRING_WINDOW_DAYS) {
        CertificationState::Expiring
    } else {
        CertificationState::Active
    };

    Classification {
        state,
        days_until_expiry,
    }
}

/// An `Achievement` together with the `Customer` who earned it and the
/// `Course` it was earned for.
#[derive(Debug, Clone)]
pub struct Certification {
    pub achievement: Achievement,
    pub customer: Customer,
    pub course: Course,
}

impl Certification {
    pub fn classify(&self, now: DateTime<Utc>, policy: &ExpiryPolicy) -> Classification {
        self.achievement.classify(now, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn certified_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 1, 9, 0, 0).unwrap()
    }

    fn classify_expiry(expiry: Option<DateTime<Utc>>, is_expired: bool) -> Classification {
        classify(
            certified_at(),
            expiry,
            is_expired,
            now(),
            &ExpiryPolicy::never_expiring(),
        )
    }

    #[test]
    fn rounds_days_up() {
        assert_eq!(days_until(now() + Duration::days(45), now()), 45);
        assert_eq!(days_until(now() + Duration::hours(1), now()), 1);
        assert_eq!(days_until(now() + Duration::hours(25), now()), 2);
        assert_eq!(days_until(now(), now()), 0);
        assert_eq!(days_until(now() - Duration::hours(1), now()), 0);
        assert_eq!(days_until(now() - Duration::hours(25), now()), -1);
        assert_eq!(days_until(now() - Duration::days(3), now()), -3);
    }

    #[test]
    fn past_expiry_is_expired_regardless_of_flag() {
        for expiry in [
            now() - Duration::minutes(1),
            now() - Duration::days(1),
            now() - Duration::days(400),
        ] {
            for flag in [true, false] {
                let c = classify_expiry(Some(expiry), flag);
                assert_eq!(c.state, CertificationState::Expired);
            }
        }
    }

    #[test]
    fn flagged_certification_is_expired() {
        let c = classify_expiry(Some(now() + Duration::days(200)), true);
        assert_eq!(c.state, CertificationState::Expired);
        assert_eq!(c.days_until_expiry, Some(200));
    }

    #[test]
    fn within_ninety_days_is_expiring() {
        for days in [0, 1, 30, 45, 89, 90] {
            let c = classify_expiry(Some(now() + Duration::days(days)), false);
            assert_eq!(c.state, CertificationState::Expiring, "days: {}", days);
            assert_eq!(c.days_until_expiry, Some(days));
        }
    }

    #[test]
    fn beyond_ninety_days_is_active() {
        let c = classify_expiry(Some(now() + Duration::days(91)), false);
        assert_eq!(c.state, CertificationState::Active);
        let c = classify_expiry(Some(now() + Duration::days(90) + Duration::minutes(1)), false);
        assert_eq!(c.state, CertificationState::Active);
        assert_eq!(c.days_until_expiry, Some(91));
    }

    #[test]
    fn no_expiry_is_active_when_never_expiring() {
        let c = classify_expiry(None, false);
        assert_eq!(c.state, CertificationState::Active);
        assert_eq!(c.days_until_expiry, None);
    }

    #[test]
    fn default_validity_policy_derives_expiry() {
        let policy = ExpiryPolicy::with_default_validity(3);
        // Certified 2021-03-01 09:00, so expires 2024-03-01 09:00 which is before now
        let c = classify(certified_at(), None, false, now(), &policy);
        assert_eq!(c.state, CertificationState::Expired);

        let policy = ExpiryPolicy::with_default_validity(5);
        let c = classify(certified_at(), None, false, now(), &policy);
        assert_eq!(c.state, CertificationState::Active);
        assert_eq!(
            policy.effective_expiry(certified_at(), None),
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())
        );

        // An explicit expiry always wins over the policy
        let explicit = now() + Duration::days(10);
        assert_eq!(policy.effective_expiry(certified_at(), Some(explicit)), Some(explicit));
    }

    #[test]
    fn out_of_range_validity_yields_no_expiry() {
        let policy = ExpiryPolicy::with_default_validity(u32::MAX);
        assert_eq!(policy.effective_expiry(certified_at(), None), None);
    }

    #[test]
    fn parses_states() {
        assert_eq!(
            "expiring".parse::<CertificationState>().unwrap(),
            CertificationState::Expiring
        );
        assert!("soon".parse::<CertificationState>().is_err());
        assert_eq!(CertificationState::Expired.as_str(), "expired");
    }
}
