mod achievement;
mod admin;
mod certification;
mod course;
mod customer;
mod reminder;
mod shared;
mod tenant;

pub use achievement::{Achievement, AttachedFile};
pub use admin::{AdminClaims, AdminRole};
pub use certification::{
    classify, days_until, Certification, CertificationState, Classification, ExpiryPolicy,
    InvalidCertificationState, EXPIRING_WINDOW_DAYS,
};
pub use chrono_tz::Tz;
pub use course::Course;
pub use customer::Customer;
pub use reminder::{
    is_due, next_reminder_date, CertificationReminder, InvalidReminderType, ReminderType,
};
pub use shared::entity::{Entity, TenantScoped, ID};
pub use tenant::Tenant;
