use certwatch_domain::{Certification, CertificationReminder, Classification, ReminderType};
use certwatch_infra::{CertwatchContext, LockCondition, ReminderEmail, ReminderLock};
use chrono::{DateTime, Duration, Utc};
use tracing::{error, info, warn};

/// Which kind of reminder to send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    /// Requested by an admin for one certification
    Manual,
    /// Picked up by the reminder sweep, typed by the threshold it crossed
    Scheduled,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    /// Rendering or sending failed. The certification was left unchanged.
    Failed,
    /// Another run holds the certification, or it stopped being due
    Skipped,
}

#[derive(Debug)]
pub struct StorageError;

/// End of the claim a run takes on a certification
pub fn lock_until(now: DateTime<Utc>, ctx: &CertwatchContext) -> DateTime<Utc> {
    now + Duration::seconds(ctx.config.reminder_lock_secs)
}

/// Sends one reminder for `certification`.
///
/// The certification is claimed for the duration of the run so that
/// concurrent runs never send the same reminder twice. Every attempt is
/// recorded as a `CertificationReminder`, whether the email went out or not.
pub async fn deliver_reminder(
    certification: Certification,
    kind: ReminderKind,
    condition: LockCondition,
    ctx: &CertwatchContext,
) -> Result<DeliveryOutcome, StorageError> {
    let now = ctx.sys.get_datetime();
    let policy = ctx.config.expiry_policy;
    let achievement_id = certification.achievement.id.clone();

    let lock = ReminderLock {
        achievement_id: achievement_id.clone(),
        now,
        until: lock_until(now, ctx),
        condition,
    };
    let mut achievement = match ctx.repos.achievements.lock_for_reminder(&lock).await {
        Ok(Some(achievement)) => achievement,
        Ok(None) => {
            info!(
                "Skipping certification {}: already being processed or no longer due",
                achievement_id
            );
            return Ok(DeliveryOutcome::Skipped);
        }
        Err(e) => {
            error!(
                "Unable to claim certification {} for a reminder: {:?}",
                achievement_id, e
            );
            return Err(StorageError);
        }
    };
    let scheduled_for = match kind {
        ReminderKind::Manual => now,
        ReminderKind::Scheduled => achievement.next_reminder_date.unwrap_or(now),
    };

    // Only persisted after a successful send, a failed send leaves the certification due
    achievement.sync_expired_flag(now, &policy);
    let classification = achievement.classify(now, &policy);
    let reminder_type = match kind {
        ReminderKind::Manual => ReminderType::Custom,
        ReminderKind::Scheduled => ReminderType::for_classification(&classification),
    };
    let certification = Certification {
        achievement,
        ..certification
    };

    let email = render(&certification, &classification, ctx).await;
    let sent = match &email {
        Some(email) => {
            let message = email.to_message(&certification.customer.email);
            match ctx.mailer.send(&message).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(
                        "Failed to send reminder for certification {} to {}: {:?}",
                        achievement_id, certification.customer.email, e
                    );
                    false
                }
            }
        }
        None => false,
    };

    let mut achievement = certification.achievement;
    if sent {
        achievement.record_reminder_sent(&classification, now, &policy);
        if let Err(e) = ctx.repos.achievements.save(&achievement).await {
            error!(
                "Reminder for certification {} was sent but its bookkeeping could not be saved: {:?}",
                achievement_id, e
            );
        }
    } else if let Err(e) = ctx.repos.achievements.unlock(&achievement_id).await {
        error!(
            "Unable to release certification {} after a failed reminder: {:?}",
            achievement_id, e
        );
    }

    let (email_subject, email_content) = match email {
        Some(email) => (email.subject, email.html_body),
        None => (String::new(), String::new()),
    };
    let reminder = CertificationReminder {
        id: Default::default(),
        tenant_id: achievement.tenant_id.clone(),
        achievement_id: achievement_id.clone(),
        reminder_type,
        scheduled_for,
        sent_at: now,
        email_sent: sent,
        email_subject,
        email_content,
    };
    record(&reminder, ctx).await;

    Ok(if sent {
        DeliveryOutcome::Sent
    } else {
        DeliveryOutcome::Failed
    })
}

async fn render(
    certification: &Certification,
    classification: &Classification,
    ctx: &CertwatchContext,
) -> Option<ReminderEmail> {
    let tenant_id = &certification.achievement.tenant_id;
    let tenant = match ctx.repos.tenants.find(tenant_id).await {
        Some(tenant) => tenant,
        None => {
            error!(
                "Tenant {} of certification {} was not found",
                tenant_id, certification.achievement.id
            );
            return None;
        }
    };
    ctx.templates
        .render(
            certification,
            &tenant,
            classification,
            &ctx.config.expiry_policy,
        )
        .map_err(|e| {
            error!(
                "Unable to render reminder for certification {}: {:?}",
                certification.achievement.id, e
            );
            e
        })
        .ok()
}

async fn record(reminder: &CertificationReminder, ctx: &CertwatchContext) {
    if let Err(e) = ctx.repos.reminders.insert(reminder).await {
        error!(
            "Unable to store reminder record for certification {}: {:?}",
            reminder.achievement_id, e
        );
    }
}
