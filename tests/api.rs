mod helpers;

use certwatch_api::{ADMIN_SESSION_COOKIE, CRON_SECRET_HEADER};
use certwatch_domain::{AdminRole, ReminderType, ID};
use certwatch_infra::{LockCondition, ReminderLock};
use certwatch_sdk::{
    AttachCertificateInput, AttachedFile, CertificationState, Credentials, GetCertificationsInput,
};
use chrono::Duration;
use helpers::setup::{now, spawn_app, CRON_SECRET};
use reqwest::StatusCode;

#[actix_web::main]
#[test]
async fn test_status_ok() {
    let (_, sdk, _) = spawn_app().await;
    assert!(sdk.status.check_health().await.is_ok());
}

#[actix_web::main]
#[test]
async fn test_sweep_sends_renewal_due_reminder() {
    let (app, _, _) = spawn_app().await;
    let seeded = app.seed_tenant("Coastal Training").await;
    let achievement = app
        .add_achievement(&seeded, Some(now() + Duration::days(45)), Some(now()))
        .await;

    let res = app
        .cron_sdk()
        .reminder
        .send_bulk()
        .await
        .expect("Expected bulk sweep to succeed");
    assert!(res.success);
    assert_eq!(res.message, "Bulk certification reminders sent successfully");
    assert_eq!((res.sent, res.errors, res.skipped), (1, 0, 0));

    let updated = app.achievement(&achievement.id).await;
    assert_eq!(updated.reminders_sent, 1);
    assert_eq!(updated.next_reminder_date, Some(now() + Duration::days(14)));
    assert!(!updated.is_expired);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, seeded.customer.email);
    assert_eq!(
        sent[0].subject,
        "Reminder: Your First Aid at Work certification expires in 45 days"
    );
    assert!(sent[0].html_body.contains("RENEWAL DUE"));
    assert!(sent[0].text_body.contains("RENEWAL DUE"));

    let history = app
        .admin_sdk(Some(seeded.tenant.id.clone()), AdminRole::Instructor)
        .certification
        .get_reminders(achievement.id.clone())
        .await
        .expect("Expected to get reminder history");
    assert_eq!(history.reminders.len(), 1);
    assert_eq!(history.reminders[0].reminder_type, ReminderType::ThreeMonths);
    assert!(history.reminders[0].email_sent);
    assert_eq!(history.reminders[0].email_subject, sent[0].subject);
}

#[actix_web::main]
#[test]
async fn test_sweep_flags_and_reminds_expired_certification() {
    let (app, _, _) = spawn_app().await;
    let seeded = app.seed_tenant("Coastal Training").await;
    let achievement = app
        .add_achievement(&seeded, Some(now() - Duration::days(1)), None)
        .await;

    let res = app.cron_sdk().reminder.send_bulk().await.unwrap();
    assert_eq!((res.sent, res.errors, res.skipped), (1, 0, 0));

    let updated = app.achievement(&achievement.id).await;
    assert!(updated.is_expired);
    assert_eq!(updated.reminders_sent, 1);
    assert_eq!(updated.next_reminder_date, None);

    let sent = app.mailer.sent();
    assert_eq!(
        sent[0].subject,
        "URGENT: Your First Aid at Work certification has expired"
    );
    assert!(sent[0].text_body.contains("EXPIRED"));

    let reminders = app
        .ctx
        .repos
        .reminders
        .find_by_achievement(&achievement.id)
        .await
        .unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].reminder_type, ReminderType::Expired);

    // Flagged and without a next reminder it is no longer due
    let res = app.cron_sdk().reminder.send_bulk().await.unwrap();
    assert_eq!((res.sent, res.errors, res.skipped), (0, 0, 0));
}

#[actix_web::main]
#[test]
async fn test_sweep_continues_after_failed_send() {
    let (app, _, _) = spawn_app().await;
    let failing = app.seed_tenant("Coastal Training").await;
    let healthy = app.seed_tenant("Inland Training").await;
    app.mailer.fail_for(&failing.customer.email);

    let failed = app
        .add_achievement(&failing, Some(now() + Duration::days(20)), Some(now()))
        .await;
    let delivered = app
        .add_achievement(&healthy, Some(now() + Duration::days(20)), Some(now()))
        .await;

    let res = app.cron_sdk().reminder.send_bulk().await.unwrap();
    assert!(res.success);
    assert_eq!((res.sent, res.errors, res.skipped), (1, 1, 0));

    let unchanged = app.achievement(&failed.id).await;
    assert_eq!(unchanged.reminders_sent, 0);
    assert_eq!(unchanged.next_reminder_date, Some(now()));
    let reminders = app
        .ctx
        .repos
        .reminders
        .find_by_achievement(&failed.id)
        .await
        .unwrap();
    assert_eq!(reminders.len(), 1);
    assert!(!reminders[0].email_sent);
    assert_eq!(reminders[0].reminder_type, ReminderType::OneMonth);

    let updated = app.achievement(&delivered.id).await;
    assert_eq!(updated.reminders_sent, 1);
    assert_eq!(updated.next_reminder_date, Some(now() + Duration::days(7)));

    // The failed certification is picked up again by the next sweep
    let res = app.cron_sdk().reminder.send_bulk().await.unwrap();
    assert_eq!((res.sent, res.errors, res.skipped), (0, 1, 0));
}

#[actix_web::main]
#[test]
async fn test_manual_reminder_for_never_expiring_certification() {
    let (app, _, _) = spawn_app().await;
    let seeded = app.seed_tenant("Coastal Training").await;
    let achievement = app.add_achievement(&seeded, None, None).await;

    let admin = app.admin_sdk(Some(seeded.tenant.id.clone()), AdminRole::Manager);
    let res = admin
        .certification
        .send_reminder(achievement.id.clone())
        .await
        .expect("Expected reminder to be sent");
    assert!(res.success);
    assert_eq!(res.message, "Reminder sent successfully");

    let updated = app.achievement(&achievement.id).await;
    assert_eq!(updated.reminders_sent, 1);
    assert_eq!(updated.next_reminder_date, None);
    assert!(!updated.is_expired);

    let sent = app.mailer.sent();
    assert_eq!(sent[0].subject, "Reminder: First Aid at Work certification renewal");
    assert!(sent[0].text_body.contains("RENEWAL REMINDER"));
    assert!(!sent[0].text_body.contains("Expires on"));

    let history = admin
        .certification
        .get_reminders(achievement.id.clone())
        .await
        .unwrap();
    assert_eq!(history.reminders[0].reminder_type, ReminderType::Custom);
}

#[actix_web::main]
#[test]
async fn test_manual_reminder_auth_and_scope() {
    let (app, sdk, _) = spawn_app().await;
    let seeded = app.seed_tenant("Coastal Training").await;
    let other = app.seed_tenant("Inland Training").await;
    let achievement = app
        .add_achievement(&seeded, Some(now() + Duration::days(200)), None)
        .await;

    let status_of = |res: Result<_, certwatch_sdk::APIError>| res.err().and_then(|e| e.status());

    let res = sdk.certification.send_reminder(achievement.id.clone()).await;
    assert_eq!(status_of(res), Some(StatusCode::UNAUTHORIZED));

    let forged = app.sdk_for(Credentials::AdminSession("not a token".into()));
    let res = forged.certification.send_reminder(achievement.id.clone()).await;
    assert_eq!(status_of(res), Some(StatusCode::UNAUTHORIZED));

    let instructor = app.admin_sdk(Some(seeded.tenant.id.clone()), AdminRole::Instructor);
    let res = instructor
        .certification
        .send_reminder(achievement.id.clone())
        .await;
    assert_eq!(status_of(res), Some(StatusCode::FORBIDDEN));

    // Another tenant can not see the certification
    let other_admin = app.admin_sdk(Some(other.tenant.id.clone()), AdminRole::Manager);
    let res = other_admin
        .certification
        .send_reminder(achievement.id.clone())
        .await;
    assert_eq!(status_of(res), Some(StatusCode::NOT_FOUND));

    let admin = app.admin_sdk(Some(seeded.tenant.id.clone()), AdminRole::Manager);
    let res = admin.certification.send_reminder(ID::new()).await;
    assert_eq!(status_of(res), Some(StatusCode::NOT_FOUND));

    assert!(app.mailer.sent().is_empty());
    assert_eq!(app.achievement(&achievement.id).await.reminders_sent, 0);

    // Platform admins act on every tenant
    let platform_admin = app.admin_sdk(None, AdminRole::SuperAdmin);
    assert!(platform_admin
        .certification
        .send_reminder(achievement.id.clone())
        .await
        .is_ok());
    assert_eq!(app.mailer.sent().len(), 1);
}

#[actix_web::main]
#[test]
async fn test_manual_reminder_conflicts_with_running_delivery() {
    let (app, _, _) = spawn_app().await;
    let seeded = app.seed_tenant("Coastal Training").await;
    let achievement = app
        .add_achievement(&seeded, Some(now() + Duration::days(60)), Some(now()))
        .await;

    let lock = ReminderLock {
        achievement_id: achievement.id.clone(),
        now: now(),
        until: now() + Duration::minutes(5),
        condition: LockCondition::Any,
    };
    assert!(app
        .ctx
        .repos
        .achievements
        .lock_for_reminder(&lock)
        .await
        .unwrap()
        .is_some());

    let admin = app.admin_sdk(Some(seeded.tenant.id.clone()), AdminRole::Manager);
    let res = admin
        .certification
        .send_reminder(achievement.id.clone())
        .await;
    assert_eq!(res.err().and_then(|e| e.status()), Some(StatusCode::CONFLICT));

    let res = app.cron_sdk().reminder.send_bulk().await.unwrap();
    assert_eq!((res.sent, res.errors, res.skipped), (0, 0, 1));
    assert!(app.mailer.sent().is_empty());
}

#[actix_web::main]
#[test]
async fn test_bulk_sweep_auth() {
    let (app, sdk, _) = spawn_app().await;

    let res = sdk.reminder.send_bulk().await;
    assert_eq!(res.err().and_then(|e| e.status()), Some(StatusCode::UNAUTHORIZED));

    let wrong_secret = app.sdk_for(Credentials::CronSecret("guess".into()));
    let res = wrong_secret.reminder.send_bulk().await;
    assert_eq!(res.err().and_then(|e| e.status()), Some(StatusCode::UNAUTHORIZED));

    let instructor = app.admin_sdk(Some(ID::new()), AdminRole::Instructor);
    let res = instructor.reminder.send_bulk().await;
    assert_eq!(res.err().and_then(|e| e.status()), Some(StatusCode::FORBIDDEN));
}

#[actix_web::main]
#[test]
async fn test_tenant_admin_sweeps_only_own_tenant() {
    let (app, _, _) = spawn_app().await;
    let own = app.seed_tenant("Coastal Training").await;
    let other = app.seed_tenant("Inland Training").await;
    let own_achievement = app
        .add_achievement(&own, Some(now() + Duration::days(120)), Some(now()))
        .await;
    let other_achievement = app
        .add_achievement(&other, Some(now() + Duration::days(120)), Some(now()))
        .await;

    let admin = app.admin_sdk(Some(own.tenant.id.clone()), AdminRole::Manager);
    let res = admin.reminder.send_bulk().await.unwrap();
    assert_eq!((res.sent, res.errors, res.skipped), (1, 0, 0));

    let updated = app.achievement(&own_achievement.id).await;
    assert_eq!(updated.next_reminder_date, Some(now() + Duration::days(30)));
    assert_eq!(app.achievement(&other_achievement.id).await.reminders_sent, 0);

    let res = app.cron_sdk().reminder.send_bulk().await.unwrap();
    assert_eq!((res.sent, res.errors, res.skipped), (1, 0, 0));
    assert_eq!(app.achievement(&other_achievement.id).await.reminders_sent, 1);
}

#[actix_web::main]
#[test]
async fn test_admin_session_cookie_and_cron_header() {
    let (app, _, address) = spawn_app().await;
    let seeded = app.seed_tenant("Coastal Training").await;
    let achievement = app.add_achievement(&seeded, None, None).await;
    let token = app.admin_token(Some(seeded.tenant.id.clone()), AdminRole::SuperAdmin);

    let client = reqwest::Client::new();
    let res = client
        .post(format!(
            "{}/api/v1/certifications/{}/reminders",
            address, achievement.id
        ))
        .header("Cookie", format!("{}={}", ADMIN_SESSION_COOKIE, token))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/v1/reminders/bulk", address))
        .header(CRON_SECRET_HEADER, CRON_SECRET)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/v1/reminders/bulk", address))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[actix_web::main]
#[test]
async fn test_list_certifications() {
    let (app, _, _) = spawn_app().await;
    let seeded = app.seed_tenant("Coastal Training").await;
    let other = app.seed_tenant("Inland Training").await;
    let expired = app
        .add_achievement(&seeded, Some(now() - Duration::days(3)), None)
        .await;
    let expiring = app
        .add_achievement(&seeded, Some(now() + Duration::days(10)), None)
        .await;
    let active = app
        .add_achievement(&seeded, Some(now() + Duration::days(400)), None)
        .await;
    let never_expiring = app.add_achievement(&seeded, None, None).await;
    app.add_achievement(&other, Some(now() + Duration::days(10)), None)
        .await;

    let instructor = app.admin_sdk(Some(seeded.tenant.id.clone()), AdminRole::Instructor);
    let res = instructor
        .certification
        .get(GetCertificationsInput::default())
        .await
        .expect("Expected to list certifications");
    let ids = res
        .certifications
        .iter()
        .map(|c| c.id.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        ids,
        vec![
            expired.id.clone(),
            expiring.id.clone(),
            active.id.clone(),
            never_expiring.id.clone()
        ]
    );
    // Not flagged by a sweep yet but classified as expired
    assert!(!res.certifications[0].is_expired);
    assert_eq!(res.certifications[0].status, CertificationState::Expired);
    assert_eq!(res.certifications[1].status, CertificationState::Expiring);
    assert_eq!(res.certifications[1].days_until_expiry, Some(10));
    assert_eq!(res.certifications[3].expiry_date, None);

    let res = instructor
        .certification
        .get(GetCertificationsInput {
            status: Some(CertificationState::Active),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(res.certifications.len(), 2);

    let res = instructor
        .certification
        .get(GetCertificationsInput {
            category: Some("Electrical".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(res.certifications.is_empty());

    // A tenant admin can not list another tenant
    let res = instructor
        .certification
        .get(GetCertificationsInput {
            tenant_id: Some(other.tenant.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(res.certifications.len(), 4);

    let platform_admin = app.admin_sdk(None, AdminRole::SuperAdmin);
    let res = platform_admin
        .certification
        .get(GetCertificationsInput::default())
        .await;
    assert_eq!(res.err().and_then(|e| e.status()), Some(StatusCode::BAD_REQUEST));
    let res = platform_admin
        .certification
        .get(GetCertificationsInput {
            tenant_id: Some(other.tenant.id.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(res.certifications.len(), 1);
}

#[actix_web::main]
#[test]
async fn test_attach_certificate() {
    let (app, _, _) = spawn_app().await;
    let seeded = app.seed_tenant("Coastal Training").await;
    let achievement = app
        .add_achievement(&seeded, Some(now() + Duration::days(100)), None)
        .await;
    let admin = app.admin_sdk(Some(seeded.tenant.id.clone()), AdminRole::Manager);

    let file = AttachedFile {
        path: "certificates/fa-2041.pdf".into(),
        original_name: "First Aid Certificate.pdf".into(),
        size_bytes: 48_213,
        uploaded_at: now(),
    };
    let res = admin
        .certification
        .attach_certificate(AttachCertificateInput {
            achievement_id: achievement.id.clone(),
            certificate_number: Some(" FA-2041 ".into()),
            attached_file: Some(file.clone()),
        })
        .await
        .expect("Expected to attach certificate");
    assert_eq!(
        res.certification.certificate_number,
        Some("FA-2041".to_string())
    );
    assert_eq!(res.certification.attached_file, Some(file));

    let res = admin
        .certification
        .attach_certificate(AttachCertificateInput {
            achievement_id: achievement.id.clone(),
            certificate_number: None,
            attached_file: None,
        })
        .await;
    assert_eq!(res.err().and_then(|e| e.status()), Some(StatusCode::BAD_REQUEST));

    let instructor = app.admin_sdk(Some(seeded.tenant.id.clone()), AdminRole::Instructor);
    let res = instructor
        .certification
        .attach_certificate(AttachCertificateInput {
            achievement_id: achievement.id.clone(),
            certificate_number: Some("FA-9999".into()),
            attached_file: None,
        })
        .await;
    assert_eq!(res.err().and_then(|e| e.status()), Some(StatusCode::FORBIDDEN));

    // The certificate number shows up in the reminder emails
    admin
        .certification
        .send_reminder(achievement.id.clone())
        .await
        .unwrap();
    let sent = app.mailer.sent();
    assert!(sent[0].text_body.contains("FA-2041"));
    assert!(sent[0].html_body.contains("FA-2041"));
}
