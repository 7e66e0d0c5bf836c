use super::{
    deliver_reminder::{deliver_reminder, DeliveryOutcome, ReminderKind},
    within_scope,
};
use crate::{
    error::CertwatchError,
    shared::{
        auth::{protect_admin_route, Caller, Permission},
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use certwatch_api_structs::send_certification_reminder::{APIResponse, PathParams};
use certwatch_domain::ID;
use certwatch_infra::{CertwatchContext, LockCondition};

pub async fn send_certification_reminder_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<CertwatchContext>,
) -> Result<HttpResponse, CertwatchError> {
    let caller = Caller::Admin(protect_admin_route(&http_req, &ctx)?);

    let usecase = SendCertificationReminderUseCase {
        achievement_id: path.achievement_id.clone(),
        tenant_id: caller.tenant_scope(),
    };

    execute_with_policy(usecase, &caller.policy(), &ctx)
        .await
        .map(|_| HttpResponse::Ok().json(APIResponse::sent()))
        .map_err(CertwatchError::from)
}

/// Sends a manual reminder for one certification, regardless of its schedule
#[derive(Debug)]
pub struct SendCertificationReminderUseCase {
    pub achievement_id: ID,
    /// Tenant the caller is restricted to
    pub tenant_id: Option<ID>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    AlreadyInProgress(ID),
    SendFailed,
    StorageError,
}

impl From<UseCaseError> for CertwatchError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => Self::NotFound(format!(
                "The certification with id: {}, was not found.",
                id
            )),
            UseCaseError::AlreadyInProgress(id) => Self::Conflict(format!(
                "A reminder for the certification with id: {} is already being sent.",
                id
            )),
            UseCaseError::SendFailed | UseCaseError::StorageError => {
                Self::OperationFailed("Failed to send reminder".into())
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendCertificationReminderUseCase {
    type Response = ();

    type Error = UseCaseError;

    const NAME: &'static str = "SendCertificationReminder";

    async fn execute(&mut self, ctx: &CertwatchContext) -> Result<Self::Response, Self::Error> {
        let certification = match ctx
            .repos
            .achievements
            .find_certification(&self.achievement_id)
            .await
        {
            Some(c) if within_scope(&self.tenant_id, &c.achievement) => c,
            _ => return Err(UseCaseError::NotFound(self.achievement_id.clone())),
        };

        let outcome = deliver_reminder(
            certification,
            ReminderKind::Manual,
            LockCondition::Any,
            ctx,
        )
        .await
        .map_err(|_| UseCaseError::StorageError)?;

        match outcome {
            DeliveryOutcome::Sent => Ok(()),
            DeliveryOutcome::Failed => Err(UseCaseError::SendFailed),
            DeliveryOutcome::Skipped => {
                Err(UseCaseError::AlreadyInProgress(self.achievement_id.clone()))
            }
        }
    }
}

impl PermissionBoundary for SendCertificationReminderUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::SendReminders]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certification::test_fixtures::{now, Fixture};
    use crate::shared::usecase::execute;
    use certwatch_domain::ReminderType;
    use chrono::Duration;

    #[actix_web::test]
    async fn sends_reminder_and_updates_bookkeeping() {
        let f = Fixture::new().await;
        let achievement = f.add(Some(now() + Duration::days(45))).await;

        let usecase = SendCertificationReminderUseCase {
            achievement_id: achievement.id.clone(),
            tenant_id: Some(f.tenant.id.clone()),
        };
        assert!(execute(usecase, &f.ctx).await.is_ok());

        let sent = f.mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, f.customer.email);
        assert_eq!(
            sent[0].subject,
            "Reminder: Your Domestic Gas Safety certification expires in 45 days"
        );

        let updated = f.ctx.repos.achievements.find(&achievement.id).await.unwrap();
        assert_eq!(updated.reminders_sent, 1);
        assert_eq!(updated.next_reminder_date, Some(now() + Duration::days(14)));
        assert!(!updated.is_expired);

        let history = f.reminders(&achievement.id).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].reminder_type, ReminderType::Custom);
        assert!(history[0].email_sent);
        assert_eq!(history[0].email_subject, sent[0].subject);
    }

    #[actix_web::test]
    async fn flags_expired_certification() {
        let f = Fixture::new().await;
        let achievement = f.add(Some(now() - Duration::days(2))).await;

        let usecase = SendCertificationReminderUseCase {
            achievement_id: achievement.id.clone(),
            tenant_id: None,
        };
        assert!(execute(usecase, &f.ctx).await.is_ok());

        assert_eq!(
            f.mailer.sent()[0].subject,
            "URGENT: Your Domestic Gas Safety certification has expired"
        );
        let updated = f.ctx.repos.achievements.find(&achievement.id).await.unwrap();
        assert!(updated.is_expired);
        assert_eq!(updated.reminders_sent, 1);
        assert_eq!(updated.next_reminder_date, None);
    }

    #[actix_web::test]
    async fn hides_other_tenants_certifications() {
        let f = Fixture::new().await;
        let achievement = f.add(Some(now() + Duration::days(45))).await;

        let usecase = SendCertificationReminderUseCase {
            achievement_id: achievement.id.clone(),
            tenant_id: Some(ID::new()),
        };
        let res = execute(usecase, &f.ctx).await;
        assert_eq!(res, Err(UseCaseError::NotFound(achievement.id.clone())));

        let usecase = SendCertificationReminderUseCase {
            achievement_id: ID::new(),
            tenant_id: None,
        };
        assert!(matches!(
            execute(usecase, &f.ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
        assert!(f.mailer.sent().is_empty());
        assert!(f.reminders(&achievement.id).await.is_empty());
    }

    #[actix_web::test]
    async fn failed_send_leaves_certification_unchanged() {
        let f = Fixture::new().await;
        let achievement = f.add(Some(now() - Duration::days(2))).await;
        f.mailer.fail_for(&f.customer.email);

        let usecase = SendCertificationReminderUseCase {
            achievement_id: achievement.id.clone(),
            tenant_id: None,
        };
        assert_eq!(execute(usecase, &f.ctx).await, Err(UseCaseError::SendFailed));

        let unchanged = f.ctx.repos.achievements.find(&achievement.id).await.unwrap();
        assert_eq!(unchanged, achievement);

        let history = f.reminders(&achievement.id).await;
        assert_eq!(history.len(), 1);
        assert!(!history[0].email_sent);
    }

    #[actix_web::test]
    async fn rejects_concurrent_send() {
        let f = Fixture::new().await;
        let achievement = f.add(Some(now() + Duration::days(45))).await;
        f.hold_lock(&achievement.id).await;

        let usecase = SendCertificationReminderUseCase {
            achievement_id: achievement.id.clone(),
            tenant_id: None,
        };
        assert_eq!(
            execute(usecase, &f.ctx).await,
            Err(UseCaseError::AlreadyInProgress(achievement.id.clone()))
        );
        assert!(f.mailer.sent().is_empty());
    }
}
