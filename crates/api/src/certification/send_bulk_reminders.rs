use super::deliver_reminder::{deliver_reminder, DeliveryOutcome, ReminderKind};
use crate::{
    error::CertwatchError,
    shared::{
        auth::{protect_reminder_trigger_route, Permission},
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use certwatch_api_structs::send_bulk_reminders::APIResponse;
use certwatch_domain::ID;
use certwatch_infra::{CertwatchContext, DueQuery, LockCondition};
use tracing::{error, info};

pub async fn send_bulk_reminders_controller(
    http_req: HttpRequest,
    ctx: web::Data<CertwatchContext>,
) -> Result<HttpResponse, CertwatchError> {
    let caller = protect_reminder_trigger_route(&http_req, &ctx)?;

    let usecase = SendBulkRemindersUseCase {
        tenant_id: caller.tenant_scope(),
    };

    execute_with_policy(usecase, &caller.policy(), &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.sent, res.errors, res.skipped)))
        .map_err(CertwatchError::from)
}

/// Sends the reminders of every due certification.
///
/// Certifications are processed one by one and independently: a failure
/// for one of them is counted and the sweep continues.
#[derive(Debug)]
pub struct SendBulkRemindersUseCase {
    /// `None` sweeps all tenants
    pub tenant_id: Option<ID>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BulkReminderResult {
    pub sent: usize,
    pub errors: usize,
    pub skipped: usize,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for CertwatchError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => {
                Self::OperationFailed("Failed to send bulk reminders".into())
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendBulkRemindersUseCase {
    type Response = BulkReminderResult;

    type Error = UseCaseError;

    const NAME: &'static str = "SendBulkReminders";

    async fn execute(&mut self, ctx: &CertwatchContext) -> Result<Self::Response, Self::Error> {
        let query = DueQuery {
            now: ctx.sys.get_datetime(),
            policy: ctx.config.expiry_policy,
            tenant_id: self.tenant_id.clone(),
        };
        let due = ctx
            .repos
            .achievements
            .find_due(&query)
            .await
            .map_err(|e| {
                error!("Unable to query due certifications: {:?}", e);
                UseCaseError::StorageError
            })?;
        info!("Found {} certifications due for a reminder", due.len());

        let mut res = BulkReminderResult::default();
        for certification in due {
            let outcome = deliver_reminder(
                certification,
                ReminderKind::Scheduled,
                LockCondition::Due(query.clone()),
                ctx,
            )
            .await;
            match outcome {
                Ok(DeliveryOutcome::Sent) => res.sent += 1,
                Ok(DeliveryOutcome::Skipped) => res.skipped += 1,
                Ok(DeliveryOutcome::Failed) | Err(_) => res.errors += 1,
            }
        }
        info!(
            "Reminder sweep done. Sent: {}, errors: {}, skipped: {}",
            res.sent, res.errors, res.skipped
        );

        Ok(res)
    }
}

impl PermissionBoundary for SendBulkRemindersUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::SendReminders]
    }
}
