use super::within_scope;
use crate::{
    error::CertwatchError,
    shared::{
        auth::{protect_admin_route, Caller, Permission},
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use certwatch_api_structs::dtos::CertificationReminderDTO;
use certwatch_api_structs::get_certification_reminders::{APIResponse, PathParams};
use certwatch_domain::{CertificationReminder, ID};
use certwatch_infra::CertwatchContext;
use tracing::error;

pub async fn get_certification_reminders_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<CertwatchContext>,
) -> Result<HttpResponse, CertwatchError> {
    let caller = Caller::Admin(protect_admin_route(&http_req, &ctx)?);

    let usecase = GetCertificationRemindersUseCase {
        achievement_id: path.achievement_id.clone(),
        tenant_id: caller.tenant_scope(),
    };

    execute_with_policy(usecase, &caller.policy(), &ctx)
        .await
        .map(|reminders| {
            HttpResponse::Ok().json(APIResponse {
                reminders: reminders
                    .into_iter()
                    .map(CertificationReminderDTO::new)
                    .collect(),
            })
        })
        .map_err(CertwatchError::from)
}

/// The reminder history of one certification, oldest first
#[derive(Debug)]
pub struct GetCertificationRemindersUseCase {
    pub achievement_id: ID,
    pub tenant_id: Option<ID>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for CertwatchError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => Self::NotFound(format!(
                "The certification with id: {}, was not found.",
                id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetCertificationRemindersUseCase {
    type Response = Vec<CertificationReminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetCertificationReminders";

    async fn execute(&mut self, ctx: &CertwatchContext) -> Result<Self::Response, Self::Error> {
        let achievement = ctx.repos.achievements.find(&self.achievement_id).await;
        if !matches!(&achievement, Some(a) if within_scope(&self.tenant_id, a)) {
            return Err(UseCaseError::NotFound(self.achievement_id.clone()));
        }

        ctx.repos
            .reminders
            .find_by_achievement(&self.achievement_id)
            .await
            .map_err(|e| {
                error!("Unable to find reminders: {:?}", e);
                UseCaseError::StorageError
            })
    }
}

impl PermissionBoundary for GetCertificationRemindersUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ViewReminderHistory]
    }
}
