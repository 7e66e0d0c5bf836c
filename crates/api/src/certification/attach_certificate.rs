use super::{deliver_reminder::lock_until, within_scope};
use crate::{
    error::CertwatchError,
    shared::{
        auth::{protect_admin_route, Caller, Permission},
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use certwatch_api_structs::attach_certificate::{APIResponse, PathParams, RequestBody};
use certwatch_api_structs::dtos::CertificationDTO;
use certwatch_domain::{AttachedFile, Certification, ID};
use certwatch_infra::{CertwatchContext, LockCondition, ReminderLock};
use tracing::error;

pub async fn attach_certificate_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<CertwatchContext>,
) -> Result<HttpResponse, CertwatchError> {
    let caller = Caller::Admin(protect_admin_route(&http_req, &ctx)?);
    let body = body.0;

    let usecase = AttachCertificateUseCase {
        achievement_id: path.achievement_id.clone(),
        tenant_id: caller.tenant_scope(),
        certificate_number: body.certificate_number,
        attached_file: body.attached_file,
    };

    let now = ctx.sys.get_datetime();
    let policy = ctx.config.expiry_policy;
    execute_with_policy(usecase, &caller.policy(), &ctx)
        .await
        .map(|certification| {
            let classification = certification.classify(now, &policy);
            HttpResponse::Ok().json(APIResponse {
                certification: CertificationDTO::new(certification, &classification, &policy),
            })
        })
        .map_err(CertwatchError::from)
}

/// Records the certificate issued for a certification. The document itself
/// is uploaded elsewhere, only its metadata is stored here.
#[derive(Debug)]
pub struct AttachCertificateUseCase {
    pub achievement_id: ID,
    pub tenant_id: Option<ID>,
    pub certificate_number: Option<String>,
    pub attached_file: Option<AttachedFile>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidCertificate(String),
    NotFound(ID),
    Busy(ID),
    StorageError,
}

impl From<UseCaseError> for CertwatchError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidCertificate(msg) => Self::BadClientData(msg),
            UseCaseError::NotFound(id) => Self::NotFound(format!(
                "The certification with id: {}, was not found.",
                id
            )),
            UseCaseError::Busy(id) => Self::Conflict(format!(
                "The certification with id: {} is being processed, try again shortly.",
                id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

impl AttachCertificateUseCase {
    fn validate(&mut self) -> Result<(), UseCaseError> {
        if let Some(number) = &self.certificate_number {
            let number = number.trim();
            if number.is_empty() {
                return Err(UseCaseError::InvalidCertificate(
                    "The certificate number can not be empty".into(),
                ));
            }
            self.certificate_number = Some(number.to_string());
        }
        if let Some(file) = &self.attached_file {
            if file.path.trim().is_empty() || file.size_bytes < 0 {
                return Err(UseCaseError::InvalidCertificate(
                    "The attached file needs a path and a non negative size".into(),
                ));
            }
        }
        if self.certificate_number.is_none() && self.attached_file.is_none() {
            return Err(UseCaseError::InvalidCertificate(
                "Provide a certificateNumber and/or an attachedFile".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for AttachCertificateUseCase {
    type Response = Certification;

    type Error = UseCaseError;

    const NAME: &'static str = "AttachCertificate";

    async fn execute(&mut self, ctx: &CertwatchContext) -> Result<Self::Response, Self::Error> {
        self.validate()?;

        let certification = match ctx
            .repos
            .achievements
            .find_certification(&self.achievement_id)
            .await
        {
            Some(c) if within_scope(&self.tenant_id, &c.achievement) => c,
            _ => return Err(UseCaseError::NotFound(self.achievement_id.clone())),
        };

        // Claimed so that a reminder run can not overwrite the update
        let now = ctx.sys.get_datetime();
        let lock = ReminderLock {
            achievement_id: self.achievement_id.clone(),
            now,
            until: lock_until(now, ctx),
            condition: LockCondition::Any,
        };
        let mut achievement = match ctx.repos.achievements.lock_for_reminder(&lock).await {
            Ok(Some(achievement)) => achievement,
            Ok(None) => return Err(UseCaseError::Busy(self.achievement_id.clone())),
            Err(e) => {
                error!("Unable to claim certification: {:?}", e);
                return Err(UseCaseError::StorageError);
            }
        };

        achievement.attach_certificate(
            self.certificate_number.take(),
            self.attached_file.take(),
            now,
        );
        if let Err(e) = ctx.repos.achievements.save(&achievement).await {
            error!("Unable to save certificate: {:?}", e);
            let _ = ctx.repos.achievements.unlock(&achievement.id).await;
            return Err(UseCaseError::StorageError);
        }

        Ok(Certification {
            achievement,
            ..certification
        })
    }
}

impl PermissionBoundary for AttachCertificateUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::AttachCertificates]
    }
}
