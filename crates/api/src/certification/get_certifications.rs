use crate::{
    error::CertwatchError,
    shared::{
        auth::{protect_admin_route, Caller, Permission},
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use certwatch_api_structs::dtos::CertificationDTO;
use certwatch_api_structs::get_certifications::{APIResponse, QueryParams};
use certwatch_domain::{Certification, CertificationState, Classification, ID};
use certwatch_infra::{CertificationFilter, CertwatchContext};
use tracing::error;

pub async fn get_certifications_controller(
    http_req: HttpRequest,
    query: web::Query<QueryParams>,
    ctx: web::Data<CertwatchContext>,
) -> Result<HttpResponse, CertwatchError> {
    let claims = protect_admin_route(&http_req, &ctx)?;
    let query = query.0;
    // Platform admins pick the tenant to list, everybody else lists their own
    let tenant_id = match claims.tenant_id.clone() {
        Some(tenant_id) => tenant_id,
        None => query.tenant_id.ok_or_else(|| {
            CertwatchError::BadClientData(
                "Platform admins must provide the tenantId to list".into(),
            )
        })?,
    };
    let caller = Caller::Admin(claims);

    let usecase = GetCertificationsUseCase {
        tenant_id,
        status: query.status,
        category: query.category,
    };

    let policy = ctx.config.expiry_policy;
    execute_with_policy(usecase, &caller.policy(), &ctx)
        .await
        .map(|certifications| {
            HttpResponse::Ok().json(APIResponse {
                certifications: certifications
                    .into_iter()
                    .map(|(c, classification)| CertificationDTO::new(c, &classification, &policy))
                    .collect(),
            })
        })
        .map_err(CertwatchError::from)
}

/// Lists the certifications of one tenant with their current state
#[derive(Debug)]
pub struct GetCertificationsUseCase {
    pub tenant_id: ID,
    pub status: Option<CertificationState>,
    pub category: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for CertwatchError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetCertificationsUseCase {
    type Response = Vec<(Certification, Classification)>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetCertifications";

    async fn execute(&mut self, ctx: &CertwatchContext) -> Result<Self::Response, Self::Error> {
        let now = ctx.sys.get_datetime();
        let policy = ctx.config.expiry_policy;
        let mut filter = CertificationFilter::new(self.tenant_id.clone(), now, policy);
        filter.status = self.status;
        filter.category = self.category.clone();

        let certifications = ctx
            .repos
            .achievements
            .find_by_filter(&filter)
            .await
            .map_err(|e| {
                error!("Unable to list certifications: {:?}", e);
                UseCaseError::StorageError
            })?;

        Ok(certifications
            .into_iter()
            .map(|c| {
                let classification = c.classify(now, &policy);
                (c, classification)
            })
            .collect())
    }
}

impl PermissionBoundary for GetCertificationsUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ViewCertifications]
    }
}
