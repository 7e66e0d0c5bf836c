use crate::{APIResponse, BaseClient};
use certwatch_api_structs::*;
use certwatch_domain::{AttachedFile, CertificationState, ID};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct CertificationClient {
    base: Arc<BaseClient>,
}

#[derive(Default)]
pub struct GetCertificationsInput {
    pub status: Option<CertificationState>,
    pub category: Option<String>,
    /// Only used by platform admins
    pub tenant_id: Option<ID>,
}

pub struct AttachCertificateInput {
    pub achievement_id: ID,
    pub certificate_number: Option<String>,
    pub attached_file: Option<AttachedFile>,
}

impl CertificationClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn get(
        &self,
        input: GetCertificationsInput,
    ) -> APIResponse<get_certifications::APIResponse> {
        let query = get_certifications::QueryParams {
            status: input.status,
            category: input.category,
            tenant_id: input.tenant_id,
        };
        self.base
            .get_with_query("certifications".into(), &query, StatusCode::OK)
            .await
    }

    pub async fn send_reminder(
        &self,
        achievement_id: ID,
    ) -> APIResponse<send_certification_reminder::APIResponse> {
        self.base
            .post::<_, ()>(
                None,
                format!("certifications/{}/reminders", achievement_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn get_reminders(
        &self,
        achievement_id: ID,
    ) -> APIResponse<get_certification_reminders::APIResponse> {
        self.base
            .get(
                format!("certifications/{}/reminders", achievement_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn attach_certificate(
        &self,
        input: AttachCertificateInput,
    ) -> APIResponse<attach_certificate::APIResponse> {
        let body = attach_certificate::RequestBody {
            certificate_number: input.certificate_number,
            attached_file: input.attached_file,
        };
        self.base
            .put(
                body,
                format!("certifications/{}/certificate", input.achievement_id),
                StatusCode::OK,
            )
            .await
    }
}
