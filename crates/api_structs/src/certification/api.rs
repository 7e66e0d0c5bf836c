use crate::dtos::{CertificationDTO, CertificationReminderDTO};
use certwatch_domain::{AttachedFile, CertificationState, ID};
use serde::{Deserialize, Serialize};

pub mod send_certification_reminder {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub achievement_id: ID,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
        pub message: String,
    }

    impl APIResponse {
        pub fn sent() -> Self {
            Self {
                success: true,
                message: "Reminder sent successfully".into(),
            }
        }
    }
}

pub mod send_bulk_reminders {
    use super::*;

    #[derive(Deserialize, Serialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub success: bool,
        pub message: String,
        /// Reminders delivered
        pub sent: usize,
        /// Reminders that failed to render or send
        pub errors: usize,
        /// Certifications another run was already processing or that were
        /// no longer due
        pub skipped: usize,
    }

    impl APIResponse {
        pub fn new(sent: usize, errors: usize, skipped: usize) -> Self {
            Self {
                success: true,
                message: "Bulk certification reminders sent successfully".into(),
                sent,
                errors,
                skipped,
            }
        }
    }
}

pub mod get_certifications {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub status: Option<CertificationState>,
        pub category: Option<String>,
        /// Only used by platform admins, everybody else lists their own tenant
        pub tenant_id: Option<ID>,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub certifications: Vec<CertificationDTO>,
    }
}

pub mod get_certification_reminders {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub achievement_id: ID,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub reminders: Vec<CertificationReminderDTO>,
    }
}

pub mod attach_certificate {
    use super::*;

    #[derive(Serialize, Deserialize)]
    pub struct PathParams {
        pub achievement_id: ID,
    }

    #[derive(Serialize, Deserialize, Debug, Default)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub certificate_number: Option<String>,
        pub attached_file: Option<AttachedFile>,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub certification: CertificationDTO,
    }
}
