mod base;
mod certification;
mod reminder;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIErrorVariant, APIResponse, Credentials};
use certification::CertificationClient;
pub use certification::{AttachCertificateInput, GetCertificationsInput};
use reminder::ReminderClient;
use status::StatusClient;
use std::sync::Arc;

pub use certwatch_api_structs::dtos::*;
pub use certwatch_domain::{AttachedFile, CertificationState, ReminderType, ID};

// Domain
pub use certwatch_api_structs::dtos::CertificationDTO as Certification;
pub use certwatch_api_structs::dtos::CertificationReminderDTO as CertificationReminder;

/// Certwatch Server SDK
///
/// The SDK contains methods for interacting with the Certwatch server API.
#[derive(Clone)]
pub struct CertwatchSDK {
    pub certification: CertificationClient,
    pub reminder: ReminderClient,
    pub status: StatusClient,
}

impl CertwatchSDK {
    pub fn new(address: String, credentials: Credentials) -> Self {
        let base = Arc::new(BaseClient::new(address, credentials));
        let certification = CertificationClient::new(base.clone());
        let reminder = ReminderClient::new(base.clone());
        let status = StatusClient::new(base);

        Self {
            certification,
            reminder,
            status,
        }
    }
}
