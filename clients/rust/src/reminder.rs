use crate::{APIResponse, BaseClient};
use certwatch_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReminderClient {
    base: Arc<BaseClient>,
}

impl ReminderClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    /// Triggers a reminder sweep over every certification the caller can see
    pub async fn send_bulk(&self) -> APIResponse<send_bulk_reminders::APIResponse> {
        self.base
            .post::<_, ()>(None, "reminders/bulk".into(), StatusCode::OK)
            .await
    }
}
