use super::Policy;
use crate::error::CertwatchError;
use actix_web::HttpRequest;
use certwatch_domain::{AdminClaims, ID};
use certwatch_infra::CertwatchContext;
use certwatch_utils::secrets_match;
use tracing::warn;

pub const ADMIN_SESSION_COOKIE: &str = "certwatch-admin-session";
pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// Who is making a request
#[derive(Debug, Clone)]
pub enum Caller {
    /// The scheduled job runner authenticated by the shared cron secret
    Cron,
    Admin(AdminClaims),
}

impl Caller {
    pub fn policy(&self) -> Policy {
        match self {
            Self::Cron => Policy::cron(),
            Self::Admin(claims) => Policy::for_role(claims.role),
        }
    }

    /// The tenant the caller is restricted to, `None` when it may act on
    /// every tenant
    pub fn tenant_scope(&self) -> Option<ID> {
        match self {
            Self::Cron => None,
            Self::Admin(claims) if claims.is_platform_admin() => None,
            Self::Admin(claims) => claims.tenant_id.clone(),
        }
    }
}

fn parse_authtoken_header(token_header_value: &str) -> String {
    let token = token_header_value
        .trim()
        .trim_start_matches("Bearer")
        .trim_start_matches("bearer");
    String::from(token.trim())
}

fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(token) = req.headers().get("authorization") {
        return token.to_str().ok().map(parse_authtoken_header);
    }
    req.cookie(ADMIN_SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Authenticates an admin from the session token in the `Authorization`
/// header or the admin session cookie
pub fn protect_admin_route(
    req: &HttpRequest,
    ctx: &CertwatchContext,
) -> Result<AdminClaims, CertwatchError> {
    let token = session_token(req).ok_or_else(|| {
        CertwatchError::Unauthorized("Missing admin session".to_string())
    })?;
    AdminClaims::decode(&token, &ctx.config.admin_session_secret).map_err(|e| {
        warn!("Rejected admin session: {:?}", e);
        CertwatchError::Unauthorized("Invalid or expired admin session".to_string())
    })
}

/// Authenticates the caller of the reminder sweep: either the cron job
/// presenting the shared secret or an admin
pub fn protect_reminder_trigger_route(
    req: &HttpRequest,
    ctx: &CertwatchContext,
) -> Result<Caller, CertwatchError> {
    let cron_secret = match req.headers().get(CRON_SECRET_HEADER) {
        Some(secret) => secret,
        None => return protect_admin_route(req, ctx).map(Caller::Admin),
    };

    let expected = ctx.config.cron_secret.as_ref().ok_or_else(|| {
        warn!("Received a cron request but CRON_SECRET is not configured");
        CertwatchError::Unauthorized("Cron access is not enabled".to_string())
    })?;
    match cron_secret.to_str() {
        Ok(secret) if secrets_match(secret, expected) => Ok(Caller::Cron),
        _ => Err(CertwatchError::Unauthorized(format!(
            "Invalid {} header",
            CRON_SECRET_HEADER
        ))),
    }
}
