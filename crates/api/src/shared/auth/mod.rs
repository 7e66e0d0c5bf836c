mod policy;
mod route_guards;

pub use policy::{Permission, Policy};
pub use route_guards::{
    protect_admin_route, protect_reminder_trigger_route, Caller, ADMIN_SESSION_COOKIE,
    CRON_SECRET_HEADER,
};
