use actix_web::web;
use certwatch_domain::{TenantScoped, ID};

mod attach_certificate;
mod deliver_reminder;
mod get_certification_reminders;
mod get_certifications;
pub mod send_bulk_reminders;
mod send_certification_reminder;
#[cfg(test)]
mod test_fixtures;

use attach_certificate::attach_certificate_controller;
use get_certification_reminders::get_certification_reminders_controller;
use get_certifications::get_certifications_controller;
use send_bulk_reminders::send_bulk_reminders_controller;
use send_certification_reminder::send_certification_reminder_controller;

/// Whether a caller restricted to `scope` may act on `entity`
fn within_scope(scope: &Option<ID>, entity: &impl TenantScoped) -> bool {
    match scope {
        Some(scope) => scope == entity.tenant_id(),
        None => true,
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/certifications",
        web::get().to(get_certifications_controller),
    );
    cfg.route(
        "/certifications/{achievement_id}/reminders",
        web::post().to(send_certification_reminder_controller),
    );
    cfg.route(
        "/certifications/{achievement_id}/reminders",
        web::get().to(get_certification_reminders_controller),
    );
    cfg.route(
        "/certifications/{achievement_id}/certificate",
        web::put().to(attach_certificate_controller),
    );

    cfg.route(
        "/reminders/bulk",
        web::post().to(send_bulk_reminders_controller),
    );
}
