use certwatch_api::Application;
use certwatch_domain::{
    Achievement, AdminClaims, AdminRole, Course, Customer, ExpiryPolicy, Tenant, ID,
};
use certwatch_infra::{CertwatchContext, InMemoryMailer, StaticTimeSys};
use certwatch_sdk::{CertwatchSDK, Credentials};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

pub const ADMIN_SESSION_SECRET: &str = "integration-session-secret";
pub const CRON_SECRET: &str = "integration-cron-secret";

/// The pinned clock of the spawned server
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 2, 7, 0, 0).unwrap()
}

pub struct TestApp {
    pub ctx: CertwatchContext,
    pub mailer: Arc<InMemoryMailer>,
    pub address: String,
}

pub struct SeededTenant {
    pub tenant: Tenant,
    pub customer: Customer,
    pub course: Course,
}

impl TestApp {
    pub fn sdk_for(&self, credentials: Credentials) -> CertwatchSDK {
        CertwatchSDK::new(self.address.clone(), credentials)
    }

    pub fn admin_token(&self, tenant_id: Option<ID>, role: AdminRole) -> String {
        AdminClaims {
            sub: ID::new(),
            tenant_id,
            role,
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        }
        .encode(ADMIN_SESSION_SECRET)
        .expect("Admin token to be encoded")
    }

    pub fn admin_sdk(&self, tenant_id: Option<ID>, role: AdminRole) -> CertwatchSDK {
        self.sdk_for(Credentials::AdminSession(self.admin_token(tenant_id, role)))
    }

    pub fn cron_sdk(&self) -> CertwatchSDK {
        self.sdk_for(Credentials::CronSecret(CRON_SECRET.into()))
    }

    pub async fn seed_tenant(&self, name: &str) -> SeededTenant {
        let tenant = Tenant::new(name);
        self.ctx.repos.tenants.insert(&tenant).await.unwrap();
        let customer = Customer::new(
            tenant.id.clone(),
            "Alex Morgan",
            format!("alex@{}.example.com", tenant.id),
        );
        self.ctx.repos.customers.insert(&customer).await.unwrap();
        let course = Course::new(tenant.id.clone(), "First Aid at Work", "Health & Safety");
        self.ctx.repos.courses.insert(&course).await.unwrap();

        SeededTenant {
            tenant,
            customer,
            course,
        }
    }

    pub async fn add_achievement(
        &self,
        seeded: &SeededTenant,
        expiry: Option<DateTime<Utc>>,
        next_reminder_date: Option<DateTime<Utc>>,
    ) -> Achievement {
        let mut achievement = Achievement::new(
            seeded.tenant.id.clone(),
            seeded.customer.id.clone(),
            seeded.course.id.clone(),
            now() - Duration::days(3 * 365),
            expiry,
        );
        achievement.next_reminder_date = next_reminder_date;
        self.ctx
            .repos
            .achievements
            .insert(&achievement)
            .await
            .unwrap();
        achievement
    }

    pub async fn achievement(&self, achievement_id: &ID) -> Achievement {
        self.ctx
            .repos
            .achievements
            .find(achievement_id)
            .await
            .expect("Achievement to exist")
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, CertwatchSDK, String) {
    let mut ctx = CertwatchContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.admin_session_secret = ADMIN_SESSION_SECRET.into();
    ctx.config.cron_secret = Some(CRON_SECRET.into());
    ctx.config.expiry_policy = ExpiryPolicy::never_expiring();
    ctx.config.reminder_sweep_interval_secs = None;
    ctx.sys = Arc::new(StaticTimeSys::at(now()));
    let mailer = Arc::new(InMemoryMailer::new());
    ctx.mailer = mailer.clone();

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp {
        ctx,
        mailer,
        address: address.clone(),
    };
    let sdk = CertwatchSDK::new(address.clone(), Credentials::None);
    (app, sdk, address)
}
